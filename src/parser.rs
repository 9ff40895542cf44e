mod loader;
mod nom_parser;
mod yaml_parser;

pub use self::{
    loader::{load, load_str},
    nom_parser::{parse_file, DataDef, TreeDef, TreeRootDef, TreeSource, VarDef},
    yaml_parser::{load_yaml, YamlNode},
};
