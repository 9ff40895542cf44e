use crate::{
    error::{LoadError, LoadYamlError},
    NodeId, Registry, Tree,
};
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct YamlDocument {
    #[serde(default)]
    behavior_tree: Option<BTreeMap<String, YamlNode>>,
}

/// One node of a YAML tree description.
#[derive(Debug, Deserialize)]
pub struct YamlNode {
    #[serde(rename = "type")]
    pub ty: String,
    /// Literal entries stored in the node's own blackboard.
    #[serde(default)]
    pub data: BTreeMap<String, Value>,
    #[serde(default)]
    pub children: Vec<YamlNode>,
}

fn recurse_parse(tree: &mut Tree, value: &YamlNode, reg: &Registry) -> Result<NodeId, LoadError> {
    let Some(node) = reg.build(&value.ty) else {
        warn!(ty = %value.ty, "node type is not registered");
        return Err(LoadError::MissingNode(value.ty.clone()));
    };
    let id = tree.add_named(value.ty.as_str(), node);

    for (key, datum) in &value.data {
        match datum {
            Value::Bool(b) => tree.set_data(id, key, *b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    tree.set_data(id, key, i);
                } else if let Some(f) = n.as_f64() {
                    tree.set_data(id, key, f);
                }
            }
            Value::String(s) => tree.set_data(id, key, s.clone()),
            _ => warn!(%key, "only scalar data values are supported"),
        }
    }

    for child in &value.children {
        let child_id = recurse_parse(tree, child, reg)?;
        tree.attach(id, child_id)
            .map_err(|e| LoadError::Attach(e, value.ty.clone()))?;
    }

    Ok(id)
}

/// Loads every tree under the `behavior_tree` mapping, keyed by its name.
pub fn load_yaml(yaml: &str, reg: &Registry) -> Result<HashMap<String, Tree>, LoadYamlError> {
    let document: YamlDocument = serde_yaml::from_str(yaml)?;
    let roots = document.behavior_tree.ok_or(LoadYamlError::Missing)?;
    roots
        .iter()
        .map(|(name, value)| -> Result<(String, Tree), LoadYamlError> {
            let mut tree = Tree::new();
            let root = recurse_parse(&mut tree, value, reg)?;
            tree.set_root(root);
            debug!(%name, nodes = tree.len(), "loaded yaml tree");
            Ok((name.clone(), tree))
        })
        .collect()
}

#[cfg(test)]
mod test;
