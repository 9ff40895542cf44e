use super::nom_parser::{parse_file, DataDef, TreeDef, TreeSource};
use crate::{error::LoadError, NodeId, Registry, Tree};
use tracing::debug;

/// Instantiate a behavior tree from a AST of a tree.
///
/// The tree named `main` becomes the root. Any node type that is not registered
/// is looked up among the other trees of the source and instantiated in place.
pub fn load(tree_source: &TreeSource, registry: &Registry) -> Result<Tree, LoadError> {
    let main = tree_source.find("main").ok_or(LoadError::MissingTree)?;

    let top = TreeStack {
        name: "main",
        parent: None,
    };

    let mut tree = Tree::new();
    let root = load_recurse(
        &mut tree,
        &main.root,
        registry,
        tree_source,
        &top,
        &VarScope::default(),
    )?;
    tree.set_root(root);
    debug!(nodes = tree.len(), "loaded tree source");
    Ok(tree)
}

/// Parses `source` and instantiates its `main` tree.
pub fn load_str(source: &str, registry: &Registry) -> Result<Tree, LoadError> {
    let (rest, tree_source) =
        parse_file(source).map_err(|e| LoadError::Parse(e.to_string()))?;
    if !rest.is_empty() {
        let snippet: String = rest.chars().take(40).collect();
        return Err(LoadError::Parse(snippet));
    }
    load(&tree_source, registry)
}

/// A mechanism to detect infinite recursion. It is a linked list in call stack.
/// You can traverse the link back to enumerate all the subtree names (which is effectively function names)
/// and check if a subtree name to be inserted is already there.
///
/// Recursive subtrees are an error. Expanding them eagerly would never terminate.
struct TreeStack<'a, 'src> {
    name: &'src str,
    parent: Option<&'a TreeStack<'a, 'src>>,
}

impl<'a, 'src> TreeStack<'a, 'src> {
    fn find(&self, name: &str) -> bool {
        if self.name == name {
            true
        } else if let Some(parent) = self.parent {
            parent.find(name)
        } else {
            false
        }
    }
}

/// Variables declared by the enclosing nodes, in the same call-stack list style as
/// [`TreeStack`]. A subtree starts with an empty scope.
#[derive(Default)]
struct VarScope<'a, 'src> {
    names: Vec<&'src str>,
    parent: Option<&'a VarScope<'a, 'src>>,
}

impl<'a, 'src> VarScope<'a, 'src> {
    fn find(&self, name: &str) -> bool {
        self.names.contains(&name) || self.parent.map_or(false, |parent| parent.find(name))
    }
}

fn load_recurse(
    tree: &mut Tree,
    def: &TreeDef,
    registry: &Registry,
    tree_source: &TreeSource,
    parent_stack: &TreeStack,
    vars: &VarScope,
) -> Result<NodeId, LoadError> {
    let id = if let Some(node) = registry.build(def.ty) {
        tree.add_named(def.ty, node)
    } else if let Some(subtree) = tree_source.find(def.ty) {
        // Prevent infinite recursion
        if parent_stack.find(def.ty) {
            return Err(LoadError::InfiniteRecursion {
                node: def.ty.to_owned(),
            });
        }
        let tree_stack = TreeStack {
            name: def.ty,
            parent: Some(parent_stack),
        };
        debug!(subtree = def.ty, "expanding subtree");
        load_recurse(
            tree,
            &subtree.root,
            registry,
            tree_source,
            &tree_stack,
            &VarScope::default(),
        )?
    } else if vars.find(def.ty) && def.children.is_empty() {
        let is_true = registry
            .build("IsTrue")
            .ok_or_else(|| LoadError::MissingNode("IsTrue".to_owned()))?;
        let id = tree.add_named("IsTrue", is_true);
        tree.set_data(id, "key", def.ty.to_owned());
        id
    } else {
        return Err(LoadError::MissingNode(def.ty.to_owned()));
    };

    for DataDef { key, value } in &def.data {
        tree.set_data(id, *key, value.clone());
    }
    // A declaration without initializer still claims the scope for assignments.
    for var in &def.vars {
        tree.set_data(id, var.name, var.init.unwrap_or(false));
    }

    let scope = VarScope {
        names: def.vars.iter().map(|var| var.name).collect(),
        parent: Some(vars),
    };

    for child in &def.children {
        let child_id = load_recurse(tree, child, registry, tree_source, parent_stack, &scope)?;
        tree.attach(id, child_id)
            .map_err(|e| LoadError::Attach(e, def.ty.to_owned()))?;
    }

    Ok(id)
}

#[cfg(test)]
mod test;
