use crate::{NodeId, NodeState, Symbol, Tree};
use std::{any::Any, rc::Rc, str::FromStr};

/// The view a node gets of the tree while it is being evaluated.
///
/// Blackboard access is scoped at the evaluating node: reads fall back to the
/// ancestors, writes stay local.
pub struct Context<'t> {
    tree: &'t mut Tree,
    node: NodeId,
}

impl<'t> Context<'t> {
    pub(crate) fn new(tree: &'t mut Tree, node: NodeId) -> Self {
        Self { tree, node }
    }

    /// Handle of the node being evaluated.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn tree(&self) -> &Tree {
        &*self.tree
    }

    pub fn num_children(&self) -> usize {
        self.tree.children(self.node).len()
    }

    pub fn child(&self, index: usize) -> Option<NodeId> {
        self.tree.children(self.node).get(index).copied()
    }

    /// Evaluates the `index`th child. A missing child counts as a failure.
    pub fn evaluate_child(&mut self, index: usize) -> NodeState {
        match self.child(index) {
            Some(child) => self.tree.evaluate(child),
            None => NodeState::Failure,
        }
    }

    pub fn reset_child(&mut self, index: usize) {
        if let Some(child) = self.child(index) {
            self.tree.reset(child);
        }
    }

    pub fn get<T: 'static>(&self, key: impl Into<Symbol>) -> Option<&T> {
        self.tree.get_data(self.node, key)
    }

    pub fn get_any(&self, key: impl Into<Symbol>) -> Option<&Rc<dyn Any>> {
        self.tree.get_any(self.node, key)
    }

    pub fn get_parse<T>(&self, key: impl Into<Symbol>) -> Option<T>
    where
        T: FromStr + Clone + 'static,
    {
        self.tree.get_parse(self.node, key)
    }

    /// Parses a parameter from the node's own blackboard, ignoring ancestors.
    pub fn get_local_parse<T>(&self, key: impl Into<Symbol>) -> Option<T>
    where
        T: FromStr + Clone + 'static,
    {
        self.tree.get_local_parse(self.node, key)
    }

    pub fn set<T: 'static>(&mut self, key: impl Into<Symbol>, val: T) {
        self.tree.set_data(self.node, key, val);
    }

    /// See [`Tree::assign_data`].
    pub fn assign<T: 'static>(&mut self, key: impl Into<Symbol>, val: T) -> NodeId {
        self.tree.assign_data(self.node, key, val)
    }

    pub fn clear(&mut self, key: impl Into<Symbol>) -> bool {
        self.tree.clear_data(self.node, key)
    }
}
