use crate::{
    error::{AttachError, AttachResult},
    BehaviorNode, Blackboard, Context, NodeState, NumChildren, Symbol,
};
use std::{
    any::Any,
    fmt::{self, Debug, Display, Formatter},
    rc::Rc,
    str::FromStr,
};
use tracing::{debug, trace, warn};

/// Stable handle of a node inside a [`Tree`].
///
/// Handles are never reused, so a handle stays valid as long as the tree lives.
/// A handle from another tree is simply not found.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        write!(fmt, "#{}", self.0)
    }
}

struct NodeSlot {
    /// Name of the type of the node
    name: String,
    /// Taken out while the node is being evaluated.
    node: Option<Box<dyn BehaviorNode>>,
    state: NodeState,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    blackboard: Blackboard,
}

/// Arena holding every node of one or more behavior trees.
///
/// Parent links are plain handles used for upward traversal only; the arena owns
/// every node.
#[derive(Default)]
pub struct Tree {
    nodes: Vec<NodeSlot>,
    root: Option<NodeId>,
}

/// Outcome of [`Tree::tick_until_done`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub state: NodeState,
    pub ticks: usize,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a detached node, named after its type.
    pub fn add_node<N: BehaviorNode + 'static>(&mut self, node: N) -> NodeId {
        let name = std::any::type_name::<N>();
        let name = name.split('<').next().unwrap_or(name);
        let name = name.rsplit("::").next().unwrap_or(name);
        self.add_named(name, Box::new(node))
    }

    pub fn add_named(&mut self, name: impl Into<String>, node: Box<dyn BehaviorNode>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeSlot {
            name: name.into(),
            node: Some(node),
            state: NodeState::default(),
            parent: None,
            children: vec![],
            blackboard: Blackboard::new(),
        });
        id
    }

    /// Adds a node and attaches `children` to it in order.
    ///
    /// If one of the children is rejected, the new node keeps the children attached
    /// before it and the error is returned.
    pub fn add_with_children<N: BehaviorNode + 'static>(
        &mut self,
        node: N,
        children: &[NodeId],
    ) -> Result<NodeId, AttachError> {
        let id = self.add_node(node);
        self.set_children(id, children)?;
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    fn slot(&self, id: NodeId) -> Option<&NodeSlot> {
        self.nodes.get(id.0)
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.slot(id).map(|slot| slot.name.as_str())
    }

    /// State of the most recent evaluation, `Failure` if never evaluated.
    pub fn state(&self, id: NodeId) -> NodeState {
        self.slot(id).map(|slot| slot.state).unwrap_or_default()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).and_then(|slot| slot.parent)
    }

    /// Children in insertion order, which is evaluation order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slot(id).map_or(&[], |slot| slot.children.as_slice())
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        !self.children(id).is_empty()
    }

    pub fn is_flow_node(&self, id: NodeId) -> bool {
        self.slot(id)
            .and_then(|slot| slot.node.as_ref())
            .map_or(false, |node| node.is_flow_node())
    }

    /// Walks the parent links upwards, starting with the parent of `id`.
    pub fn ancestors(&self, id: NodeId) -> Ancestors {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> AttachResult {
        let parent_slot = self.slot(parent).ok_or(AttachError::InvalidNode(parent))?;
        let child_slot = self.slot(child).ok_or(AttachError::InvalidNode(child))?;

        if let Some(existing) = child_slot.parent {
            warn!(%child, %existing, "attach rejected, node already has a parent");
            return Err(AttachError::AlreadyAttached {
                child,
                parent: existing,
            });
        }

        if child == parent || self.ancestors(parent).any(|ancestor| ancestor == child) {
            warn!(%parent, %child, "attach rejected, would create a cycle");
            return Err(AttachError::Cycle { parent, child });
        }

        let capacity = parent_slot
            .node
            .as_ref()
            .map_or(NumChildren::Infinite, |node| node.max_children());
        if !(NumChildren::Finite(parent_slot.children.len()) < capacity) {
            warn!(%parent, name = %parent_slot.name, "attach rejected, too many children");
            return Err(AttachError::TooManyChildren(parent));
        }

        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        debug!(%parent, %child, "attached");
        Ok(())
    }

    /// Removes `child` from `parent`'s children.
    ///
    /// Returns `false` and changes nothing if `child` was not a child of `parent`.
    pub fn detach(&mut self, parent: NodeId, child: NodeId) -> bool {
        let Some(parent_slot) = self.nodes.get_mut(parent.0) else {
            return false;
        };
        let Some(pos) = parent_slot.children.iter().position(|c| *c == child) else {
            return false;
        };
        parent_slot.children.remove(pos);
        if let Some(child_slot) = self.nodes.get_mut(child.0) {
            child_slot.parent = None;
        }
        debug!(%parent, %child, "detached");
        true
    }

    /// Attaches each of `children` in order, stopping at the first rejection.
    pub fn set_children(&mut self, parent: NodeId, children: &[NodeId]) -> AttachResult {
        children
            .iter()
            .try_for_each(|child| self.attach(parent, *child))
    }

    /// Raw lookup along the ancestor chain.
    pub fn get_any(&self, id: NodeId, key: impl Into<Symbol>) -> Option<&Rc<dyn Any>> {
        let key = key.into();
        let mut cur = Some(id);
        while let Some(id) = cur {
            let slot = self.slot(id)?;
            if let Some(value) = slot.blackboard.get(&key) {
                return Some(value);
            }
            cur = slot.parent;
        }
        None
    }

    /// Returns the nearest value of `key`, or `None` if it is absent or the nearest
    /// entry is not a `T`.
    pub fn get_data<T: 'static>(&self, id: NodeId, key: impl Into<Symbol>) -> Option<&T> {
        self.get_any(id, key)
            .and_then(|value| (**value).downcast_ref())
    }

    /// Like [`Tree::get_data`], but converts string, number and bool values with
    /// `FromStr` when the stored type is not `T`.
    pub fn get_parse<T>(&self, id: NodeId, key: impl Into<Symbol>) -> Option<T>
    where
        T: FromStr + Clone + 'static,
    {
        self.get_any(id, key).and_then(|value| parse_value(&**value))
    }

    /// Like [`Tree::get_parse`], but only looks at the node's own blackboard.
    ///
    /// Node kinds read their parameters this way, so that a parameter of one node
    /// does not configure its descendants.
    pub fn get_local_parse<T>(&self, id: NodeId, key: impl Into<Symbol>) -> Option<T>
    where
        T: FromStr + Clone + 'static,
    {
        let key = key.into();
        self.slot(id)
            .and_then(|slot| slot.blackboard.get(&key))
            .and_then(|value| parse_value(&**value))
    }

    /// Writes to the node's own blackboard. Ancestors are never touched.
    pub fn set_data<T: 'static>(&mut self, id: NodeId, key: impl Into<Symbol>, val: T) {
        self.set_any(id, key, Rc::new(val));
    }

    pub fn set_any(&mut self, id: NodeId, key: impl Into<Symbol>, val: Rc<dyn Any>) {
        let key = key.into();
        match self.nodes.get_mut(id.0) {
            Some(slot) => {
                slot.blackboard.insert(key, val);
            }
            None => warn!(node = %id, %key, "set_data on a node outside this tree"),
        }
    }

    /// Overwrites the nearest existing entry of `key`.
    ///
    /// If no node on the chain has it, the value is stored at the parent of `id`
    /// (or at `id` itself for a root), so that siblings can see it.
    /// Returns the node that received the value.
    pub fn assign_data<T: 'static>(&mut self, id: NodeId, key: impl Into<Symbol>, val: T) -> NodeId {
        let key = key.into();
        let holder = std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|node| {
                self.slot(*node)
                    .map_or(false, |slot| slot.blackboard.contains_key(&key))
            })
            .or_else(|| self.parent(id))
            .unwrap_or(id);
        self.set_data(holder, key, val);
        holder
    }

    /// Removes the nearest entry of `key` only.
    ///
    /// Returns `false` if no node on the ancestor chain had it.
    pub fn clear_data(&mut self, id: NodeId, key: impl Into<Symbol>) -> bool {
        let key = key.into();
        let mut cur = Some(id);
        while let Some(id) = cur {
            let Some(slot) = self.nodes.get_mut(id.0) else {
                return false;
            };
            if slot.blackboard.remove(&key).is_some() {
                return true;
            }
            cur = slot.parent;
        }
        false
    }

    pub fn local_data(&self, id: NodeId) -> Option<&Blackboard> {
        self.slot(id).map(|slot| &slot.blackboard)
    }

    /// Evaluates `id` and records its state.
    ///
    /// The whole subtree the node routes to is evaluated before this returns.
    pub fn evaluate(&mut self, id: NodeId) -> NodeState {
        let Some(mut node) = self.nodes.get_mut(id.0).and_then(|slot| slot.node.take()) else {
            warn!(node = %id, "evaluated a node that is missing or already being evaluated");
            return NodeState::Failure;
        };
        let state = node.evaluate(&mut Context::new(self, id));
        let slot = &mut self.nodes[id.0];
        slot.node = Some(node);
        slot.state = state;
        trace!(node = %id, name = %slot.name, %state, "evaluated");
        state
    }

    /// Evaluates the root once. `None` if no root was set.
    pub fn tick(&mut self) -> Option<NodeState> {
        let root = self.root?;
        Some(self.evaluate(root))
    }

    /// Ticks the root until it stops running or `max_ticks` ticks have passed.
    pub fn tick_until_done(&mut self, max_ticks: usize) -> Option<TickReport> {
        let root = self.root?;
        let mut report = TickReport {
            state: NodeState::Running,
            ticks: 0,
        };
        while report.ticks < max_ticks {
            report.state = self.evaluate(root);
            report.ticks += 1;
            if !report.state.is_running() {
                break;
            }
        }
        debug!(state = %report.state, ticks = report.ticks, "tick loop finished");
        Some(report)
    }

    /// Forgets in-progress state of `id` and its whole subtree.
    /// Blackboards are left untouched.
    pub fn reset(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let Some(slot) = self.nodes.get_mut(id.0) else {
                continue;
            };
            if let Some(node) = slot.node.as_mut() {
                node.reset();
            }
            slot.state = NodeState::default();
            stack.extend(slot.children.iter().copied());
        }
        debug!(node = %id, "reset");
    }
}

impl Debug for Tree {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        let mut list = fmt.debug_list();
        for (i, slot) in self.nodes.iter().enumerate() {
            list.entry(&format_args!(
                "{} {} {} parent={:?} children={:?}",
                NodeId(i),
                slot.name,
                slot.state,
                slot.parent,
                slot.children
            ));
        }
        list.finish()
    }
}

/// Iterator over the ancestors of a node, nearest first.
pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let cur = self.next?;
        self.next = self.tree.parent(cur);
        Some(cur)
    }
}

pub(crate) fn parse_value<T: FromStr + Clone + 'static>(value: &dyn Any) -> Option<T> {
    if let Some(value) = value.downcast_ref::<T>() {
        return Some(value.clone());
    }
    if let Some(s) = value.downcast_ref::<String>() {
        return s.parse().ok();
    }
    if let Some(s) = value.downcast_ref::<&'static str>() {
        return s.parse().ok();
    }
    if let Some(v) = value.downcast_ref::<i64>() {
        return v.to_string().parse().ok();
    }
    if let Some(v) = value.downcast_ref::<f64>() {
        return v.to_string().parse().ok();
    }
    if let Some(v) = value.downcast_ref::<bool>() {
        return v.to_string().parse().ok();
    }
    None
}
