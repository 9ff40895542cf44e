use super::{
    nodes::{
        EmptyNode, FailureNode, FallbackNode, ForceFailureNode, ForceSuccessNode, IfNode,
        InverterNode, IsTrueNode, ParallelNode, ReactiveFallbackNode, ReactiveSequenceNode,
        RepeatNode, RepeatUntilNode, RetryNode, SequenceNode, SetBoolNode, SuccessNode,
    },
    BehaviorNode,
};
use std::collections::HashMap;

pub type Constructor = Box<dyn Fn() -> Box<dyn BehaviorNode>>;

pub fn boxify<T>(cons: impl (Fn() -> T) + 'static) -> Constructor
where
    T: BehaviorNode + 'static,
{
    Box::new(move || Box::new(cons()))
}

/// Maps node type names used in tree sources to constructors.
pub struct Registry {
    node_types: HashMap<String, Constructor>,
}

impl Default for Registry {
    fn default() -> Self {
        let mut ret = Self::empty();
        ret.register("Sequence", boxify(SequenceNode::default));
        ret.register("ReactiveSequence", boxify(ReactiveSequenceNode::default));
        ret.register("Fallback", boxify(FallbackNode::default));
        ret.register("Selector", boxify(FallbackNode::default));
        ret.register("ReactiveFallback", boxify(ReactiveFallbackNode::default));
        ret.register("Parallel", boxify(ParallelNode::default));
        ret.register("ForceSuccess", boxify(|| ForceSuccessNode));
        ret.register("ForceFailure", boxify(|| ForceFailureNode));
        ret.register("Inverter", boxify(|| InverterNode));
        ret.register("Repeat", boxify(RepeatNode::default));
        ret.register("Retry", boxify(RetryNode::default));
        ret.register("RepeatUntil", boxify(RepeatUntilNode::default));
        ret.register("if", boxify(IfNode::default));
        ret.register("IsTrue", boxify(|| IsTrueNode));
        ret.register("SetBool", boxify(|| SetBoolNode));
        ret.register("Success", boxify(|| SuccessNode));
        ret.register("Failure", boxify(|| FailureNode));
        ret.register("Empty", boxify(|| EmptyNode));
        ret
    }
}

impl Registry {
    /// A registry without the built-in node types.
    pub fn empty() -> Self {
        Self {
            node_types: HashMap::new(),
        }
    }

    pub fn register(&mut self, type_name: impl ToString, constructor: Constructor) {
        self.node_types.insert(type_name.to_string(), constructor);
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.node_types.contains_key(type_name)
    }

    pub fn build(&self, type_name: &str) -> Option<Box<dyn BehaviorNode>> {
        self.node_types
            .get(type_name)
            .map(|constructor| constructor())
    }
}
