use crate::{BehaviorNode, Context, Lazy, NodeState, NumChildren, Symbol};

/// The base node. Never starts a behavior and always fails.
#[derive(Default, Debug, Clone, Copy)]
pub struct EmptyNode;

impl BehaviorNode for EmptyNode {}

#[derive(Default, Debug, Clone, Copy)]
pub struct SuccessNode;

impl BehaviorNode for SuccessNode {
    fn evaluate(&mut self, _ctx: &mut Context) -> NodeState {
        NodeState::Success
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct FailureNode;

impl BehaviorNode for FailureNode {
    fn evaluate(&mut self, _ctx: &mut Context) -> NodeState {
        NodeState::Failure
    }
}

#[derive(Default, Debug)]
pub struct SequenceNode {
    current_child: Option<usize>,
}

impl BehaviorNode for SequenceNode {
    fn evaluate(&mut self, ctx: &mut Context) -> NodeState {
        let from = self.current_child.take().unwrap_or(0);
        for i in from..ctx.num_children() {
            match ctx.evaluate_child(i) {
                NodeState::Failure => return NodeState::Failure,
                NodeState::Running => {
                    self.current_child = Some(i);
                    return NodeState::Running;
                }
                NodeState::Success => (),
            }
        }
        NodeState::Success
    }

    fn is_flow_node(&self) -> bool {
        true
    }

    fn reset(&mut self) {
        self.current_child = None;
    }
}

/// A sequence that re-checks every child from the first one on each tick.
///
/// If an earlier child concludes the tick, the child that was running before is
/// reset.
#[derive(Default, Debug)]
pub struct ReactiveSequenceNode {
    running_child: Option<usize>,
}

impl BehaviorNode for ReactiveSequenceNode {
    fn evaluate(&mut self, ctx: &mut Context) -> NodeState {
        let (res, running) = tick_reactive(ctx, NodeState::Success);
        halt_previous(ctx, &mut self.running_child, running);
        res
    }

    fn is_flow_node(&self) -> bool {
        true
    }

    fn reset(&mut self) {
        self.running_child = None;
    }
}

#[derive(Default, Debug)]
pub struct FallbackNode {
    current_child: Option<usize>,
}

/// Selector is the other common name of a fallback.
pub type SelectorNode = FallbackNode;

impl BehaviorNode for FallbackNode {
    fn evaluate(&mut self, ctx: &mut Context) -> NodeState {
        let from = self.current_child.take().unwrap_or(0);
        for i in from..ctx.num_children() {
            match ctx.evaluate_child(i) {
                NodeState::Success => return NodeState::Success,
                NodeState::Running => {
                    self.current_child = Some(i);
                    return NodeState::Running;
                }
                NodeState::Failure => (),
            }
        }
        NodeState::Failure
    }

    fn is_flow_node(&self) -> bool {
        true
    }

    fn reset(&mut self) {
        self.current_child = None;
    }
}

#[derive(Default, Debug)]
pub struct ReactiveFallbackNode {
    running_child: Option<usize>,
}

impl BehaviorNode for ReactiveFallbackNode {
    fn evaluate(&mut self, ctx: &mut Context) -> NodeState {
        let (res, running) = tick_reactive(ctx, NodeState::Failure);
        halt_previous(ctx, &mut self.running_child, running);
        res
    }

    fn is_flow_node(&self) -> bool {
        true
    }

    fn reset(&mut self) {
        self.running_child = None;
    }
}

/// Ticks children from the first one while they return `pass`.
/// Returns the result and the index of the child left running, if any.
fn tick_reactive(ctx: &mut Context, pass: NodeState) -> (NodeState, Option<usize>) {
    for i in 0..ctx.num_children() {
        match ctx.evaluate_child(i) {
            NodeState::Running => return (NodeState::Running, Some(i)),
            res if res == pass => (),
            res => return (res, None),
        }
    }
    (pass, None)
}

fn halt_previous(ctx: &mut Context, previous: &mut Option<usize>, current: Option<usize>) {
    if let Some(prev) = *previous {
        if Some(prev) != current {
            ctx.reset_child(prev);
        }
    }
    *previous = current;
}

static THRESHOLD: Lazy<Symbol> = Lazy::new(|| "threshold".into());

/// Ticks every child on every tick.
///
/// Succeeds once `threshold` children have succeeded in the same tick (all of them
/// by default), fails as soon as that is no longer reachable.
#[derive(Default, Debug)]
pub struct ParallelNode {
    threshold: Option<usize>,
}

impl ParallelNode {
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold: Some(threshold),
        }
    }
}

impl BehaviorNode for ParallelNode {
    fn evaluate(&mut self, ctx: &mut Context) -> NodeState {
        let total = ctx.num_children();
        let threshold = self
            .threshold
            .or_else(|| ctx.get_local_parse::<usize>(*THRESHOLD))
            .unwrap_or(total)
            .min(total);

        let (mut succeeded, mut failed) = (0, 0);
        for i in 0..total {
            match ctx.evaluate_child(i) {
                NodeState::Success => succeeded += 1,
                NodeState::Failure => failed += 1,
                NodeState::Running => (),
            }
        }

        let res = if succeeded >= threshold {
            NodeState::Success
        } else if failed > total - threshold {
            NodeState::Failure
        } else {
            return NodeState::Running;
        };
        for i in 0..total {
            let running = ctx
                .child(i)
                .map_or(false, |child| ctx.tree().state(child).is_running());
            if running {
                ctx.reset_child(i);
            }
        }
        res
    }

    fn is_flow_node(&self) -> bool {
        true
    }
}

#[derive(Default, Debug)]
pub struct InverterNode;

impl BehaviorNode for InverterNode {
    fn evaluate(&mut self, ctx: &mut Context) -> NodeState {
        if ctx.num_children() == 0 {
            return NodeState::Failure;
        }
        ctx.evaluate_child(0).invert()
    }

    fn is_flow_node(&self) -> bool {
        true
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Finite(1)
    }
}

#[derive(Default, Debug)]
pub struct ForceSuccessNode;

impl BehaviorNode for ForceSuccessNode {
    fn evaluate(&mut self, ctx: &mut Context) -> NodeState {
        if ctx.num_children() == 0 {
            return NodeState::Failure;
        }
        match ctx.evaluate_child(0) {
            NodeState::Running => NodeState::Running,
            _ => NodeState::Success,
        }
    }

    fn is_flow_node(&self) -> bool {
        true
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Finite(1)
    }
}

#[derive(Default, Debug)]
pub struct ForceFailureNode;

impl BehaviorNode for ForceFailureNode {
    fn evaluate(&mut self, ctx: &mut Context) -> NodeState {
        if ctx.num_children() == 0 {
            return NodeState::Failure;
        }
        match ctx.evaluate_child(0) {
            NodeState::Running => NodeState::Running,
            _ => NodeState::Failure,
        }
    }

    fn is_flow_node(&self) -> bool {
        true
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Finite(1)
    }
}

static N: Lazy<Symbol> = Lazy::new(|| "n".into());

/// Runs its child `n` times in a row, one run per tick.
///
/// `n` comes from the constructor or the node's own `n` entry. A failing run fails
/// the whole repetition.
#[derive(Default, Debug)]
pub struct RepeatNode {
    n: Option<usize>,
    remaining: Option<usize>,
}

impl RepeatNode {
    pub fn new(n: usize) -> Self {
        Self {
            n: Some(n),
            remaining: None,
        }
    }
}

impl BehaviorNode for RepeatNode {
    fn evaluate(&mut self, ctx: &mut Context) -> NodeState {
        let Some(current) = self
            .remaining
            .or(self.n)
            .or_else(|| ctx.get_local_parse::<usize>(*N))
        else {
            return NodeState::Failure;
        };
        if ctx.num_children() == 0 {
            return NodeState::Failure;
        }
        if current == 0 {
            self.remaining = None;
            return NodeState::Success;
        }
        match ctx.evaluate_child(0) {
            NodeState::Success if current == 1 => {
                self.remaining = None;
                NodeState::Success
            }
            NodeState::Success => {
                self.remaining = Some(current - 1);
                NodeState::Running
            }
            NodeState::Running => {
                self.remaining = Some(current);
                NodeState::Running
            }
            NodeState::Failure => {
                self.remaining = None;
                NodeState::Failure
            }
        }
    }

    fn is_flow_node(&self) -> bool {
        true
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Finite(1)
    }

    fn reset(&mut self) {
        self.remaining = None;
    }
}

/// Gives a failing child up to `n` attempts, one attempt per tick.
#[derive(Default, Debug)]
pub struct RetryNode {
    n: Option<usize>,
    remaining: Option<usize>,
}

impl RetryNode {
    pub fn new(n: usize) -> Self {
        Self {
            n: Some(n),
            remaining: None,
        }
    }
}

impl BehaviorNode for RetryNode {
    fn evaluate(&mut self, ctx: &mut Context) -> NodeState {
        let Some(current) = self
            .remaining
            .or(self.n)
            .or_else(|| ctx.get_local_parse::<usize>(*N))
        else {
            return NodeState::Failure;
        };
        if current == 0 || ctx.num_children() == 0 {
            self.remaining = None;
            return NodeState::Failure;
        }
        match ctx.evaluate_child(0) {
            NodeState::Failure if current == 1 => {
                self.remaining = None;
                NodeState::Failure
            }
            NodeState::Failure => {
                self.remaining = Some(current - 1);
                NodeState::Running
            }
            NodeState::Running => {
                self.remaining = Some(current);
                NodeState::Running
            }
            NodeState::Success => {
                self.remaining = None;
                NodeState::Success
            }
        }
    }

    fn is_flow_node(&self) -> bool {
        true
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Finite(1)
    }

    fn reset(&mut self) {
        self.remaining = None;
    }
}

static UNTIL: Lazy<Symbol> = Lazy::new(|| "until".into());

/// Re-runs its child every tick until it concludes with the target state
/// (`until` key, failure by default).
#[derive(Default, Debug)]
pub struct RepeatUntilNode {
    until: Option<NodeState>,
}

impl RepeatUntilNode {
    pub fn new(until: NodeState) -> Self {
        Self { until: Some(until) }
    }
}

impl BehaviorNode for RepeatUntilNode {
    fn evaluate(&mut self, ctx: &mut Context) -> NodeState {
        let until = self
            .until
            .or_else(|| ctx.get_local_parse::<NodeState>(*UNTIL))
            .unwrap_or(NodeState::Failure);
        if until.is_running() || ctx.num_children() == 0 {
            return NodeState::Failure;
        }
        if ctx.evaluate_child(0) == until {
            NodeState::Success
        } else {
            NodeState::Running
        }
    }

    fn is_flow_node(&self) -> bool {
        true
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Finite(1)
    }
}

/// Condition, then branch and optional else branch.
#[derive(Default, Debug)]
pub struct IfNode {
    condition_result: Option<NodeState>,
}

impl BehaviorNode for IfNode {
    fn evaluate(&mut self, ctx: &mut Context) -> NodeState {
        let condition_result = match self.condition_result {
            Some(res) => res,
            None => ctx.evaluate_child(0),
        };

        // Remember the last conditional result in case the branch returns Running
        self.condition_result = Some(condition_result);

        let branch_result = match condition_result {
            NodeState::Success => ctx.evaluate_child(1),
            NodeState::Failure => {
                // Be aware that lack of else clause is not an error, so the result is Success.
                if ctx.num_children() > 2 {
                    ctx.evaluate_child(2)
                } else {
                    NodeState::Success
                }
            }
            NodeState::Running => NodeState::Running,
        };

        // Only a running branch keeps the condition; a running condition is re-evaluated.
        if !branch_result.is_running() || condition_result.is_running() {
            self.condition_result = None;
        }

        branch_result
    }

    fn is_flow_node(&self) -> bool {
        true
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Finite(3)
    }

    fn reset(&mut self) {
        self.condition_result = None;
    }
}

static VALUE: Lazy<Symbol> = Lazy::new(|| "value".into());
static OUTPUT: Lazy<Symbol> = Lazy::new(|| "output".into());
static INPUT: Lazy<Symbol> = Lazy::new(|| "input".into());
static KEY: Lazy<Symbol> = Lazy::new(|| "key".into());

/// Assigns the boolean `value` to the variable named by `output`.
///
/// The nearest scope that already holds the variable receives it, otherwise the
/// parent of this node.
#[derive(Default, Debug)]
pub struct SetBoolNode;

impl BehaviorNode for SetBoolNode {
    fn evaluate(&mut self, ctx: &mut Context) -> NodeState {
        let value = ctx.get_local_parse::<bool>(*VALUE);
        let output = ctx.get_local_parse::<String>(*OUTPUT);
        if let Some((value, output)) = value.zip(output) {
            ctx.assign(output, value);
            NodeState::Success
        } else {
            NodeState::Failure
        }
    }
}

/// Succeeds if the variable named by `key` (or else the `input` entry) is true.
#[derive(Default, Debug)]
pub struct IsTrueNode;

impl BehaviorNode for IsTrueNode {
    fn evaluate(&mut self, ctx: &mut Context) -> NodeState {
        let input = match ctx.get_local_parse::<String>(*KEY) {
            Some(key) => ctx.get_parse::<bool>(key),
            None => ctx.get_local_parse::<bool>(*INPUT),
        };
        match input {
            Some(true) => NodeState::Success,
            _ => NodeState::Failure,
        }
    }
}
