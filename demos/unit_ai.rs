//! A single unit driven by a behavior tree.
//!
//! Run with `RUST_LOG=rts_behavior_tree=trace` to see every node evaluation.

use ::rts_behavior_tree::{
    boxify, load_str, BehaviorNode, Context, Lazy, NodeState, Registry, Symbol,
};
use tracing::info;

static ENEMY_DISTANCE: Lazy<Symbol> = Lazy::new(|| "enemy_distance".into());
static COMMAND: Lazy<Symbol> = Lazy::new(|| "command".into());

struct EnemyVisible;

impl BehaviorNode for EnemyVisible {
    fn evaluate(&mut self, ctx: &mut Context) -> NodeState {
        if ctx.get::<f64>(*ENEMY_DISTANCE).is_some() {
            NodeState::Success
        } else {
            NodeState::Failure
        }
    }
}

struct EnemyInRange;

impl BehaviorNode for EnemyInRange {
    fn evaluate(&mut self, ctx: &mut Context) -> NodeState {
        let range = ctx.get_local_parse::<f64>("range").unwrap_or(1.);
        match ctx.get::<f64>(*ENEMY_DISTANCE) {
            Some(distance) if *distance <= range => NodeState::Success,
            _ => NodeState::Failure,
        }
    }
}

/// Issues `command` to the game and reports `result`.
struct Order {
    command: &'static str,
    result: NodeState,
}

impl BehaviorNode for Order {
    fn evaluate(&mut self, ctx: &mut Context) -> NodeState {
        ctx.assign(*COMMAND, self.command);
        self.result
    }
}

// Reactive composites re-check their conditions every frame.
const SOURCE: &str = r#"
tree main = ReactiveFallback {
    Engage
    Patrol
}

tree Engage = ReactiveSequence {
    EnemyVisible
    ReactiveFallback {
        ReactiveSequence {
            EnemyInRange (range = "2.5")
            Attack
        }
        Approach
    }
}
"#;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let mut registry = Registry::default();
    registry.register("EnemyVisible", boxify(|| EnemyVisible));
    registry.register("EnemyInRange", boxify(|| EnemyInRange));
    registry.register(
        "Attack",
        boxify(|| Order {
            command: "attack",
            result: NodeState::Success,
        }),
    );
    registry.register(
        "Approach",
        boxify(|| Order {
            command: "approach",
            result: NodeState::Running,
        }),
    );
    registry.register(
        "Patrol",
        boxify(|| Order {
            command: "patrol",
            result: NodeState::Running,
        }),
    );

    let mut tree = load_str(SOURCE, &registry)?;
    let root = tree
        .root()
        .ok_or_else(|| anyhow::anyhow!("tree has no root"))?;
    tree.set_data(root, *COMMAND, "idle");

    let mut enemy: Option<f64> = None;
    let mut enemy_health = 2;
    for frame in 0..10 {
        // The enemy shows up on the third frame.
        if frame == 2 {
            enemy = Some(6.);
        }
        match enemy {
            Some(distance) => tree.set_data(root, *ENEMY_DISTANCE, distance),
            None => {
                tree.clear_data(root, *ENEMY_DISTANCE);
            }
        }

        let Some(state) = tree.tick() else {
            break;
        };
        let command = tree.get_data::<&str>(root, *COMMAND).copied().unwrap_or("idle");
        info!(frame, %state, command, ?enemy, "unit ticked");

        match command {
            "approach" => {
                if let Some(distance) = enemy.as_mut() {
                    *distance -= 1.5;
                }
            }
            "attack" if enemy.is_some() => {
                enemy_health -= 1;
                if enemy_health == 0 {
                    info!(frame, "enemy destroyed");
                    enemy = None;
                }
            }
            _ => (),
        }
    }

    Ok(())
}
