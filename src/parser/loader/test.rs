use super::*;
use crate::{boxify, BehaviorNode, Context, NodeState};
use std::{cell::RefCell, rc::Rc};

/// Pushes the blackboard value `label` into a shared log.
struct Say(Rc<RefCell<Vec<String>>>);

impl BehaviorNode for Say {
    fn evaluate(&mut self, ctx: &mut Context) -> NodeState {
        match ctx.get::<String>("label") {
            Some(label) => {
                self.0.borrow_mut().push(label.clone());
                NodeState::Success
            }
            None => NodeState::Failure,
        }
    }
}

fn registry_with_log() -> (Registry, Rc<RefCell<Vec<String>>>) {
    let log = Rc::new(RefCell::new(vec![]));
    let mut registry = Registry::default();
    let cloned = log.clone();
    registry.register("Say", boxify(move || Say(cloned.clone())));
    (registry, log)
}

#[test]
fn test_load_main() {
    let (registry, log) = registry_with_log();
    let mut tree = load_str(
        r#"
tree main = Sequence {
    Say (label = "first")
    Say (label = "second")
}
"#,
        &registry,
    )
    .unwrap();

    assert_eq!(tree.len(), 3);
    let root = tree.root().unwrap();
    assert_eq!(tree.name(root), Some("Sequence"));
    assert_eq!(tree.tick(), Some(NodeState::Success));
    assert_eq!(*log.borrow(), vec!["first", "second"]);
}

#[test]
fn test_subtree() {
    let (registry, log) = registry_with_log();
    let source = r#"
tree main = Sequence {
    sub (label = "outer")
    Say
}

tree sub = Fallback {
    Say
}
"#;
    let (_, tree_source) = parse_file(source).unwrap();
    let mut tree = load(&tree_source, &registry).unwrap();

    // The subtree root holds the data, so only the subtree sees it.
    assert_eq!(tree.tick(), Some(NodeState::Failure));
    assert_eq!(*log.borrow(), vec!["outer"]);

    let root = tree.root().unwrap();
    let subtree_root = tree.children(root)[0];
    assert_eq!(tree.name(subtree_root), Some("Fallback"));
    assert_eq!(tree.get_data::<String>(subtree_root, "label").map(String::as_str), Some("outer"));
}

#[test]
fn test_subtree_instances_are_independent() {
    let registry = Registry::default();
    let mut tree = load_str(
        "tree main = Sequence { sub sub }
         tree sub = Repeat (n = \"2\") { Success }",
        &registry,
    )
    .unwrap();
    let root = tree.root().unwrap();
    let (first, second) = (tree.children(root)[0], tree.children(root)[1]);
    assert_ne!(first, second);
    assert_eq!(tree.tick_until_done(10).unwrap().state, NodeState::Success);
}

#[test]
fn test_vars() {
    let (registry, log) = registry_with_log();
    let mut tree = load_str(
        r#"
tree main = Sequence {
    var alert = false
    if (alert) {
        Say (label = "alert")
    } else {
        Say (label = "calm")
        alert = true
    }
    if (alert) {
        Say (label = "alert")
    }
}
"#,
        &registry,
    )
    .unwrap();
    let root = tree.root().unwrap();
    assert_eq!(tree.get_data::<bool>(root, "alert"), Some(&false));

    assert_eq!(tree.tick(), Some(NodeState::Success));
    assert_eq!(*log.borrow(), vec!["calm", "alert"]);
    assert_eq!(tree.get_data::<bool>(root, "alert"), Some(&true));
}

#[test]
fn test_var_without_initializer() {
    let registry = Registry::default();
    let mut tree = load_str(
        "tree main = Sequence {
            var a
            ForceSuccess { Sequence { a = true } }
            a
        }",
        &registry,
    )
    .unwrap();
    let root = tree.root().unwrap();
    assert_eq!(tree.get_data::<bool>(root, "a"), Some(&false));

    // The nested assignment reaches the declaring scope, where the sibling reads it.
    assert_eq!(tree.tick(), Some(NodeState::Success));
    assert_eq!(tree.get_data::<bool>(root, "a"), Some(&true));
}

#[test]
fn test_undeclared_var_is_missing() {
    let registry = Registry::default();
    let err = load_str("tree main = Sequence { if (flag) { Success } }", &registry).unwrap_err();
    assert!(matches!(err, LoadError::MissingNode(node) if node == "flag"));
}

#[test]
fn test_missing_tree() {
    let registry = Registry::default();
    let err = load_str("tree other = Success", &registry).unwrap_err();
    assert!(matches!(err, LoadError::MissingTree));
}

#[test]
fn test_infinite_recursion() {
    let registry = Registry::default();
    let err = load_str(
        "tree main = Sequence { sub }
         tree sub = Fallback { main }",
        &registry,
    )
    .unwrap_err();
    assert!(matches!(err, LoadError::InfiniteRecursion { node } if node == "main"));
}

#[test]
fn test_too_many_children() {
    let registry = Registry::default();
    let err = load_str("tree main = Inverter { Success Failure }", &registry).unwrap_err();
    assert!(matches!(
        err,
        LoadError::Attach(crate::error::AttachError::TooManyChildren(_), node) if node == "Inverter"
    ));
}

#[test]
fn test_parse_error() {
    let registry = Registry::default();
    let err = load_str("tree main = Sequence { Success } }", &registry).unwrap_err();
    assert!(matches!(err, LoadError::Parse(rest) if rest == "}"));
}
