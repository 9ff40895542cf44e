use super::*;
use crate::NodeState;

#[test]
fn test_load_yaml() {
    let yaml = r#"
behavior_tree:
  main:
    type: Sequence
    data:
      faction: red
    children:
    - type: Repeat
      data:
        n: 2
      children:
      - type: Success
    - type: Inverter
      children:
      - type: Failure
  idle:
    type: Empty
"#;
    let mut trees = load_yaml(yaml, &Registry::default()).unwrap();
    assert_eq!(trees.len(), 2);

    let main = trees.get_mut("main").unwrap();
    let root = main.root().unwrap();
    assert_eq!(main.get_data::<String>(root, "faction").map(String::as_str), Some("red"));
    let repeat = main.children(root)[0];
    assert_eq!(main.get_data::<i64>(repeat, "n"), Some(&2));
    assert_eq!(main.tick_until_done(10).unwrap().state, NodeState::Success);

    let idle = trees.get_mut("idle").unwrap();
    assert_eq!(idle.tick(), Some(NodeState::Failure));
}

#[test]
fn test_scalar_types() {
    let yaml = r#"
behavior_tree:
  main:
    type: Empty
    data:
      flag: true
      speed: 1.5
      label: "scout"
"#;
    let trees = load_yaml(yaml, &Registry::default()).unwrap();
    let tree = &trees["main"];
    let root = tree.root().unwrap();
    assert_eq!(tree.get_data::<bool>(root, "flag"), Some(&true));
    assert_eq!(tree.get_data::<f64>(root, "speed"), Some(&1.5));
    assert_eq!(tree.get_parse::<f32>(root, "speed"), Some(1.5));
    assert_eq!(tree.get_data::<String>(root, "label").map(String::as_str), Some("scout"));
}

#[test]
fn test_missing_section() {
    let err = load_yaml("something_else: 1", &Registry::default()).unwrap_err();
    assert!(matches!(err, LoadYamlError::Missing));
}

#[test]
fn test_unknown_type() {
    let yaml = r#"
behavior_tree:
  main:
    type: Sequence
    children:
    - type: Teleport
"#;
    let err = load_yaml(yaml, &Registry::default()).unwrap_err();
    assert!(matches!(err, LoadYamlError::Load(LoadError::MissingNode(node)) if node == "Teleport"));
}

#[test]
fn test_invalid_yaml() {
    let err = load_yaml("behavior_tree: [", &Registry::default()).unwrap_err();
    assert!(matches!(err, LoadYamlError::Yaml(_)));
}
