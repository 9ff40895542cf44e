use super::*;

impl<'src> TreeRootDef<'src> {
    fn new(name: &'src str, root: TreeDef<'src>) -> Self {
        Self { name, root }
    }
}

#[test]
fn test_trees() {
    assert_eq!(
        parse_tree(
            "tree main = Sequence {
        }"
        ),
        Ok(("", TreeRootDef::new("main", TreeDef::new("Sequence"))))
    );

    assert_eq!(
        parse_tree(
            "tree main = Sequence {
                    PrintBodyNode
        }"
        ),
        Ok((
            "",
            TreeRootDef::new(
                "main",
                TreeDef::new_with_child("Sequence", TreeDef::new("PrintBodyNode"))
            )
        ))
    );

    assert_eq!(
        parse_tree("tree leaf = Attack"),
        Ok(("", TreeRootDef::new("leaf", TreeDef::new("Attack"))))
    );
}

#[test]
fn test_nested() {
    assert_eq!(
        parse_tree(
            "tree main = Sequence {
                Fallback { A B }
                C
            }"
        ),
        Ok((
            "",
            TreeRootDef::new(
                "main",
                TreeDef::new_with_children(
                    "Sequence",
                    vec![
                        TreeDef::new_with_children(
                            "Fallback",
                            vec![TreeDef::new("A"), TreeDef::new("B")]
                        ),
                        TreeDef::new("C"),
                    ]
                )
            )
        ))
    );
}

#[test]
fn test_data() {
    assert_eq!(
        node_syntax(r#"Repeat (n = "3", label = scout_1) { Attack }"#),
        Ok((
            "",
            TreeDef {
                ty: "Repeat",
                data: vec![DataDef::new("n", "3"), DataDef::new("label", "scout_1")],
                children: vec![TreeDef::new("Attack")],
                vars: vec![],
            }
        ))
    );

    assert_eq!(
        node_syntax(r#"Say (text = "a\nb",)"#),
        Ok((
            "",
            TreeDef::new_with_data("Say", vec![DataDef::new("text", "a\nb")])
        ))
    );
}

#[test]
fn test_comments() {
    let (rest, source) = parse_file(
        "# This is a comment at the top level.

tree main = Sequence { # This is a comment after opening brace.
           # This is a comment in a whole line.
    var a  # This is a comment after a variable declaration.
    Yes    # This is a comment after a node.
}          # This is a comment after a closing brace.
",
    )
    .unwrap();
    assert_eq!(rest, "");
    assert_eq!(
        source.tree_defs,
        vec![TreeRootDef::new(
            "main",
            TreeDef {
                ty: "Sequence",
                data: vec![],
                children: vec![TreeDef::new("Yes")],
                vars: vec![VarDef {
                    name: "a",
                    init: None
                }],
            }
        )]
    );
}

#[test]
fn test_vars() {
    let (rest, tree) = parse_tree(
        "tree main = Sequence {
            var flag = true
            flag = false
        }",
    )
    .unwrap();
    assert_eq!(rest, "");
    assert_eq!(
        tree.root.vars,
        vec![VarDef {
            name: "flag",
            init: Some(true)
        }]
    );
    assert_eq!(
        tree.root.children,
        vec![TreeDef::new_with_data(
            "SetBool",
            vec![DataDef::new("value", "false"), DataDef::new("output", "flag")]
        )]
    );
}

#[test]
fn test_keyword_prefix_is_a_node() {
    let (_, tree) = parse_tree("tree main = Sequence { variant iffy }").unwrap();
    assert_eq!(
        tree.root,
        TreeDef::new_with_children(
            "Sequence",
            vec![TreeDef::new("variant"), TreeDef::new("iffy")]
        )
    );
}

#[test]
fn test_if() {
    let (_, tree) = parse_tree(
        "tree main = Sequence {
            if (!Enemy) {
                Patrol
            } else {
                Attack
            }
        }",
    )
    .unwrap();
    assert_eq!(
        tree.root.children,
        vec![TreeDef::new_with_children(
            "if",
            vec![
                TreeDef::new_with_child("Inverter", TreeDef::new("Enemy")),
                TreeDef::new_with_child("Sequence", TreeDef::new("Patrol")),
                TreeDef::new_with_child("Sequence", TreeDef::new("Attack")),
            ]
        )]
    );
}

#[test]
fn test_else_if() {
    let (rest, tree) = parse_tree(
        "tree main = if (A) { X } else if (B) { Y } else { Z }",
    )
    .unwrap();
    assert_eq!(rest, "");
    assert_eq!(
        tree.root,
        TreeDef::new_with_children(
            "if",
            vec![
                TreeDef::new("A"),
                TreeDef::new_with_child("Sequence", TreeDef::new("X")),
                TreeDef::new_with_child(
                    "Sequence",
                    TreeDef::new_with_children(
                        "if",
                        vec![
                            TreeDef::new("B"),
                            TreeDef::new_with_child("Sequence", TreeDef::new("Y")),
                            TreeDef::new_with_child("Sequence", TreeDef::new("Z")),
                        ]
                    )
                ),
            ]
        )
    );
}

#[test]
fn test_logical_operators() {
    let (rest, expr) = conditional("!a || b && c").unwrap();
    assert_eq!(rest, "");
    assert_eq!(
        expr,
        TreeDef::new_with_children(
            "Fallback",
            vec![
                TreeDef::new_with_child("Inverter", TreeDef::new("a")),
                TreeDef::new_with_children("Sequence", vec![TreeDef::new("b"), TreeDef::new("c")]),
            ]
        )
    );

    let (rest, expr) = conditional("(a || b) && c").unwrap();
    assert_eq!(rest, "");
    assert_eq!(
        expr,
        TreeDef::new_with_children(
            "Sequence",
            vec![
                TreeDef::new_with_children("Fallback", vec![TreeDef::new("a"), TreeDef::new("b")]),
                TreeDef::new("c"),
            ]
        )
    );
}

#[test]
fn test_multiple_trees() {
    let (rest, source) = parse_file(
        "tree main = Sequence { Guard }

tree Guard = Fallback {
    Attack
    Idle
}
",
    )
    .unwrap();
    assert_eq!(rest, "");
    assert_eq!(source.tree_defs.len(), 2);
    assert_eq!(source.find("Guard").map(|tree| tree.root.children.len()), Some(2));
    assert!(source.find("Missing").is_none());
}

#[test]
fn test_unparsed_rest() {
    let (rest, source) = parse_file("tree main = Sequence { A } }").unwrap();
    assert_eq!(source.tree_defs.len(), 1);
    assert_eq!(rest, "}");
}
