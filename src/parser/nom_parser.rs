use nom::{
    branch::alt,
    bytes::complete::{is_not, tag},
    character::complete::{alpha1, alphanumeric1, char, multispace1, none_of, satisfy},
    combinator::{map, not, opt, recognize, value},
    multi::{many0, many1, separated_list0},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

/// A node in the AST, before it is instantiated with a registry.
#[derive(Debug, PartialEq, Eq)]
pub struct TreeDef<'src> {
    pub(crate) ty: &'src str,
    pub(crate) data: Vec<DataDef<'src>>,
    pub(crate) children: Vec<TreeDef<'src>>,
    pub(crate) vars: Vec<VarDef<'src>>,
}

/// A literal blackboard entry stored at the node it is written on.
#[derive(Debug, PartialEq, Eq)]
pub struct DataDef<'src> {
    pub(crate) key: &'src str,
    /// Literal value could have decoded, so it is an owned string.
    pub(crate) value: String,
}

/// A variable declared in the scope of the enclosing node.
#[derive(Debug, PartialEq, Eq)]
pub struct VarDef<'src> {
    pub(crate) name: &'src str,
    pub(crate) init: Option<bool>,
}

#[derive(Debug)]
enum TreeElem<'src> {
    Node(TreeDef<'src>),
    Var(VarDef<'src>),
}

impl<'src> TreeDef<'src> {
    #[allow(dead_code)]
    pub(crate) fn new(ty: &'src str) -> Self {
        Self::new_with_children(ty, vec![])
    }

    pub(crate) fn new_with_child(ty: &'src str, child: TreeDef<'src>) -> Self {
        Self::new_with_children(ty, vec![child])
    }

    pub(crate) fn new_with_children(ty: &'src str, children: Vec<TreeDef<'src>>) -> Self {
        Self {
            ty,
            data: vec![],
            children,
            vars: vec![],
        }
    }

    pub(crate) fn new_with_data(ty: &'src str, data: Vec<DataDef<'src>>) -> Self {
        Self {
            ty,
            data,
            children: vec![],
            vars: vec![],
        }
    }

    fn new_with_tree_elems(
        ty: &'src str,
        data: Vec<DataDef<'src>>,
        elems: Vec<TreeElem<'src>>,
    ) -> Self {
        let (children, vars) = elems
            .into_iter()
            .fold((vec![], vec![]), |mut acc, cur| {
                match cur {
                    TreeElem::Node(node) => acc.0.push(node),
                    TreeElem::Var(var) => acc.1.push(var),
                }
                acc
            });

        Self {
            ty,
            data,
            children,
            vars,
        }
    }

    /// Node type or subtree name.
    pub fn ty(&self) -> &'src str {
        self.ty
    }

    pub fn children(&self) -> &[TreeDef<'src>] {
        &self.children
    }
}

impl<'src> DataDef<'src> {
    pub(crate) fn new(key: &'src str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct TreeRootDef<'src> {
    pub(crate) name: &'src str,
    pub(crate) root: TreeDef<'src>,
}

impl<'src> TreeRootDef<'src> {
    pub fn name(&self) -> &'src str {
        self.name
    }

    pub fn root(&self) -> &TreeDef<'src> {
        &self.root
    }
}

#[derive(Debug, PartialEq)]
pub struct TreeSource<'src> {
    pub tree_defs: Vec<TreeRootDef<'src>>,
}

impl<'src> TreeSource<'src> {
    pub fn find(&self, name: &str) -> Option<&TreeRootDef<'src>> {
        self.tree_defs.iter().find(|tree| tree.name == name)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn line_comment(i: &str) -> IResult<&str, ()> {
    value((), pair(char('#'), opt(is_not("\n\r"))))(i)
}

/// Whitespace, newlines and line comments.
fn ws(i: &str) -> IResult<&str, ()> {
    value((), many0(alt((value((), multispace1), line_comment))))(i)
}

fn sym<'src>(c: char) -> impl FnMut(&'src str) -> IResult<&'src str, char> {
    preceded(ws, char(c))
}

fn keyword<'src>(k: &'static str) -> impl FnMut(&'src str) -> IResult<&'src str, &'src str> {
    preceded(ws, terminated(tag(k), not(satisfy(is_ident_char))))
}

fn ident(i: &str) -> IResult<&str, &str> {
    preceded(ws, identifier)(i)
}

fn bool_literal(i: &str) -> IResult<&str, bool> {
    alt((value(true, keyword("true")), value(false, keyword("false"))))(i)
}

fn str_literal(input: &str) -> IResult<&str, String> {
    let (r, val) = delimited(char('"'), many0(none_of("\"")), char('"'))(input)?;
    Ok((
        r,
        val.iter()
            .collect::<String>()
            .replace("\\\\", "\\")
            .replace("\\n", "\n"),
    ))
}

fn bare_literal(i: &str) -> IResult<&str, String> {
    map(
        recognize(many1(alt((alphanumeric1, tag("."), tag("-"), tag("_"))))),
        str::to_owned,
    )(i)
}

fn data_entry(i: &str) -> IResult<&str, DataDef> {
    let (i, (key, _, value)) = tuple((
        ident,
        sym('='),
        preceded(ws, alt((str_literal, bare_literal))),
    ))(i)?;
    Ok((i, DataDef { key, value }))
}

fn data_list(i: &str) -> IResult<&str, Vec<DataDef>> {
    delimited(
        sym('('),
        separated_list0(sym(','), data_entry),
        pair(opt(sym(',')), sym(')')),
    )(i)
}

fn node_syntax(i: &str) -> IResult<&str, TreeDef> {
    let (i, ty) = ident(i)?;

    let (i, data) = opt(data_list)(i)?;

    let (i, children) = opt(delimited(sym('{'), tree_children, sym('}')))(i)?;

    Ok((
        i,
        TreeDef::new_with_tree_elems(ty, data.unwrap_or_default(), children.unwrap_or_default()),
    ))
}

fn fold_operands<'src>(
    ty: &'src str,
    first: TreeDef<'src>,
    rest: Vec<TreeDef<'src>>,
) -> TreeDef<'src> {
    if rest.is_empty() {
        first
    } else {
        let mut children = vec![first];
        children.extend(rest);
        TreeDef::new_with_children(ty, children)
    }
}

fn condition_factor(i: &str) -> IResult<&str, TreeDef> {
    alt((
        map(preceded(sym('!'), condition_factor), |res| {
            TreeDef::new_with_child("Inverter", res)
        }),
        delimited(sym('('), conditional, sym(')')),
        node_syntax,
    ))(i)
}

fn condition_and(i: &str) -> IResult<&str, TreeDef> {
    let (i, first) = condition_factor(i)?;
    let (i, rest) = many0(preceded(pair(ws, tag("&&")), condition_factor))(i)?;
    Ok((i, fold_operands("Sequence", first, rest)))
}

/// `&&` binds tighter than `||`, and they become Sequence and Fallback nodes.
fn conditional(i: &str) -> IResult<&str, TreeDef> {
    let (i, first) = condition_and(i)?;
    let (i, rest) = many0(preceded(pair(ws, tag("||")), condition_and))(i)?;
    Ok((i, fold_operands("Fallback", first, rest)))
}

fn braced_children(i: &str) -> IResult<&str, Vec<TreeElem>> {
    delimited(sym('{'), tree_children, sym('}'))(i)
}

fn if_syntax(i: &str) -> IResult<&str, TreeDef> {
    let (i, _) = keyword("if")(i)?;

    let (i, condition) = delimited(sym('('), conditional, sym(')'))(i)?;

    let (i, then_children) = braced_children(i)?;

    let (i, else_children) = opt(preceded(
        keyword("else"),
        alt((
            map(if_syntax, |node| vec![TreeElem::Node(node)]),
            braced_children,
        )),
    ))(i)?;

    let mut children = vec![
        condition,
        TreeDef::new_with_tree_elems("Sequence", vec![], then_children),
    ];

    if let Some(else_children) = else_children {
        children.push(TreeDef::new_with_tree_elems("Sequence", vec![], else_children));
    }

    Ok((i, TreeDef::new_with_children("if", children)))
}

fn var_decl(i: &str) -> IResult<&str, TreeElem> {
    let (i, _) = keyword("var")(i)?;

    let (i, name) = ident(i)?;

    let (i, init) = opt(preceded(sym('='), bool_literal))(i)?;

    Ok((i, TreeElem::Var(VarDef { name, init })))
}

/// `name = true` desugars into a SetBool node.
fn var_assign(i: &str) -> IResult<&str, TreeElem> {
    let (i, (name, _, init)) = tuple((ident, sym('='), bool_literal))(i)?;

    Ok((
        i,
        TreeElem::Node(TreeDef::new_with_data(
            "SetBool",
            vec![
                DataDef::new("value", init.to_string()),
                DataDef::new("output", name),
            ],
        )),
    ))
}

fn tree_children(i: &str) -> IResult<&str, Vec<TreeElem>> {
    let (i, elems) = many0(alt((
        var_decl,
        var_assign,
        map(if_syntax, TreeElem::Node),
        map(conditional, TreeElem::Node),
    )))(i)?;

    let (i, _) = ws(i)?;

    Ok((i, elems))
}

fn parse_tree(i: &str) -> IResult<&str, TreeRootDef> {
    let (i, _) = keyword("tree")(i)?;

    let (i, name) = ident(i)?;

    let (i, _) = sym('=')(i)?;

    let (i, root) = alt((if_syntax, conditional))(i)?;

    Ok((i, TreeRootDef { name, root }))
}

/// Parses a whole tree source.
///
/// The remaining input is returned as usual with nom; anything left in it
/// could not be parsed.
pub fn parse_file(i: &str) -> IResult<&str, TreeSource> {
    let (i, tree_defs) = many0(parse_tree)(i)?;

    // Eat up trailing whitespace to indicate that the input was thoroughly consumed
    let (i, _) = ws(i)?;

    Ok((i, TreeSource { tree_defs }))
}

#[cfg(test)]
mod test;
