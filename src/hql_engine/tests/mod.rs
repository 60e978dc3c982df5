//! Shared token-tree builders for the engine tests.
//!
//! These build the same shapes a Hive-aware tokenizer hands the engine:
//! statements are flat keyword/identifier runs, table references are
//! `Identifier` groups, sub-selects sit inside `Parenthesis` groups.


use crate::token_tree::{NodeId, TokenTree};

/// Identifier expression `name` or `name alias`.
pub(crate) fn table_ident(tree: &mut TokenTree, name: &str, alias: Option<&str>) -> NodeId {
    let mut children = vec![tree.name(name)];
    if let Some(alias) = alias {
        children.push(tree.whitespace());
        children.push(tree.name(alias));
    }
    tree.identifier(children)
}

/// `SELECT * FROM` prefix followed by `tail`, grouped into a statement.
pub(crate) fn select_star_from(tree: &mut TokenTree, tail: Vec<NodeId>) -> NodeId {
    let mut children = select_star_prefix(tree);
    children.extend(tail);
    tree.statement(children)
}

/// The `SELECT * FROM ` token run, ready for a table reference tail.
pub(crate) fn select_star_prefix(tree: &mut TokenTree) -> Vec<NodeId> {
    vec![
        tree.dml("SELECT"),
        tree.whitespace(),
        tree.wildcard(),
        tree.whitespace(),
        tree.keyword("FROM"),
        tree.whitespace(),
    ]
}

/// Parenthesized sub-select `(SELECT * FROM <table>)`.
pub(crate) fn subquery_paren(tree: &mut TokenTree, table: &str) -> NodeId {
    let ident = table_ident(tree, table, None);
    let children = vec![
        tree.punctuation("("),
        tree.dml("SELECT"),
        tree.whitespace(),
        tree.wildcard(),
        tree.whitespace(),
        tree.keyword("FROM"),
        tree.whitespace(),
        ident,
        tree.punctuation(")"),
    ];
    tree.parenthesis(children)
}

/// `a.b = c.d`-style opaque comparison group for ON conditions.
pub(crate) fn on_condition(tree: &mut TokenTree, left: &str, right: &str) -> NodeId {
    let children = vec![
        tree.name(left),
        tree.whitespace(),
        tree.operator("="),
        tree.whitespace(),
        tree.name(right),
    ];
    tree.comparison(children)
}

/// `a <JOIN-KW> b ON a.x = b.x` token run (not yet grouped).
pub(crate) fn join_tail(tree: &mut TokenTree, join_keyword: &str) -> Vec<NodeId> {
    let left = table_ident(tree, "a", None);
    let right = table_ident(tree, "b", None);
    let condition = on_condition(tree, "a.x", "b.x");
    vec![
        left,
        tree.whitespace(),
        tree.keyword(join_keyword),
        tree.whitespace(),
        right,
        tree.whitespace(),
        tree.keyword("ON"),
        tree.whitespace(),
        condition,
    ]
}

/// `WHERE <column> IN (SELECT * FROM <table>)[ <alias>]` clause group.
pub(crate) fn where_in_subquery(
    tree: &mut TokenTree,
    column: &str,
    table: &str,
    alias: Option<&str>,
) -> NodeId {
    let paren = subquery_paren(tree, table);
    let mut children = vec![
        tree.keyword("WHERE"),
        tree.whitespace(),
        tree.name(column),
        tree.whitespace(),
        tree.keyword("IN"),
        tree.whitespace(),
        paren,
    ];
    if let Some(alias) = alias {
        children.push(tree.whitespace());
        children.push(tree.name(alias));
    }
    tree.where_clause(children)
}
