//! Grammar rules for the Hive-flavored SELECT subset.
//!
//! Each [`GrammarNode`] variant wraps one token (or grouped span) and knows
//! how to expand itself one grammar rule deeper via
//! [`GrammarNode::produce_children`]. The rules cover:
//!
//! ```text
//! SELECT select_expr, ...
//!   FROM table_reference
//!   [WHERE where_condition]
//!   [GROUP BY | ORDER BY | CLUSTER BY | DISTRIBUTE BY | SORT BY | LIMIT ...]
//!
//! table_reference: table_factor | join_table
//! join_table:      table_reference [INNER] JOIN table_factor [join_condition]
//!                | table_reference {LEFT|RIGHT|FULL} [OUTER] JOIN table_reference join_condition
//!                | table_reference LEFT SEMI JOIN table_reference join_condition
//!                | table_reference CROSS JOIN table_reference [join_condition]
//! table_factor:    tbl_name [alias] | table_subquery alias | ( table_references )
//! ```
//!
//! `UNION` is only recognized as a scope terminator: everything after it is a
//! sibling SELECT in the same statement, not a child of the current one.

use crate::error::{Result, TraverseError};
use crate::token_tree::{NodeId, TokenKind, TokenTree};

use super::grouping::TokenSpan;

/// Fixed identifier of the outermost query scope.
pub const ROOT_SCOPE: &str = "__root__";

/// Keywords that end a FROM clause. Prefix-matched, so `GROUP BY` and
/// `UNION ALL` count; a WHERE clause ends the span as well.
const FROM_BOUNDARY_KEYWORDS: [&str; 7] = [
    "GROUP",
    "ORDER",
    "CLUSTER",
    "DISTRIBUTE",
    "SORT",
    "LIMIT",
    "UNION",
];

const JOIN_KEYWORDS: [&str; 10] = [
    "JOIN",
    "INNER JOIN",
    "RIGHT JOIN",
    "FULL JOIN",
    "LEFT JOIN",
    "LEFT SEMI JOIN",
    "RIGHT OUTER JOIN",
    "FULL OUTER JOIN",
    "LEFT OUTER JOIN",
    "CROSS JOIN",
];

/// How a subquery's display identifier was (or was not) assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubqueryAlias {
    /// Nothing assigned yet; resolution falls back to the parent's alias.
    Unset,
    /// Explicitly anonymous (the WHERE-clause heuristic found no alias).
    Anonymous,
    /// Explicitly resolved alias.
    Named(String),
}

/// One grammar construct wrapping a token or grouped span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarNode {
    /// Root statement.
    Query(NodeId),
    /// Parenthesized sub-select; carries its alias resolution state.
    Subquery { token: NodeId, alias: SubqueryAlias },
    /// A SELECT keyword inside a statement or parenthesis.
    Select(NodeId),
    TableReference(TokenSpan),
    JoinTable(TokenSpan),
    TableFactor(TokenSpan),
    /// Comma-separated identifier list inside `( table_references )`.
    TableReferences(NodeId),
    WhereCondition(NodeId),
    /// Terminal leaf: a table name token or identifier expression.
    TableName(NodeId),
}

impl GrammarNode {
    /// Expand this node one grammar rule deeper.
    ///
    /// The returned sequence is finite and drawn from a bounded sub-span of
    /// the wrapped token, so repeated expansion always terminates. A shape
    /// that matches no rule is a [`TraverseError`], never silently empty.
    pub fn produce_children(&self, tree: &TokenTree) -> Result<Vec<GrammarNode>> {
        match self {
            GrammarNode::Query(statement) => Ok(scan_selects(tree, *statement)),
            GrammarNode::Subquery { token, .. } => Ok(scan_selects(tree, *token)),
            GrammarNode::Select(token) => expand_select(tree, *token),
            GrammarNode::TableReference(span) => Ok(expand_table_reference(tree, span)),
            GrammarNode::JoinTable(span) => expand_join_table(tree, span),
            GrammarNode::TableFactor(span) => expand_table_factor(tree, span),
            GrammarNode::TableReferences(list) => Ok(expand_table_references(tree, *list)),
            GrammarNode::WhereCondition(token) => Ok(expand_where_condition(tree, *token)),
            GrammarNode::TableName(_) => Ok(Vec::new()),
        }
    }

    /// Display identifier for scope and table nodes; `None` for structural
    /// variants and for table names the tree cannot resolve.
    pub fn identifier(&self, tree: &TokenTree) -> Option<String> {
        match self {
            GrammarNode::Query(_) => Some(ROOT_SCOPE.to_string()),
            GrammarNode::Subquery { token, alias } => {
                Some(subquery_identifier(tree, *token, alias))
            }
            GrammarNode::TableName(token) => table_name_identifier(tree, *token),
            _ => None,
        }
    }

    /// True for variants that open a query scope of their own.
    pub fn is_scope(&self) -> bool {
        matches!(self, GrammarNode::Query(_) | GrammarNode::Subquery { .. })
    }
}

/// All SELECT keywords among a node's immediate children.
fn scan_selects(tree: &TokenTree, of: NodeId) -> Vec<GrammarNode> {
    tree.children(of)
        .iter()
        .filter(|&&child| tree.matches_dml(child, "SELECT"))
        .map(|&child| GrammarNode::Select(child))
        .collect()
}

/// Walk the SELECT's siblings, grouping each FROM span into a table reference
/// and stopping at a WHERE clause or a UNION keyword.
fn expand_select(tree: &TokenTree, select: NodeId) -> Result<Vec<GrammarNode>> {
    let Some(parent) = tree.parent(select) else {
        return Ok(Vec::new());
    };
    let siblings = tree.children(parent);
    let Some(start) = siblings.iter().position(|&t| t == select) else {
        return Ok(Vec::new());
    };

    let mut children = Vec::new();
    let mut cursor = Some(start);
    while let Some(idx) = cursor {
        let token = siblings[idx];
        // Everything after UNION is a sibling SELECT, outside this scope.
        if tree.keyword_starts_with(token, "UNION") {
            break;
        }
        if tree.matches_keyword(token, "FROM") {
            let first = idx + 1;
            let Some(scan_from) = next_meaningful(tree, siblings, idx) else {
                return Err(TraverseError::UnexpectedEndOfStatement("FROM".to_string()));
            };
            match find_from(siblings, scan_from, |t| is_from_boundary(tree, t)) {
                None => {
                    let span = TokenSpan::Node(parent).slice(tree, first..siblings.len());
                    children.push(GrammarNode::TableReference(span));
                    return Ok(children);
                }
                Some(boundary) => {
                    let span = TokenSpan::Node(parent).slice(tree, first..boundary);
                    children.push(GrammarNode::TableReference(span));
                    cursor = Some(boundary);
                    continue;
                }
            }
        }
        if tree.kind(token) == TokenKind::Where {
            children.push(GrammarNode::WhereCondition(token));
            return Ok(children);
        }
        cursor = next_meaningful(tree, siblings, idx);
    }
    Ok(children)
}

/// `table_reference: table_factor | join_table` — a classification, not a
/// split; both wrap the same span.
fn expand_table_reference(tree: &TokenTree, span: &TokenSpan) -> Vec<GrammarNode> {
    let is_join = span
        .children(tree)
        .iter()
        .any(|&t| is_join_keyword(tree, t));
    if is_join {
        vec![GrammarNode::JoinTable(span.clone())]
    } else {
        vec![GrammarNode::TableFactor(span.clone())]
    }
}

/// Split a join at its first top-level join keyword. The left operand is
/// always a table reference; the right operand is a table factor for plain
/// `JOIN`/`INNER JOIN` and a table reference for every other join kind. The
/// join condition after `ON` contributes no lineage edges and is skipped.
fn expand_join_table(tree: &TokenTree, span: &TokenSpan) -> Result<Vec<GrammarNode>> {
    let tokens = span.children(tree);
    let Some(first) = first_meaningful(tree, tokens) else {
        return Err(TraverseError::MissingJoinKeyword(render_span(tree, span)));
    };
    let Some(join) = find_from(tokens, first, |t| is_join_keyword(tree, t)) else {
        return Err(TraverseError::MissingJoinKeyword(render_span(tree, span)));
    };

    let left = GrammarNode::TableReference(span.slice(tree, first..join));
    // CROSS JOIN may legally omit the join condition; without ON the right
    // operand runs to the end of the span.
    let end = find_from(tokens, join, |t| tree.matches_keyword(t, "ON")).unwrap_or(tokens.len());
    let right_span = span.slice(tree, join + 1..end);
    let right = if is_inner_join_keyword(tree, tokens[join]) {
        GrammarNode::TableFactor(right_span)
    } else {
        GrammarNode::TableReference(right_span)
    };
    Ok(vec![left, right])
}

/// `table_factor: tbl_name [alias] | table_subquery alias | ( table_references )`
fn expand_table_factor(tree: &TokenTree, span: &TokenSpan) -> Result<Vec<GrammarNode>> {
    let tokens = span.children(tree);
    let Some(first_idx) = first_meaningful(tree, tokens) else {
        return Err(TraverseError::UnrecognizedTableFactor("<empty>".to_string()));
    };
    let first = tokens[first_idx];

    // tbl_name [alias], bare name token
    if tree.kind(first) == TokenKind::Name {
        return Ok(vec![GrammarNode::TableName(first)]);
    }

    // ( table_references ) — the tokenizer nests the comma-separated list one
    // parenthesis level down.
    if tree.kind(first) == TokenKind::Parenthesis {
        for &token in tokens {
            if tree.kind(token) != TokenKind::Parenthesis {
                continue;
            }
            for &inner in tree.children(token) {
                if tree.kind(inner) == TokenKind::IdentifierList {
                    return Ok(vec![GrammarNode::TableReferences(inner)]);
                }
            }
        }
    }

    // table_subquery alias — an identifier expression whose first element is a
    // parenthesized sub-select; the enclosing identifier carries the alias.
    if let Some(inner_idx) = first_meaningful(tree, tree.children(first)) {
        let inner = tree.children(first)[inner_idx];
        if tree.kind(inner) == TokenKind::Parenthesis {
            return Ok(vec![GrammarNode::Subquery {
                token: inner,
                alias: SubqueryAlias::Unset,
            }]);
        }
    }

    // tbl_name [alias], identifier expression
    if tree.kind(first) == TokenKind::Identifier {
        return Ok(vec![GrammarNode::TableName(first)]);
    }

    Err(TraverseError::UnrecognizedTableFactor(render_span(tree, span)))
}

/// One table reference per listed identifier, in list order.
fn expand_table_references(tree: &TokenTree, list: NodeId) -> Vec<GrammarNode> {
    tree.children(list)
        .iter()
        .filter(|&&t| {
            !tree.kind(t).is_skippable() && tree.kind(t) != TokenKind::Punctuation
        })
        .map(|&t| GrammarNode::TableReference(TokenSpan::Node(t)))
        .collect()
}

/// Yield the WHERE clause's subquery, if its first parenthesis holds one.
/// At most one subquery per WHERE clause; scanning stops at the first
/// parenthesis whether or not it qualifies.
fn expand_where_condition(tree: &TokenTree, clause: NodeId) -> Vec<GrammarNode> {
    for &token in tree.children(clause) {
        if tree.kind(token) != TokenKind::Parenthesis {
            continue;
        }
        let alias = match where_subquery_alias(tree, clause) {
            Some(name) => SubqueryAlias::Named(name),
            None => SubqueryAlias::Anonymous,
        };
        if !scan_selects(tree, token).is_empty() {
            return vec![GrammarNode::Subquery { token, alias }];
        }
        return Vec::new();
    }
    Vec::new()
}

/// Alias of a WHERE-embedded subquery.
///
/// The general alias accessor does not cover WHERE clauses, so this applies a
/// stricter pair of patterns: `... AS alias` takes the first name after `AS`;
/// otherwise, for clauses with more than two tokens and some whitespace,
/// `expr IN (...) alias` takes the last name at or after the `IN` keyword.
fn where_subquery_alias(tree: &TokenTree, clause: NodeId) -> Option<String> {
    let children = tree.children(clause);
    if let Some(as_idx) = children.iter().position(|&t| tree.matches_keyword(t, "AS")) {
        return tree.first_name_in(&children[as_idx + 1..]);
    }
    let has_ws = children
        .iter()
        .any(|&t| tree.kind(t) == TokenKind::Whitespace);
    if children.len() > 2 && has_ws {
        let in_idx = children
            .iter()
            .position(|&t| tree.matches_keyword(t, "IN"))
            .unwrap_or(0);
        return tree.last_name_in(&children[in_idx..]);
    }
    None
}

/// Resolve a subquery's display identifier. Every subquery gets one: the
/// pre-assigned alias when present, else the enclosing identifier's alias,
/// else a fallback unique to the wrapped node for the lifetime of the tree.
fn subquery_identifier(tree: &TokenTree, token: NodeId, alias: &SubqueryAlias) -> String {
    let fallback = || format!("__subquery_{}__", token.index());
    match alias {
        SubqueryAlias::Named(name) => name.clone(),
        SubqueryAlias::Anonymous => fallback(),
        SubqueryAlias::Unset => tree
            .parent(token)
            .and_then(|parent| tree.alias(parent))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(fallback),
    }
}

/// Resolve a table name. A bare name token delegates to its enclosing
/// identifier expression; an unexpected shape resolves to `None` rather than
/// failing, so lineage with a placeholder survives odd tokenizer output.
fn table_name_identifier(tree: &TokenTree, token: NodeId) -> Option<String> {
    match tree.kind(token) {
        TokenKind::Name => tree.parent(token).and_then(|parent| tree.real_name(parent)),
        TokenKind::Identifier => tree.real_name(token),
        _ => None,
    }
}

fn is_from_boundary(tree: &TokenTree, token: NodeId) -> bool {
    tree.kind(token) == TokenKind::Where
        || FROM_BOUNDARY_KEYWORDS
            .iter()
            .any(|kw| tree.keyword_starts_with(token, kw))
}

fn is_join_keyword(tree: &TokenTree, token: NodeId) -> bool {
    JOIN_KEYWORDS.iter().any(|kw| tree.matches_keyword(token, kw))
}

fn is_inner_join_keyword(tree: &TokenTree, token: NodeId) -> bool {
    tree.matches_keyword(token, "JOIN") || tree.matches_keyword(token, "INNER JOIN")
}

fn first_meaningful(tree: &TokenTree, tokens: &[NodeId]) -> Option<usize> {
    tokens.iter().position(|&t| !tree.kind(t).is_skippable())
}

fn next_meaningful(tree: &TokenTree, tokens: &[NodeId], after: usize) -> Option<usize> {
    tokens[after + 1..]
        .iter()
        .position(|&t| !tree.kind(t).is_skippable())
        .map(|offset| after + 1 + offset)
}

fn find_from(tokens: &[NodeId], start: usize, pred: impl Fn(NodeId) -> bool) -> Option<usize> {
    tokens[start..]
        .iter()
        .position(|&t| pred(t))
        .map(|offset| start + offset)
}

fn render_span(tree: &TokenTree, span: &TokenSpan) -> String {
    let mut out = String::new();
    for &token in span.children(tree) {
        out.push_str(&tree.render(token));
    }
    let trimmed = out.trim();
    if trimmed.chars().count() > 48 {
        format!("{}...", trimmed.chars().take(48).collect::<String>())
    } else {
        trimmed.to_string()
    }
}
