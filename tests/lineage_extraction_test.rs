//! End-to-end extraction tests against tokenizer-shaped input trees.

use table_lineage::hql_engine::graph::dependency_graph;
use table_lineage::token_tree::{NodeId, TokenTree};
use table_lineage::{collect_table_edges, Edge, TraverseError, ROOT_SCOPE};

/// `name` or `name alias` identifier expression.
fn table_ident(tree: &mut TokenTree, name: &str, alias: Option<&str>) -> NodeId {
    let mut children = vec![tree.name(name)];
    if let Some(alias) = alias {
        children.push(tree.whitespace());
        children.push(tree.name(alias));
    }
    tree.identifier(children)
}

/// `SELECT * FROM ` token run.
fn select_star_prefix(tree: &mut TokenTree) -> Vec<NodeId> {
    vec![
        tree.dml("SELECT"),
        tree.whitespace(),
        tree.wildcard(),
        tree.whitespace(),
        tree.keyword("FROM"),
        tree.whitespace(),
    ]
}

/// `(SELECT * FROM <inner>)` where `inner` is an already-built factor token.
fn paren_select_from(tree: &mut TokenTree, inner: NodeId) -> NodeId {
    let mut children = vec![tree.punctuation("(")];
    children.extend(select_star_prefix(tree));
    children.push(inner);
    children.push(tree.punctuation(")"));
    tree.parenthesis(children)
}

#[test]
fn derived_table_join_end_to_end() {
    // SELECT a.* FROM (SELECT * FROM t1) a JOIN t2 b ON a.id = b.id
    let mut tree = TokenTree::new();
    let t1 = table_ident(&mut tree, "t1", None);
    let paren = paren_select_from(&mut tree, t1);
    let ws = tree.whitespace();
    let alias = tree.name("a");
    let derived = tree.identifier(vec![paren, ws, alias]);
    let t2 = table_ident(&mut tree, "t2", Some("b"));
    let condition = {
        let children = vec![
            tree.name("a.id"),
            tree.whitespace(),
            tree.operator("="),
            tree.whitespace(),
            tree.name("b.id"),
        ];
        tree.comparison(children)
    };
    let mut children = select_star_prefix(&mut tree);
    children.extend([
        derived,
        tree.whitespace(),
        tree.keyword("JOIN"),
        tree.whitespace(),
        t2,
        tree.whitespace(),
        tree.keyword("ON"),
        tree.whitespace(),
        condition,
    ]);
    let statement = tree.statement(children);

    let edges = collect_table_edges(&tree, statement).unwrap();
    assert_eq!(
        edges,
        vec![
            Edge::new(ROOT_SCOPE, "t2"),
            Edge::new(ROOT_SCOPE, "a"),
            Edge::new("a", "t1"),
        ]
    );

    let graph = dependency_graph(&edges);
    assert_eq!(graph.node_count(), 4); // __root__, t2, a, t1
    assert_eq!(graph.edge_count(), 3);
}

#[test]
fn nested_derived_tables_chain_their_scopes() {
    // SELECT * FROM (SELECT * FROM (SELECT * FROM base) inner_q) outer_q
    let mut tree = TokenTree::new();
    let base = table_ident(&mut tree, "base", None);
    let inner_paren = paren_select_from(&mut tree, base);
    let ws1 = tree.whitespace();
    let inner_alias = tree.name("inner_q");
    let inner_ident = tree.identifier(vec![inner_paren, ws1, inner_alias]);
    let outer_paren = paren_select_from(&mut tree, inner_ident);
    let ws2 = tree.whitespace();
    let outer_alias = tree.name("outer_q");
    let outer_ident = tree.identifier(vec![outer_paren, ws2, outer_alias]);
    let mut children = select_star_prefix(&mut tree);
    children.push(outer_ident);
    let statement = tree.statement(children);

    let edges = collect_table_edges(&tree, statement).unwrap();
    assert_eq!(
        edges,
        vec![
            Edge::new(ROOT_SCOPE, "outer_q"),
            Edge::new("outer_q", "inner_q"),
            Edge::new("inner_q", "base"),
        ]
    );
}

#[test]
fn failures_stay_isolated_per_statement() {
    // Two statements in one arena: a malformed one and a healthy one. The
    // first aborts with an error, the second still extracts in full.
    let mut tree = TokenTree::new();
    let bad_factor = tree.literal("42");
    let mut bad_children = select_star_prefix(&mut tree);
    bad_children.push(bad_factor);
    let bad = tree.statement(bad_children);

    let users = table_ident(&mut tree, "users", None);
    let mut good_children = select_star_prefix(&mut tree);
    good_children.push(users);
    let good = tree.statement(good_children);

    let mut extracted = Vec::new();
    let mut failures = 0;
    for statement in [bad, good] {
        match collect_table_edges(&tree, statement) {
            Ok(edges) => extracted.extend(edges),
            Err(TraverseError::UnrecognizedTableFactor(_)) => failures += 1,
            Err(other) => panic!("unexpected failure: {}", other),
        }
    }

    assert_eq!(failures, 1);
    assert_eq!(extracted, vec![Edge::new(ROOT_SCOPE, "users")]);
}

#[test]
fn mixed_statement_with_join_and_where_subquery() {
    // SELECT * FROM a LEFT OUTER JOIN b ON a.x = b.x WHERE id IN (SELECT * FROM t) x
    let mut tree = TokenTree::new();
    let a = table_ident(&mut tree, "a", None);
    let b = table_ident(&mut tree, "b", None);
    let condition = {
        let children = vec![
            tree.name("a.x"),
            tree.whitespace(),
            tree.operator("="),
            tree.whitespace(),
            tree.name("b.x"),
        ];
        tree.comparison(children)
    };
    let t = table_ident(&mut tree, "t", None);
    let sub = paren_select_from(&mut tree, t);
    let clause = {
        let children = vec![
            tree.keyword("WHERE"),
            tree.whitespace(),
            tree.name("id"),
            tree.whitespace(),
            tree.keyword("IN"),
            tree.whitespace(),
            sub,
            tree.whitespace(),
            tree.name("x"),
        ];
        tree.where_clause(children)
    };
    let mut children = select_star_prefix(&mut tree);
    children.extend([
        a,
        tree.whitespace(),
        tree.keyword("LEFT OUTER JOIN"),
        tree.whitespace(),
        b,
        tree.whitespace(),
        tree.keyword("ON"),
        tree.whitespace(),
        condition,
        tree.whitespace(),
    ]);
    children.push(clause);
    let statement = tree.statement(children);

    let edges = collect_table_edges(&tree, statement).unwrap();
    assert_eq!(
        edges,
        vec![
            Edge::new(ROOT_SCOPE, "x"),
            Edge::new("x", "t"),
            Edge::new(ROOT_SCOPE, "b"),
            Edge::new(ROOT_SCOPE, "a"),
        ]
    );
}
