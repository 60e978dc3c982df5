//! Edge extraction: the explicit-stack walk over the grammar rules.
//!
//! The walk simulates recursive descent with two stacks. The work stack holds
//! grammar nodes still to expand; the scope stack pairs each open query scope
//! with the work-stack size at the moment it was pushed. A scope is closed
//! exactly when the work stack shrinks below that recorded size, which is the
//! moment every node contributed by the scope's own expansion has been
//! consumed. That depth bookkeeping is what keeps each emitted edge attributed
//! to the nearest enclosing scope without ever materializing the grammar tree.
//!
//! Emission order is LIFO over each rule's child sequence; consumers that only
//! need set-equality of edges can ignore the ordering.

use std::fmt;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::token_tree::{NodeId, TokenTree};

use super::grammar::{GrammarNode, ROOT_SCOPE};

/// Sentinel for a table name the tree could not resolve. Distinct from a
/// traversal failure: lineage with a placeholder name is more useful than
/// losing the statement's whole graph.
pub const UNRESOLVED_NAME: &str = "";

/// One lineage edge: `scope` reads from `target`.
///
/// `target` is either a table name or a nested scope's identifier. The same
/// pair can occur more than once when a scope references a table twice; all
/// textual references are reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub scope: String,
    pub target: String,
}

impl Edge {
    pub fn new(scope: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.scope, self.target)
    }
}

/// Lazy edge sequence for one statement. Finite and non-restartable; after an
/// error or exhaustion it yields nothing further.
pub struct Edges<'t> {
    tree: &'t TokenTree,
    work: Vec<GrammarNode>,
    /// (scope identifier, work-stack size when the scope was opened)
    scopes: Vec<(String, usize)>,
    done: bool,
}

impl<'t> Edges<'t> {
    fn new(tree: &'t TokenTree, statement: NodeId) -> Self {
        debug!("extracting table edges from statement node {}", statement.index());
        let root = GrammarNode::Query(statement);
        // Query expansion only scans for SELECT keywords and cannot fail.
        let work = root.produce_children(tree).unwrap_or_default();
        Self {
            tree,
            work,
            scopes: vec![(ROOT_SCOPE.to_string(), 0)],
            done: false,
        }
    }

    fn current_scope(&self) -> &str {
        self.scopes
            .last()
            .map(|(ident, _)| ident.as_str())
            .unwrap_or(ROOT_SCOPE)
    }
}

impl Iterator for Edges<'_> {
    type Item = Result<Edge>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        while let Some(node) = self.work.pop() {
            // Close every scope whose expansion the work stack has drained.
            while self
                .scopes
                .last()
                .is_some_and(|&(_, depth)| self.work.len() < depth)
            {
                self.scopes.pop();
            }

            let emits = matches!(node, GrammarNode::TableName(_)) || node.is_scope();
            let identifier = node.identifier(self.tree);
            let edge = emits.then(|| {
                Edge::new(
                    self.current_scope(),
                    identifier.clone().unwrap_or_else(|| UNRESOLVED_NAME.to_string()),
                )
            });
            if node.is_scope() {
                let ident = identifier.unwrap_or_else(|| ROOT_SCOPE.to_string());
                self.scopes.push((ident, self.work.len()));
            }

            match node.produce_children(self.tree) {
                Ok(children) => self.work.extend(children),
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
            if let Some(edge) = edge {
                trace!("emit {}", edge);
                return Some(Ok(edge));
            }
        }
        self.done = true;
        None
    }
}

/// Lazily extract the scope-to-table edges of one statement.
pub fn extract_table_edges<'t>(tree: &'t TokenTree, statement: NodeId) -> Edges<'t> {
    Edges::new(tree, statement)
}

/// Eagerly extract all edges, stopping at the first traversal failure.
pub fn collect_table_edges(tree: &TokenTree, statement: NodeId) -> Result<Vec<Edge>> {
    extract_table_edges(tree, statement).collect()
}
