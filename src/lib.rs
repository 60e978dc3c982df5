//! Table dependency graph extraction for Hive-flavored SQL.
//!
//! Given one already-tokenized statement, the engine walks the token tree with
//! the dialect's grammar rules and emits directed edges from each query scope
//! to the tables and subqueries it reads from. Consumers fold those edges into
//! lineage or impact graphs across SQL scripts.
//!
//! Lexing and parsing raw SQL text is an external concern: callers hand the
//! engine a [`token_tree::TokenTree`] that is already grouped into statements,
//! identifiers, parentheses and WHERE clauses.

pub mod error;
pub mod hql_engine;
pub mod token_tree;

pub use error::{Result, TraverseError};
pub use hql_engine::grammar::ROOT_SCOPE;
pub use hql_engine::traverse::{collect_table_edges, extract_table_edges, Edge, Edges};
