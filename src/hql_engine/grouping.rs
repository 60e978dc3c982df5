//! Non-destructive grouping of sibling token runs.
//!
//! Several grammar rules need to treat a slice of an existing node's children
//! (say, the span between `FROM` and `GROUP BY`) as a node of its own. The
//! tokenizer's tree is shared and may be traversed more than once, so grouping
//! must never rewrite it: a [`SpanGroup`] is an owned synthetic composite that
//! copies the child handles and remembers the owning node, leaving the arena
//! untouched.

use std::ops::Range;
use std::rc::Rc;

use crate::token_tree::{NodeId, TokenTree};

/// Synthetic composite over a contiguous run of an existing node's children.
///
/// Never inserted into the arena; the original node's child list is unchanged
/// by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanGroup {
    /// The node whose children were sliced.
    pub parent: NodeId,
    /// The sliced child run, in original order.
    pub tokens: Vec<NodeId>,
}

/// Either a real tree node or a synthetic [`SpanGroup`].
///
/// Grammar variants hold one of these so a grouped slice and a plain node can
/// flow through the same rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSpan {
    Node(NodeId),
    Group(Rc<SpanGroup>),
}

impl TokenSpan {
    /// Child tokens covered by this span.
    pub fn children<'a>(&'a self, tree: &'a TokenTree) -> &'a [NodeId] {
        match self {
            TokenSpan::Node(id) => tree.children(*id),
            TokenSpan::Group(group) => &group.tokens,
        }
    }

    /// The arena node that owns the covered tokens.
    pub fn base(&self) -> NodeId {
        match self {
            TokenSpan::Node(id) => *id,
            TokenSpan::Group(group) => group.parent,
        }
    }

    /// Slice a sub-run of this span into a new synthetic group. Out-of-range
    /// bounds clamp to the available children.
    pub fn slice(&self, tree: &TokenTree, range: Range<usize>) -> TokenSpan {
        let children = self.children(tree);
        let start = range.start.min(children.len());
        let end = range.end.clamp(start, children.len());
        TokenSpan::Group(Rc::new(SpanGroup {
            parent: self.base(),
            tokens: children[start..end].to_vec(),
        }))
    }
}

/// Group `node`'s children in `start..=end` into a synthetic composite.
pub fn group_tokens(tree: &TokenTree, node: NodeId, start: usize, end: usize) -> TokenSpan {
    TokenSpan::Node(node).slice(tree, start..end + 1)
}
