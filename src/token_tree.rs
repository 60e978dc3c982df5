//! Token tree contract between the tokenizer and the grammar engine.
//!
//! The tokenizer collaborator lexes and groups raw SQL into this arena-backed
//! tree; the engine only ever borrows it. Nodes are either leaf tokens
//! (keywords, names, punctuation, ...) or groups (statements, identifiers,
//! parentheses, WHERE clauses, ...) whose children are further nodes. Group
//! kinds and the `real_name`/`alias` accessors mirror what a Hive-aware
//! tokenizer resolves for identifier expressions like `db.t1 a`.

/// Handle into a [`TokenTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Position of the node in its arena. Stable for the lifetime of the tree;
    /// used to derive run-unique identifiers for anonymous subqueries.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kind tag of a token tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Leaf tokens
    Keyword,
    /// DML-class keyword (SELECT and friends); kept apart from plain keywords
    /// the way the tokenizer reports them.
    Dml,
    Name,
    Literal,
    Operator,
    Punctuation,
    Whitespace,
    Comment,
    Wildcard,
    // Grouped tokens
    Statement,
    Identifier,
    IdentifierList,
    Parenthesis,
    Where,
    Comparison,
    Function,
}

impl TokenKind {
    /// Whitespace and comments carry no grammatical meaning.
    pub fn is_skippable(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }
}

#[derive(Debug, Clone)]
struct TokenData {
    kind: TokenKind,
    text: String,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

/// Arena of token nodes for one parsed script.
///
/// Built once by the tokenizer via the `leaf`/`group` constructors, then
/// consumed read-only by the grammar engine.
#[derive(Debug, Default, Clone)]
pub struct TokenTree {
    nodes: Vec<TokenData>,
}

impl TokenTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a leaf token.
    pub fn leaf(&mut self, kind: TokenKind, text: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(TokenData {
            kind,
            text: text.into(),
            children: Vec::new(),
            parent: None,
        });
        id
    }

    /// Add a group node over already-created children, wiring their parent
    /// back-references to the new group.
    pub fn group(&mut self, kind: TokenKind, children: Vec<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        for &child in &children {
            self.nodes[child.index()].parent = Some(id);
        }
        self.nodes.push(TokenData {
            kind,
            text: String::new(),
            children,
            parent: None,
        });
        id
    }

    // Convenience constructors used by tokenizer frontends and tests.

    pub fn keyword(&mut self, text: &str) -> NodeId {
        self.leaf(TokenKind::Keyword, text)
    }

    pub fn dml(&mut self, text: &str) -> NodeId {
        self.leaf(TokenKind::Dml, text)
    }

    pub fn name(&mut self, text: &str) -> NodeId {
        self.leaf(TokenKind::Name, text)
    }

    pub fn punctuation(&mut self, text: &str) -> NodeId {
        self.leaf(TokenKind::Punctuation, text)
    }

    pub fn whitespace(&mut self) -> NodeId {
        self.leaf(TokenKind::Whitespace, " ")
    }

    pub fn literal(&mut self, text: &str) -> NodeId {
        self.leaf(TokenKind::Literal, text)
    }

    pub fn operator(&mut self, text: &str) -> NodeId {
        self.leaf(TokenKind::Operator, text)
    }

    pub fn wildcard(&mut self) -> NodeId {
        self.leaf(TokenKind::Wildcard, "*")
    }

    pub fn statement(&mut self, children: Vec<NodeId>) -> NodeId {
        self.group(TokenKind::Statement, children)
    }

    pub fn identifier(&mut self, children: Vec<NodeId>) -> NodeId {
        self.group(TokenKind::Identifier, children)
    }

    pub fn identifier_list(&mut self, children: Vec<NodeId>) -> NodeId {
        self.group(TokenKind::IdentifierList, children)
    }

    pub fn parenthesis(&mut self, children: Vec<NodeId>) -> NodeId {
        self.group(TokenKind::Parenthesis, children)
    }

    pub fn where_clause(&mut self, children: Vec<NodeId>) -> NodeId {
        self.group(TokenKind::Where, children)
    }

    pub fn comparison(&mut self, children: Vec<NodeId>) -> NodeId {
        self.group(TokenKind::Comparison, children)
    }

    // Inspection surface.

    pub fn kind(&self, id: NodeId) -> TokenKind {
        self.nodes[id.index()].kind
    }

    /// Leaf text; empty for groups (use [`TokenTree::render`] for those).
    pub fn text(&self, id: NodeId) -> &str {
        &self.nodes[id.index()].text
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// True when the node is a plain keyword matching `expected`
    /// (case-insensitive, internal whitespace collapsed).
    pub fn matches_keyword(&self, id: NodeId, expected: &str) -> bool {
        self.kind(id) == TokenKind::Keyword && normalize_keyword(self.text(id)) == expected
    }

    /// True when the node is a DML keyword matching `expected`.
    pub fn matches_dml(&self, id: NodeId, expected: &str) -> bool {
        self.kind(id) == TokenKind::Dml && normalize_keyword(self.text(id)) == expected
    }

    /// Prefix match for keywords; covers forms like `UNION ALL` or `GROUP BY`
    /// that the tokenizer reports as a single token.
    pub fn keyword_starts_with(&self, id: NodeId, prefix: &str) -> bool {
        self.kind(id) == TokenKind::Keyword
            && normalize_keyword(self.text(id)).starts_with(prefix)
    }

    /// Real table name of an identifier expression: the first name after the
    /// first dot (`db.t1` resolves to `t1`), else the first name. Only
    /// identifier-like groups resolve names; anything else yields `None`.
    pub fn real_name(&self, id: NodeId) -> Option<String> {
        if !matches!(self.kind(id), TokenKind::Identifier | TokenKind::Function) {
            return None;
        }
        let children = self.children(id);
        let dot = children
            .iter()
            .position(|&c| self.kind(c) == TokenKind::Punctuation && self.text(c) == ".");
        let from = dot.map(|i| i + 1).unwrap_or(0);
        children[from..]
            .iter()
            .find(|&&c| self.kind(c) == TokenKind::Name)
            .map(|&c| self.text(c).to_string())
    }

    /// Alias of an identifier expression: the name following an `AS` keyword,
    /// else (for `name alias` shapes with at least one whitespace token and
    /// more than two children) the last name token. `None` for non-identifier
    /// groups.
    pub fn alias(&self, id: NodeId) -> Option<String> {
        if !matches!(self.kind(id), TokenKind::Identifier | TokenKind::Function) {
            return None;
        }
        let children = self.children(id);
        if let Some(as_idx) = children.iter().position(|&c| self.matches_keyword(c, "AS")) {
            return self.first_name_in(&children[as_idx + 1..]);
        }
        let has_ws = children.iter().any(|&c| self.kind(c) == TokenKind::Whitespace);
        if children.len() > 2 && has_ws {
            return self.last_name_in(children);
        }
        None
    }

    /// First name-like token in a child run.
    pub(crate) fn first_name_in(&self, children: &[NodeId]) -> Option<String> {
        children.iter().find_map(|&c| self.name_of(c))
    }

    /// Last name-like token in a child run (reverse scan).
    pub(crate) fn last_name_in(&self, children: &[NodeId]) -> Option<String> {
        children.iter().rev().find_map(|&c| self.name_of(c))
    }

    fn name_of(&self, id: NodeId) -> Option<String> {
        match self.kind(id) {
            TokenKind::Name => Some(self.text(id).to_string()),
            TokenKind::Identifier | TokenKind::Function => {
                self.alias(id).or_else(|| self.real_name(id))
            }
            _ => None,
        }
    }

    /// Flattened source text of a subtree, for diagnostics.
    pub fn render(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.render_into(id, &mut out);
        out
    }

    fn render_into(&self, id: NodeId, out: &mut String) {
        let data = &self.nodes[id.index()];
        if data.children.is_empty() {
            out.push_str(&data.text);
        } else {
            for &child in &data.children {
                self.render_into(child, out);
            }
        }
    }
}

fn normalize_keyword(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase()
}
