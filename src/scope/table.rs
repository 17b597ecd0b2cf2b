//! Scope table for declaration lookup
//!
//! The table tracks:
//! - Scope hierarchy (child → parent)
//! - Scope kinds
//! - Value declarations visible in each scope, in declaration order
//!
//! A scope is identified by the node that opens it (unit, record, enum,
//! function or block).

use crate::graph::Graph;
use crate::node::{NodeId, NodeTag};
use indexmap::IndexSet;
use std::collections::HashMap;

/// Scopes are keyed by the node that opens them
pub type ScopeId = NodeId;

/// The kind of scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Translation unit scope
    Module,
    /// Record or enum scope
    Class,
    /// Function/method scope
    Function,
    /// Block scope
    Block,
}

impl ScopeKind {
    /// The scope a node of this tag opens, if any
    pub fn opened_by(tag: NodeTag) -> Option<ScopeKind> {
        match tag {
            NodeTag::Unit => Some(ScopeKind::Module),
            NodeTag::Record | NodeTag::Enum => Some(ScopeKind::Class),
            NodeTag::Function => Some(ScopeKind::Function),
            NodeTag::Block => Some(ScopeKind::Block),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct ScopeTable {
    parents: HashMap<ScopeId, ScopeId>,
    kinds: HashMap<ScopeId, ScopeKind>,
    declarations: HashMap<ScopeId, IndexSet<NodeId>>,
}

impl ScopeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scope under `parent` (`None` for a root)
    pub fn add_scope(&mut self, scope: ScopeId, parent: Option<ScopeId>, kind: ScopeKind) {
        if let Some(parent) = parent {
            self.parents.insert(scope, parent);
        }
        self.kinds.insert(scope, kind);
    }

    /// Add a declaration to a scope. Returns false if it was already there.
    pub fn add_declaration(&mut self, scope: ScopeId, declaration: NodeId) -> bool {
        self.declarations.entry(scope).or_default().insert(declaration)
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.parents.get(&scope).copied()
    }

    pub fn kind(&self, scope: ScopeId) -> Option<ScopeKind> {
        self.kinds.get(&scope).copied()
    }

    /// Declarations made directly in a scope (not walking parents)
    pub fn declarations_in_scope(&self, scope: ScopeId) -> impl Iterator<Item = NodeId> + '_ {
        self.declarations
            .get(&scope)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Get scope chain from a scope up to its root
    pub fn scope_chain(&self, scope: ScopeId) -> Vec<ScopeId> {
        let mut chain = vec![scope];
        let mut current = scope;
        while let Some(parent) = self.parent(current) {
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// Everything visible from `scope`, innermost scope first
    pub fn declarations_for_scope(&self, scope: ScopeId) -> Vec<NodeId> {
        self.scope_chain(scope)
            .into_iter()
            .flat_map(|s| self.declarations_in_scope(s))
            .collect()
    }

    /// First visible declaration named `name`
    pub fn lookup(&self, graph: &Graph, scope: ScopeId, name: &str) -> Option<NodeId> {
        self.scope_chain(scope)
            .into_iter()
            .flat_map(|s| self.declarations_in_scope(s))
            .find(|&decl| graph.node(decl).name == name)
    }
}
