//! Scope-aware AST traversal
//!
//! The walker visits a translation unit depth-first in source order while
//! maintaining the scope table and the enclosing record type. Handlers are
//! passed per traversal, so a walker can be reused across phases with
//! different callbacks.

use super::table::{ScopeId, ScopeKind, ScopeTable};
use crate::graph::Graph;
use crate::node::{NodeId, NodeTag};
use crate::types::TypeDescriptor;

/// What a handler sees for each node
#[derive(Debug, Clone)]
pub struct Visit {
    /// Type of the innermost enclosing record
    pub current_type: Option<TypeDescriptor>,
    /// Innermost scope, which is the node itself when it opens one
    pub scope: Option<ScopeId>,
    pub node: NodeId,
}

enum Step {
    Enter(NodeId),
    Exit { opened_scope: bool, pushed_type: bool },
}

#[derive(Debug, Default)]
pub struct ScopedWalker {
    scopes: ScopeTable,
}

impl ScopedWalker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scopes(&self) -> &ScopeTable {
        &self.scopes
    }

    /// Declarations visible from `scope`, innermost scope first
    pub fn declarations_for_scope(&self, scope: ScopeId) -> Vec<NodeId> {
        self.scopes.declarations_for_scope(scope)
    }

    /// Walk the AST under `root`, calling `handler` for every node.
    ///
    /// A node's children are read after its handler returns, so links the
    /// handler rewrites decide what gets visited next.
    pub fn iterate<F>(&mut self, graph: &mut Graph, root: NodeId, mut handler: F)
    where
        F: FnMut(&mut Graph, &ScopeTable, &Visit),
    {
        let mut todo = vec![Step::Enter(root)];
        let mut scope_stack: Vec<ScopeId> = Vec::new();
        let mut type_stack: Vec<TypeDescriptor> = Vec::new();

        while let Some(step) = todo.pop() {
            let node = match step {
                Step::Enter(node) => node,
                Step::Exit { opened_scope, pushed_type } => {
                    if opened_scope {
                        scope_stack.pop();
                    }
                    if pushed_type {
                        type_stack.pop();
                    }
                    continue;
                }
            };

            let tag = graph.node(node).tag();

            // declarations belong to the scope around them, not the one they open
            if tag.is_value_declaration() {
                if let Some(&scope) = scope_stack.last() {
                    self.scopes.add_declaration(scope, node);
                }
            }

            let kind = ScopeKind::opened_by(tag);
            if let Some(kind) = kind {
                self.scopes.add_scope(node, scope_stack.last().copied(), kind);
                scope_stack.push(node);
            }

            let pushed_type = tag == NodeTag::Record;
            if pushed_type {
                type_stack.push(TypeDescriptor::parse(&graph.node(node).name));
            }

            let visit = Visit {
                current_type: type_stack.last().cloned(),
                scope: scope_stack.last().copied(),
                node,
            };
            handler(graph, &self.scopes, &visit);

            todo.push(Step::Exit { opened_scope: kind.is_some(), pushed_type });
            for child in graph.ast_children(node).into_iter().rev() {
                todo.push(Step::Enter(child));
            }
        }
    }
}
