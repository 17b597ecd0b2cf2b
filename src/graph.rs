//! Program Graph - arena of nodes produced by the frontends
//!
//! Nodes are owned by the graph and addressed by [`NodeId`]. Every link
//! between nodes (AST children, `refers_to`, member access base/member) is an
//! id, so cycles such as a field whose type listeners point back at a reference
//! need no shared ownership.

use crate::node::{Node, NodeId, NodeKind, NodeTag};
use crate::types::TypeDescriptor;
use serde::Serialize;
use std::collections::HashMap;

/// In-memory program graph.
#[derive(Debug, Default)]
pub struct Graph {
    /// All nodes, indexed by `NodeId`
    nodes: Vec<Node>,
    /// Top-level translation units in insertion order
    units: Vec<NodeId>,
    /// Nodes indexed by name (for quick lookup)
    nodes_by_name: HashMap<String, Vec<NodeId>>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the arena
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes_by_name
            .entry(node.name.clone())
            .or_default()
            .push(id);
        self.nodes.push(node);
        id
    }

    /// Add a translation unit and register it as top-level
    pub fn add_unit(&mut self, name: impl Into<String>) -> NodeId {
        let id = self.add_node(Node::new(name, NodeKind::Unit { declarations: Vec::new() }));
        self.units.push(id);
        id
    }

    /// Create a record together with its implicit `this` field.
    ///
    /// The record is not attached anywhere; the caller decides where it lives.
    pub fn add_record(
        &mut self,
        name: impl Into<String>,
        kind: impl Into<String>,
        super_types: Vec<TypeDescriptor>,
        dummy: bool,
    ) -> NodeId {
        let name = name.into();
        let record_type = TypeDescriptor::parse(&name);

        let mut this = Node::new("this", NodeKind::Field { modifiers: Vec::new(), initializer: None })
            .with_code("this");
        this.dummy = dummy;
        let this = self.add_node(this);
        self.set_type(this, record_type);

        let mut record = Node::new(
            name,
            NodeKind::Record {
                kind: kind.into(),
                super_types,
                fields: vec![this],
                methods: Vec::new(),
                constructors: Vec::new(),
                records: Vec::new(),
                this: Some(this),
            },
        );
        record.dummy = dummy;
        self.add_node(record)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Node by id. Ids are only minted by this graph.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn translation_units(&self) -> &[NodeId] {
        &self.units
    }

    /// Get all nodes with a given name
    pub fn nodes_named(&self, name: &str) -> &[NodeId] {
        self.nodes_by_name.get(name).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// First node with the given tag and name
    pub fn find(&self, tag: NodeTag, name: &str) -> Option<NodeId> {
        self.nodes_named(name)
            .iter()
            .copied()
            .find(|&id| self.node(id).tag() == tag)
    }

    /// Get all nodes of a given tag, in creation order
    pub fn nodes_with_tag(&self, tag: NodeTag) -> Vec<NodeId> {
        self.all_nodes()
            .filter(|(_, node)| node.tag() == tag)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn all_nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }

    /// Syntactic children of a node, in source order.
    ///
    /// A member access only owns its base and member while they are still
    /// expressions; once resolved they point at declarations that live elsewhere.
    pub fn ast_children(&self, id: NodeId) -> Vec<NodeId> {
        match &self.node(id).kind {
            NodeKind::Unit { declarations } => declarations.clone(),
            NodeKind::Record { fields, methods, constructors, records, .. } => fields
                .iter()
                .chain(methods)
                .chain(constructors)
                .chain(records)
                .copied()
                .collect(),
            NodeKind::Enum { entries, .. } => entries.clone(),
            NodeKind::Field { initializer, .. } | NodeKind::Variable { initializer } => {
                initializer.iter().copied().collect()
            }
            NodeKind::Function { parameters, body, .. } => {
                parameters.iter().chain(body.iter()).copied().collect()
            }
            NodeKind::Block { statements } => statements.clone(),
            NodeKind::DeclarationStatement { declarations } => declarations.clone(),
            NodeKind::Return { value } => value.iter().copied().collect(),
            NodeKind::MemberAccess { base, member } => std::iter::once(*base)
                .chain(member.iter().copied())
                .filter(|&child| self.node(child).tag().is_expression())
                .collect(),
            NodeKind::Call { base, arguments } => {
                base.iter().chain(arguments).copied().collect()
            }
            NodeKind::EnumConstant
            | NodeKind::Parameter { .. }
            | NodeKind::Reference { .. }
            | NodeKind::Literal { .. } => Vec::new(),
        }
    }

    /// All AST descendants of `root` (including itself), pre-order
    pub fn subnodes(&self, root: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            result.push(id);
            stack.extend(self.ast_children(id).into_iter().rev());
        }
        result
    }

    /// AST descendants of `root` with the given tag
    pub fn subnodes_with_tag(&self, root: NodeId, tag: NodeTag) -> Vec<NodeId> {
        self.subnodes(root)
            .into_iter()
            .filter(|&id| self.node(id).tag() == tag)
            .collect()
    }

    pub fn refers_to(&self, reference: NodeId) -> Option<NodeId> {
        match self.node(reference).kind {
            NodeKind::Reference { refers_to, .. } => refers_to,
            _ => None,
        }
    }

    pub fn set_refers_to(&mut self, reference: NodeId, target: Option<NodeId>) {
        if let NodeKind::Reference { refers_to, .. } = &mut self.node_mut(reference).kind {
            *refers_to = target;
        }
    }

    /// `(base, member)` of a member access
    pub fn member_access(&self, id: NodeId) -> Option<(NodeId, Option<NodeId>)> {
        match self.node(id).kind {
            NodeKind::MemberAccess { base, member } => Some((base, member)),
            _ => None,
        }
    }

    pub fn set_member_access(&mut self, id: NodeId, new_base: NodeId, new_member: Option<NodeId>) {
        if let NodeKind::MemberAccess { base, member } = &mut self.node_mut(id).kind {
            *base = new_base;
            *member = new_member;
        }
    }

    /// Fields of a record (including its `this`)
    pub fn record_fields(&self, record: NodeId) -> &[NodeId] {
        match &self.node(record).kind {
            NodeKind::Record { fields, .. } => fields,
            _ => &[],
        }
    }

    pub fn record_this(&self, record: NodeId) -> Option<NodeId> {
        match self.node(record).kind {
            NodeKind::Record { this, .. } => this,
            _ => None,
        }
    }

    /// Declared supertypes of a record or enum
    pub fn super_types(&self, id: NodeId) -> &[TypeDescriptor] {
        match &self.node(id).kind {
            NodeKind::Record { super_types, .. } | NodeKind::Enum { super_types, .. } => super_types,
            _ => &[],
        }
    }

    pub fn enum_entries(&self, id: NodeId) -> &[NodeId] {
        match &self.node(id).kind {
            NodeKind::Enum { entries, .. } => entries,
            _ => &[],
        }
    }

    pub fn push_record_field(&mut self, record: NodeId, field: NodeId) {
        if let NodeKind::Record { fields, .. } = &mut self.node_mut(record).kind {
            fields.push(field);
        }
    }

    pub fn push_unit_declaration(&mut self, unit: NodeId, declaration: NodeId) {
        if let NodeKind::Unit { declarations } = &mut self.node_mut(unit).kind {
            declarations.push(declaration);
        }
    }

    /// Get statistics about the graph
    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            units: self.units.len(),
            nodes: self.nodes.len(),
            ..Default::default()
        };

        for (_, node) in self.all_nodes() {
            if node.is_typed() {
                stats.typed += 1;
            }
            if node.dummy {
                stats.dummies += 1;
            }
            match node.kind {
                NodeKind::Reference { refers_to, .. } => {
                    stats.references += 1;
                    if refers_to.is_some() {
                        stats.resolved_references += 1;
                    }
                }
                NodeKind::MemberAccess { member, .. } => {
                    stats.member_accesses += 1;
                    if member.is_some_and(|m| self.node(m).tag().is_value_declaration()) {
                        stats.resolved_members += 1;
                    }
                }
                _ => {}
            }
        }

        stats
    }
}

/// Statistics about a program graph
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphStats {
    pub units: usize,
    pub nodes: usize,
    pub typed: usize,
    pub references: usize,
    pub resolved_references: usize,
    pub member_accesses: usize,
    pub resolved_members: usize,
    pub dummies: usize,
}

impl std::fmt::Display for GraphStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Program Graph Statistics:")?;
        writeln!(f, "  Units: {}", self.units)?;
        writeln!(f, "  Nodes: {} (typed: {}, dummy: {})", self.nodes, self.typed, self.dummies)?;
        writeln!(f, "  References: {} (resolved: {})", self.references, self.resolved_references)?;
        writeln!(f, "  Member accesses: {} (resolved: {})", self.member_accesses, self.resolved_members)
    }
}
