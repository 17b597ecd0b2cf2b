//! Graph builder used by frontends
//!
//! Tracks the stack of open containers (unit, record, enum, function, block)
//! so declarations and statements land in the right parent. Closing a record
//! without constructors adds the implicit default constructor.

use crate::graph::Graph;
use crate::node::{FunctionKind, Node, NodeId, NodeKind};
use crate::types::TypeDescriptor;

pub struct GraphBuilder<'g> {
    graph: &'g mut Graph,
    unit: NodeId,
    containers: Vec<NodeId>,
}

impl<'g> GraphBuilder<'g> {
    /// Start a new translation unit
    pub fn new(graph: &'g mut Graph, unit_name: impl Into<String>) -> Self {
        let unit = graph.add_unit(unit_name);
        Self {
            graph,
            unit,
            containers: vec![unit],
        }
    }

    pub fn unit(&self) -> NodeId {
        self.unit
    }

    pub fn graph(&self) -> &Graph {
        &*self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut *self.graph
    }

    fn current(&self) -> NodeId {
        self.containers.last().copied().unwrap_or(self.unit)
    }

    fn typed(&mut self, node: Node, ty: TypeDescriptor) -> NodeId {
        let id = self.graph.add_node(node);
        self.graph.set_type(id, ty);
        id
    }

    /// Attach a record or enum to the innermost unit or record
    fn attach_nominal(&mut self, id: NodeId) {
        let parent = self.current();
        match &mut self.graph.node_mut(parent).kind {
            NodeKind::Unit { declarations } => declarations.push(id),
            NodeKind::Record { records, .. } => records.push(id),
            _ => {
                tracing::debug!("Nested type {} declared outside a unit or record", id);
                let unit = self.unit;
                self.graph.push_unit_declaration(unit, id);
            }
        }
    }

    /// Open a class-like declaration. Returns the record id.
    pub fn enter_record(
        &mut self,
        name: impl Into<String>,
        kind: impl Into<String>,
        super_types: Vec<TypeDescriptor>,
    ) -> NodeId {
        let record = self.graph.add_record(name, kind, super_types, false);
        self.attach_nominal(record);
        self.containers.push(record);
        record
    }

    pub fn enter_enum(&mut self, name: impl Into<String>, super_types: Vec<TypeDescriptor>) -> NodeId {
        let id = self.graph.add_node(Node::new(
            name,
            NodeKind::Enum { entries: Vec::new(), super_types },
        ));
        self.attach_nominal(id);
        self.containers.push(id);
        id
    }

    /// Add a constant to the innermost enum; it is typed as that enum.
    pub fn add_enum_constant(&mut self, name: impl Into<String>) -> NodeId {
        let owner = self.current();
        let ty = TypeDescriptor::parse(&self.graph.node(owner).name);
        let id = self.typed(Node::new(name, NodeKind::EnumConstant), ty);
        if let NodeKind::Enum { entries, .. } = &mut self.graph.node_mut(owner).kind {
            entries.push(id);
        }
        id
    }

    /// Add a field to the innermost record, or a global to the unit.
    pub fn add_field(
        &mut self,
        name: impl Into<String>,
        ty: TypeDescriptor,
        modifiers: Vec<String>,
        initializer: Option<NodeId>,
    ) -> NodeId {
        let id = self.typed(Node::new(name, NodeKind::Field { modifiers, initializer }), ty);
        let owner = self.current();
        if matches!(self.graph.node(owner).kind, NodeKind::Record { .. }) {
            self.graph.push_record_field(owner, id);
        } else {
            let unit = self.unit;
            self.graph.push_unit_declaration(unit, id);
        }
        id
    }

    /// Open a function, method or constructor.
    ///
    /// Constructors are typed as the record they construct.
    pub fn enter_function(
        &mut self,
        name: impl Into<String>,
        kind: FunctionKind,
        return_type: TypeDescriptor,
        is_static: bool,
    ) -> NodeId {
        let owner = self.current();
        let ty = match (kind, &self.graph.node(owner).kind) {
            (FunctionKind::Constructor, NodeKind::Record { .. }) => {
                TypeDescriptor::parse(&self.graph.node(owner).name)
            }
            _ => return_type,
        };

        let id = self.typed(
            Node::new(
                name,
                NodeKind::Function {
                    kind,
                    is_static,
                    parameters: Vec::new(),
                    body: None,
                },
            ),
            ty,
        );

        match &mut self.graph.node_mut(owner).kind {
            NodeKind::Record { constructors, .. } if kind == FunctionKind::Constructor => {
                constructors.push(id)
            }
            NodeKind::Record { methods, .. } => methods.push(id),
            _ => {
                let unit = self.unit;
                self.graph.push_unit_declaration(unit, id);
            }
        }

        self.containers.push(id);
        id
    }

    pub fn add_parameter(&mut self, name: impl Into<String>, ty: TypeDescriptor, variadic: bool) -> NodeId {
        let id = self.typed(Node::new(name, NodeKind::Parameter { variadic }), ty);
        let owner = self.current();
        if let NodeKind::Function { parameters, .. } = &mut self.graph.node_mut(owner).kind {
            parameters.push(id);
        }
        id
    }

    /// Open a block: the body of the innermost function, or a nested statement.
    pub fn enter_block(&mut self) -> NodeId {
        let id = self.graph.add_node(Node::new("", NodeKind::Block { statements: Vec::new() }));
        let owner = self.current();
        match &mut self.graph.node_mut(owner).kind {
            NodeKind::Function { body: body @ None, .. } => *body = Some(id),
            NodeKind::Block { statements } => statements.push(id),
            _ => tracing::debug!("Block {} opened outside a function body", id),
        }
        self.containers.push(id);
        id
    }

    /// Append a statement to the innermost block
    pub fn add_statement(&mut self, statement: NodeId) {
        let owner = self.current();
        if let NodeKind::Block { statements } = &mut self.graph.node_mut(owner).kind {
            statements.push(statement);
        } else {
            tracing::debug!("Statement {} outside a block dropped", statement);
        }
    }

    /// Declare a local variable in the innermost block.
    ///
    /// Outside a block the variable becomes a unit-level declaration.
    pub fn declare_variable(
        &mut self,
        name: impl Into<String>,
        ty: TypeDescriptor,
        initializer: Option<NodeId>,
    ) -> NodeId {
        let id = self.typed(Node::new(name, NodeKind::Variable { initializer }), ty);
        let owner = self.current();
        if matches!(self.graph.node(owner).kind, NodeKind::Block { .. }) {
            let statement = self.graph.add_node(Node::new(
                "",
                NodeKind::DeclarationStatement { declarations: vec![id] },
            ));
            self.add_statement(statement);
        } else {
            let unit = self.unit;
            self.graph.push_unit_declaration(unit, id);
        }
        id
    }

    pub fn add_return(&mut self, value: Option<NodeId>) -> NodeId {
        let id = self.graph.add_node(Node::new("", NodeKind::Return { value }));
        self.add_statement(id);
        id
    }

    /// Close the innermost container and return it.
    pub fn leave(&mut self) -> Option<NodeId> {
        if self.containers.len() <= 1 {
            return None;
        }
        let closed = self.containers.pop()?;
        if matches!(self.graph.node(closed).kind, NodeKind::Record { .. }) {
            self.ensure_default_constructor(closed);
        }
        Some(closed)
    }

    /// Close every open container and return the unit
    pub fn finish(mut self) -> NodeId {
        while self.leave().is_some() {}
        self.unit
    }

    fn ensure_default_constructor(&mut self, record: NodeId) {
        let has_constructor = matches!(
            &self.graph.node(record).kind,
            NodeKind::Record { constructors, .. } if !constructors.is_empty()
        );
        if has_constructor {
            return;
        }

        self.containers.push(record);
        let name = self.graph.node(record).name.clone();
        self.enter_function(name, FunctionKind::Constructor, TypeDescriptor::unknown(), false);
        self.containers.pop();
        self.containers.pop();
    }

    /// A name used as a value
    pub fn reference(&mut self, name: impl Into<String>, ty: TypeDescriptor) -> NodeId {
        self.typed(
            Node::new(name, NodeKind::Reference { refers_to: None, is_static: false }),
            ty,
        )
    }

    /// A reference qualified by a type name; never resolves to an implicit field
    pub fn static_reference(&mut self, name: impl Into<String>, ty: TypeDescriptor) -> NodeId {
        self.typed(
            Node::new(name, NodeKind::Reference { refers_to: None, is_static: true }),
            ty,
        )
    }

    /// `base.member`, with a reference stub for the member
    pub fn member(
        &mut self,
        base: NodeId,
        member: impl Into<String>,
        ty: TypeDescriptor,
        member_ty: TypeDescriptor,
    ) -> NodeId {
        let member = member.into();
        let stub = self.reference(member.clone(), member_ty);
        self.typed(
            Node::new(member, NodeKind::MemberAccess { base, member: Some(stub) }),
            ty,
        )
    }

    pub fn call(
        &mut self,
        name: impl Into<String>,
        base: Option<NodeId>,
        arguments: Vec<NodeId>,
        ty: TypeDescriptor,
    ) -> NodeId {
        self.typed(Node::new(name, NodeKind::Call { base, arguments }), ty)
    }

    pub fn literal(&mut self, value: impl Into<String>, ty: TypeDescriptor) -> NodeId {
        let value = value.into();
        self.typed(
            Node::new(value.clone(), NodeKind::Literal { value: value.clone() }).with_code(value),
            ty,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeTag;

    fn t(raw: &str) -> TypeDescriptor {
        TypeDescriptor::parse(raw)
    }

    #[test]
    fn test_record_gets_default_constructor() {
        let mut graph = Graph::new();
        let mut builder = GraphBuilder::new(&mut graph, "point.json");
        let record = builder.enter_record("Point", "class", vec![]);
        builder.add_field("x", t("int"), vec![], None);
        let unit = builder.finish();

        assert_eq!(graph.ast_children(unit), vec![record]);
        let NodeKind::Record { constructors, fields, .. } = &graph.node(record).kind else {
            panic!("expected record");
        };
        assert_eq!(fields.len(), 2);
        assert_eq!(constructors.len(), 1);
        let ctor = constructors[0];
        assert_eq!(graph.node(ctor).name, "Point");
        assert_eq!(graph.type_of(ctor), t("Point"));
    }

    #[test]
    fn test_explicit_constructor_is_kept() {
        let mut graph = Graph::new();
        let mut builder = GraphBuilder::new(&mut graph, "a.json");
        let record = builder.enter_record("A", "class", vec![]);
        builder.enter_function("A", FunctionKind::Constructor, TypeDescriptor::unknown(), false);
        builder.add_parameter("size", t("int"), false);
        builder.leave();
        builder.leave();
        builder.finish();

        let NodeKind::Record { constructors, .. } = &graph.node(record).kind else {
            panic!("expected record");
        };
        assert_eq!(constructors.len(), 1);
        assert_eq!(graph.ast_children(constructors[0]).len(), 1);
    }

    #[test]
    fn test_enum_constants_typed_as_enum() {
        let mut graph = Graph::new();
        let mut builder = GraphBuilder::new(&mut graph, "color.json");
        let color = builder.enter_enum("Color", vec![]);
        let red = builder.add_enum_constant("RED");
        builder.finish();

        assert_eq!(graph.enum_entries(color), &[red]);
        assert_eq!(graph.type_of(red), t("Color"));
    }

    #[test]
    fn test_locals_are_wrapped_in_declaration_statements() {
        let mut graph = Graph::new();
        let mut builder = GraphBuilder::new(&mut graph, "main.json");
        let main = builder.enter_function("main", FunctionKind::Function, t("int"), false);
        let body = builder.enter_block();
        let init = builder.literal("0", t("int"));
        let x = builder.declare_variable("x", t("int"), Some(init));
        let use_x = builder.reference("x", TypeDescriptor::unknown());
        builder.add_return(Some(use_x));
        let unit = builder.finish();

        assert_eq!(graph.ast_children(main), vec![body]);
        let statements = graph.ast_children(body);
        assert_eq!(statements.len(), 2);
        assert_eq!(graph.node(statements[0]).tag(), NodeTag::DeclarationStatement);
        assert_eq!(graph.ast_children(statements[0]), vec![x]);
        assert!(graph.subnodes(unit).contains(&use_x));
    }

    #[test]
    fn test_member_access_has_reference_stub() {
        let mut graph = Graph::new();
        let mut builder = GraphBuilder::new(&mut graph, "m.json");
        let base = builder.reference("p", t("Point"));
        let access = builder.member(base, "x", t("int"), t("int"));

        let (b, member) = builder.graph().member_access(access).unwrap();
        assert_eq!(b, base);
        let member = member.unwrap();
        assert_eq!(builder.graph().node(member).name, "x");
        assert_eq!(builder.graph().refers_to(member), None);
    }
}
