//! Node types - the closed taxonomy of graph nodes
//!
//! Every frontend maps its syntax onto these kinds:
//! - Declarations: `Unit`, `Record`, `Enum`, `EnumConstant`, `Field`,
//!   `Variable`, `Parameter`, `Function`
//! - Statements: `Block`, `DeclarationStatement`, `Return`
//! - Expressions: `Reference`, `MemberAccess`, `Call`, `Literal`
//!
//! Nodes that carry a runtime value hold a [`TypeState`] and take part in
//! type propagation.

use crate::types::{TypeDescriptor, TypeState};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Index of a node inside its [`Graph`](crate::Graph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a function-like declaration is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    Function,
    Method,
    Constructor,
}

/// Node payload. Links between nodes are [`NodeId`]s.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A translation unit (file, module)
    Unit { declarations: Vec<NodeId> },
    /// Class-like declaration: class, struct, interface
    Record {
        kind: String,
        super_types: Vec<TypeDescriptor>,
        fields: Vec<NodeId>,
        methods: Vec<NodeId>,
        constructors: Vec<NodeId>,
        records: Vec<NodeId>,
        /// The implicit self field (`this`)
        this: Option<NodeId>,
    },
    /// Enumeration declaration
    Enum {
        entries: Vec<NodeId>,
        super_types: Vec<TypeDescriptor>,
    },
    EnumConstant,
    Field {
        modifiers: Vec<String>,
        initializer: Option<NodeId>,
    },
    Variable { initializer: Option<NodeId> },
    Parameter { variadic: bool },
    Function {
        kind: FunctionKind,
        is_static: bool,
        parameters: Vec<NodeId>,
        body: Option<NodeId>,
    },
    Block { statements: Vec<NodeId> },
    DeclarationStatement { declarations: Vec<NodeId> },
    Return { value: Option<NodeId> },
    /// A name used as a value. `refers_to` stays empty until resolution.
    Reference {
        refers_to: Option<NodeId>,
        /// Statically qualified (e.g. a type name used as a receiver)
        is_static: bool,
    },
    /// `base.member`. Both links start out as reference stubs.
    MemberAccess { base: NodeId, member: Option<NodeId> },
    Call {
        base: Option<NodeId>,
        arguments: Vec<NodeId>,
    },
    Literal { value: String },
}

impl NodeKind {
    pub fn tag(&self) -> NodeTag {
        match self {
            NodeKind::Unit { .. } => NodeTag::Unit,
            NodeKind::Record { .. } => NodeTag::Record,
            NodeKind::Enum { .. } => NodeTag::Enum,
            NodeKind::EnumConstant => NodeTag::EnumConstant,
            NodeKind::Field { .. } => NodeTag::Field,
            NodeKind::Variable { .. } => NodeTag::Variable,
            NodeKind::Parameter { .. } => NodeTag::Parameter,
            NodeKind::Function { .. } => NodeTag::Function,
            NodeKind::Block { .. } => NodeTag::Block,
            NodeKind::DeclarationStatement { .. } => NodeTag::DeclarationStatement,
            NodeKind::Return { .. } => NodeTag::Return,
            NodeKind::Reference { .. } => NodeTag::Reference,
            NodeKind::MemberAccess { .. } => NodeTag::MemberAccess,
            NodeKind::Call { .. } => NodeTag::Call,
            NodeKind::Literal { .. } => NodeTag::Literal,
        }
    }
}

/// Fieldless mirror of [`NodeKind`], used for filtering and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeTag {
    Unit,
    Record,
    Enum,
    EnumConstant,
    Field,
    Variable,
    Parameter,
    Function,
    Block,
    DeclarationStatement,
    Return,
    Reference,
    MemberAccess,
    Call,
    Literal,
}

impl NodeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeTag::Unit => "unit",
            NodeTag::Record => "record",
            NodeTag::Enum => "enum",
            NodeTag::EnumConstant => "enum_constant",
            NodeTag::Field => "field",
            NodeTag::Variable => "variable",
            NodeTag::Parameter => "parameter",
            NodeTag::Function => "function",
            NodeTag::Block => "block",
            NodeTag::DeclarationStatement => "declaration_statement",
            NodeTag::Return => "return",
            NodeTag::Reference => "reference",
            NodeTag::MemberAccess => "member_access",
            NodeTag::Call => "call",
            NodeTag::Literal => "literal",
        }
    }

    pub fn all() -> &'static [NodeTag] {
        &[
            NodeTag::Unit,
            NodeTag::Record,
            NodeTag::Enum,
            NodeTag::EnumConstant,
            NodeTag::Field,
            NodeTag::Variable,
            NodeTag::Parameter,
            NodeTag::Function,
            NodeTag::Block,
            NodeTag::DeclarationStatement,
            NodeTag::Return,
            NodeTag::Reference,
            NodeTag::MemberAccess,
            NodeTag::Call,
            NodeTag::Literal,
        ]
    }

    /// Kinds that carry a runtime value and therefore a [`TypeState`]
    pub fn is_typed(&self) -> bool {
        matches!(
            self,
            NodeTag::EnumConstant
                | NodeTag::Field
                | NodeTag::Variable
                | NodeTag::Parameter
                | NodeTag::Function
                | NodeTag::Reference
                | NodeTag::MemberAccess
                | NodeTag::Call
                | NodeTag::Literal
        )
    }

    /// Declarations that can be the target of a reference
    pub fn is_value_declaration(&self) -> bool {
        matches!(
            self,
            NodeTag::EnumConstant
                | NodeTag::Field
                | NodeTag::Variable
                | NodeTag::Parameter
                | NodeTag::Function
        )
    }

    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            NodeTag::Reference | NodeTag::MemberAccess | NodeTag::Call | NodeTag::Literal
        )
    }
}

impl FromStr for NodeTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "unit" | "translation_unit" | "file" | "module" => Ok(NodeTag::Unit),
            "record" | "class" | "struct" | "interface" => Ok(NodeTag::Record),
            "enum" => Ok(NodeTag::Enum),
            "enum_constant" | "constant" => Ok(NodeTag::EnumConstant),
            "field" => Ok(NodeTag::Field),
            "variable" | "var" | "let" => Ok(NodeTag::Variable),
            "parameter" | "param" => Ok(NodeTag::Parameter),
            "function" | "method" | "constructor" | "fn" => Ok(NodeTag::Function),
            "block" => Ok(NodeTag::Block),
            "declaration_statement" => Ok(NodeTag::DeclarationStatement),
            "return" => Ok(NodeTag::Return),
            "reference" | "ref" => Ok(NodeTag::Reference),
            "member_access" | "member" => Ok(NodeTag::MemberAccess),
            "call" => Ok(NodeTag::Call),
            "literal" => Ok(NodeTag::Literal),
            _ => Err(Error::Parse(format!("Unknown node kind: {}", s))),
        }
    }
}

impl fmt::Display for NodeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A node in the program graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    /// Source text, when the frontend provides it
    pub code: Option<String>,
    /// Starting line number (1-indexed)
    pub line: Option<u32>,
    /// Synthesized because no real declaration exists
    pub dummy: bool,
    pub(crate) types: Option<TypeState>,
}

impl Node {
    /// Create a node; typed kinds start with the unknown type and no listeners.
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        let types = kind.tag().is_typed().then(TypeState::new);
        Self {
            name: name.into(),
            kind,
            code: None,
            line: None,
            dummy: false,
            types,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn tag(&self) -> NodeTag {
        self.kind.tag()
    }

    pub fn is_typed(&self) -> bool {
        self.types.is_some()
    }

    /// Current type; unknown for untyped nodes
    pub fn ty(&self) -> TypeDescriptor {
        self.types
            .as_ref()
            .map(|state| state.ty.clone())
            .unwrap_or_else(TypeDescriptor::unknown)
    }

    pub fn type_state(&self) -> Option<&TypeState> {
        self.types.as_ref()
    }

    /// Get a short description for display
    pub fn short_description(&self) -> String {
        let dummy = if self.dummy { " (dummy)" } else { "" };
        match &self.types {
            Some(state) => format!("{} {}: {}{}", self.tag(), self.name, state.ty, dummy),
            None => format!("{} {}{}", self.tag(), self.name, dummy),
        }
    }
}
