//! JSON unit documents
//!
//! A language-neutral interchange format for translation units. External
//! parsers emit one document per source file:
//!
//! ```json
//! {
//!   "name": "shapes.java",
//!   "declarations": [
//!     { "kind": "record", "name": "Point", "members": [
//!       { "kind": "field", "name": "x", "type": "int" }
//!     ]},
//!     { "kind": "function", "name": "main", "body": [
//!       { "kind": "declare", "name": "p", "type": "Point" },
//!       { "kind": "expression", "expression":
//!         { "kind": "member", "base": { "kind": "ref", "name": "p", "type": "Point" },
//!           "member": "x", "type": "int" } }
//!     ]}
//!   ]
//! }
//! ```

use super::framework::Frontend;
use crate::builder::GraphBuilder;
use crate::graph::Graph;
use crate::node::{FunctionKind, NodeId};
use crate::types::{Origin, TypeDescriptor};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitDocument {
    /// Unit name; defaults to the file path
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub declarations: Vec<DeclarationSpec>,
}

fn default_record_kind() -> String {
    "class".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeclarationSpec {
    Record {
        name: String,
        #[serde(default = "default_record_kind")]
        record_kind: String,
        #[serde(default)]
        super_types: Vec<String>,
        #[serde(default)]
        members: Vec<DeclarationSpec>,
    },
    Enum {
        name: String,
        #[serde(default)]
        super_types: Vec<String>,
        #[serde(default)]
        constants: Vec<String>,
    },
    Field {
        name: String,
        #[serde(rename = "type", default)]
        ty: Option<String>,
        #[serde(default)]
        modifiers: Vec<String>,
        #[serde(default)]
        initializer: Option<ExpressionSpec>,
    },
    Function {
        name: String,
        /// Defaults to `method` inside records and `function` elsewhere
        #[serde(default)]
        function_kind: Option<FunctionKind>,
        #[serde(default)]
        return_type: Option<String>,
        #[serde(rename = "static", default)]
        is_static: bool,
        #[serde(default)]
        parameters: Vec<ParameterSpec>,
        #[serde(default)]
        body: Option<Vec<StatementSpec>>,
    },
    Variable {
        name: String,
        #[serde(rename = "type", default)]
        ty: Option<String>,
        #[serde(default)]
        initializer: Option<ExpressionSpec>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type", default)]
    pub ty: Option<String>,
    #[serde(default)]
    pub variadic: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatementSpec {
    Declare {
        name: String,
        #[serde(rename = "type", default)]
        ty: Option<String>,
        #[serde(default)]
        initializer: Option<ExpressionSpec>,
    },
    Return {
        #[serde(default)]
        value: Option<ExpressionSpec>,
    },
    Expression {
        expression: ExpressionSpec,
    },
    Block {
        #[serde(default)]
        statements: Vec<StatementSpec>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExpressionSpec {
    Ref {
        name: String,
        #[serde(rename = "type", default)]
        ty: Option<String>,
        #[serde(rename = "static", default)]
        is_static: bool,
        #[serde(default)]
        line: Option<u32>,
    },
    Member {
        base: Box<ExpressionSpec>,
        member: String,
        #[serde(rename = "type", default)]
        ty: Option<String>,
        /// Type of the member itself; defaults to the access type
        #[serde(default)]
        member_type: Option<String>,
        #[serde(default)]
        line: Option<u32>,
    },
    Call {
        name: String,
        #[serde(default)]
        base: Option<Box<ExpressionSpec>>,
        #[serde(default)]
        arguments: Vec<ExpressionSpec>,
        #[serde(rename = "type", default)]
        ty: Option<String>,
        #[serde(default)]
        line: Option<u32>,
    },
    Literal {
        value: String,
        #[serde(rename = "type", default)]
        ty: Option<String>,
    },
}

/// Frontend for `*.json` unit documents
#[derive(Debug, Default)]
pub struct DocumentFrontend;

impl DocumentFrontend {
    pub fn new() -> Self {
        Self
    }

    /// Build a parsed document into `graph`
    pub fn build(&self, document: &UnitDocument, default_name: &str, graph: &mut Graph) -> NodeId {
        let name = document.name.as_deref().unwrap_or(default_name);
        let mut builder = GraphBuilder::new(graph, name);
        for declaration in &document.declarations {
            build_declaration(&mut builder, declaration, false);
        }
        builder.finish()
    }
}

impl Frontend for DocumentFrontend {
    fn language_name(&self) -> &str {
        "Document"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn parse_file(&self, path: &str, content: &str, graph: &mut Graph) -> Result<NodeId> {
        let document: UnitDocument = serde_json::from_str(content)
            .map_err(|e| Error::Parse(format!("{}: {}", path, e)))?;
        let unit = self.build(&document, path, graph);
        tracing::debug!("Built unit {} from {} declarations", path, document.declarations.len());
        Ok(unit)
    }
}

/// Types spelled out in a document are taken as resolved
fn type_of(raw: Option<&str>) -> TypeDescriptor {
    match raw {
        Some(raw) => TypeDescriptor::parse(raw).with_origin(Origin::Resolved),
        None => TypeDescriptor::unknown(),
    }
}

fn build_declaration(b: &mut GraphBuilder<'_>, declaration: &DeclarationSpec, in_record: bool) {
    match declaration {
        DeclarationSpec::Record { name, record_kind, super_types, members } => {
            let supers = super_types.iter().map(|s| TypeDescriptor::parse(s)).collect();
            b.enter_record(name.as_str(), record_kind.as_str(), supers);
            for member in members {
                build_declaration(b, member, true);
            }
            b.leave();
        }
        DeclarationSpec::Enum { name, super_types, constants } => {
            let supers = super_types.iter().map(|s| TypeDescriptor::parse(s)).collect();
            b.enter_enum(name.as_str(), supers);
            for constant in constants {
                b.add_enum_constant(constant.as_str());
            }
            b.leave();
        }
        DeclarationSpec::Field { name, ty, modifiers, initializer } => {
            let initializer = initializer.as_ref().map(|e| build_expression(b, e));
            b.add_field(name.as_str(), type_of(ty.as_deref()), modifiers.clone(), initializer);
        }
        DeclarationSpec::Function { name, function_kind, return_type, is_static, parameters, body } => {
            let kind = function_kind.unwrap_or(if in_record {
                FunctionKind::Method
            } else {
                FunctionKind::Function
            });
            b.enter_function(name.as_str(), kind, type_of(return_type.as_deref()), *is_static);
            for parameter in parameters {
                b.add_parameter(parameter.name.as_str(), type_of(parameter.ty.as_deref()), parameter.variadic);
            }
            if let Some(statements) = body {
                b.enter_block();
                for statement in statements {
                    build_statement(b, statement);
                }
                b.leave();
            }
            b.leave();
        }
        DeclarationSpec::Variable { name, ty, initializer } => {
            let initializer = initializer.as_ref().map(|e| build_expression(b, e));
            b.declare_variable(name.as_str(), type_of(ty.as_deref()), initializer);
        }
    }
}

fn build_statement(b: &mut GraphBuilder<'_>, statement: &StatementSpec) {
    match statement {
        StatementSpec::Declare { name, ty, initializer } => {
            let initializer = initializer.as_ref().map(|e| build_expression(b, e));
            b.declare_variable(name.as_str(), type_of(ty.as_deref()), initializer);
        }
        StatementSpec::Return { value } => {
            let value = value.as_ref().map(|e| build_expression(b, e));
            b.add_return(value);
        }
        StatementSpec::Expression { expression } => {
            let expression = build_expression(b, expression);
            b.add_statement(expression);
        }
        StatementSpec::Block { statements } => {
            b.enter_block();
            for statement in statements {
                build_statement(b, statement);
            }
            b.leave();
        }
    }
}

fn build_expression(b: &mut GraphBuilder<'_>, expression: &ExpressionSpec) -> NodeId {
    let (id, line) = match expression {
        ExpressionSpec::Ref { name, ty, is_static, line } => {
            let ty = type_of(ty.as_deref());
            let id = if *is_static {
                b.static_reference(name.as_str(), ty)
            } else {
                b.reference(name.as_str(), ty)
            };
            (id, *line)
        }
        ExpressionSpec::Member { base, member, ty, member_type, line } => {
            let base = build_expression(b, base);
            let ty = type_of(ty.as_deref());
            let member_ty = match member_type {
                Some(raw) => type_of(Some(raw)),
                None => ty.clone(),
            };
            (b.member(base, member.as_str(), ty, member_ty), *line)
        }
        ExpressionSpec::Call { name, base, arguments, ty, line } => {
            let base = base.as_ref().map(|e| build_expression(b, e));
            let arguments = arguments.iter().map(|e| build_expression(b, e)).collect();
            (b.call(name.as_str(), base, arguments, type_of(ty.as_deref())), *line)
        }
        ExpressionSpec::Literal { value, ty } => (b.literal(value.as_str(), type_of(ty.as_deref())), None),
    };

    if let Some(line) = line {
        b.graph_mut().node_mut(id).line = Some(line);
    }
    id
}
