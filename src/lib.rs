//! # Unigraph - Language-agnostic program graph
//!
//! Frontends for different source languages emit into one graph; uniform
//! enhancement passes then refine it.
//!
//! Unigraph provides:
//! - A type model where a value's type is a monotonically refined belief
//!   that other nodes can subscribe to
//! - An arena-backed graph of declarations, statements and expressions
//! - A scope-aware walker over translation units
//! - A declaration/usage resolution pass that links references to their
//!   declarations, across scopes and class inheritance
//! - A frontend registry with a JSON interchange frontend

pub mod node;
pub mod graph;
pub mod edge;
pub mod builder;
pub mod types;
pub mod scope;
pub mod passes;
pub mod frontend;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use node::{Node, NodeId, NodeKind, NodeTag};
pub use graph::Graph;
pub use builder::GraphBuilder;
pub use types::{Origin, TypeDescriptor, TypeLattice, TypeListener, TypePropagator};
pub use passes::{Pass, Pipeline, VariableUsageResolver};

/// Result type alias for Unigraph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Unigraph operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Frontend error: {0}")]
    Frontend(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Unknown pass: {0}")]
    UnknownPass(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}
