//! Lexical scopes - which declarations a usage can see
//!
//! The walker builds the scope table as it goes, so handlers observe exactly
//! the declarations that precede them in traversal order plus everything
//! already collected in enclosing scopes.

pub mod table;
pub mod walker;

pub use table::{ScopeId, ScopeKind, ScopeTable};
pub use walker::{ScopedWalker, Visit};
