//! Frontend Framework
//!
//! A frontend turns one source file into a translation unit of the shared
//! graph. The core never sees language-specific logic; it only consumes the
//! node taxonomy.

pub mod framework;
pub mod document;

pub use framework::{Frontend, FrontendRegistry, default_registry};
pub use document::{DocumentFrontend, UnitDocument};
