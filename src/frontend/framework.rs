//! Core frontend framework
//!
//! Defines the trait all frontends implement and the registry that picks one
//! per file.

use crate::graph::Graph;
use crate::node::NodeId;
use crate::Result;
use std::path::Path;

/// Trait for language frontends
///
/// A frontend translates one source file into a translation unit of the
/// graph. References and member accesses are emitted as unresolved stubs
/// carrying a name and a best-effort type; passes link them later.
pub trait Frontend: Send + Sync {
    /// Get the language name (for display)
    fn language_name(&self) -> &str;

    /// Get file extensions this frontend handles
    fn file_extensions(&self) -> &[&str];

    /// Check if this frontend can handle a file
    fn can_handle(&self, path: &Path) -> bool {
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            self.file_extensions().contains(&ext)
        } else {
            false
        }
    }

    /// Parse a file into `graph`, returning the new translation unit
    fn parse_file(&self, path: &str, content: &str, graph: &mut Graph) -> Result<NodeId>;
}

/// Registry of frontends
#[derive(Default)]
pub struct FrontendRegistry {
    frontends: Vec<Box<dyn Frontend>>,
}

impl FrontendRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a frontend
    pub fn register(&mut self, frontend: impl Frontend + 'static) {
        self.frontends.push(Box::new(frontend));
    }

    /// Find a frontend for a file
    pub fn find_frontend(&self, path: &Path) -> Option<&dyn Frontend> {
        self.frontends
            .iter()
            .find(|f| f.can_handle(path))
            .map(|f| f.as_ref())
    }

    /// Get all registered frontends
    pub fn frontends(&self) -> &[Box<dyn Frontend>] {
        &self.frontends
    }

    /// Parse a file with the matching frontend; `None` if no frontend handles it
    pub fn parse_file(&self, path: &Path, content: &str, graph: &mut Graph) -> Result<Option<NodeId>> {
        match self.find_frontend(path) {
            Some(frontend) => {
                let unit = frontend.parse_file(&path.to_string_lossy(), content, graph)?;
                Ok(Some(unit))
            }
            None => Ok(None),
        }
    }
}

/// Create a default registry with all built-in frontends
pub fn default_registry() -> FrontendRegistry {
    let mut registry = FrontendRegistry::new();
    registry.register(super::document::DocumentFrontend::new());
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestFrontend;

    impl Frontend for TestFrontend {
        fn language_name(&self) -> &str { "test" }
        fn file_extensions(&self) -> &[&str] { &["test"] }
        fn parse_file(&self, path: &str, _content: &str, graph: &mut Graph) -> Result<NodeId> {
            Ok(graph.add_unit(path))
        }
    }

    #[test]
    fn test_registry() {
        let mut registry = FrontendRegistry::new();
        registry.register(TestFrontend);

        assert!(registry.find_frontend(Path::new("foo.test")).is_some());
        assert!(registry.find_frontend(Path::new("foo.other")).is_none());

        let mut graph = Graph::new();
        let unit = registry.parse_file(Path::new("foo.test"), "", &mut graph).unwrap();
        assert_eq!(unit.map(|u| graph.node(u).name.clone()), Some("foo.test".to_string()));
        assert!(registry.parse_file(Path::new("foo.rs"), "", &mut graph).unwrap().is_none());
    }

    #[test]
    fn test_default_registry_handles_documents() {
        let registry = default_registry();
        assert!(registry.find_frontend(Path::new("unit.json")).is_some());
        assert_eq!(registry.frontends().len(), 1);
    }
}
