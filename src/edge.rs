//! Resolution links - the edges usage resolution adds to the graph
//!
//! Three kinds of link are produced:
//! - `RefersTo`: reference → declaration
//! - `Base`: member access → declaration its base resolved to
//! - `Member`: member access → field or enum constant
//!
//! Links are not stored separately; [`Link::collect`] reads them off the
//! node payloads so an export always matches the graph.

use crate::graph::Graph;
use crate::node::{NodeId, NodeKind, NodeTag};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    RefersTo,
    Base,
    Member,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::RefersTo => "refers_to",
            LinkKind::Base => "base",
            LinkKind::Member => "member",
        }
    }

    pub fn all() -> &'static [LinkKind] {
        &[LinkKind::RefersTo, LinkKind::Base, LinkKind::Member]
    }
}

impl FromStr for LinkKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "refers_to" | "refers-to" | "ref" => Ok(LinkKind::RefersTo),
            "base" => Ok(LinkKind::Base),
            "member" => Ok(LinkKind::Member),
            _ => Err(crate::Error::Parse(format!("Unknown link kind: {}", s))),
        }
    }
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resolved usage → declaration link.
#[derive(Debug, Clone, Serialize)]
pub struct Link {
    pub from: NodeId,
    pub to: NodeId,
    pub kind: LinkKind,
    /// Name of the usage
    pub name: String,
    /// Tag of the declaration side
    pub target: NodeTag,
    /// Target was synthesized by resolution
    pub dummy: bool,
    pub line: Option<u32>,
}

impl Link {
    fn new(graph: &Graph, from: NodeId, to: NodeId, kind: LinkKind) -> Self {
        let usage = graph.node(from);
        let target = graph.node(to);
        Self {
            from,
            to,
            kind,
            name: usage.name.clone(),
            target: target.tag(),
            dummy: target.dummy,
            line: usage.line,
        }
    }

    /// Collect every resolved link in the graph, in node order.
    ///
    /// Member access slots that still hold unresolved expressions are skipped.
    pub fn collect(graph: &Graph) -> Vec<Link> {
        let mut links = Vec::new();
        for (id, node) in graph.all_nodes() {
            match node.kind {
                NodeKind::Reference { refers_to: Some(to), .. } => {
                    links.push(Link::new(graph, id, to, LinkKind::RefersTo));
                }
                NodeKind::MemberAccess { base, member } => {
                    if !graph.node(base).tag().is_expression() {
                        links.push(Link::new(graph, id, base, LinkKind::Base));
                    }
                    if let Some(member) = member.filter(|&m| !graph.node(m).tag().is_expression()) {
                        links.push(Link::new(graph, id, member, LinkKind::Member));
                    }
                }
                _ => {}
            }
        }
        links
    }
}
