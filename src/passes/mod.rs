//! Enhancement passes over a built graph
//!
//! A pass mutates the graph in place and reports what it did. The
//! [`Pipeline`] runs passes in registration order and releases every pass
//! once the run is over, whether it succeeded or not.

pub mod variable_usage;

pub use variable_usage::{
    DeclarationIndex, Fresh, Indexed, Resolved, ResolutionStats, UsageResolution,
    VariableUsageResolver,
};

use crate::graph::Graph;
use crate::node::NodeId;
use crate::{Error, Result};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Name of the unit that holds synthesized declarations
pub const UNKNOWN_UNIT_NAME: &str = "unknown declarations";

/// Passes run when nothing is configured
pub const DEFAULT_PASSES: &[&str] = &[VariableUsageResolver::NAME];

/// A single mutating stage of the pipeline
pub trait Pass {
    fn name(&self) -> &'static str;

    /// Run the pass over the whole graph
    fn accept(&mut self, graph: &mut Graph) -> Result<PassReport>;

    /// Release everything kept from the last run
    fn cleanup(self: Box<Self>);
}

/// Find or create the dummy unit for synthesized declarations.
///
/// Every pass that synthesizes declarations shares this unit.
pub fn unknown_translation_unit(graph: &mut Graph) -> NodeId {
    let existing = graph
        .translation_units()
        .iter()
        .copied()
        .find(|&unit| {
            let node = graph.node(unit);
            node.dummy && node.name == UNKNOWN_UNIT_NAME
        });
    if let Some(unit) = existing {
        return unit;
    }

    let unit = graph.add_unit(UNKNOWN_UNIT_NAME);
    graph.node_mut(unit).dummy = true;
    debug!("Created translation unit for unknown declarations");
    unit
}

/// One named counter in a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub name: String,
    pub value: usize,
}

/// What a pass did during one run
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    pub pass: String,
    pub metrics: Vec<Metric>,
}

impl PassReport {
    pub fn new(pass: impl Into<String>) -> Self {
        Self {
            pass: pass.into(),
            metrics: Vec::new(),
        }
    }

    pub fn with_metric(mut self, name: impl Into<String>, value: usize) -> Self {
        self.metrics.push(Metric { name: name.into(), value });
        self
    }

    pub fn metric(&self, name: &str) -> Option<usize> {
        self.metrics.iter().find(|m| m.name == name).map(|m| m.value)
    }
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.pass)?;
        for metric in &self.metrics {
            writeln!(f, "  {}: {}", metric.name, metric.value)?;
        }
        Ok(())
    }
}

/// Construct a pass from its registered name
pub fn create_pass(name: &str) -> Result<Box<dyn Pass>> {
    match name {
        VariableUsageResolver::NAME | "variable_usage_resolver" | "usage" => {
            Ok(Box::new(VariableUsageResolver::new()))
        }
        _ => Err(Error::UnknownPass(name.to_string())),
    }
}

/// Ordered list of passes
#[derive(Default)]
pub struct Pipeline {
    passes: Vec<Box<dyn Pass>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pipeline from registered pass names
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let mut pipeline = Self::new();
        for name in names {
            pipeline.register(create_pass(name.as_ref())?);
        }
        Ok(pipeline)
    }

    /// The default pipeline
    pub fn standard() -> Self {
        let mut pipeline = Self::new();
        pipeline.register(Box::new(VariableUsageResolver::new()));
        pipeline
    }

    pub fn register(&mut self, pass: Box<dyn Pass>) {
        self.passes.push(pass);
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Run every pass in order, then clean all of them up.
    ///
    /// Stops at the first failing pass; passes after it do not run.
    pub fn run(mut self, graph: &mut Graph) -> Result<Vec<PassReport>> {
        let mut reports = Vec::with_capacity(self.passes.len());
        let mut outcome = Ok(());

        for pass in self.passes.iter_mut() {
            info!("Running pass {}", pass.name());
            match pass.accept(graph) {
                Ok(report) => {
                    debug!("{}", report);
                    reports.push(report);
                }
                Err(err) => {
                    outcome = Err(err);
                    break;
                }
            }
        }

        for pass in self.passes.drain(..) {
            pass.cleanup();
        }

        outcome.map(|()| reports)
    }
}
