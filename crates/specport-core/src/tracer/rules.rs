/*!
# Transformation Rules

Core trait and utilities for defining transformation rules.
*/

use crate::error::TransformResult;
use crate::sexp::Sexp;

use super::TransformationContext;

/// Entry point rules use to transform nested nodes (class bodies, block
/// contents) with the full rule set.
pub trait Dispatch {
    fn dispatch(&self, ast: Sexp, context: &TransformationContext) -> TransformResult<Sexp>;
}

/// Core trait for transformation rules
///
/// A rule claims the nodes it `matches`, takes ownership of each one and
/// returns its replacement. Nodes no rule claims are rebuilt by the tracer's
/// generic pass-through.
pub trait TransformationRule: Send + Sync {
    /// Human-readable name for this rule
    fn name(&self) -> &'static str;

    /// Detailed description of what this rule does
    fn description(&self) -> &'static str;

    /// Priority for rule ordering (higher priority runs first)
    fn priority(&self) -> u32 {
        100
    }

    /// Check if this rule applies to the given node
    fn matches(&self, ast: &Sexp, context: &TransformationContext) -> bool;

    /// Consume the node and return its replacement.
    ///
    /// Nested statements are sent back through `tracer`.
    fn transform(
        &self,
        ast: Sexp,
        context: &TransformationContext,
        tracer: &dyn Dispatch,
    ) -> TransformResult<Sexp>;
}

/// Rule execution statistics
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RuleStats {
    pub rule_name: String,
    pub applications: u64,
    pub transformations: u64,
    pub errors: u64,
    pub total_time_ms: u64,
}

impl RuleStats {
    pub fn new(rule_name: String) -> Self {
        Self {
            rule_name,
            applications: 0,
            transformations: 0,
            errors: 0,
            total_time_ms: 0,
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.applications == 0 {
            0.0
        } else {
            (self.transformations as f64) / (self.applications as f64)
        }
    }

    pub fn average_time_ms(&self) -> f64 {
        if self.applications == 0 {
            0.0
        } else {
            (self.total_time_ms as f64) / (self.applications as f64)
        }
    }
}
