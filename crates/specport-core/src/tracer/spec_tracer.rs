/*!
# SpecTracer - Transformation Engine

Dispatches every node of a tree to the highest-priority rule that claims it,
or rebuilds it with its children transformed when no rule does.
*/

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::config::ConvertOptions;
use crate::error::{ConvertError, TransformResult};
use crate::sexp::{Call, Class, Iter, Node, Sexp};

use super::rules::{Dispatch, RuleStats, TransformationRule};
use super::spec_rules::{ClassDeclarationRule, MochaStubRule};
use super::TransformationContext;

/// Rule-based tree transformation engine
///
/// Not meant to be shared across threads; statistics are kept behind a
/// `RefCell`.
pub struct SpecTracer {
    rules: Vec<Box<dyn TransformationRule>>,
    stats: RefCell<HashMap<String, RuleStats>>,
}

impl SpecTracer {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            stats: RefCell::new(HashMap::new()),
        }
    }

    /// A tracer with the class declaration and mocha stub rules installed
    pub fn with_spec_rules() -> Self {
        let mut tracer = Self::new();
        tracer.add_rule(Box::new(ClassDeclarationRule::new()));
        tracer.add_rule(Box::new(MochaStubRule::new()));
        tracer
    }

    /// Add a transformation rule, keeping rules ordered by priority
    pub fn add_rule(&mut self, rule: Box<dyn TransformationRule>) {
        let rule_name = rule.name().to_string();
        self.stats
            .get_mut()
            .insert(rule_name.clone(), RuleStats::new(rule_name));
        self.rules.push(rule);
        self.sort_rules_by_priority();
    }

    /// Sort rules by priority (higher priority first)
    fn sort_rules_by_priority(&mut self) {
        self.rules.sort_by_key(|rule| std::cmp::Reverse(rule.priority()));
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Transform a single node and everything below it
    pub fn transform_ast(&self, ast: Sexp, context: &TransformationContext) -> TransformResult<Sexp> {
        if context.at_max_depth() {
            return Err(ConvertError::NestingTooDeep {
                max_depth: context.options.max_depth,
            });
        }

        match self.rules.iter().find(|rule| rule.matches(&ast, context)) {
            Some(rule) => self.apply_rule(rule.as_ref(), ast, context),
            None => self.transform_children(ast, context),
        }
    }

    fn apply_rule(
        &self,
        rule: &dyn TransformationRule,
        ast: Sexp,
        context: &TransformationContext,
    ) -> TransformResult<Sexp> {
        let start_time = Instant::now();
        trace!(rule = rule.name(), kind = ast.kind(), depth = context.current_depth, "applying rule");

        let result = rule.transform(ast, context, self);

        let mut stats = self.stats.borrow_mut();
        let stats = stats
            .entry(rule.name().to_string())
            .or_insert_with(|| RuleStats::new(rule.name().to_string()));
        stats.applications += 1;
        match &result {
            Ok(_) => stats.transformations += 1,
            Err(e) => {
                stats.errors += 1;
                debug!(rule = rule.name(), error = %e, "rule failed");
            }
        }
        stats.total_time_ms += start_time.elapsed().as_millis() as u64;

        result
    }

    /// Generic pass-through: rebuild the node with every child transformed
    fn transform_children(&self, ast: Sexp, context: &TransformationContext) -> TransformResult<Sexp> {
        let child_context = context.descend();
        let transform = |child: Sexp| self.transform_ast(child, &child_context);
        let transform_boxed = |child: Box<Sexp>| transform(*child).map(Box::new);
        let transform_all = |children: Vec<Sexp>| -> TransformResult<Vec<Sexp>> {
            let mut transformed = Vec::with_capacity(children.len());
            for child in children {
                transformed.push(transform(child)?);
            }
            Ok(transformed)
        };

        match ast {
            Sexp::Empty
            | Sexp::Sym(_)
            | Sexp::Int(_)
            | Sexp::Text(_)
            | Sexp::Nil
            | Sexp::SelfRef
            | Sexp::Lit(_)
            | Sexp::Str(_)
            | Sexp::Const(_)
            | Sexp::Colon3(_) => Ok(ast),

            Sexp::Colon2 { scope, name } => Ok(Sexp::Colon2 {
                scope: transform_boxed(scope)?,
                name,
            }),

            Sexp::Call(Call { receiver, method, args }) => Ok(Sexp::Call(Call {
                receiver: receiver.map(transform_boxed).transpose()?,
                method,
                args: transform_all(args)?,
            })),

            Sexp::Iter(Iter { call, params, body }) => Ok(Sexp::Iter(Iter {
                call: transform_boxed(call)?,
                params: transform_boxed(params)?,
                body: body.map(transform_boxed).transpose()?,
            })),

            Sexp::Class(Class { name, parent, body }) => Ok(Sexp::Class(Class {
                name,
                parent,
                body: transform_all(body)?,
            })),

            Sexp::Block(stmts) => Ok(Sexp::Block(transform_all(stmts)?)),
            Sexp::Hash(entries) => Ok(Sexp::Hash(transform_all(entries)?)),
            Sexp::Array(elements) => Ok(Sexp::Array(transform_all(elements)?)),

            Sexp::Node(Node { kind, children }) => Ok(Sexp::Node(Node {
                kind,
                children: transform_all(children)?,
            })),
        }
    }

    /// Transform a whole tree with `options`
    pub fn transform_tree(&self, tree: Sexp, options: &ConvertOptions) -> TransformResult<Sexp> {
        self.transform_ast(tree, &TransformationContext::new(options.clone()))
    }

    /// Transform several named trees. A failure only affects its own input
    /// and is recorded in the summary.
    pub fn transform_batch(
        &self,
        inputs: Vec<(String, Sexp)>,
        options: &ConvertOptions,
    ) -> (Vec<(String, TransformResult<Sexp>)>, TransformationSummary) {
        let mut summary = TransformationSummary::new();
        let mut outputs = Vec::with_capacity(inputs.len());

        for (name, tree) in inputs {
            let context = TransformationContext::new(options.clone()).with_source_name(name.clone());
            let result = self.transform_ast(tree, &context);
            match &result {
                Ok(_) => summary.converted += 1,
                Err(e) => {
                    warn!(source = %name, error = %e, "conversion failed");
                    summary.errors.push(format!("Error converting {name}: {e}"));
                }
            }
            outputs.push((name, result));
        }

        (outputs, summary)
    }

    /// Get transformation statistics
    pub fn stats(&self) -> HashMap<String, RuleStats> {
        self.stats.borrow().clone()
    }

    /// Clear statistics
    pub fn clear_stats(&self) {
        for stats in self.stats.borrow_mut().values_mut() {
            *stats = RuleStats::new(stats.rule_name.clone());
        }
    }
}

impl Default for SpecTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatch for SpecTracer {
    fn dispatch(&self, ast: Sexp, context: &TransformationContext) -> TransformResult<Sexp> {
        self.transform_ast(ast, context)
    }
}

/// Summary of batch transformation results
#[derive(Debug, Default)]
pub struct TransformationSummary {
    pub converted: u64,
    pub errors: Vec<String>,
}

impl TransformationSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, other: TransformationSummary) {
        self.converted += other.converted;
        self.errors.extend(other.errors);
    }

    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }
}
