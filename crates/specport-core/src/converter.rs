/*!
# Converter

Public entry point: runs a minitest tree through a `SpecTracer` loaded with the
class and mocha rules.

```rust
use specport_core::{Converter, ConvertOptions};

let converter = Converter::new(ConvertOptions::new().rails(true));
let spec = converter.convert(
    "s(:class, :FooTest, s(:colon2, s(:const, :ActiveSupport), :TestCase))",
)?;
assert_eq!(
    spec,
    "s(:iter, s(:call, s(:const, :RSpec), :describe, s(:str, \"Foo\"), s(:hash, s(:lit, :type), s(:lit, :model))), 0)"
);
# Ok::<(), specport_core::ConvertError>(())
```
*/

use std::collections::HashMap;

use tracing::debug;

use crate::config::ConvertOptions;
use crate::error::{ConvertError, TransformResult};
use crate::sexp::notation::parse_sexp_with_max_depth;
use crate::sexp::Sexp;
use crate::tracer::{RuleStats, SpecTracer, TransformationSummary};

pub struct Converter {
    options: ConvertOptions,
    tracer: SpecTracer,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            options,
            tracer: SpecTracer::with_spec_rules(),
        }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert a whole tree
    pub fn process(&self, tree: Sexp) -> TransformResult<Sexp> {
        debug!(kind = tree.kind(), "processing tree");
        self.tracer.transform_tree(tree, &self.options)
    }

    /// Convert a tree written in S-expression notation, returning notation
    pub fn convert(&self, source: &str) -> TransformResult<String> {
        let tree = parse_sexp_with_max_depth(source, self.options.max_depth)?;
        Ok(self.process(tree)?.to_string())
    }

    /// Convert a tree serialized as JSON, returning JSON
    pub fn convert_json(&self, source: &str) -> TransformResult<String> {
        let tree: Sexp = serde_json::from_str(source)
            .map_err(|e| ConvertError::notation(format!("invalid JSON tree: {e}")))?;
        let converted = self.process(tree)?;
        serde_json::to_string_pretty(&converted)
            .map_err(|e| ConvertError::notation(format!("cannot serialize tree: {e}")))
    }

    /// Convert several named trees; a failing tree does not stop the others
    pub fn process_batch(
        &self,
        inputs: Vec<(String, Sexp)>,
    ) -> (Vec<(String, TransformResult<Sexp>)>, TransformationSummary) {
        self.tracer.transform_batch(inputs, &self.options)
    }

    /// Per-rule statistics accumulated by this converter
    pub fn stats(&self) -> HashMap<String, RuleStats> {
        self.tracer.stats()
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConvertOptions::default())
    }
}

/// Convert `tree` with a fresh converter
pub fn process(tree: Sexp, options: &ConvertOptions) -> TransformResult<Sexp> {
    Converter::new(options.clone()).process(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_non_class_input_passes_through() {
        let converter = Converter::default();
        let source = "s(:block, s(:call, nil, :require, s(:str, \"test_helper\")), s(:lasgn, :x, s(:lit, 1)))";
        assert_eq!(converter.convert(source).unwrap(), source);
    }

    #[test]
    fn test_invalid_notation() {
        let err = Converter::default().convert("s(:class").unwrap_err();
        assert!(matches!(err, ConvertError::Notation(_)));
    }

    #[test]
    fn test_nested_notation_converts_or_fails_cleanly() {
        let nested = |depth: usize| format!("{}s(:nil){}", "s(:array, ".repeat(depth), ")".repeat(depth));
        let converter = Converter::default();

        let source = nested(120);
        assert_eq!(converter.convert(&source).unwrap(), source);

        for depth in [300, 1_000, 200_000] {
            let err = converter.convert(&nested(depth)).unwrap_err();
            assert_eq!(err, ConvertError::NestingTooDeep { max_depth: 256 });
        }
    }

    #[test]
    fn test_json_round_trip() {
        let converter = Converter::new(ConvertOptions::new().mocha(true));
        let tree = Sexp::call(Some(Sexp::const_ref("Foo")), "stubs", vec![Sexp::symbol("bar")]);
        let json = serde_json::to_string(&tree).unwrap();

        let output: Sexp = serde_json::from_str(&converter.convert_json(&json).unwrap()).unwrap();
        assert_eq!(
            output.to_string(),
            "s(:call, s(:call, nil, :allow, s(:const, :Foo)), :to, s(:call, nil, :receive, s(:lit, :bar)))"
        );
    }

    #[test]
    fn test_stats_are_recorded() {
        let converter = Converter::new(ConvertOptions::new().mocha(true));
        converter
            .convert("s(:class, :FooTest, s(:colon2, s(:const, :ActiveSupport), :TestCase), s(:call, nil, :stubs, s(:lit, :x)))")
            .unwrap();

        let stats = converter.stats();
        assert_eq!(stats["ClassDeclarationRule"].transformations, 1);
        assert_eq!(stats["MochaStubRule"].transformations, 1);
    }

    #[test]
    fn test_free_process_function() {
        let tree: Sexp = "s(:class, :Foo, nil)".parse().unwrap();
        assert_eq!(process(tree.clone(), &ConvertOptions::default()).unwrap(), tree);
    }
}
