/*!
# SpecTracer - Test Tree Transformation System

A rule-based tracer that walks a minitest syntax tree and rewrites it, node by
node, into the equivalent RSpec tree.

## Architecture

- `TransformationRule`: Trait for defining transformation rules
- `Dispatch`: Handle rules use to send nested nodes back through the tracer
- `SpecTracer`: Core transformation engine with rule management
- Spec-specific rules: class declarations and mocha stub chains

## Example Usage

```rust
use specport_core::sexp::Sexp;
use specport_core::tracer::{SpecTracer, TransformationContext};
use specport_core::ConvertOptions;

let tracer = SpecTracer::with_spec_rules();
let context = TransformationContext::new(ConvertOptions::new().mocha(true));

let tree: Sexp = "s(:call, s(:const, :Foo), :stubs, s(:lit, :bar))".parse()?;
let converted = tracer.transform_ast(tree, &context)?;
assert_eq!(
    converted.to_string(),
    "s(:call, s(:call, nil, :allow, s(:const, :Foo)), :to, s(:call, nil, :receive, s(:lit, :bar)))"
);
# Ok::<(), specport_core::ConvertError>(())
```
*/

pub mod rules;
pub mod spec_rules;
pub mod spec_tracer;

// Re-export main types
pub use rules::{Dispatch, RuleStats, TransformationRule};
pub use spec_tracer::{SpecTracer, TransformationSummary};

use crate::config::ConvertOptions;

#[derive(Debug, Clone)]
pub struct TransformationContext {
    pub options: ConvertOptions,
    pub source_name: Option<String>,
    pub current_depth: usize,
}

impl Default for TransformationContext {
    fn default() -> Self {
        Self::new(ConvertOptions::default())
    }
}

impl TransformationContext {
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            options,
            source_name: None,
            current_depth: 0,
        }
    }

    pub fn with_source_name(mut self, name: String) -> Self {
        self.source_name = Some(name);
        self
    }

    pub fn descend(&self) -> Self {
        Self {
            options: self.options.clone(),
            source_name: self.source_name.clone(),
            current_depth: self.current_depth + 1,
        }
    }

    pub fn at_max_depth(&self) -> bool {
        self.current_depth >= self.options.max_depth
    }
}
