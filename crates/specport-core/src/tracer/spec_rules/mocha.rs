/*!
# Mocha Stub Rule

Rewrites mocha stubs and expectations as rspec-mocks statements:

```ruby
Foo.any_instance.expects(:bar).with(1).returns(2)
# => expect_any_instance_of(Foo).to(receive(:bar).with(1).and_return(2))
```

Only active when mocha conversion is enabled.
*/

use tracing::debug;

use crate::error::TransformResult;
use crate::model::call::CallView;
use crate::sexp::Sexp;
use crate::stub::{MochaStub, RspecStub};
use crate::tracer::rules::{Dispatch, TransformationRule};
use crate::tracer::TransformationContext;

pub struct MochaStubRule {
    priority: u32,
}

impl MochaStubRule {
    pub fn new() -> Self {
        Self { priority: 150 }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }
}

impl Default for MochaStubRule {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformationRule for MochaStubRule {
    fn name(&self) -> &'static str {
        "MochaStubRule"
    }

    fn description(&self) -> &'static str {
        "Converts mocha expects/stubs chains into rspec-mocks allow/expect statements"
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn matches(&self, ast: &Sexp, context: &TransformationContext) -> bool {
        context.options.mocha
            && ast
                .as_call()
                .is_some_and(|call| CallView::from_call(call).is_mocha_stub())
    }

    fn transform(
        &self,
        ast: Sexp,
        _context: &TransformationContext,
        _tracer: &dyn Dispatch,
    ) -> TransformResult<Sexp> {
        let model = MochaStub::new(CallView::new(&ast)?).to_model()?;
        debug!(
            message = %model.message,
            any_instance = model.any_instance,
            count = ?model.count,
            "converting mocha stub"
        );
        RspecStub::new(model).to_rspec_exp()
    }
}
