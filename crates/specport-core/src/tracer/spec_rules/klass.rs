/*!
# Class Declaration Rule

Turns minitest test classes into `RSpec.describe` blocks:

```ruby
class BananaTest < ActiveSupport::TestCase   # => RSpec.describe "Banana", type: :model do
  ...                                        #      ...
end                                          #    end
```

Classes that do not inherit from a known test base stay classes; their bodies
are still transformed.
*/

use tracing::debug;

use crate::config::ConvertOptions;
use crate::error::TransformResult;
use crate::model::klass::{ClassView, TestBase};
use crate::sexp::Sexp;
use crate::tracer::rules::{Dispatch, TransformationRule};
use crate::tracer::TransformationContext;

/// RSpec describe metadata (`type:`) by test base, highest priority first.
/// Integration tests get no metadata.
const METADATA_TAGS: [(TestBase, Option<&str>); 6] = [
    (TestBase::ActionController, Some("controller")),
    (TestBase::Draper, Some("decorator")),
    (TestBase::ActionMailer, Some("mailer")),
    (TestBase::ActionView, Some("view")),
    (TestBase::ActiveJob, Some("job")),
    (TestBase::Integration, None),
];

const DEFAULT_METADATA_TAG: &str = "model";

/// Described classes that must be referenced as constants, not strings
const CONSTANT_SUBJECTS: [&str; 1] = ["Graphql::PublishedFormCacheable"];

/// Resolve the `type:` metadata of a describe block given which test bases
/// the class inherits from
pub fn resolve_metadata_tag(inherits: impl Fn(TestBase) -> bool) -> Option<&'static str> {
    METADATA_TAGS
        .iter()
        .find(|(base, _)| inherits(*base))
        .map_or(Some(DEFAULT_METADATA_TAG), |(_, tag)| *tag)
}

/// Given a test class name like `BananaTest`, returns the described class,
/// like `Banana`
fn described_class(test_class_name: &str) -> &str {
    test_class_name
        .strip_suffix("Test")
        .unwrap_or(test_class_name)
}

pub struct ClassDeclarationRule {
    priority: u32,
}

impl ClassDeclarationRule {
    pub fn new() -> Self {
        Self { priority: 200 }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }
}

impl Default for ClassDeclarationRule {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformationRule for ClassDeclarationRule {
    fn name(&self) -> &'static str {
        "ClassDeclarationRule"
    }

    fn description(&self) -> &'static str {
        "Converts classes inheriting from minitest test bases into RSpec describe blocks"
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn matches(&self, ast: &Sexp, _context: &TransformationContext) -> bool {
        matches!(ast, Sexp::Class(_))
    }

    fn transform(
        &self,
        ast: Sexp,
        context: &TransformationContext,
        tracer: &dyn Dispatch,
    ) -> TransformResult<Sexp> {
        let class = ClassView::new(ast)?;
        if context.options.strict_names {
            class.assert_valid_name()?;
        }

        let name = class.name()?;
        let describe = if class.is_test_case() {
            Some(rspec_describe(&class, &name, &context.options))
        } else {
            None
        };

        let (_, parent, mut statements) = class.into_parts();

        if let Some(helper) = describe.as_ref().and_then(helper_module) {
            statements.insert(0, Sexp::call(None, "include", vec![Sexp::const_ref(&helper)]));
        }

        let child_context = context.descend();
        let mut processed = statements
            .into_iter()
            .map(|stmt| tracer.dispatch(stmt, &child_context))
            .collect::<TransformResult<Vec<_>>>()?;

        let body = match processed.len() {
            0 => None,
            1 => processed.pop(),
            _ => Some(Sexp::Block(processed)),
        };

        Ok(match describe {
            Some(call) => Sexp::iter(call, body),
            None => Sexp::class(Sexp::Sym(name), parent, body.into_iter().collect()),
        })
    }
}

/// Returns a S-expression representing a call to RSpec.describe
fn rspec_describe(class: &ClassView, name: &str, options: &ConvertOptions) -> Sexp {
    let tag = resolve_metadata_tag(|base| class.inherits(base));
    let described = described_class(name);
    debug!(class = name, tag = ?tag, "converting test case to describe block");

    let subject = if tag == Some("controller") || CONSTANT_SUBJECTS.contains(&described) {
        Sexp::const_ref(described)
    } else {
        Sexp::string(described)
    };

    let mut args = vec![subject];
    if options.rails {
        if let Some(tag) = tag {
            args.push(Sexp::Hash(vec![Sexp::symbol("type"), Sexp::symbol(tag)]));
        }
    }
    Sexp::call(Some(Sexp::const_ref("RSpec")), "describe", args)
}

/// Helper specs describe the helper module itself, which must be included to
/// be callable: `RSpec.describe "FooHelper"` gets `include FooHelper`
fn helper_module(describe: &Sexp) -> Option<String> {
    let call = describe.as_call()?;
    let subject = match call.args.first()? {
        Sexp::Str(name) | Sexp::Const(name) => name,
        _ => return None,
    };
    subject.ends_with("Helper").then(|| subject.clone())
}
