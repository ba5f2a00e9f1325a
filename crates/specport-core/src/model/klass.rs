/*!
# Class View

Read-only view over a `s(:class, name, parent, body...)` node. Answers the
lineage questions the class subprocessor needs to decide whether a class is a
minitest test case, and which kind.
*/

use std::fmt;

use crate::error::{ConvertError, TransformResult};
use crate::sexp::{Class, Sexp};

/// Known minitest/Rails test base classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestBase {
    ActiveSupport,
    ActionController,
    ActionMailer,
    ActionView,
    ActiveJob,
    Integration,
    TestUnit,
    Draper,
}

/// Ancestor chain of every known test base
const TEST_BASE_LINEAGES: [(TestBase, &[&str]); 8] = [
    (TestBase::ActiveSupport, &["ActiveSupport", "TestCase"]),
    (TestBase::ActionController, &["ActionController", "TestCase"]),
    (TestBase::ActionMailer, &["ActionMailer", "TestCase"]),
    (TestBase::ActionView, &["ActionView", "TestCase"]),
    (TestBase::ActiveJob, &["ActiveJob", "TestCase"]),
    (TestBase::Integration, &["ActionDispatch", "IntegrationTest"]),
    (TestBase::TestUnit, &["Test", "Unit", "TestCase"]),
    (TestBase::Draper, &["Draper", "TestCase"]),
];

impl TestBase {
    pub const ALL: [TestBase; 8] = [
        TestBase::ActiveSupport,
        TestBase::ActionController,
        TestBase::ActionMailer,
        TestBase::ActionView,
        TestBase::ActiveJob,
        TestBase::Integration,
        TestBase::TestUnit,
        TestBase::Draper,
    ];

    pub fn lineage(self) -> &'static [&'static str] {
        TEST_BASE_LINEAGES
            .iter()
            .find(|(base, _)| *base == self)
            .map(|(_, lineage)| *lineage)
            .unwrap_or(&[])
    }
}

impl fmt::Display for TestBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lineage().join("::"))
    }
}

/// Flatten a constant reference into its ancestor names.
///
/// - `Banana` (bare symbol) => `["Banana"]`
/// - `s(:const, :Banana)` => `["Banana"]`
/// - `s(:colon2, s(:const, :Fruit), :Banana)` => `["Fruit", "Banana"]`
/// - `s(:colon3, :Banana)` => `["Banana"]`
pub fn ancestor_names(exp: &Sexp) -> TransformResult<Vec<String>> {
    match exp {
        Sexp::Sym(name) | Sexp::Const(name) | Sexp::Colon3(name) => Ok(vec![name.clone()]),
        Sexp::Colon2 { scope, name } => {
            let mut names = ancestor_names(scope)?;
            names.push(name.clone());
            Ok(names)
        }
        other => Err(ConvertError::mismatch("const or colon2", other.kind())),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassView {
    name: Sexp,
    parent: Option<Sexp>,
    body: Vec<Sexp>,
    /// Flattened parent, only for `colon2` parents
    lineage: Option<Vec<String>>,
}

impl ClassView {
    /// Take ownership of a `class` node
    pub fn new(exp: Sexp) -> TransformResult<Self> {
        let Class { name, parent, body } = match exp {
            Sexp::Class(class) => class,
            other => return Err(ConvertError::mismatch("class", other.kind())),
        };

        let lineage = match parent.as_deref() {
            Some(colon2 @ Sexp::Colon2 { .. }) => Some(ancestor_names(colon2)?),
            _ => None,
        };

        Ok(Self {
            name: *name,
            parent: parent.map(|p| *p),
            body,
            lineage,
        })
    }

    /// Reject class names given in module shorthand (`class Fruit::BananaTest`).
    /// Only enforced when strict name checking is enabled.
    pub fn assert_valid_name(&self) -> TransformResult<()> {
        match &self.name {
            Sexp::Sym(_) => Ok(()),
            other => Err(ConvertError::UnsupportedNameForm {
                name: other.to_string(),
            }),
        }
    }

    /// Returns the name of the class.
    ///
    /// - `Banana` => `"Banana"`
    /// - `Fruit::Banana` => `"Fruit::Banana"`
    pub fn name(&self) -> TransformResult<String> {
        match &self.name {
            Sexp::Sym(name) => Ok(name.clone()),
            shorthand @ (Sexp::Colon2 { .. } | Sexp::Colon3(_)) => {
                Ok(ancestor_names(shorthand)?.join("::"))
            }
            other => Err(ConvertError::UnsupportedNameForm {
                name: other.to_string(),
            }),
        }
    }

    /// Returns the raw inheritance reference, e.g. `s(:const, :Foo)` or
    /// `s(:colon2, s(:const, :Bar), :Foo)`
    pub fn parent(&self) -> Option<&Sexp> {
        self.parent.as_ref()
    }

    pub fn statements(&self) -> &[Sexp] {
        &self.body
    }

    /// Flattened parent chain, when the parent is module-qualified
    pub fn ancestor_chain(&self) -> Option<&[String]> {
        self.lineage.as_deref()
    }

    /// True if the parent's ancestor chain is exactly the lineage of `base`
    pub fn inherits(&self, base: TestBase) -> bool {
        self.lineage
            .as_deref()
            .is_some_and(|chain| chain.iter().map(String::as_str).eq(base.lineage().iter().copied()))
    }

    /// The known test base this class inherits from, if any
    pub fn test_base(&self) -> Option<TestBase> {
        TestBase::ALL.into_iter().find(|base| self.inherits(*base))
    }

    /// True if the class inherits from one of the known test bases, e.g.
    /// `ActiveSupport::TestCase`
    pub fn is_test_case(&self) -> bool {
        matches!(self.parent, Some(Sexp::Colon2 { .. })) && self.test_base().is_some()
    }

    /// Give up the view, returning name, parent and body statements
    pub fn into_parts(self) -> (Sexp, Option<Sexp>, Vec<Sexp>) {
        (self.name, self.parent, self.body)
    }
}
