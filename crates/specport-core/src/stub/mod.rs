/*!
# Stubs

Framework-agnostic description of a stub or message expectation, read from a
mocha chain by `MochaStub` and written as an rspec-mocks chain by `RspecStub`.
*/

pub mod mocha;
pub mod rspec;

pub use mocha::MochaStub;
pub use rspec::RspecStub;

use crate::sexp::Sexp;

/// Count meaning "expected, with the default single-call semantics"
pub const EXPECT_DEFAULT: i64 = -1;

#[derive(Debug, Clone, PartialEq)]
pub struct StubModel {
    /// The stubbed object; `s(:self)` when the chain has no receiver
    pub receiver: Sexp,
    pub any_instance: bool,
    /// `s(:lit, :name)`, or a hash literal for multi-message stubs
    pub message: Sexp,
    pub with: Option<Vec<Sexp>>,
    pub returns: Option<Vec<Sexp>>,
    pub raises: Option<Vec<Sexp>>,
    /// `None` allows any number of calls; `-1` expects with default
    /// semantics; `0`, `1`, `2` mean never, once, twice
    pub count: Option<i64>,
}

impl StubModel {
    /// An `allow` stub of `message` on `receiver` with no qualifiers
    pub fn new(receiver: Sexp, message: Sexp) -> Self {
        Self {
            receiver,
            any_instance: false,
            message,
            with: None,
            returns: None,
            raises: None,
            count: None,
        }
    }
}
