/*!
# Mocha Stub Reader

Interprets a mocha call chain (`expects`/`stubs` plus qualifiers) as a
`StubModel`. The view is taken at the outermost call of the chain; every
attribute is read from that call if it plays the matching role, or else from
the nearest call behind it.
*/

use crate::error::{ConvertError, TransformResult};
use crate::model::call::{CallView, MOCHA_ANCHORS};
use crate::sexp::Sexp;

use super::{StubModel, EXPECT_DEFAULT};

/// Count qualifiers mocha offers that have no rspec-mocks mapping here
const UNSUPPORTED_COUNTS: [&str; 5] = [
    "at_least",
    "at_least_once",
    "at_most",
    "at_most_once",
    "exactly",
];

/// Represents an `expects` or a `stubs` from mocha
#[derive(Debug, Clone, Copy)]
pub struct MochaStub<'a> {
    call: CallView<'a>,
}

impl<'a> MochaStub<'a> {
    pub fn new(call: CallView<'a>) -> Self {
        Self { call }
    }

    /// The call to `expects` or `stubs` that starts the chain
    fn anchor(&self) -> Option<CallView<'a>> {
        if self.call.is_named(&MOCHA_ANCHORS) {
            Some(self.call)
        } else {
            self.call.find_call_in_receiver_chain(&MOCHA_ANCHORS)
        }
    }

    /// Given e.g. `X.any_instance.expects(:y)`, returns `X`. A chain without
    /// an explicit receiver stubs `self`.
    pub fn receiver(&self) -> TransformResult<Sexp> {
        let anchor = self.anchor().ok_or_else(|| ConvertError::ReceiverNotFound {
            method: self.call.method_name().to_string(),
        })?;

        let receiver = match anchor.receiver() {
            Some(Sexp::Call(marker)) if marker.method == "any_instance" => marker.receiver(),
            other => other,
        };
        Ok(receiver.cloned().unwrap_or(Sexp::SelfRef))
    }

    /// True if we are stubbing any instance of `receiver`
    pub fn any_instance(&self) -> bool {
        std::iter::once(self.call)
            .chain(self.call.calls_in_receiver_chain())
            .any(|call| call.method_name().contains("any_instance"))
    }

    /// Given e.g. `expects(:y)`, returns `s(:lit, :y)`
    pub fn message(&self) -> TransformResult<Sexp> {
        let anchor = self.anchor().ok_or_else(|| {
            ConvertError::UnknownStubShape(format!(
                "not a mocha stub, no stubs/expects behind '{}'",
                self.call.method_name()
            ))
        })?;
        anchor.arguments().first().cloned().ok_or_else(|| {
            ConvertError::UnknownStubShape(format!(
                "call to '{}' names no message",
                anchor.method_name()
            ))
        })
    }

    pub fn with(&self) -> Option<Vec<Sexp>> {
        self.role_arguments("with")
    }

    pub fn returns(&self) -> Option<Vec<Sexp>> {
        self.role_arguments("returns")
    }

    pub fn raises(&self) -> Option<Vec<Sexp>> {
        self.role_arguments("raises")
    }

    fn role_arguments(&self, role: &str) -> Option<Vec<Sexp>> {
        let call = if self.call.method_name() == role {
            Some(self.call)
        } else {
            self.call.find_call_in_receiver_chain(&[role])
        };
        call.map(|c| c.arguments().to_vec())
    }

    /// Expected call count, read from the outermost method name.
    ///
    /// `at_least`, `at_least_once`, `at_most`, `at_most_once` and `exactly`
    /// anywhere in the chain are rejected.
    pub fn count(&self) -> TransformResult<Option<i64>> {
        if let Some(unsupported) = std::iter::once(self.call)
            .chain(self.call.calls_in_receiver_chain())
            .find(|call| call.is_named(&UNSUPPORTED_COUNTS))
        {
            return Err(ConvertError::UnsupportedCallCount(
                unsupported.method_name().to_string(),
            ));
        }

        let count = match self.call.method_name() {
            "expects" => Some(EXPECT_DEFAULT),
            "once" => Some(1),
            "never" => Some(0),
            "twice" => Some(2),
            "returns" => match self.anchor() {
                Some(anchor) if anchor.method_name() == "expects" => Some(EXPECT_DEFAULT),
                Some(_) => None,
                None => {
                    return Err(ConvertError::UnknownStubShape(
                        "returns without stubs/expects".to_string(),
                    ))
                }
            },
            _ => None,
        };
        Ok(count)
    }

    /// Read every attribute of the stub
    pub fn to_model(&self) -> TransformResult<StubModel> {
        let message = self.message()?;
        let receiver = self.receiver()?;
        let count = self.count()?;

        Ok(StubModel {
            receiver,
            any_instance: self.any_instance(),
            message,
            with: self.with(),
            returns: self.returns(),
            raises: self.raises(),
            count,
        })
    }
}
