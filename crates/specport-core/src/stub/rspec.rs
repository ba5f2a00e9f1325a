/*!
# RSpec Stub Writer

Builds an rspec-mocks `allow`/`expect` statement from a `StubModel`:

```ruby
expect_any_instance_of(Foo).to(receive(:bar).with(1).once.and_return(2))
allow(foo).to(receive(:bar).and_raise(Err))
```
*/

use crate::error::{ConvertError, TransformResult};
use crate::sexp::Sexp;

use super::{StubModel, EXPECT_DEFAULT};

/// Represents a `receive` matcher from RSpec
#[derive(Debug, Clone, PartialEq)]
pub struct RspecStub {
    model: StubModel,
}

impl RspecStub {
    pub fn new(model: StubModel) -> Self {
        Self { model }
    }

    /// `allow`, `expect`, `allow_any_instance_of` or `expect_any_instance_of`
    pub fn mocks_method(&self) -> &'static str {
        match (self.model.count.is_some(), self.model.any_instance) {
            (false, false) => "allow",
            (true, false) => "expect",
            (false, true) => "allow_any_instance_of",
            (true, true) => "expect_any_instance_of",
        }
    }

    /// Count qualifier to append to the chain, if any
    fn receive_count_method(&self) -> TransformResult<Option<&'static str>> {
        match self.model.count {
            None | Some(EXPECT_DEFAULT) => Ok(None),
            Some(0) => Ok(Some("never")),
            Some(1) => Ok(Some("once")),
            Some(2) => Ok(Some("twice")),
            Some(other) => Err(ConvertError::UnsupportedCallCount(other.to_string())),
        }
    }

    /// Returns a Sexp representing an RSpec stub (allow) or message
    /// expectation (expect)
    pub fn to_rspec_exp(self) -> TransformResult<Sexp> {
        let count_method = self.receive_count_method()?;
        let mocks_method = self.mocks_method();
        // expect_any_instance_of takes the count before and_return/and_raise
        let count_first = mocks_method == "expect_any_instance_of";

        let StubModel {
            receiver,
            message,
            with,
            returns,
            raises,
            ..
        } = self.model;

        let matcher = if matches!(message, Sexp::Hash(_)) {
            "receive_messages"
        } else {
            "receive"
        };
        let mut stub_chain = Sexp::call(None, matcher, vec![message]);

        if let Some(args) = with {
            stub_chain = Sexp::call(Some(stub_chain), "with", args);
        }

        if count_first {
            if let Some(count) = count_method {
                stub_chain = Sexp::call(Some(stub_chain), count, vec![]);
            }
        }

        if let Some(args) = returns {
            stub_chain = Sexp::call(Some(stub_chain), "and_return", args);
        }
        if let Some(args) = raises {
            stub_chain = Sexp::call(Some(stub_chain), "and_raise", args);
        }

        if !count_first {
            if let Some(count) = count_method {
                stub_chain = Sexp::call(Some(stub_chain), count, vec![]);
            }
        }

        let expect_allow = Sexp::call(None, mocks_method, vec![receiver]);
        Ok(Sexp::call(Some(expect_allow), "to", vec![stub_chain]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stub(count: Option<i64>, any_instance: bool) -> StubModel {
        StubModel {
            any_instance,
            count,
            ..StubModel::new(Sexp::const_ref("Foo"), Sexp::symbol("bar"))
        }
    }

    #[test]
    fn test_mocks_method_table() {
        let cases = [
            (None, false, "allow"),
            (Some(1), false, "expect"),
            (Some(EXPECT_DEFAULT), true, "expect_any_instance_of"),
            (None, true, "allow_any_instance_of"),
        ];
        for (count, any_instance, expected) in cases {
            assert_eq!(RspecStub::new(stub(count, any_instance)).mocks_method(), expected);
        }
    }

    #[test]
    fn test_plain_allow() {
        let exp = RspecStub::new(stub(None, false)).to_rspec_exp().unwrap();
        assert_eq!(
            exp.to_string(),
            "s(:call, s(:call, nil, :allow, s(:const, :Foo)), :to, s(:call, nil, :receive, s(:lit, :bar)))"
        );
    }

    #[test]
    fn test_count_goes_last_for_expect() {
        let model = StubModel {
            with: Some(vec![Sexp::integer(1)]),
            returns: Some(vec![Sexp::integer(2)]),
            ..stub(Some(1), false)
        };
        let exp = RspecStub::new(model).to_rspec_exp().unwrap();
        let expected: Sexp = "s(:call, s(:call, nil, :expect, s(:const, :Foo)), :to, \
             s(:call, s(:call, s(:call, s(:call, nil, :receive, s(:lit, :bar)), :with, s(:lit, 1)), :and_return, s(:lit, 2)), :once))"
            .parse()
            .unwrap();
        assert_eq!(exp, expected);
    }

    #[test]
    fn test_count_goes_before_return_for_expect_any_instance_of() {
        let model = StubModel {
            returns: Some(vec![Sexp::integer(2)]),
            raises: Some(vec![Sexp::const_ref("Boom")]),
            ..stub(Some(2), true)
        };
        let exp = RspecStub::new(model).to_rspec_exp().unwrap();
        let expected: Sexp = "s(:call, s(:call, nil, :expect_any_instance_of, s(:const, :Foo)), :to, \
             s(:call, s(:call, s(:call, s(:call, nil, :receive, s(:lit, :bar)), :twice), :and_return, s(:lit, 2)), :and_raise, s(:const, :Boom)))"
            .parse()
            .unwrap();
        assert_eq!(exp, expected);
    }

    #[test]
    fn test_default_expect_has_no_qualifier() {
        let exp = RspecStub::new(stub(Some(EXPECT_DEFAULT), false)).to_rspec_exp().unwrap();
        assert_eq!(
            exp.to_string(),
            "s(:call, s(:call, nil, :expect, s(:const, :Foo)), :to, s(:call, nil, :receive, s(:lit, :bar)))"
        );
    }

    #[test]
    fn test_never_on_hash_message() {
        let model = StubModel {
            message: Sexp::Hash(vec![Sexp::symbol("a"), Sexp::integer(1)]),
            ..stub(Some(0), false)
        };
        let exp = RspecStub::new(model).to_rspec_exp().unwrap();
        assert_eq!(
            exp.to_string(),
            "s(:call, s(:call, nil, :expect, s(:const, :Foo)), :to, s(:call, s(:call, nil, :receive_messages, s(:hash, s(:lit, :a), s(:lit, 1))), :never))"
        );
    }

    #[test]
    fn test_unsupported_count_is_rejected() {
        for count in [3, -2] {
            let err = RspecStub::new(stub(Some(count), false)).to_rspec_exp().unwrap_err();
            assert_eq!(err, ConvertError::UnsupportedCallCount(count.to_string()));
        }
    }
}
