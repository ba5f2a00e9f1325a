/*!
# Call View

Borrowed view over a `s(:call, receiver, :method, args...)` node and the chain
of receivers behind it. Mocha stubs are written as chains such as
`Foo.any_instance.expects(:bar).with(1).returns(2)`, where the outermost call
(`returns`) reaches the others through its receiver links.
*/

use crate::error::{ConvertError, TransformResult};
use crate::sexp::{Call, Sexp};

/// Mocha methods that start a stub chain
pub const MOCHA_ANCHORS: [&str; 2] = ["expects", "stubs"];

/// Every method that may terminate a mocha stub chain
const MOCHA_CHAIN_METHODS: [&str; 13] = [
    "expects",
    "stubs",
    "with",
    "returns",
    "raises",
    "once",
    "twice",
    "never",
    "at_least",
    "at_least_once",
    "at_most",
    "at_most_once",
    "exactly",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallView<'a> {
    call: &'a Call,
}

impl<'a> CallView<'a> {
    pub fn new(exp: &'a Sexp) -> TransformResult<Self> {
        match exp {
            Sexp::Call(call) => Ok(Self { call }),
            other => Err(ConvertError::mismatch("call", other.kind())),
        }
    }

    pub fn from_call(call: &'a Call) -> Self {
        Self { call }
    }

    pub fn method_name(&self) -> &'a str {
        &self.call.method
    }

    pub fn arguments(&self) -> &'a [Sexp] {
        &self.call.args
    }

    /// `None` for an implicit `self` receiver
    pub fn receiver(&self) -> Option<&'a Sexp> {
        self.call.receiver()
    }

    /// Receivers reached by following receiver links outward, nearest first.
    /// Given `a.b.c`, viewed at `c`, returns `[a.b, a]`.
    pub fn receiver_chain(&self) -> Vec<&'a Sexp> {
        let mut chain = Vec::new();
        let mut next = self.receiver();
        while let Some(receiver) = next {
            chain.push(receiver);
            next = receiver.as_call().and_then(Call::receiver);
        }
        chain
    }

    /// The calls among `receiver_chain`, nearest first
    pub fn calls_in_receiver_chain(&self) -> Vec<CallView<'a>> {
        self.receiver_chain()
            .into_iter()
            .filter_map(Sexp::as_call)
            .map(CallView::from_call)
            .collect()
    }

    /// Nearest call in the receiver chain named one of `method_names`
    pub fn find_call_in_receiver_chain(&self, method_names: &[&str]) -> Option<CallView<'a>> {
        self.calls_in_receiver_chain()
            .into_iter()
            .find(|call| method_names.contains(&call.method_name()))
    }

    pub fn is_named(&self, method_names: &[&str]) -> bool {
        method_names.contains(&self.method_name())
    }

    /// True if this call ends a mocha stub chain, e.g. the `returns` of
    /// `x.stubs(:y).returns(1)` or a lone `expects(:z)`
    pub fn is_mocha_stub(&self) -> bool {
        self.is_named(&MOCHA_CHAIN_METHODS)
            && (self.is_named(&MOCHA_ANCHORS)
                || self.find_call_in_receiver_chain(&MOCHA_ANCHORS).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Sexp {
        "s(:call, s(:call, s(:call, s(:call, s(:const, :Foo), :any_instance), :expects, s(:lit, :bar)), :with, s(:lit, 1)), :returns, s(:lit, 2))"
            .parse()
            .unwrap()
    }

    #[test]
    fn test_new_requires_call() {
        assert!(CallView::new(&Sexp::Nil).is_err());
    }

    #[test]
    fn test_receiver_chain_walks_outward() {
        let exp = chain();
        let call = CallView::new(&exp).unwrap();

        let chain = call.receiver_chain();
        assert_eq!(chain.len(), 4);
        assert_eq!(chain[3], &Sexp::const_ref("Foo"));

        let names: Vec<_> = call
            .calls_in_receiver_chain()
            .iter()
            .map(|c| c.method_name())
            .collect();
        assert_eq!(names, vec!["with", "expects", "any_instance"]);
    }

    #[test]
    fn test_receiver_chain_excludes_self() {
        let exp = Sexp::call(None, "expects", vec![Sexp::symbol("x")]);
        let call = CallView::new(&exp).unwrap();
        assert!(call.receiver_chain().is_empty());
        assert!(call.find_call_in_receiver_chain(&["expects"]).is_none());
    }

    #[test]
    fn test_find_call_in_receiver_chain() {
        let exp = chain();
        let call = CallView::new(&exp).unwrap();

        let anchor = call.find_call_in_receiver_chain(&MOCHA_ANCHORS).unwrap();
        assert_eq!(anchor.method_name(), "expects");
        assert_eq!(anchor.arguments(), &[Sexp::symbol("bar")]);
        assert!(call.find_call_in_receiver_chain(&["raises"]).is_none());
    }

    #[test]
    fn test_is_mocha_stub() {
        let exp = chain();
        assert!(CallView::new(&exp).unwrap().is_mocha_stub());

        let lone = Sexp::call(None, "stubs", vec![Sexp::symbol("x")]);
        assert!(CallView::new(&lone).unwrap().is_mocha_stub());

        // `with` alone is not a stub
        let with = Sexp::call(Some(Sexp::const_ref("Foo")), "with", vec![]);
        assert!(!CallView::new(&with).unwrap().is_mocha_stub());

        // rspec output is not a stub
        let rspec: Sexp = "s(:call, s(:call, nil, :allow, s(:const, :Foo)), :to, s(:call, nil, :receive, s(:lit, :bar)))"
            .parse()
            .unwrap();
        assert!(!CallView::new(&rspec).unwrap().is_mocha_stub());
    }
}
