//! S-expression notation reader and writer using nom
//!
//! The notation is the one printed by Ruby's `Sexp#inspect`, so trees dumped
//! from ruby_parser can be fed to the converter unchanged.
//!
//! # EBNF Grammar
//!
//! ```ebnf
//! sexp    = node | atom;
//! node    = "s(", ":", tag, {",", sexp}, ")";
//! atom    = "nil" | symbol | number | string;
//! symbol  = ":", (bare_symbol | string);
//! number  = ["-"], digit, {digit}, [".", digit, {digit}], [exponent];
//! string  = '"', {char | escape}, '"';
//! escape  = "\\", ("\\" | '"' | "n" | "t" | "r");
//! ```
//!
//! nom reads the input token by token; nodes are assembled bottom-up on an
//! explicit stack, so nesting costs heap, not call stack. Nodes nested deeper
//! than the maximum depth are rejected with `NestingTooDeep`.
//!
//! Floats are only accepted as the payload of a `lit` node. Known tags are
//! checked for shape while building the typed tree.

use std::fmt;
use std::str::FromStr;

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag, take_while1},
    character::complete::{char, digit1, multispace0},
    combinator::{map, opt, recognize, value},
    sequence::{delimited, pair, preceded, tuple},
};

use super::{Call, Class, Iter, Lit, Node, Sexp};
use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::{ConvertError, TransformResult};

/// A finished child, before its parent's shape is checked
#[derive(Debug, Clone)]
enum Item {
    Sexp(Sexp),
    Float(f64),
}

#[derive(Debug, Clone)]
enum Token {
    /// `s(:tag`
    Open(String),
    Comma,
    Close,
    Atom(Item),
}

fn is_symbol_char(c: char) -> bool {
    c.is_alphanumeric() || "_?!=@$<>+-*/%[]~^&|".contains(c)
}

/// Parse a double-quoted string with backslash escapes
fn parse_string(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        map(
            opt(escaped_transform(
                is_not("\\\""),
                '\\',
                alt((
                    value("\\", char('\\')),
                    value("\"", char('"')),
                    value("\n", char('n')),
                    value("\t", char('t')),
                    value("\r", char('r')),
                )),
            )),
            Option::unwrap_or_default,
        ),
        char('"'),
    )(input)
}

/// Parse `:name` or `:"quoted name"`
fn parse_symbol(input: &str) -> IResult<&str, String> {
    preceded(
        char(':'),
        alt((
            parse_string,
            map(take_while1(is_symbol_char), str::to_string),
        )),
    )(input)
}

/// Parse an integer, or a float when a fraction or exponent is present
fn parse_number(input: &str) -> IResult<&str, Item> {
    let (rest, text) = recognize(tuple((
        opt(char('-')),
        digit1,
        opt(pair(char('.'), digit1)),
        opt(tuple((
            alt((char('e'), char('E'))),
            opt(alt((char('+'), char('-')))),
            digit1,
        ))),
    )))(input)?;

    let number = if text.contains(['.', 'e', 'E']) {
        text.parse::<f64>().map(Item::Float).ok()
    } else {
        text.parse::<i64>().map(|n| Item::Sexp(Sexp::Int(n))).ok()
    };

    match number {
        Some(item) => Ok((rest, item)),
        None => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Digit,
        ))),
    }
}

fn parse_atom(input: &str) -> IResult<&str, Item> {
    alt((
        value(Item::Sexp(Sexp::Empty), tag("nil")),
        map(parse_symbol, |name| Item::Sexp(Sexp::Sym(name))),
        map(parse_string, |text| Item::Sexp(Sexp::Text(text))),
        parse_number,
    ))(input)
}

/// Parse `s(:tag`
fn parse_open(input: &str) -> IResult<&str, String> {
    preceded(pair(tag("s("), multispace0), parse_symbol)(input)
}

fn parse_token(input: &str) -> IResult<&str, Token> {
    preceded(
        multispace0,
        alt((
            map(parse_open, Token::Open),
            value(Token::Comma, char(',')),
            value(Token::Close, char(')')),
            map(parse_atom, Token::Atom),
        )),
    )(input)
}

/// Parse one tree from its notation, nested at most `DEFAULT_MAX_DEPTH` deep
pub fn parse_sexp(source: &str) -> TransformResult<Sexp> {
    parse_sexp_with_max_depth(source, DEFAULT_MAX_DEPTH)
}

/// Parse one tree from its notation. The root node sits at depth 0; a node
/// at depth `max_depth` or below is rejected.
pub fn parse_sexp_with_max_depth(source: &str, max_depth: usize) -> TransformResult<Sexp> {
    let mut open: Vec<(String, Vec<Item>)> = Vec::new();
    let mut expecting_child = true;
    let mut input = source;

    loop {
        let (rest, token) = parse_token(input)
            .map_err(|e| ConvertError::notation(format!("cannot read s-expression: {e}")))?;
        input = rest;

        let item = match (token, expecting_child) {
            (Token::Open(kind), true) => {
                if open.len() >= max_depth {
                    return Err(ConvertError::NestingTooDeep { max_depth });
                }
                open.push((kind, Vec::new()));
                expecting_child = false;
                continue;
            }
            (Token::Atom(item), true) => item,
            (Token::Comma, false) if !open.is_empty() => {
                expecting_child = true;
                continue;
            }
            (Token::Close, false) => match open.pop() {
                Some((kind, children)) => Item::Sexp(build_node(kind, children)?),
                None => return Err(ConvertError::notation("unbalanced ')'")),
            },
            (token, _) => {
                return Err(ConvertError::notation(format!("unexpected token {token:?}")))
            }
        };

        expecting_child = false;
        match open.last_mut() {
            Some((_, children)) => children.push(item),
            None => {
                let rest = input.trim_start();
                if !rest.is_empty() {
                    return Err(ConvertError::notation(format!(
                        "unexpected trailing input: {}",
                        rest.chars().take(20).collect::<String>()
                    )));
                }
                return build(item);
            }
        }
    }
}

impl FromStr for Sexp {
    type Err = ConvertError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        parse_sexp(source)
    }
}

fn build(item: Item) -> TransformResult<Sexp> {
    match item {
        Item::Sexp(sexp) => Ok(sexp),
        Item::Float(f) => Err(ConvertError::notation(format!(
            "float {f} outside of a lit node"
        ))),
    }
}

fn build_all(children: Vec<Item>) -> TransformResult<Vec<Sexp>> {
    children.into_iter().map(build).collect()
}

fn expect_symbol(item: Item, tag: &str) -> TransformResult<String> {
    match item {
        Item::Sexp(Sexp::Sym(name)) => Ok(name),
        other => Err(ConvertError::notation(format!(
            "{tag} expects a symbol, got {other:?}"
        ))),
    }
}

/// `nil` becomes `None`, anything else a boxed child
fn build_optional(item: Item) -> TransformResult<Option<Box<Sexp>>> {
    match build(item)? {
        Sexp::Empty => Ok(None),
        sexp => Ok(Some(Box::new(sexp))),
    }
}

fn arity_error(kind: &str, expected: &str, got: usize) -> ConvertError {
    ConvertError::notation(format!(
        "{kind} expects {expected} children, got {got}"
    ))
}

fn build_node(kind: String, children: Vec<Item>) -> TransformResult<Sexp> {
    let count = children.len();
    let mut children = children.into_iter();

    let sexp = match kind.as_str() {
        "nil" | "self" => {
            if count != 0 {
                return Err(arity_error(&kind, "no", count));
            }
            if kind == "nil" { Sexp::Nil } else { Sexp::SelfRef }
        }
        "lit" | "str" | "const" | "colon3" => {
            let (Some(child), None) = (children.next(), children.next()) else {
                return Err(arity_error(&kind, "1", count));
            };
            match (kind.as_str(), child) {
                ("lit", Item::Sexp(Sexp::Sym(name))) => Sexp::Lit(Lit::Symbol(name)),
                ("lit", Item::Sexp(Sexp::Int(n))) => Sexp::Lit(Lit::Integer(n)),
                ("lit", Item::Float(f)) => Sexp::Lit(Lit::Float(f)),
                ("str", Item::Sexp(Sexp::Text(text))) => Sexp::Str(text),
                ("const", child) => Sexp::Const(expect_symbol(child, "const")?),
                ("colon3", child) => Sexp::Colon3(expect_symbol(child, "colon3")?),
                (_, other) => {
                    return Err(ConvertError::notation(format!(
                        "unexpected payload for {kind}: {other:?}"
                    )))
                }
            }
        }
        "colon2" => {
            let (Some(scope), Some(name), None) = (children.next(), children.next(), children.next()) else {
                return Err(arity_error(&kind, "2", count));
            };
            Sexp::Colon2 {
                scope: Box::new(build(scope)?),
                name: expect_symbol(name, "colon2")?,
            }
        }
        "call" => {
            let (Some(receiver), Some(method)) = (children.next(), children.next()) else {
                return Err(arity_error(&kind, "at least 2", count));
            };
            Sexp::Call(Call {
                receiver: build_optional(receiver)?,
                method: expect_symbol(method, "call")?,
                args: build_all(children.collect())?,
            })
        }
        "iter" => {
            if !(2..=3).contains(&count) {
                return Err(arity_error(&kind, "2 or 3", count));
            }
            let (Some(call), Some(params)) = (children.next(), children.next()) else {
                return Err(arity_error(&kind, "2 or 3", count));
            };
            Sexp::Iter(Iter {
                call: Box::new(build(call)?),
                params: Box::new(build(params)?),
                body: children.next().map(build).transpose()?.map(Box::new),
            })
        }
        "class" => {
            let (Some(name), Some(parent)) = (children.next(), children.next()) else {
                return Err(arity_error(&kind, "at least 2", count));
            };
            Sexp::Class(Class {
                name: Box::new(build(name)?),
                parent: build_optional(parent)?,
                body: build_all(children.collect())?,
            })
        }
        "block" => Sexp::Block(build_all(children.collect())?),
        "hash" => Sexp::Hash(build_all(children.collect())?),
        "array" => Sexp::Array(build_all(children.collect())?),
        _ => Sexp::Node(Node {
            kind,
            children: build_all(children.collect())?,
        }),
    };

    Ok(sexp)
}

fn is_bare_symbol(name: &str) -> bool {
    !name.is_empty()
        && !name.contains("::")
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(is_symbol_char)
}

fn write_string(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in text.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '"' => f.write_str("\\\"")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

fn write_symbol(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    f.write_str(":")?;
    if is_bare_symbol(name) {
        f.write_str(name)
    } else {
        write_string(f, name)
    }
}

fn write_optional(f: &mut fmt::Formatter<'_>, child: Option<&Sexp>) -> fmt::Result {
    match child {
        Some(sexp) => write!(f, "{sexp}"),
        None => f.write_str("nil"),
    }
}

fn write_children(f: &mut fmt::Formatter<'_>, children: &[Sexp]) -> fmt::Result {
    for child in children {
        write!(f, ", {child}")?;
    }
    Ok(())
}

fn write_tagged(f: &mut fmt::Formatter<'_>, kind: &str, children: &[Sexp]) -> fmt::Result {
    f.write_str("s(")?;
    write_symbol(f, kind)?;
    write_children(f, children)?;
    f.write_str(")")
}

impl fmt::Display for Sexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sexp::Empty => f.write_str("nil"),
            Sexp::Sym(name) => write_symbol(f, name),
            Sexp::Int(n) => write!(f, "{n}"),
            Sexp::Text(text) => write_string(f, text),
            Sexp::Nil => f.write_str("s(:nil)"),
            Sexp::SelfRef => f.write_str("s(:self)"),
            Sexp::Lit(lit) => {
                f.write_str("s(:lit, ")?;
                match lit {
                    Lit::Symbol(name) => write_symbol(f, name)?,
                    Lit::Integer(n) => write!(f, "{n}")?,
                    Lit::Float(x) => write!(f, "{x:?}")?,
                }
                f.write_str(")")
            }
            Sexp::Str(text) => {
                f.write_str("s(:str, ")?;
                write_string(f, text)?;
                f.write_str(")")
            }
            Sexp::Const(name) => {
                f.write_str("s(:const, ")?;
                write_symbol(f, name)?;
                f.write_str(")")
            }
            Sexp::Colon2 { scope, name } => {
                write!(f, "s(:colon2, {scope}, ")?;
                write_symbol(f, name)?;
                f.write_str(")")
            }
            Sexp::Colon3(name) => {
                f.write_str("s(:colon3, ")?;
                write_symbol(f, name)?;
                f.write_str(")")
            }
            Sexp::Call(call) => {
                f.write_str("s(:call, ")?;
                write_optional(f, call.receiver())?;
                f.write_str(", ")?;
                write_symbol(f, &call.method)?;
                write_children(f, &call.args)?;
                f.write_str(")")
            }
            Sexp::Iter(iter) => {
                write!(f, "s(:iter, {}, {}", iter.call, iter.params)?;
                if let Some(body) = &iter.body {
                    write!(f, ", {body}")?;
                }
                f.write_str(")")
            }
            Sexp::Class(class) => {
                write!(f, "s(:class, {}, ", class.name)?;
                write_optional(f, class.parent.as_deref())?;
                write_children(f, &class.body)?;
                f.write_str(")")
            }
            Sexp::Block(children) => write_tagged(f, "block", children),
            Sexp::Hash(children) => write_tagged(f, "hash", children),
            Sexp::Array(children) => write_tagged(f, "array", children),
            Sexp::Node(node) => write_tagged(f, &node.kind, &node.children),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_call_chain() {
        let sexp: Sexp = "s(:call, s(:call, nil, :stubs, s(:lit, :x)), :returns, s(:lit, 2))"
            .parse()
            .unwrap();

        let Sexp::Call(outer) = sexp else {
            panic!("Expected Call");
        };
        assert_eq!(outer.method, "returns");
        assert_eq!(outer.args, vec![Sexp::integer(2)]);

        let inner = outer.receiver().and_then(Sexp::as_call).unwrap();
        assert_eq!(inner.method, "stubs");
        assert!(inner.receiver.is_none());
        assert_eq!(inner.args, vec![Sexp::symbol("x")]);
    }

    #[test]
    fn test_parse_class_with_module_parent() {
        let sexp: Sexp = "s(:class, :BananaTest, s(:colon2, s(:const, :ActiveSupport), :TestCase))"
            .parse()
            .unwrap();
        assert_eq!(
            sexp,
            Sexp::class(
                Sexp::sym("BananaTest"),
                Some(Sexp::colon2(Sexp::const_ref("ActiveSupport"), "TestCase")),
                vec![],
            )
        );
    }

    #[test]
    fn test_parse_atoms_and_generic_nodes() {
        let sexp: Sexp = r#"s(:lasgn, :x, s(:dstr, "a \"b\"\n", s(:evstr, s(:lvar, :y))))"#
            .parse()
            .unwrap();
        let expected = Sexp::node(
            "lasgn",
            vec![
                Sexp::sym("x"),
                Sexp::node(
                    "dstr",
                    vec![
                        Sexp::Text("a \"b\"\n".to_string()),
                        Sexp::node("evstr", vec![Sexp::node("lvar", vec![Sexp::sym("y")])]),
                    ],
                ),
            ],
        );
        assert_eq!(sexp, expected);
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!("s(:lit, -3)".parse::<Sexp>().unwrap(), Sexp::integer(-3));
        assert_eq!(
            "s(:lit, 1.5)".parse::<Sexp>().unwrap(),
            Sexp::Lit(Lit::Float(1.5))
        );
        assert_eq!("s(:str, \"\")".parse::<Sexp>().unwrap(), Sexp::string(""));
        assert_eq!(
            "s(:lit, :\"Graphql::Thing\")".parse::<Sexp>().unwrap(),
            Sexp::symbol("Graphql::Thing")
        );
        assert_eq!("s(:call, nil, :[]=)".parse::<Sexp>().unwrap(), Sexp::call(None, "[]=", vec![]));
    }

    #[test]
    fn test_display_matches_ruby_inspect() {
        let sexp = Sexp::call(
            None,
            "expect_any_instance_of",
            vec![Sexp::const_ref("Foo")],
        );
        assert_eq!(sexp.to_string(), "s(:call, nil, :expect_any_instance_of, s(:const, :Foo))");

        let describe = Sexp::iter(
            Sexp::call(
                Some(Sexp::const_ref("RSpec")),
                "describe",
                vec![Sexp::string("Foo"), Sexp::Hash(vec![Sexp::symbol("type"), Sexp::symbol("model")])],
            ),
            None,
        );
        assert_eq!(
            describe.to_string(),
            "s(:iter, s(:call, s(:const, :RSpec), :describe, s(:str, \"Foo\"), s(:hash, s(:lit, :type), s(:lit, :model))), 0)"
        );

        assert_eq!(Sexp::const_ref("A::B").to_string(), "s(:const, :\"A::B\")");
    }

    #[test]
    fn test_display_output_reads_back() {
        let source = "s(:class, :Foo, nil, s(:iter, s(:call, nil, :it, s(:str, \"works\")), 0, s(:call, nil, :assert, s(:true))))";
        let sexp: Sexp = source.parse().unwrap();
        assert_eq!(sexp.to_string(), source);
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert!(matches!("s(:call, nil".parse::<Sexp>(), Err(ConvertError::Notation(_))));
        assert!(matches!("s(:const, \"Foo\")".parse::<Sexp>(), Err(ConvertError::Notation(_))));
        assert!(matches!("s(:colon2, s(:const, :A))".parse::<Sexp>(), Err(ConvertError::Notation(_))));
        assert!(matches!("s(:nil) junk".parse::<Sexp>(), Err(ConvertError::Notation(_))));
        assert!(matches!("s(:array, 1.5)".parse::<Sexp>(), Err(ConvertError::Notation(_))));
        assert!(matches!("s(:array, )".parse::<Sexp>(), Err(ConvertError::Notation(_))));
        assert!(matches!("s(:array,, nil)".parse::<Sexp>(), Err(ConvertError::Notation(_))));
        assert!(matches!("nil, nil".parse::<Sexp>(), Err(ConvertError::Notation(_))));
        assert!(matches!(")".parse::<Sexp>(), Err(ConvertError::Notation(_))));
    }

    fn nested_arrays(depth: usize) -> String {
        format!("{}s(:nil){}", "s(:array, ".repeat(depth), ")".repeat(depth))
    }

    #[test]
    fn test_deeply_nested_input_is_read() {
        let sexp: Sexp = nested_arrays(200).parse().unwrap();

        let mut depth = 0;
        let mut node = &sexp;
        while let Sexp::Array(children) = node {
            depth += 1;
            node = &children[0];
        }
        assert_eq!(depth, 200);
        assert_eq!(*node, Sexp::Nil);
    }

    #[test]
    fn test_nesting_beyond_max_depth_is_rejected() {
        let err = nested_arrays(DEFAULT_MAX_DEPTH).parse::<Sexp>().unwrap_err();
        assert_eq!(err, ConvertError::NestingTooDeep { max_depth: DEFAULT_MAX_DEPTH });

        let err = parse_sexp_with_max_depth(&nested_arrays(100_000), 64).unwrap_err();
        assert_eq!(err, ConvertError::NestingTooDeep { max_depth: 64 });

        assert!(parse_sexp_with_max_depth(&nested_arrays(3), 4).is_ok());
        assert!(parse_sexp_with_max_depth(&nested_arrays(4), 4).is_err());
    }
}
