// Syntax tree shared by the minitest input and the RSpec output.
// Mirrors the S-expressions produced by ruby_parser: every node is a tag plus an
// ordered list of children. Tags the converter inspects carry typed payloads;
// every other tag is kept verbatim in `Sexp::Node` and only ever passed through.

pub mod notation;

use serde::{Deserialize, Serialize};

/// Payload of a `s(:lit, ..)` node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Lit {
    /// :foo
    Symbol(String),
    /// 42
    Integer(i64),
    /// 1.5
    Float(f64),
}

/// `s(:call, receiver, :method, args...)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    /// `None` means the implicit `self` receiver
    pub receiver: Option<Box<Sexp>>,
    pub method: String,
    pub args: Vec<Sexp>,
}

/// `s(:iter, call, params, body?)`, a call with a block attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Iter {
    pub call: Box<Sexp>,
    /// `Sexp::Int(0)` for a block without parameters, `s(:args, ..)` otherwise
    pub params: Box<Sexp>,
    pub body: Option<Box<Sexp>>,
}

/// `s(:class, name, parent, body...)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    /// A bare symbol, or a `colon2`/`colon3` reference for module shorthand
    pub name: Box<Sexp>,
    pub parent: Option<Box<Sexp>>,
    pub body: Vec<Sexp>,
}

/// Any tag the converter has no opinion about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: String,
    pub children: Vec<Sexp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Sexp {
    // Atoms, only found in child positions
    /// `nil` in a child slot
    Empty,
    /// Bare symbol such as a class name or a local variable name
    Sym(String),
    /// Bare integer such as the zero-arity marker of an `iter`
    Int(i64),
    /// Bare string such as the head of a `dstr`
    Text(String),

    // Literals and references
    Nil,
    SelfRef,
    Lit(Lit),
    Str(String),
    Const(String),
    Colon2 {
        scope: Box<Sexp>,
        name: String,
    },
    Colon3(String),

    // Structure
    Call(Call),
    Iter(Iter),
    Class(Class),
    Block(Vec<Sexp>),
    Hash(Vec<Sexp>),
    Array(Vec<Sexp>),

    Node(Node),
}

impl Sexp {
    /// The ruby_parser tag of this node, or a description of the atom
    pub fn kind(&self) -> &str {
        match self {
            Sexp::Empty => "nil atom",
            Sexp::Sym(_) => "symbol atom",
            Sexp::Int(_) => "integer atom",
            Sexp::Text(_) => "string atom",
            Sexp::Nil => "nil",
            Sexp::SelfRef => "self",
            Sexp::Lit(_) => "lit",
            Sexp::Str(_) => "str",
            Sexp::Const(_) => "const",
            Sexp::Colon2 { .. } => "colon2",
            Sexp::Colon3(_) => "colon3",
            Sexp::Call(_) => "call",
            Sexp::Iter(_) => "iter",
            Sexp::Class(_) => "class",
            Sexp::Block(_) => "block",
            Sexp::Hash(_) => "hash",
            Sexp::Array(_) => "array",
            Sexp::Node(node) => &node.kind,
        }
    }

    pub fn call(receiver: Option<Sexp>, method: &str, args: Vec<Sexp>) -> Sexp {
        Sexp::Call(Call {
            receiver: receiver.map(Box::new),
            method: method.to_string(),
            args,
        })
    }

    pub fn const_ref(name: &str) -> Sexp {
        Sexp::Const(name.to_string())
    }

    pub fn colon2(scope: Sexp, name: &str) -> Sexp {
        Sexp::Colon2 {
            scope: Box::new(scope),
            name: name.to_string(),
        }
    }

    /// `s(:lit, :name)`
    pub fn symbol(name: &str) -> Sexp {
        Sexp::Lit(Lit::Symbol(name.to_string()))
    }

    pub fn integer(value: i64) -> Sexp {
        Sexp::Lit(Lit::Integer(value))
    }

    pub fn string(value: &str) -> Sexp {
        Sexp::Str(value.to_string())
    }

    pub fn sym(name: &str) -> Sexp {
        Sexp::Sym(name.to_string())
    }

    /// A parameterless block: `s(:iter, call, 0, body?)`
    pub fn iter(call: Sexp, body: Option<Sexp>) -> Sexp {
        Sexp::Iter(Iter {
            call: Box::new(call),
            params: Box::new(Sexp::Int(0)),
            body: body.map(Box::new),
        })
    }

    pub fn class(name: Sexp, parent: Option<Sexp>, body: Vec<Sexp>) -> Sexp {
        Sexp::Class(Class {
            name: Box::new(name),
            parent: parent.map(Box::new),
            body,
        })
    }

    pub fn node(kind: &str, children: Vec<Sexp>) -> Sexp {
        Sexp::Node(Node {
            kind: kind.to_string(),
            children,
        })
    }

    pub fn as_call(&self) -> Option<&Call> {
        match self {
            Sexp::Call(call) => Some(call),
            _ => None,
        }
    }

    /// Name carried by a `const` node or a bare symbol atom
    pub fn const_name(&self) -> Option<&str> {
        match self {
            Sexp::Const(name) | Sexp::Sym(name) => Some(name),
            _ => None,
        }
    }
}

impl Call {
    pub fn receiver(&self) -> Option<&Sexp> {
        self.receiver.as_deref()
    }
}
