//! Runtime argument values and the two-state registry slot.
//!
//! Every declared argument owns one [`Slot`] in its node's registry. The
//! slot stays [`Slot::Unset`] until the tree-wide parse pass completes,
//! then becomes [`Slot::Value`] holding the parsed value (or `None` when
//! the argument had no matching token and no default). Reading an `Unset`
//! slot is the failure path, not a silent `None`.

use std::fmt;

/// Declared type of a value-carrying argument. Booleans never appear here;
/// they only arise from flag registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    Text,
    Int,
    Float,
}

impl ArgType {
    pub fn name(self) -> &'static str {
        match self {
            ArgType::Text => "text",
            ArgType::Int => "int",
            ArgType::Float => "float",
        }
    }
}

/// A parsed argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl ArgValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ArgValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ArgValue::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Whether this value satisfies a declared type. Used to validate
    /// defaults at registration time.
    pub(crate) fn satisfies(&self, ty: ArgType) -> bool {
        matches!(
            (self, ty),
            (ArgValue::Str(_), ArgType::Text)
                | (ArgValue::Int(_), ArgType::Int)
                | (ArgValue::Float(_), ArgType::Float)
        )
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Str(s) => write!(f, "{s}"),
            ArgValue::Int(n) => write!(f, "{n}"),
            ArgValue::Float(x) => write!(f, "{x}"),
            ArgValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::Str(s.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        ArgValue::Str(s)
    }
}

impl From<i64> for ArgValue {
    fn from(n: i64) -> Self {
        ArgValue::Int(n)
    }
}

impl From<f64> for ArgValue {
    fn from(x: f64) -> Self {
        ArgValue::Float(x)
    }
}

impl From<bool> for ArgValue {
    fn from(b: bool) -> Self {
        ArgValue::Bool(b)
    }
}

/// One registry cell: declared but pending until the parse pass runs, then
/// filled with the parsed value (`None` when absent).
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Slot {
    #[default]
    Unset,
    Value(Option<ArgValue>),
}

impl Slot {
    pub fn is_unset(&self) -> bool {
        matches!(self, Slot::Unset)
    }
}
