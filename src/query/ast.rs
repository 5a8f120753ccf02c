//! Typed query representation
//!
//! Produced by the validators from the raw JSON query. Evaluation works on
//! these types only, never on the raw JSON.

use std::fmt;

use crate::dataset::KEY_SEPARATOR;

/// Wildcard marker in IS patterns
pub const WILDCARD: char = '*';

/// A `<datasetId>_<field>` reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    pub dataset: String,
    pub field: String,
}

impl Key {
    pub fn new(dataset: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            field: field.into(),
        }
    }

    /// Splits on the separator. Exactly two non-empty parts are required.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split(KEY_SEPARATOR);
        let dataset = parts.next()?;
        let field = parts.next()?;
        if parts.next().is_some() || dataset.is_empty() || field.is_empty() {
            return None;
        }
        Some(Self::new(dataset, field))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.dataset, KEY_SEPARATOR, self.field)
    }
}

/// Numeric comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumOp {
    Eq,
    Gt,
    Lt,
}

impl NumOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumOp::Eq => "EQ",
            NumOp::Gt => "GT",
            NumOp::Lt => "LT",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "EQ" => Some(NumOp::Eq),
            "GT" => Some(NumOp::Gt),
            "LT" => Some(NumOp::Lt),
            _ => None,
        }
    }

    /// Applies the comparison `actual <op> bound`
    pub fn compare(&self, actual: f64, bound: f64) -> bool {
        match self {
            NumOp::Eq => actual == bound,
            NumOp::Gt => actual > bound,
            NumOp::Lt => actual < bound,
        }
    }
}

/// How an IS pattern's text is anchored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// `X`
    Exact,
    /// `X*`
    Prefix,
    /// `*X`
    Suffix,
    /// `*X*`
    Contains,
}

/// Parsed IS pattern with the wildcards stripped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub text: String,
    pub kind: PatternKind,
}

impl Pattern {
    /// Parses a raw pattern. At most one leading and one trailing wildcard
    /// are allowed; any other wildcard rejects the pattern.
    pub fn parse(raw: &str) -> Option<Self> {
        let (leading, rest) = match raw.strip_prefix(WILDCARD) {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let (trailing, text) = match rest.strip_suffix(WILDCARD) {
            Some(text) => (true, text),
            None => (false, rest),
        };

        if text.contains(WILDCARD) {
            return None;
        }

        let kind = match (leading, trailing) {
            (true, true) => PatternKind::Contains,
            (true, false) => PatternKind::Suffix,
            (false, true) => PatternKind::Prefix,
            (false, false) => PatternKind::Exact,
        };

        Some(Self {
            text: text.to_string(),
            kind,
        })
    }

    pub fn matches(&self, value: &str) -> bool {
        match self.kind {
            PatternKind::Exact => value == self.text,
            PatternKind::Prefix => value.starts_with(&self.text),
            PatternKind::Suffix => value.ends_with(&self.text),
            PatternKind::Contains => value.contains(&self.text),
        }
    }
}

/// WHERE filter tree
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Empty WHERE
    MatchAll,
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Compare { op: NumOp, key: Key, value: f64 },
    Is { key: Key, pattern: Pattern },
}

/// Aggregate operator of an apply rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOp {
    Max,
    Min,
    Avg,
    Sum,
    Count,
}

impl ApplyOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplyOp::Max => "MAX",
            ApplyOp::Min => "MIN",
            ApplyOp::Avg => "AVG",
            ApplyOp::Sum => "SUM",
            ApplyOp::Count => "COUNT",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "MAX" => Some(ApplyOp::Max),
            "MIN" => Some(ApplyOp::Min),
            "AVG" => Some(ApplyOp::Avg),
            "SUM" => Some(ApplyOp::Sum),
            "COUNT" => Some(ApplyOp::Count),
            _ => None,
        }
    }

    /// COUNT accepts any field; the rest need a numeric one
    pub fn requires_numeric(&self) -> bool {
        !matches!(self, ApplyOp::Count)
    }
}

/// One named aggregate column
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyRule {
    pub name: String,
    pub op: ApplyOp,
    pub key: Key,
}

/// GROUP/APPLY clause
#[derive(Debug, Clone, PartialEq)]
pub struct Transformations {
    /// Group keys, de-duplicated, in declaration order
    pub group: Vec<Key>,
    pub apply: Vec<ApplyRule>,
}

/// Sort direction of the multi-key ORDER form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "UP" => Some(Direction::Up),
            "DOWN" => Some(Direction::Down),
            _ => None,
        }
    }
}

/// ORDER clause
#[derive(Debug, Clone, PartialEq)]
pub enum Order {
    /// Single column, ascending
    Column(String),
    /// Column list compared in order, all in one direction
    Keys { dir: Direction, keys: Vec<String> },
}

/// OPTIONS clause
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub columns: Vec<String>,
    pub order: Option<Order>,
}

/// A validated query bound to exactly one dataset
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub dataset: String,
    pub filter: Filter,
    pub transformations: Option<Transformations>,
    pub options: Options,
}
