//! The closed set of payloads carried by every token and every tree node

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use strum::{EnumCount, EnumIter};

/// A primitive type name
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, EnumIter, EnumCount)]
pub enum TypeName {
    Int,
    Float,
    Char,
    Bool,
}

impl TypeName {
    /// The lower-cased name, as written in source
    pub const fn as_str(&self) -> &'static str {
        match self {
            TypeName::Int => "int",
            TypeName::Float => "float",
            TypeName::Char => "char",
            TypeName::Bool => "bool",
        }
    }

    /// Storage size of one value of this type, in bytes
    pub const fn size(&self) -> usize {
        match self {
            TypeName::Int => 4,
            TypeName::Float => 8,
            TypeName::Char => 1,
            TypeName::Bool => 1,
        }
    }
}

impl Display for TypeName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A keyword that appears as a tree label
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, EnumIter, EnumCount)]
pub enum Keyword {
    If,
    While,
    Input,
    Output,
    Return,
}

impl Keyword {
    /// The lower-cased name, as written in source
    pub const fn as_str(&self) -> &'static str {
        match self {
            Keyword::If => "if",
            Keyword::While => "while",
            Keyword::Input => "input",
            Keyword::Output => "output",
            Keyword::Return => "return",
        }
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed set of operators.
///
/// The symbol returned by [`Operator::symbol`] is only meant for diagnostics:
/// [`Operator::Initialization`] and [`Operator::LessEqual`] both display as `<=`
/// but never compare equal.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, EnumIter, EnumCount)]
pub enum Operator {
    Attribution,
    Initialization,
    Division,
    Multiplication,
    Rest,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,
    And,
    Or,
    Negation,
    Positive,
    Negative,
    Index,
    IndexSep,
}

impl Operator {
    /// The canonical display form of this operator
    pub const fn symbol(&self) -> &'static str {
        match self {
            Operator::Attribution => "=",
            Operator::Initialization => "<=",
            Operator::Division => "/",
            Operator::Multiplication => "*",
            Operator::Rest => "%",
            Operator::LessThan => "<",
            Operator::GreaterThan => ">",
            Operator::LessEqual => "<=",
            Operator::GreaterEqual => ">=",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::Negation => "!",
            Operator::Positive => "+",
            Operator::Negative => "-",
            Operator::Index => "[]",
            Operator::IndexSep => "^",
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// The discriminant of a [`LexicalValue`]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, EnumIter, EnumCount)]
pub enum ValueKind {
    Empty,
    TypeName,
    Keyword,
    Operator,
    IntLiteral,
    BoolLiteral,
    FloatLiteral,
    CharLiteral,
    StringLiteral,
}

/// The payload of a token or tree node. Exactly one variant is active.
///
/// Values compare by variant first and payload second. Floats use a total order, so
/// `NaN` compares equal to itself here.
#[derive(Debug, Clone, Default)]
pub enum LexicalValue {
    #[default]
    Empty,
    TypeName(TypeName),
    Keyword(Keyword),
    Operator(Operator),
    IntLiteral(i64),
    BoolLiteral(bool),
    FloatLiteral(f64),
    CharLiteral(char),
    StringLiteral(String),
}

impl LexicalValue {
    /// Gets the discriminant of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            LexicalValue::Empty => ValueKind::Empty,
            LexicalValue::TypeName(_) => ValueKind::TypeName,
            LexicalValue::Keyword(_) => ValueKind::Keyword,
            LexicalValue::Operator(_) => ValueKind::Operator,
            LexicalValue::IntLiteral(_) => ValueKind::IntLiteral,
            LexicalValue::BoolLiteral(_) => ValueKind::BoolLiteral,
            LexicalValue::FloatLiteral(_) => ValueKind::FloatLiteral,
            LexicalValue::CharLiteral(_) => ValueKind::CharLiteral,
            LexicalValue::StringLiteral(_) => ValueKind::StringLiteral,
        }
    }

    /// Gets the canonical, human readable form of this value
    pub fn format(&self) -> String {
        self.to_string()
    }

    /// Creates a string literal value
    pub fn string(s: impl Into<String>) -> Self {
        LexicalValue::StringLiteral(s.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, LexicalValue::Empty)
    }
}

impl Display for LexicalValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LexicalValue::Empty => Ok(()),
            LexicalValue::TypeName(t) => t.fmt(f),
            LexicalValue::Keyword(k) => k.fmt(f),
            LexicalValue::Operator(o) => o.fmt(f),
            LexicalValue::IntLiteral(i) => write!(f, "{i}"),
            LexicalValue::BoolLiteral(b) => write!(f, "{b}"),
            LexicalValue::FloatLiteral(fl) => write!(f, "{fl}"),
            LexicalValue::CharLiteral(c) => write!(f, "{c}"),
            LexicalValue::StringLiteral(s) => f.write_str(s),
        }
    }
}

impl PartialEq for LexicalValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for LexicalValue {}

impl PartialOrd for LexicalValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LexicalValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use LexicalValue::*;
        match (self, other) {
            (Empty, Empty) => Ordering::Equal,
            (TypeName(l), TypeName(r)) => l.cmp(r),
            (Keyword(l), Keyword(r)) => l.cmp(r),
            (Operator(l), Operator(r)) => l.cmp(r),
            (IntLiteral(l), IntLiteral(r)) => l.cmp(r),
            (BoolLiteral(l), BoolLiteral(r)) => l.cmp(r),
            (FloatLiteral(l), FloatLiteral(r)) => l.total_cmp(r),
            (CharLiteral(l), CharLiteral(r)) => l.cmp(r),
            (StringLiteral(l), StringLiteral(r)) => l.cmp(r),
            (l, r) => l.kind().cmp(&r.kind()),
        }
    }
}

impl From<TypeName> for LexicalValue {
    fn from(value: TypeName) -> Self {
        LexicalValue::TypeName(value)
    }
}

impl From<Keyword> for LexicalValue {
    fn from(value: Keyword) -> Self {
        LexicalValue::Keyword(value)
    }
}

impl From<Operator> for LexicalValue {
    fn from(value: Operator) -> Self {
        LexicalValue::Operator(value)
    }
}

impl From<i64> for LexicalValue {
    fn from(value: i64) -> Self {
        LexicalValue::IntLiteral(value)
    }
}

impl From<bool> for LexicalValue {
    fn from(value: bool) -> Self {
        LexicalValue::BoolLiteral(value)
    }
}

impl From<f64> for LexicalValue {
    fn from(value: f64) -> Self {
        LexicalValue::FloatLiteral(value)
    }
}

impl From<char> for LexicalValue {
    fn from(value: char) -> Self {
        LexicalValue::CharLiteral(value)
    }
}

impl From<String> for LexicalValue {
    fn from(value: String) -> Self {
        LexicalValue::StringLiteral(value)
    }
}
