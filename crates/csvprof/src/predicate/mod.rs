//! Leaf predicates: stateless value tests.

pub mod lookup;
mod numeric;
pub mod primitive;
pub mod range;
pub mod regex;

use std::fmt;

pub use lookup::{LookupProvider, LookupProviders, LookupTest};
pub use primitive::Primitive;
pub use range::{RangeBounds, RangeTest};
pub use regex::RegexTest;

pub(crate) use numeric::parse_float;

/// How a predicate wants its input presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRepr {
    /// Unicode text.
    Text,
    /// Raw UTF-8 bytes with ASCII-only semantics.
    Bytes,
}

/// A single value test.
#[derive(Debug, Clone)]
pub enum Predicate {
    Primitive(Primitive),
    Regex(RegexTest),
    Lookup(LookupTest),
    Range(RangeTest),
}

impl Predicate {
    pub fn test(&self, value: &str) -> bool {
        match self {
            Predicate::Primitive(p) => p.test(value),
            Predicate::Regex(r) => r.is_match(value),
            Predicate::Lookup(l) => l.test(value),
            Predicate::Range(r) => r.test(value),
        }
    }

    pub fn input(&self) -> InputRepr {
        match self {
            Predicate::Primitive(p) => p.input(),
            _ => InputRepr::Text,
        }
    }

    pub fn is_lookup(&self) -> bool {
        matches!(self, Predicate::Lookup(_))
    }

    /// Short family name used in listings.
    pub fn kind(&self) -> &'static str {
        match self {
            Predicate::Primitive(_) => "primitive",
            Predicate::Regex(_) => "regex",
            Predicate::Lookup(_) => "lookup",
            Predicate::Range(_) => "range",
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Primitive(p) => {
                let bytes = if p.input() == InputRepr::Bytes { " (bytes)" } else { "" };
                write!(f, "primitive {p:?}{bytes}")
            }
            Predicate::Regex(r) => write!(f, "{r}"),
            Predicate::Lookup(l) => write!(f, "{l}"),
            Predicate::Range(r) => write!(f, "{r}"),
        }
    }
}
