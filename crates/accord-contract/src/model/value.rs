//! Consumer/producer value pairs.
//!
//! Every field of a contract carries two views: what the consumer sends or
//! expects (often a pattern) and what the producer sends or expects (often a
//! concrete example). [`DualValue`] holds both.

use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::error::ContractError;

/// A compiled regular expression compared and serialized by its source text.
#[derive(Clone)]
pub struct RegexPattern {
    source: Regex,
    whole: Regex,
}

impl RegexPattern {
    /// Compile a pattern, rejecting invalid expressions.
    pub fn new(pattern: &str) -> Result<Self, ContractError> {
        let invalid =
            |e: regex::Error| ContractError::definition(format!("invalid regex '{pattern}': {e}"));
        let source = Regex::new(pattern).map_err(invalid)?;
        let whole = Regex::new(&format!(r"\A(?:{pattern})\z")).map_err(invalid)?;
        Ok(Self { source, whole })
    }

    pub fn as_str(&self) -> &str {
        self.source.as_str()
    }

    /// Whether the whole of `value` matches the pattern.
    pub fn matches(&self, value: &str) -> bool {
        self.whole.is_match(value)
    }
}

impl PartialEq for RegexPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl fmt::Debug for RegexPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegexPattern({:?})", self.as_str())
    }
}

impl fmt::Display for RegexPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RegexPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One side of a [`DualValue`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Side<T> {
    Concrete(T),
    Pattern(RegexPattern),
}

impl<T> Side<T> {
    pub fn as_concrete(&self) -> Option<&T> {
        match self {
            Side::Concrete(value) => Some(value),
            Side::Pattern(_) => None,
        }
    }

    pub fn as_pattern(&self) -> Option<&RegexPattern> {
        match self {
            Side::Concrete(_) => None,
            Side::Pattern(pattern) => Some(pattern),
        }
    }

    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Side<U>, E> {
        Ok(match self {
            Side::Concrete(value) => Side::Concrete(f(value)?),
            Side::Pattern(pattern) => Side::Pattern(pattern),
        })
    }
}

/// A contract field value as seen by the consumer and by the producer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DualValue<T> {
    /// No value was supplied.
    Unset,
    /// One concrete value shared by both sides.
    Single(T),
    /// The sides differ. At least one side is present.
    Matched {
        #[serde(skip_serializing_if = "Option::is_none")]
        consumer: Option<Side<T>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        producer: Option<Side<T>>,
    },
}

impl<T> Default for DualValue<T> {
    fn default() -> Self {
        DualValue::Unset
    }
}

impl<T: PartialEq> DualValue<T> {
    /// Combine explicit consumer and producer sides.
    ///
    /// A lone concrete side, or two equal concrete sides, collapse into
    /// [`DualValue::Single`]; no sides at all yield [`DualValue::Unset`].
    pub fn from_parts(consumer: Option<Side<T>>, producer: Option<Side<T>>) -> Self {
        match (consumer, producer) {
            (None, None) => DualValue::Unset,
            (Some(Side::Concrete(value)), None) | (None, Some(Side::Concrete(value))) => {
                DualValue::Single(value)
            }
            (Some(Side::Concrete(c)), Some(Side::Concrete(p))) if c == p => DualValue::Single(c),
            (consumer, producer) => DualValue::Matched { consumer, producer },
        }
    }
}

impl<T> DualValue<T> {
    pub fn single(value: T) -> Self {
        DualValue::Single(value)
    }

    /// A consumer-side pattern with no fixed producer value.
    pub fn pattern(pattern: RegexPattern) -> Self {
        DualValue::Matched {
            consumer: Some(Side::Pattern(pattern)),
            producer: None,
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, DualValue::Unset)
    }

    pub fn is_single(&self) -> bool {
        matches!(self, DualValue::Single(_))
    }

    /// The consumer view, falling back to the producer side when the
    /// consumer side was not given.
    pub fn consumer_side(&self) -> Option<Side<&T>> {
        match self {
            DualValue::Unset => None,
            DualValue::Single(value) => Some(Side::Concrete(value)),
            DualValue::Matched { consumer, producer } => {
                consumer.as_ref().or(producer.as_ref()).map(Side::as_borrowed)
            }
        }
    }

    /// The producer view, falling back to the consumer side.
    pub fn producer_side(&self) -> Option<Side<&T>> {
        match self {
            DualValue::Unset => None,
            DualValue::Single(value) => Some(Side::Concrete(value)),
            DualValue::Matched { consumer, producer } => {
                producer.as_ref().or(consumer.as_ref()).map(Side::as_borrowed)
            }
        }
    }

    pub fn consumer_value(&self) -> Option<&T> {
        self.consumer_side().and_then(|side| match side {
            Side::Concrete(value) => Some(value),
            Side::Pattern(_) => None,
        })
    }

    pub fn producer_value(&self) -> Option<&T> {
        self.producer_side().and_then(|side| match side {
            Side::Concrete(value) => Some(value),
            Side::Pattern(_) => None,
        })
    }

    /// Convert the payload type, keeping patterns as they are.
    pub fn try_map<U, E>(self, mut f: impl FnMut(T) -> Result<U, E>) -> Result<DualValue<U>, E> {
        Ok(match self {
            DualValue::Unset => DualValue::Unset,
            DualValue::Single(value) => DualValue::Single(f(value)?),
            DualValue::Matched { consumer, producer } => DualValue::Matched {
                consumer: consumer.map(|side| side.try_map(&mut f)).transpose()?,
                producer: producer.map(|side| side.try_map(&mut f)).transpose()?,
            },
        })
    }
}

impl<T> Side<T> {
    fn as_borrowed(&self) -> Side<&T> {
        match self {
            Side::Concrete(value) => Side::Concrete(value),
            Side::Pattern(pattern) => Side::Pattern(pattern.clone()),
        }
    }
}

impl From<&str> for DualValue<String> {
    fn from(value: &str) -> Self {
        DualValue::Single(value.to_string())
    }
}

impl From<String> for DualValue<String> {
    fn from(value: String) -> Self {
        DualValue::Single(value)
    }
}

impl From<RegexPattern> for DualValue<String> {
    fn from(pattern: RegexPattern) -> Self {
        DualValue::pattern(pattern)
    }
}

impl From<u16> for DualValue<u16> {
    fn from(value: u16) -> Self {
        DualValue::Single(value)
    }
}

impl From<u64> for DualValue<u64> {
    fn from(value: u64) -> Self {
        DualValue::Single(value)
    }
}

impl From<serde_json::Value> for DualValue<serde_json::Value> {
    fn from(value: serde_json::Value) -> Self {
        DualValue::Single(value)
    }
}
