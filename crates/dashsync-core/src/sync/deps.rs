use time::Date;

use crate::domain::format_date;

/// One primitive entry in a [`DependencySet`].
#[derive(Debug, Clone)]
pub enum DepValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl PartialEq for DepValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            // Bitwise so that NaN equals itself and an unchanged value never
            // looks like a change.
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Str(a), Self::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for DepValue {}

impl From<bool> for DepValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for DepValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for DepValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for DepValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for DepValue {
    fn from(value: u64) -> Self {
        i64::try_from(value)
            .map(Self::Int)
            .unwrap_or(Self::Float(value as f64))
    }
}

impl From<usize> for DepValue {
    fn from(value: usize) -> Self {
        Self::from(value as u64)
    }
}

impl From<f64> for DepValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for DepValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for DepValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for DepValue {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<Date> for DepValue {
    fn from(value: Date) -> Self {
        Self::Str(format_date(value))
    }
}

impl<T> From<Option<T>> for DepValue
where
    T: Into<DepValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

/// Ordered values whose change restarts a fetch cycle.
///
/// Two sets are equal when they have the same length and equal values at
/// every position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet(Vec<DepValue>);

impl DependencySet {
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_values(values: Vec<DepValue>) -> Self {
        Self(values)
    }

    pub fn with(mut self, value: impl Into<DepValue>) -> Self {
        self.0.push(value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<DepValue> for DependencySet {
    fn from_iter<I: IntoIterator<Item = DepValue>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Builds a [`DependencySet`] from values convertible into [`DepValue`].
///
/// ```rust
/// use dashsync_core::deps;
///
/// let a = deps!["2024-01-01", "2024-01-31", 0];
/// let b = deps!["2024-01-01", "2024-01-31", 0];
/// assert_eq!(a, b);
/// ```
#[macro_export]
macro_rules! deps {
    () => {
        $crate::sync::DependencySet::new()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::sync::DependencySet::from_values(vec![$($crate::sync::DepValue::from($value)),+])
    };
}
