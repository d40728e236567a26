//! Filter operations for PostgrestClient

use std::fmt;

/// Operator for filter expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Equal to
    Eq,

    /// Not equal to
    Neq,

    /// Greater than or equal to
    Gte,

    /// Less than or equal to
    Lte,

    /// Like (case insensitive)
    ILike,
}

impl FilterOperator {
    /// Convert the operator to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
            FilterOperator::Gte => "gte",
            FilterOperator::Lte => "lte",
            FilterOperator::ILike => "ilike",
        }
    }

    /// Render `operator.value` as the query parameter value
    pub fn apply(&self, value: &str) -> String {
        format!("{}.{}", self.as_str(), value)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Escape a user supplied search term for a `like`/`ilike` pattern
///
/// `*` is the wildcard in the URL syntax and `,`/`()` delimit lists, so they
/// are stripped from the term before it is wrapped in wildcards.
pub fn contains_pattern(term: &str) -> String {
    let cleaned: String = term
        .chars()
        .filter(|c| !matches!(c, '*' | '%' | ',' | '(' | ')'))
        .collect();
    format!("*{}*", cleaned.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_renders_prefix() {
        assert_eq!(FilterOperator::Gte.apply("5000"), "gte.5000");
        assert_eq!(FilterOperator::ILike.apply("*moto*"), "ilike.*moto*");
    }

    #[test]
    fn search_pattern_strips_wildcards() {
        assert_eq!(contains_pattern(" iphone*(12) "), "*iphone12*");
    }
}
