//! Allow-listed SQL literals and identifiers.
//!
//! Filter values are never concatenated into SQL as-is. A string literal is
//! only emitted after [`validate_literal`] accepted it, which rules out every
//! character that could terminate or escape the quoted form.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::error::{QueryBuildError, QueryBuildResult};

/// Schema qualifier used when none is configured.
pub const DEFAULT_SCHEMA: &str = "SNOWFLAKE_EXAMPLE.FIBERIFIC";

/// Clause emitted in place of an empty `IN ()` list.
pub const MATCH_NOTHING: &str = "1 = 0";

/// Check that `value` can be embedded between single quotes verbatim.
pub fn validate_literal(value: &str) -> QueryBuildResult<()> {
    for ch in value.chars() {
        let reason = match ch {
            '\'' | '"' | '`' => "embedded quote character",
            '\\' => "embedded backslash",
            c if c.is_control() => "embedded control character",
            _ => continue,
        };
        return Err(QueryBuildError::invalid_filter_value(value, reason));
    }
    Ok(())
}

/// Render `value` as a single-quoted SQL string literal.
pub fn quote_literal(value: &str) -> QueryBuildResult<String> {
    validate_literal(value)?;
    Ok(format!("'{}'", value))
}

/// Render `column IN ('a','b')`, or a clause matching no rows when `values`
/// is empty.
pub fn in_list<S: AsRef<str>>(column: &str, values: &[S]) -> QueryBuildResult<String> {
    if values.is_empty() {
        return Ok(MATCH_NOTHING.to_string());
    }
    let quoted = values
        .iter()
        .map(|v| quote_literal(v.as_ref()))
        .collect::<QueryBuildResult<Vec<_>>>()?;
    Ok(format!("{} IN ({})", column, quoted.join(",")))
}

fn validate_identifier(part: &str, whole: &str) -> QueryBuildResult<()> {
    let mut chars = part.chars();
    match chars.next() {
        None => {
            return Err(QueryBuildError::invalid_identifier(
                whole,
                "empty identifier segment",
            ))
        }
        Some(c) if !(c.is_ascii_alphabetic() || c == '_') => {
            return Err(QueryBuildError::invalid_identifier(
                whole,
                "identifier must start with a letter or underscore",
            ))
        }
        _ => {}
    }
    if chars.any(|c| !(c.is_ascii_alphanumeric() || c == '_' || c == '$')) {
        return Err(QueryBuildError::invalid_identifier(
            whole,
            "identifier may only contain letters, digits, '_' and '$'",
        ));
    }
    Ok(())
}

/// Dot-separated schema qualifier such as `DATABASE.SCHEMA`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaName(String);

impl SchemaName {
    pub fn parse(value: &str) -> QueryBuildResult<Self> {
        let value = value.trim();
        for part in value.split('.') {
            validate_identifier(part, value)?;
        }
        Ok(Self(value.to_string()))
    }

    /// Fully qualified table name.
    pub fn table(&self, table: &str) -> String {
        format!("{}.{}", self.0, table)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SchemaName {
    fn default() -> Self {
        Self(DEFAULT_SCHEMA.to_string())
    }
}

impl FromStr for SchemaName {
    type Err = QueryBuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SchemaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for SchemaName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_plain_values() {
        assert_eq!(quote_literal("CA").unwrap(), "'CA'");
        assert_eq!(quote_literal("New Mexico").unwrap(), "'New Mexico'");
    }

    #[test]
    fn test_rejects_quotes_backslashes_and_control_chars() {
        for bad in ["CA'", "C\"A", "C`A", "CA\\", "CA\n", "CA\0", "CA\u{7f}"] {
            let err = quote_literal(bad).unwrap_err();
            assert!(
                matches!(err, QueryBuildError::InvalidFilterValue { .. }),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_in_list_rendering() {
        assert_eq!(in_list("n.state", &["CA", "TX"]).unwrap(), "n.state IN ('CA','TX')");
        assert_eq!(in_list::<&str>("n.state", &[]).unwrap(), MATCH_NOTHING);
    }

    #[test]
    fn test_in_list_rejects_injection() {
        let err = in_list("n.state", &["CA", "CA'; DROP TABLE x; --"]).unwrap_err();
        assert!(matches!(err, QueryBuildError::InvalidFilterValue { .. }));
    }

    #[test]
    fn test_schema_name_validation() {
        let schema = SchemaName::parse("SNOWFLAKE_EXAMPLE.FIBERIFIC").unwrap();
        assert_eq!(
            schema.table("RAW_TICKETS"),
            "SNOWFLAKE_EXAMPLE.FIBERIFIC.RAW_TICKETS"
        );
        assert!(SchemaName::parse("DB..SCHEMA").is_err());
        assert!(SchemaName::parse("DB.SCHEMA; DROP").is_err());
        assert!(SchemaName::parse("1DB").is_err());
        assert_eq!(SchemaName::default().as_str(), DEFAULT_SCHEMA);
    }
}
