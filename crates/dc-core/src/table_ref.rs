//! Schema-qualified table references.

use crate::error::{CoreError, CoreResult};
use crate::sql_utils::quote_ident;
use std::fmt;

/// A table name with an optional schema, parsed from a dotted string.
///
/// `orders` has no schema, `raw.orders` has schema `raw`. A three-part name
/// such as `db.raw.orders` keeps the first segment as the schema and the
/// remainder (`raw.orders`) as the name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableRef {
    pub schema: Option<String>,
    pub name: String,
}

impl TableRef {
    /// Create a reference from explicit parts
    pub fn new(schema: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.map(String::from),
            name: name.into(),
        }
    }

    /// Parse a dotted, possibly qualified name.
    pub fn parse(qualified: &str) -> CoreResult<Self> {
        let trimmed = qualified.trim();
        let invalid = || CoreError::InvalidTableName {
            value: qualified.to_string(),
        };
        if trimmed.is_empty() {
            return Err(invalid());
        }

        let mut parts = trimmed.splitn(2, '.');
        let first = parts.next().ok_or_else(invalid)?;
        match parts.next() {
            None => Ok(Self::new(None, first)),
            Some(rest) if first.is_empty() || rest.is_empty() || rest.ends_with('.') => {
                Err(invalid())
            }
            // Known limitation: `db.schema.table` yields schema `db`, name `schema.table`.
            Some(rest) => Ok(Self::new(Some(first), rest)),
        }
    }

    /// The unquoted dotted form
    pub fn qualified(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.name),
            None => self.name.clone(),
        }
    }

    /// The quoted form for use in generated SQL
    pub fn quoted(&self) -> String {
        let name = self
            .name
            .split('.')
            .map(quote_ident)
            .collect::<Vec<_>>()
            .join(".");
        match &self.schema {
            Some(schema) => format!("{}.{}", quote_ident(schema), name),
            None => name,
        }
    }

    /// Schema to use for catalog lookups
    pub fn schema_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.schema.as_deref().unwrap_or(default)
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified())
    }
}

impl std::str::FromStr for TableRef {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
