//! Field and operator catalogs, and the group combinator.
//!
//! The field catalog is supplied from configuration; the operator set and the
//! combinators are fixed. Parsing from text happens here so that unknown
//! values are rejected before they reach the tree editor.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Shown in an empty value input when the field has no example.
pub const DEFAULT_PLACEHOLDER: &str = "Value";

/// Primitive kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
        }
    }
}

/// One selectable field of the record set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Key stored in conditions, e.g. `employeeId`
    pub key: String,
    /// Display label, e.g. `Employee ID`
    pub label: String,
    pub kind: FieldKind,
    /// Example value shown when a condition's value is empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl FieldDef {
    pub fn new(key: &str, label: &str, kind: FieldKind, placeholder: Option<&str>) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            kind,
            placeholder: placeholder.map(str::to_string),
        }
    }

    pub fn placeholder_or_default(&self) -> &str {
        self.placeholder.as_deref().unwrap_or(DEFAULT_PLACEHOLDER)
    }
}

/// Ordered, non-empty list of field definitions.
///
/// The first entry is the default field of every new condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldCatalog {
    fields: Vec<FieldDef>,
}

impl Default for FieldCatalog {
    fn default() -> Self {
        Self {
            fields: vec![
                FieldDef::new("employeeId", "Employee ID", FieldKind::Number, Some("1,001")),
                FieldDef::new("title", "Title", FieldKind::Text, Some("Sales Manager")),
                FieldDef::new("city", "City", FieldKind::Text, Some("Kirkland")),
                FieldDef::new("department", "Department", FieldKind::Text, Some("Finance")),
                FieldDef::new("country", "Country", FieldKind::Text, Some("United States")),
            ],
        }
    }
}

impl FieldCatalog {
    /// Build a catalog, rejecting empty lists and duplicate keys.
    pub fn new(fields: Vec<FieldDef>) -> Result<Self, DomainError> {
        if fields.is_empty() {
            return Err(DomainError::EmptyCatalog);
        }
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.key.as_str()) {
                return Err(DomainError::DuplicateField(field.key.clone()));
            }
        }
        Ok(Self { fields })
    }

    pub fn first(&self) -> &FieldDef {
        // non-empty by construction
        &self.fields[0]
    }

    pub fn get(&self, key: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Look up a field by key, falling back to the first entry for keys the
    /// catalog does not know.
    pub fn resolve(&self, key: &str) -> &FieldDef {
        self.get(key).unwrap_or_else(|| self.first())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Comparison applied by a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Contains,
    Equals,
    GreaterThan,
    LessThan,
    StartsWith,
}

impl Operator {
    /// Catalog order; the first entry is the default operator.
    pub const ALL: [Operator; 5] = [
        Operator::Contains,
        Operator::Equals,
        Operator::GreaterThan,
        Operator::LessThan,
        Operator::StartsWith,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Operator::Contains => "contains",
            Operator::Equals => "equals",
            Operator::GreaterThan => "greaterThan",
            Operator::LessThan => "lessThan",
            Operator::StartsWith => "startsWith",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Operator::Contains => "Contains",
            Operator::Equals => "Equals",
            Operator::GreaterThan => "Greater Than",
            Operator::LessThan => "Less Than",
            Operator::StartsWith => "Starts With",
        }
    }
}

impl Default for Operator {
    fn default() -> Self {
        Operator::ALL[0]
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Operator {
    type Err = DomainError;

    /// Accepts the key (`greaterThan`) case-insensitively, plus kebab and
    /// snake spellings (`greater-than`, `greater_than`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_' && *c != ' ')
            .collect::<String>()
            .to_ascii_lowercase();
        Operator::ALL
            .into_iter()
            .find(|op| op.key().to_ascii_lowercase() == normalized)
            .ok_or_else(|| DomainError::UnknownOperator(s.to_string()))
    }
}

/// Boolean operator applied uniformly to a group's direct children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Combinator {
    #[default]
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

impl Combinator {
    pub const ALL: [Combinator; 2] = [Combinator::And, Combinator::Or];

    pub fn as_str(self) -> &'static str {
        match self {
            Combinator::And => "AND",
            Combinator::Or => "OR",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Combinator::And => Combinator::Or,
            Combinator::Or => Combinator::And,
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Combinator {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AND" => Ok(Combinator::And),
            "OR" => Ok(Combinator::Or),
            _ => Err(DomainError::UnknownCombinator(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_parses_key_and_loose_spellings() {
        assert_eq!("greaterThan".parse::<Operator>(), Ok(Operator::GreaterThan));
        assert_eq!("starts-with".parse::<Operator>(), Ok(Operator::StartsWith));
        assert_eq!("LESS_THAN".parse::<Operator>(), Ok(Operator::LessThan));
        assert!("between".parse::<Operator>().is_err());
    }

    #[test]
    fn combinator_parse_is_case_insensitive() {
        assert_eq!("or".parse::<Combinator>(), Ok(Combinator::Or));
        assert_eq!(
            "XOR".parse::<Combinator>(),
            Err(DomainError::UnknownCombinator("XOR".into()))
        );
    }

    #[test]
    fn catalog_resolve_falls_back_to_first() {
        let catalog = FieldCatalog::default();
        assert_eq!(catalog.resolve("city").label, "City");
        assert_eq!(catalog.resolve("salary").key, "employeeId");
    }

    #[test]
    fn catalog_rejects_duplicates() {
        let field = FieldDef::new("a", "A", FieldKind::Text, None);
        let result = FieldCatalog::new(vec![field.clone(), field]);
        assert_eq!(result, Err(DomainError::DuplicateField("a".into())));
    }
}
