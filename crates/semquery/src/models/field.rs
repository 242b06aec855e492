use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Semantic type of a catalog field. Drives operator availability and the
/// input kind offered for filter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Number,
    Date,
    Datetime,
    Boolean,
}

impl FieldType {
    /// Normalizes a catalog type string. Returns `None` for types the builder
    /// has no dedicated input for.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "string" | "text" => Some(Self::String),
            "number" | "integer" | "int" | "float" | "decimal" | "numeric" => Some(Self::Number),
            "date" => Some(Self::Date),
            "datetime" | "timestamp" => Some(Self::Datetime),
            "boolean" | "bool" => Some(Self::Boolean),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_temporal(self) -> bool {
        matches!(self, Self::Date | Self::Datetime)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Dimension,
    Measure,
}

impl FieldKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dimension => "dimension",
            Self::Measure => "measure",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Field {
    pub name: String,

    #[serde(rename = "fullName")]
    pub full_name: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
}

impl Field {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        full_name: impl Into<String>,
        field_type: Option<FieldType>,
    ) -> Self {
        Self {
            name: name.into(),
            full_name: full_name.into(),
            field_type,
        }
    }
}

/// Flattened dimensions and measures available to one panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FieldCatalog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,

    pub dimensions: Vec<Field>,
    pub measures: Vec<Field>,
}

impl FieldCatalog {
    #[must_use]
    pub fn new(dimensions: Vec<Field>, measures: Vec<Field>) -> Self {
        Self {
            topic: None,
            dimensions,
            measures,
        }
    }

    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    #[must_use]
    pub fn find(&self, full_name: &str) -> Option<(FieldKind, &Field)> {
        self.dimensions
            .iter()
            .find(|field| field.full_name == full_name)
            .map(|field| (FieldKind::Dimension, field))
            .or_else(|| {
                self.measures
                    .iter()
                    .find(|field| field.full_name == full_name)
                    .map(|field| (FieldKind::Measure, field))
            })
    }

    #[must_use]
    pub fn contains(&self, kind: FieldKind, full_name: &str) -> bool {
        let fields = match kind {
            FieldKind::Dimension => &self.dimensions,
            FieldKind::Measure => &self.measures,
        };
        fields.iter().any(|field| field.full_name == full_name)
    }

    #[must_use]
    pub fn field_type(&self, full_name: &str) -> Option<FieldType> {
        self.find(full_name).and_then(|(_, field)| field.field_type)
    }

    /// Default target for a freshly added filter.
    #[must_use]
    pub fn first_field(&self) -> Option<&Field> {
        self.dimensions.first().or_else(|| self.measures.first())
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldKind, &Field)> {
        self.dimensions
            .iter()
            .map(|field| (FieldKind::Dimension, field))
            .chain(self.measures.iter().map(|field| (FieldKind::Measure, field)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dimensions.len() + self.measures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::{Field, FieldCatalog, FieldKind, FieldType};

    fn catalog() -> FieldCatalog {
        FieldCatalog::new(
            vec![Field::new("status", "orders.status", Some(FieldType::String))],
            vec![Field::new("total", "orders.total", Some(FieldType::Number))],
        )
    }

    #[test]
    fn normalizes_type_aliases() {
        assert_eq!(FieldType::parse("TIMESTAMP"), Some(FieldType::Datetime));
        assert_eq!(FieldType::parse("integer"), Some(FieldType::Number));
        assert_eq!(FieldType::parse(" bool "), Some(FieldType::Boolean));
        assert_eq!(FieldType::parse("geography"), None);
    }

    #[test]
    fn finds_fields_across_both_kinds() {
        let catalog = catalog();
        assert_eq!(
            catalog.find("orders.total").map(|(kind, _)| kind),
            Some(FieldKind::Measure)
        );
        assert_eq!(catalog.field_type("orders.status"), Some(FieldType::String));
        assert!(catalog.find("orders.missing").is_none());
        assert!(!catalog.contains(FieldKind::Dimension, "orders.total"));
    }

    #[test]
    fn first_field_prefers_dimensions() {
        let catalog = catalog();
        assert_eq!(
            catalog.first_field().map(|field| field.full_name.as_str()),
            Some("orders.status")
        );

        let measures_only = FieldCatalog::new(Vec::new(), catalog.measures.clone());
        assert_eq!(
            measures_only
                .first_field()
                .map(|field| field.full_name.as_str()),
            Some("orders.total")
        );
        assert!(FieldCatalog::default().first_field().is_none());
    }

    #[test]
    fn field_serializes_with_camel_case_identifier() {
        let encoded = serde_json::to_value(Field::new("total", "orders.total", None))
            .expect("field should serialize");
        assert_eq!(
            encoded,
            serde_json::json!({"name": "total", "fullName": "orders.total"})
        );
    }
}
