use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::resolver::ResolveError;

/// Value of one attribute on a graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Scalar(String),
    Reference(String),
    List(Vec<AttributeValue>),
}

impl AttributeValue {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::Scalar(s.clone())),
            Value::Number(n) => Some(Self::Scalar(n.to_string())),
            Value::Bool(b) => Some(Self::Scalar(b.to_string())),
            Value::Array(items) => Some(Self::List(
                items.iter().filter_map(Self::from_json).collect(),
            )),
            Value::Object(map) => {
                if let Some(inner) = map.get("@value") {
                    return match inner {
                        Value::Object(_) | Value::Array(_) | Value::Null => None,
                        scalar => Self::from_json(scalar),
                    };
                }
                map.get("@id")
                    .and_then(Value::as_str)
                    .map(|id| Self::Reference(id.to_string()))
            }
            Value::Null => None,
        }
    }

    /// Scalar text, unwrapping a single-element list.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::List(items) if items.len() == 1 => items[0].as_scalar(),
            _ => None,
        }
    }

    /// Every reference id carried by this value, in order.
    pub fn references(&self) -> Vec<&str> {
        match self {
            Self::Reference(id) => vec![id.as_str()],
            Self::List(items) => items.iter().flat_map(|v| v.references()).collect(),
            Self::Scalar(_) => Vec::new(),
        }
    }

    /// Every scalar carried by this value, in order.
    pub fn scalars(&self) -> Vec<&str> {
        match self {
            Self::Scalar(s) => vec![s.as_str()],
            Self::List(items) => items.iter().flat_map(|v| v.scalars()).collect(),
            Self::Reference(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEntity {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: Option<String>,
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl GraphEntity {
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    pub fn scalar(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(AttributeValue::as_scalar)
    }

    pub fn references(&self, name: &str) -> Vec<&str> {
        self.attribute(name)
            .map(AttributeValue::references)
            .unwrap_or_default()
    }
}

/// The entity list of one linked-data document, in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub entities: Vec<GraphEntity>,
}

impl GraphDocument {
    /// Decode a JSON-LD payload. A payload without a non-empty `@graph`
    /// array has no graph structure.
    pub fn from_json(payload: &Value) -> Result<Self, ResolveError> {
        let nodes = payload
            .get("@graph")
            .and_then(Value::as_array)
            .filter(|nodes| !nodes.is_empty())
            .ok_or(ResolveError::NoGraph)?;

        let entities = nodes
            .iter()
            .filter_map(Value::as_object)
            .filter_map(|node| {
                let id = node.get("@id")?.as_str()?.to_string();
                let entity_type = node
                    .get("@type")
                    .and_then(AttributeValue::from_json)
                    .and_then(|t| t.scalars().first().map(|s| s.to_string()));
                let attributes = node
                    .iter()
                    .filter(|(key, _)| !key.starts_with('@'))
                    .filter_map(|(key, value)| {
                        AttributeValue::from_json(value).map(|v| (key.clone(), v))
                    })
                    .collect();
                Some(GraphEntity {
                    id,
                    entity_type,
                    attributes,
                })
            })
            .collect();

        Ok(Self { entities })
    }
}

/// Canonical attribute names extracted from free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Class,
    DamageStatus,
    ExamStatus,
    DescriptionSv,
    Placement,
    Terrain,
    Orientation,
    Province,
    County,
    Municipality,
    Parish,
    ActualityStatus,
    AntiquarianAssessment,
    Lamningsnummer,
    RaaNumber,
    Organization,
    BuildDate,
    LastChanged,
    Url,
    Title,
    Tradition,
    Reference,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 22] = [
        Self::Class,
        Self::DamageStatus,
        Self::ExamStatus,
        Self::DescriptionSv,
        Self::Placement,
        Self::Terrain,
        Self::Orientation,
        Self::Province,
        Self::County,
        Self::Municipality,
        Self::Parish,
        Self::ActualityStatus,
        Self::AntiquarianAssessment,
        Self::Lamningsnummer,
        Self::RaaNumber,
        Self::Organization,
        Self::BuildDate,
        Self::LastChanged,
        Self::Url,
        Self::Title,
        Self::Tradition,
        Self::Reference,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::DamageStatus => "damage_status",
            Self::ExamStatus => "exam_status",
            Self::DescriptionSv => "description_sv",
            Self::Placement => "placement",
            Self::Terrain => "terrain",
            Self::Orientation => "orientation",
            Self::Province => "province",
            Self::County => "county",
            Self::Municipality => "municipality",
            Self::Parish => "parish",
            Self::ActualityStatus => "actuality_status",
            Self::AntiquarianAssessment => "antiquarian_assessment",
            Self::Lamningsnummer => "lamningsnummer",
            Self::RaaNumber => "raa_number",
            Self::Organization => "organization",
            Self::BuildDate => "build_date",
            Self::LastChanged => "last_changed",
            Self::Url => "url",
            Self::Title => "title",
            Self::Tradition => "tradition",
            Self::Reference => "reference",
        }
    }

    /// Descriptive prose fields. URLs are stripped from these; structured
    /// fields (dates, identifiers) are left untouched.
    pub fn is_free_text(&self) -> bool {
        matches!(
            self,
            Self::DescriptionSv
                | Self::Terrain
                | Self::Orientation
                | Self::Placement
                | Self::Reference
                | Self::Tradition
                | Self::Title
        )
    }

    /// Sub-fields carried on the composite geographic line.
    pub fn is_geographic(&self) -> bool {
        matches!(
            self,
            Self::Province | Self::County | Self::Municipality | Self::Parish
        )
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical field -> value. Absent keys were not found in the source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParsedFields(BTreeMap<CanonicalField, String>);

impl ParsedFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: CanonicalField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Value or empty string.
    pub fn text(&self, field: CanonicalField) -> &str {
        self.get(field).unwrap_or("")
    }

    pub fn insert(&mut self, field: CanonicalField, value: impl Into<String>) {
        self.0.insert(field, value.into());
    }

    /// Append after a line break when the field already holds a value.
    pub fn append(&mut self, field: CanonicalField, value: &str) {
        match self.0.get_mut(&field) {
            Some(existing) if !existing.is_empty() => {
                existing.push('\n');
                existing.push_str(value);
            }
            _ => {
                self.0.insert(field, value.to_string());
            }
        }
    }

    pub fn remove(&mut self, field: CanonicalField) -> Option<String> {
        self.0.remove(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(CanonicalField, String)> for ParsedFields {
    fn from_iter<I: IntoIterator<Item = (CanonicalField, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
