//! Field descriptors rendered by the host
//!
//! The module describes which inputs exist and their options; markup is the
//! host's business.

use ph24_api::AvailabilityZone;
use serde::{Deserialize, Serialize};

pub const PLACEHOLDER_NO_MODULE: &str = "- No API server configured -";
pub const PLACEHOLDER_NO_IMAGES: &str = "- No images available -";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Select {
        options: Vec<SelectOption>,
        selected: Option<String>,
    },
    Text {
        value: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
}

impl Field {
    /// Select field; an empty option list gets a single placeholder entry
    pub fn select(
        name: impl Into<String>,
        label: impl Into<String>,
        mut options: Vec<SelectOption>,
        selected: Option<String>,
        placeholder: &str,
    ) -> Self {
        if options.is_empty() {
            options.push(SelectOption::new("", placeholder));
        }
        Self {
            name: name.into(),
            label: label.into(),
            kind: FieldKind::Select { options, selected },
        }
    }

    pub fn text(name: impl Into<String>, label: impl Into<String>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind: FieldKind::Text { value },
        }
    }

    pub fn options(&self) -> &[SelectOption] {
        match &self.kind {
            FieldKind::Select { options, .. } => options,
            FieldKind::Text { .. } => &[],
        }
    }
}

/// Ordered set of fields for one form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleFields {
    pub fields: Vec<Field>,
}

impl ModuleFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Human-friendly label for an availability zone
pub fn zone_label(identifier: &str, zone: Option<&AvailabilityZone>) -> String {
    let known = match identifier {
        "fra1" | "fra" => Some("Frankfurt am Main 🇩🇪 (Maincubes)"),
        "ams1" => Some("Amsterdam, Netherlands"),
        "nyc1" => Some("New York, USA"),
        "lon1" => Some("London, UK"),
        _ => None,
    };

    if let Some(label) = known {
        return label.to_string();
    }

    zone.and_then(|z| z.name.clone())
        .unwrap_or_else(|| identifier.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_label() {
        assert_eq!(zone_label("fra", None), "Frankfurt am Main 🇩🇪 (Maincubes)");
        assert_eq!(zone_label("lon1", None), "London, UK");

        let zone: AvailabilityZone =
            serde_json::from_value(serde_json::json!({"identifier": "waw1", "name": "Warsaw"}))
                .unwrap();
        assert_eq!(zone_label("waw1", Some(&zone)), "Warsaw");
        assert_eq!(zone_label("sin1", None), "sin1");
    }

    #[test]
    fn test_empty_select_gets_placeholder() {
        let field = Field::select("flavor_id", "Plan/Flavor ID", vec![], None, PLACEHOLDER_NO_MODULE);
        assert_eq!(field.options(), &[SelectOption::new("", PLACEHOLDER_NO_MODULE)]);
    }
}
