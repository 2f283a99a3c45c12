//! User-entered product attributes captured by the listing form.

use serde::{Deserialize, Serialize};

/// Three-dimensional measurements, kept as decimal strings exactly as typed.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Dimensions {
    /// Height in inches.
    pub height: String,

    /// Width in inches.
    pub width: String,

    /// Depth in inches.
    pub depth: String,
}

/// The full set of form fields describing a collectible item.
///
/// Immutable once attached to a draft; the generation prompt, the SEO
/// deriver, and the exports all read from the same snapshot.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductForm {
    /// Item title, e.g. "Victorian Walnut Side Chair". Required; an
    /// absent or blank title is a validation error, not a parse error.
    #[serde(default)]
    pub title: String,

    /// Product category, e.g. "Antique Furniture". Required.
    #[serde(default)]
    pub category: String,

    /// Free-text details supplied by the seller.
    #[serde(default)]
    pub details: String,

    /// Height / width / depth measurements.
    #[serde(default)]
    pub dimensions: Dimensions,

    /// Primary materials, e.g. "walnut, brass".
    #[serde(default)]
    pub materials: String,

    /// Era or period, e.g. "Victorian". May be empty.
    #[serde(default)]
    pub era: String,

    /// Asking price as a decimal string, without currency symbol.
    #[serde(default)]
    pub price: String,

    /// Seller inventory / SKU number.
    #[serde(default)]
    pub item_number: String,
}

/// A single failed form-field check, surfaced inline at the field.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct FieldIssue {
    pub field: &'static str,
    pub message: &'static str,
}

impl ProductForm {
    /// Check required fields. Returns every violation so the caller can
    /// surface all of them at once rather than one per round trip.
    pub fn validate(&self) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        if self.title.trim().is_empty() {
            issues.push(FieldIssue {
                field: "title",
                message: "Title is required",
            });
        }
        if self.category.trim().is_empty() {
            issues.push(FieldIssue {
                field: "category",
                message: "Category is required",
            });
        }
        issues
    }

    /// Render the measurements as a display string, `H″ × W″ × D″`.
    pub fn dimensions_display(&self) -> String {
        format!(
            "{}″ × {}″ × {}″",
            self.dimensions.height, self.dimensions.width, self.dimensions.depth
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> ProductForm {
        ProductForm {
            title: "Victorian Walnut Side Chair".into(),
            category: "Antique Furniture".into(),
            details: "Hand-carved walnut frame with original upholstery.".into(),
            dimensions: Dimensions {
                height: "36".into(),
                width: "18".into(),
                depth: "20".into(),
            },
            materials: "Walnut".into(),
            era: "Victorian".into(),
            price: "450".into(),
            item_number: "AF-1021".into(),
        }
    }

    #[test]
    fn validate_accepts_complete_form() {
        assert!(filled_form().validate().is_empty());
    }

    #[test]
    fn validate_reports_each_missing_required_field() {
        let form = ProductForm {
            title: "  ".into(),
            category: String::new(),
            ..filled_form()
        };
        let issues = form.validate();
        let fields: Vec<&str> = issues.iter().map(|i| i.field).collect();
        assert_eq!(fields, vec!["title", "category"]);
    }

    #[test]
    fn dimensions_display_uses_double_prime_marks() {
        assert_eq!(filled_form().dimensions_display(), "36″ × 18″ × 20″");
    }

    #[test]
    fn form_round_trips_camel_case_wire_names() {
        let json = serde_json::to_value(filled_form()).unwrap();
        assert!(json.get("itemNumber").is_some());
        assert!(json.get("item_number").is_none());
    }
}
