//! The generated, user-editable description document.
//!
//! This is the canonical record produced by the generation call, rewritten
//! wholesale by the enhancement pass, edited section-by-section during
//! review, and consumed by every export format. All text fields default to
//! the empty string so downstream formatters never branch on a missing
//! field.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Technical specifications sub-record of a description document.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetails {
    #[serde(default)]
    pub category: String,

    /// Origin and period, e.g. "England, circa 1870".
    #[serde(default)]
    pub origin_period: String,

    #[serde(default)]
    pub age: String,

    #[serde(default)]
    pub materials: String,

    /// Dimensions as a display string, e.g. `36″ × 18″ × 20″`.
    #[serde(default)]
    pub dimensions: String,

    #[serde(default)]
    pub condition: String,

    #[serde(default)]
    pub item_number: String,

    /// Price as a decimal string, without currency symbol.
    #[serde(default)]
    pub price: String,
}

/// A complete structured product description.
///
/// Either the whole document parses out of a generation response or the
/// response is rejected; no partially-populated document is ever accepted.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionDocument {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub details: ProductDetails,

    /// Narrative paragraphs, in display order.
    #[serde(default)]
    pub description: Vec<String>,

    /// Distinguishing characteristics, in display order.
    #[serde(default)]
    pub distinguishing_characteristics: Vec<String>,

    #[serde(default)]
    pub condition_report: String,

    #[serde(default)]
    pub provenance_history: String,

    #[serde(default)]
    pub collector_value: String,

    #[serde(default)]
    pub additional_details: String,

    #[serde(default)]
    pub shipping_handling: String,
}

/// Named sections a review edit may replace. Each edit swaps one section
/// wholesale; partial updates are impossible by construction.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DocumentSection {
    Title,
    Details,
    Description,
    DistinguishingCharacteristics,
    ConditionReport,
    ProvenanceHistory,
    CollectorValue,
    AdditionalDetails,
    ShippingHandling,
}

#[derive(Debug, Error)]
pub enum SectionError {
    /// The replacement value did not deserialize to the section's type.
    #[error("invalid value for section: {0}")]
    InvalidValue(#[from] serde_json::Error),
}

impl DescriptionDocument {
    /// Replace one named section with a new value.
    ///
    /// `value` must deserialize to the section's type: a string for text
    /// sections, a string array for the narrative paragraphs and the
    /// characteristics list, a details object for `Details`. On error the
    /// document is left untouched.
    pub fn replace_section(
        &mut self,
        section: DocumentSection,
        value: serde_json::Value,
    ) -> Result<(), SectionError> {
        match section {
            DocumentSection::Title => self.title = serde_json::from_value(value)?,
            DocumentSection::Details => self.details = serde_json::from_value(value)?,
            DocumentSection::Description => self.description = serde_json::from_value(value)?,
            DocumentSection::DistinguishingCharacteristics => {
                self.distinguishing_characteristics = serde_json::from_value(value)?
            }
            DocumentSection::ConditionReport => {
                self.condition_report = serde_json::from_value(value)?
            }
            DocumentSection::ProvenanceHistory => {
                self.provenance_history = serde_json::from_value(value)?
            }
            DocumentSection::CollectorValue => {
                self.collector_value = serde_json::from_value(value)?
            }
            DocumentSection::AdditionalDetails => {
                self.additional_details = serde_json::from_value(value)?
            }
            DocumentSection::ShippingHandling => {
                self.shipping_handling = serde_json::from_value(value)?
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_deserialize_to_empty_strings() {
        let doc: DescriptionDocument =
            serde_json::from_value(json!({ "title": "Carriage Clock" })).unwrap();
        assert_eq!(doc.title, "Carriage Clock");
        assert_eq!(doc.condition_report, "");
        assert_eq!(doc.details.origin_period, "");
        assert!(doc.description.is_empty());
    }

    #[test]
    fn replace_section_swaps_one_section_wholesale() {
        let mut doc = DescriptionDocument::default();
        doc.replace_section(
            DocumentSection::Description,
            json!(["First paragraph.", "Second paragraph."]),
        )
        .unwrap();
        assert_eq!(doc.description.len(), 2);

        doc.replace_section(DocumentSection::ConditionReport, json!("Excellent."))
            .unwrap();
        assert_eq!(doc.condition_report, "Excellent.");
    }

    #[test]
    fn replace_section_rejects_mismatched_value_and_keeps_document() {
        let mut doc = DescriptionDocument {
            condition_report: "Original.".into(),
            ..Default::default()
        };
        let err = doc.replace_section(DocumentSection::ConditionReport, json!(["not", "text"]));
        assert!(err.is_err());
        assert_eq!(doc.condition_report, "Original.");
    }

    #[test]
    fn section_names_parse_from_camel_case() {
        let section: DocumentSection = serde_json::from_value(json!("conditionReport")).unwrap();
        assert_eq!(section, DocumentSection::ConditionReport);
    }

    #[test]
    fn document_serializes_camel_case_wire_names() {
        let doc = DescriptionDocument::default();
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("distinguishingCharacteristics").is_some());
        assert!(json.get("shippingHandling").is_some());
        assert!(json["details"].get("originPeriod").is_some());
    }
}
