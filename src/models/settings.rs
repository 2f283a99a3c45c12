//! User-adjustable export and template settings.

use serde::{Deserialize, Serialize};

/// Settings persisted as one JSON blob under a single namespaced key.
/// A missing key means defaults; reset deletes the key.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Default description template, with `{category}` / `{title}` style
    /// placeholders.
    #[serde(default)]
    pub default_template: String,

    /// Comma-separated field list for CSV export.
    #[serde(default = "default_csv_format")]
    pub csv_format: String,
}

fn default_csv_format() -> String {
    "title,description,price,sku,category".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_template: String::new(),
            csv_format: default_csv_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stock_csv_field_list() {
        let settings = Settings::default();
        assert_eq!(settings.default_template, "");
        assert_eq!(settings.csv_format, "title,description,price,sku,category");
    }

    #[test]
    fn partial_json_fills_missing_fields_with_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"defaultTemplate":"Elegant {title}"}"#).unwrap();
        assert_eq!(settings.default_template, "Elegant {title}");
        assert_eq!(settings.csv_format, "title,description,price,sku,category");
    }
}
