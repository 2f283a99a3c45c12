//! src/services/export_service.rs
//!
//! Pure rendering of a description document into CSV, HTML, and plain-text
//! export payloads. All three formats walk the same ordered section table,
//! so adding a section updates every output by construction instead of by
//! parallel edits. The functions assume a well-formed document; malformed
//! input is a programming error, not a runtime condition.

use crate::models::{
    description::{DescriptionDocument, ProductDetails},
    image::ImageRecord,
    seo::SeoMetadata,
};

/// Identity of an exportable section, used to place sections into the
/// fixed CSV columns and by the coverage test.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectionId {
    Description,
    DistinguishingCharacteristics,
    ConditionReport,
    ProvenanceHistory,
    CollectorValue,
    AdditionalDetails,
    ShippingHandling,
}

/// How a section's content is shaped.
pub enum SectionBody<'a> {
    /// Narrative paragraphs, one display paragraph each.
    Paragraphs(&'a [String]),
    /// Bulleted list items, order preserved.
    Bullets(&'a [String]),
    /// A single free-text block.
    Text(&'a str),
}

/// One (label, body) entry of the shared export table.
pub struct Section<'a> {
    pub id: SectionId,
    pub label: &'static str,
    pub body: SectionBody<'a>,
}

/// The single ordered list of exportable sections. Every formatter
/// enumerates exactly this table.
pub fn sections(doc: &DescriptionDocument) -> Vec<Section<'_>> {
    vec![
        Section {
            id: SectionId::Description,
            label: "Description",
            body: SectionBody::Paragraphs(&doc.description),
        },
        Section {
            id: SectionId::DistinguishingCharacteristics,
            label: "Distinguishing Characteristics",
            body: SectionBody::Bullets(&doc.distinguishing_characteristics),
        },
        Section {
            id: SectionId::ConditionReport,
            label: "Condition Report",
            body: SectionBody::Text(&doc.condition_report),
        },
        Section {
            id: SectionId::ProvenanceHistory,
            label: "Provenance/History",
            body: SectionBody::Text(&doc.provenance_history),
        },
        Section {
            id: SectionId::CollectorValue,
            label: "Collector Value",
            body: SectionBody::Text(&doc.collector_value),
        },
        Section {
            id: SectionId::AdditionalDetails,
            label: "Additional Details",
            body: SectionBody::Text(&doc.additional_details),
        },
        Section {
            id: SectionId::ShippingHandling,
            label: "Shipping & Handling",
            body: SectionBody::Text(&doc.shipping_handling),
        },
    ]
}

/// The eight labeled detail fields, in display order. Price carries the
/// currency symbol here so HTML and plain text render it identically.
fn detail_fields(details: &ProductDetails) -> [(&'static str, String); 8] {
    [
        ("Category", details.category.clone()),
        ("Origin/Period", details.origin_period.clone()),
        ("Age", details.age.clone()),
        ("Materials", details.materials.clone()),
        ("Dimensions", details.dimensions.clone()),
        ("Condition", details.condition.clone()),
        ("Item Number", details.item_number.clone()),
        ("Price", format!("${}", details.price)),
    ]
}

const CSV_HEADERS: [&str; 12] = [
    "SKU",
    "Name",
    "SEO Title",
    "Slug",
    "Meta Description",
    "Tags",
    "Regular Price",
    "Categories",
    "Description",
    "Images",
    "Alt Text",
    "Shipping Notes",
];

/// Render the commerce-platform CSV: one header row and exactly one data
/// row per product, regardless of how many images it carries.
pub fn csv(doc: &DescriptionDocument, seo: &SeoMetadata, images: &[ImageRecord]) -> String {
    let mut description_cell: Vec<String> = Vec::new();
    for section in sections(doc) {
        match (section.id, section.body) {
            // Shipping has its own column.
            (SectionId::ShippingHandling, _) => {}
            // The narrative opens the cell without a sub-header.
            (SectionId::Description, SectionBody::Paragraphs(paragraphs)) => {
                description_cell.extend(paragraphs.iter().cloned());
            }
            (_, body) => {
                description_cell.push(format!("\n{}:", section.label));
                match body {
                    SectionBody::Bullets(items) => {
                        description_cell.extend(items.iter().map(|item| format!("- {}", item)));
                    }
                    SectionBody::Text(text) => description_cell.push(text.to_string()),
                    SectionBody::Paragraphs(paragraphs) => {
                        description_cell.extend(paragraphs.iter().cloned());
                    }
                }
            }
        }
    }

    let image_names = images
        .iter()
        .map(|img| img.filename.as_str())
        .collect::<Vec<_>>()
        .join("|");
    // Alt texts follow the image order, not the map's key order.
    let alt_texts = images
        .iter()
        .map(|img| {
            seo.image_alt_texts
                .get(&img.url())
                .map(String::as_str)
                .unwrap_or_default()
        })
        .collect::<Vec<_>>()
        .join("|");

    let row = [
        doc.details.item_number.clone(),
        doc.title.clone(),
        seo.seo_title.clone(),
        seo.slug.clone(),
        seo.meta_description.clone(),
        seo.tags.join("|"),
        doc.details.price.clone(),
        doc.details.category.clone(),
        description_cell.join("\n"),
        image_names,
        alt_texts,
        doc.shipping_handling.clone(),
    ];

    format!(
        "{}\n{}",
        CSV_HEADERS
            .iter()
            .map(|cell| csv_escape(cell))
            .collect::<Vec<_>>()
            .join(","),
        row.iter()
            .map(|cell| csv_escape(cell))
            .collect::<Vec<_>>()
            .join(",")
    )
}

/// Render a self-contained HTML fragment (not a full document).
pub fn html(doc: &DescriptionDocument) -> String {
    let mut out = String::new();
    out.push_str(&format!("<h1>{}</h1>\n", html_escape(&doc.title)));

    out.push_str("<div class=\"product-details\">\n");
    for (label, value) in detail_fields(&doc.details) {
        out.push_str(&format!(
            "  <p><strong>{}:</strong> {}</p>\n",
            label,
            html_escape(&value)
        ));
    }
    out.push_str("</div>\n");

    for section in sections(doc) {
        match section.body {
            SectionBody::Paragraphs(paragraphs) => {
                out.push_str("<div class=\"description\">\n");
                for paragraph in paragraphs {
                    out.push_str(&format!("  <p>{}</p>\n", html_escape(paragraph)));
                }
                out.push_str("</div>\n");
            }
            SectionBody::Bullets(items) => {
                out.push_str(&format!("<h2>{}</h2>\n<ul>\n", html_escape(section.label)));
                for item in items {
                    out.push_str(&format!("  <li>{}</li>\n", html_escape(item)));
                }
                out.push_str("</ul>\n");
            }
            SectionBody::Text(text) => {
                out.push_str(&format!(
                    "<h2>{}</h2>\n<p>{}</p>\n",
                    html_escape(section.label),
                    html_escape(text)
                ));
            }
        }
    }
    out
}

/// Render plain text: uppercase section labels, blank-line separation,
/// no markup, trimmed.
pub fn plain_text(doc: &DescriptionDocument) -> String {
    let mut blocks: Vec<String> = vec![doc.title.clone()];

    let details = detail_fields(&doc.details)
        .iter()
        .map(|(label, value)| format!("{}: {}", label, value))
        .collect::<Vec<_>>()
        .join("\n");
    blocks.push(format!("PRODUCT DETAILS\n{}", details));

    for section in sections(doc) {
        let body = match section.body {
            SectionBody::Paragraphs(paragraphs) => paragraphs.join("\n\n"),
            SectionBody::Bullets(items) => items
                .iter()
                .map(|item| format!("- {}", item))
                .collect::<Vec<_>>()
                .join("\n"),
            SectionBody::Text(text) => text.to_string(),
        };
        blocks.push(format!("{}\n{}", section.label.to_uppercase(), body));
    }

    blocks.join("\n\n").trim().to_string()
}

/// Wrap a cell in double quotes, doubling internal quotes. Applied to
/// every cell so embedded commas and newlines cannot break the row shape.
fn csv_escape(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::image::stub_visual_keywords;
    use chrono::Utc;
    use sqlx::types::Json;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn sample_document() -> DescriptionDocument {
        DescriptionDocument {
            title: "Victorian Walnut Side Chair".into(),
            details: ProductDetails {
                category: "Antique Furniture".into(),
                origin_period: "England, circa 1870".into(),
                age: "Approximately 155 years".into(),
                materials: "Walnut, horsehair".into(),
                dimensions: "36″ × 18″ × 20″".into(),
                condition: "Very good".into(),
                item_number: "AF-1021".into(),
                price: "450".into(),
            },
            description: vec![
                "A finely carved walnut side chair.".into(),
                "The balloon back shows crisp floral carving.".into(),
            ],
            distinguishing_characteristics: vec![
                "Original horsehair upholstery".into(),
                "Hand-cut dovetail joinery".into(),
                "Rich original patina".into(),
                "Carved cabriole legs".into(),
                "Maker's stamp under the seat rail".into(),
            ],
            condition_report: "Structurally sound; light wear to finish, \"as found\".".into(),
            provenance_history: "Single-family estate, Boston.".into(),
            collector_value: "Strong demand for balloon-back chairs.".into(),
            additional_details: "Matching pair available on request.".into(),
            shipping_handling: "Ships freight, blanket-wrapped.\nInsured in transit.".into(),
        }
    }

    fn sample_images() -> Vec<ImageRecord> {
        ["front.jpg", "back.jpg"]
            .iter()
            .map(|name| ImageRecord {
                id: Uuid::new_v4(),
                draft_id: Uuid::new_v4(),
                filename: (*name).into(),
                content_type: "image/jpeg".into(),
                size_bytes: 2048,
                etag: "00000000000000000000000000000000".into(),
                visual_keywords: Json(stub_visual_keywords("image/jpeg")),
                created_at: Utc::now(),
            })
            .collect()
    }

    fn sample_seo(images: &[ImageRecord]) -> SeoMetadata {
        let mut image_alt_texts = BTreeMap::new();
        for image in images {
            image_alt_texts.insert(image.url(), format!("alt for {}", image.filename));
        }
        SeoMetadata {
            seo_title: "Victorian Walnut Side Chair - Antique Furniture Victoria".into(),
            meta_description: "A finely carved walnut side chair...".into(),
            slug: "victorian-walnut-side-chair".into(),
            tags: vec!["antique furniture".into(), "walnut".into()],
            image_alt_texts,
        }
    }

    /// Minimal quote-aware CSV reader, enough to verify row/cell shape.
    fn parse_csv(input: &str) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        let mut row = Vec::new();
        let mut cell = String::new();
        let mut in_quotes = false;
        let mut chars = input.chars().peekable();
        while let Some(c) = chars.next() {
            if in_quotes {
                if c == '"' {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        cell.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    cell.push(c);
                }
            } else {
                match c {
                    '"' => in_quotes = true,
                    ',' => row.push(std::mem::take(&mut cell)),
                    '\n' => {
                        row.push(std::mem::take(&mut cell));
                        rows.push(std::mem::take(&mut row));
                    }
                    other => cell.push(other),
                }
            }
        }
        if !cell.is_empty() || !row.is_empty() {
            row.push(cell);
            rows.push(row);
        }
        rows
    }

    #[test]
    fn csv_round_trips_as_two_rows_with_matching_widths() {
        let images = sample_images();
        let output = csv(&sample_document(), &sample_seo(&images), &images);
        let rows = parse_csv(&output);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 12);
        assert_eq!(rows[1].len(), rows[0].len());
        // Embedded quotes and newlines survived the trip intact.
        assert!(rows[1][11].contains('\n'));
        let condition_cell = &rows[1][8];
        assert!(condition_cell.contains("\"as found\""));
    }

    #[test]
    fn csv_emits_one_row_per_product_not_per_image() {
        let images = sample_images();
        let output = csv(&sample_document(), &sample_seo(&images), &images);
        assert_eq!(parse_csv(&output).len(), 2);
        let rows = parse_csv(&output);
        assert_eq!(rows[1][9], "front.jpg|back.jpg");
        assert_eq!(rows[1][10], "alt for front.jpg|alt for back.jpg");
    }

    #[test]
    fn csv_description_cell_carries_every_non_shipping_section() {
        let images = sample_images();
        let output = csv(&sample_document(), &sample_seo(&images), &images);
        let rows = parse_csv(&output);
        let cell = &rows[1][8];
        for label in [
            "Distinguishing Characteristics:",
            "Condition Report:",
            "Provenance/History:",
            "Collector Value:",
            "Additional Details:",
        ] {
            assert!(cell.contains(label), "missing {}", label);
        }
        assert_eq!(rows[1][11], sample_document().shipping_handling);
    }

    #[test]
    fn html_lists_characteristics_in_order() {
        let output = html(&sample_document());
        let items: Vec<&str> = output
            .lines()
            .filter(|line| line.trim_start().starts_with("<li>"))
            .collect();
        assert_eq!(items.len(), 5);
        assert!(items[0].contains("Original horsehair upholstery"));
        assert!(items[4].contains("stamp under the seat rail"));
    }

    #[test]
    fn html_renders_eight_detail_fields_and_dollar_price() {
        let output = html(&sample_document());
        let fields = output.matches("<strong>").count();
        assert_eq!(fields, 8);
        assert!(output.contains("<strong>Price:</strong> $450"));
        assert!(output.contains("<strong>Age:</strong>"));
    }

    #[test]
    fn html_escapes_interpolated_text() {
        let mut doc = sample_document();
        doc.title = "Chair <script> & \"Co\"".into();
        let output = html(&doc);
        assert!(output.contains("Chair &lt;script&gt; &amp; &quot;Co&quot;"));
        assert!(!output.contains("<script>"));
    }

    #[test]
    fn plain_text_uses_uppercase_labels_and_dash_bullets() {
        let output = plain_text(&sample_document());
        let expected_order = [
            "PRODUCT DETAILS",
            "DESCRIPTION",
            "DISTINGUISHING CHARACTERISTICS",
            "CONDITION REPORT",
            "PROVENANCE/HISTORY",
            "COLLECTOR VALUE",
            "ADDITIONAL DETAILS",
            "SHIPPING & HANDLING",
        ];
        let mut last = 0;
        for label in expected_order {
            let pos = output.find(label).unwrap_or_else(|| panic!("missing {}", label));
            assert!(pos > last || last == 0);
            last = pos;
        }
        let bullets: Vec<&str> = output
            .lines()
            .filter(|line| line.starts_with("- "))
            .collect();
        assert_eq!(bullets.len(), 5);
        assert_eq!(bullets[0], "- Original horsehair upholstery");
        assert_eq!(output, output.trim());
        assert!(output.contains("Price: $450"));
    }

    #[test]
    fn all_formats_cover_the_same_sections() {
        let doc = sample_document();
        let images = sample_images();
        let seo = sample_seo(&images);
        let csv_out = csv(&doc, &seo, &images);
        let html_out = html(&doc);
        let text_out = plain_text(&doc);

        // A content snippet per section; every output must carry each one,
        // so no format can silently drop a section.
        for section in sections(&doc) {
            let content = match section.body {
                SectionBody::Paragraphs(paragraphs) => paragraphs[0].as_str(),
                SectionBody::Bullets(items) => items[0].as_str(),
                SectionBody::Text(text) => text,
            };
            let snippet: String = content.chars().take(20).collect();
            for (name, output) in [("csv", &csv_out), ("html", &html_out), ("text", &text_out)] {
                assert!(
                    output.contains(&snippet),
                    "{} missing section {:?}",
                    name,
                    section.id
                );
            }
        }
    }
}
