//! src/services/seo_service.rs
//!
//! Pure derivation of SEO metadata from the product form and image set.
//! Deterministic: identical input always yields byte-identical output, so
//! it is safe to recompute on every (re)generation. No error conditions —
//! empty optional fields degrade to fewer tags, never to a failure.

use crate::models::{form::ProductForm, image::ImageRecord, seo::SeoMetadata};
use std::collections::BTreeMap;

const SEO_TITLE_MAX: usize = 60;
const META_DESCRIPTION_MAX: usize = 155;
const ALT_TEXT_MAX: usize = 125;
const MAX_TAGS: usize = 5;
const ALT_KEYWORD_COUNT: usize = 3;

/// Derive the full SEO record for a form + image set.
pub fn derive_seo_metadata(form: &ProductForm, images: &[ImageRecord]) -> SeoMetadata {
    let seo_title = truncate_chars(
        &format!("{} - {} {}", form.title, form.category, form.era),
        SEO_TITLE_MAX,
    );

    let mut image_alt_texts = BTreeMap::new();
    for image in images {
        let keywords = image
            .visual_keywords
            .iter()
            .take(ALT_KEYWORD_COUNT)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        let alt = truncate_chars(&format!("{} - {}", form.title, keywords), ALT_TEXT_MAX);
        image_alt_texts.insert(image.url(), alt);
    }

    SeoMetadata {
        seo_title,
        meta_description: truncate_meta_description(&form.details),
        slug: slugify(&form.title),
        tags: derive_tags(form),
        image_alt_texts,
    }
}

/// Lowercase the title and collapse every run of non-alphanumeric
/// characters into a single hyphen, with no hyphen at either end.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Truncate free text to the meta-description limit. When truncation
/// occurs, cut back to the last whitespace boundary and append an
/// ellipsis marker so the result never ends mid-word.
pub fn truncate_meta_description(text: &str) -> String {
    if text.chars().count() <= META_DESCRIPTION_MAX {
        return text.to_string();
    }
    let cut: String = text.chars().take(META_DESCRIPTION_MAX).collect();
    match cut.rfind(char::is_whitespace) {
        Some(pos) => {
            let mut out = cut[..pos].trim_end().to_string();
            out.push_str("...");
            out
        }
        // A 155-character run with no whitespace; hard-cut with room for
        // the marker so the bound still holds.
        None => {
            let mut out: String = cut.chars().take(META_DESCRIPTION_MAX - 3).collect();
            out.push_str("...");
            out
        }
    }
}

/// Category/materials/era tag set: lowercased, non-empty, de-duplicated
/// preserving first occurrence, capped at five entries.
fn derive_tags(form: &ProductForm) -> Vec<String> {
    let category = form.category.trim().to_lowercase();
    let materials = form.materials.trim().to_lowercase();
    let era = form.era.trim().to_lowercase();

    let candidates = [
        category.clone(),
        materials,
        era,
        if category.is_empty() {
            String::new()
        } else {
            format!("vintage {}", category)
        },
        "collectible".to_string(),
    ];

    let mut tags: Vec<String> = Vec::new();
    for candidate in candidates {
        if candidate.is_empty() || tags.contains(&candidate) {
            continue;
        }
        tags.push(candidate);
        if tags.len() == MAX_TAGS {
            break;
        }
    }
    tags
}

/// Hard character-count truncation, no word-boundary adjustment.
fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
