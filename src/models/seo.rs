//! Derived search / commerce-platform metadata.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// SEO fields computed deterministically from the product form and image
/// set. Recomputed whenever a description is (re)generated; never edited
/// independently.
///
/// `image_alt_texts` is a `BTreeMap` so serialization order is stable and
/// the deriver stays byte-for-byte idempotent for identical input.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeoMetadata {
    /// Search title, at most 60 characters.
    pub seo_title: String,

    /// Meta description, at most 155 characters, truncated on a word
    /// boundary.
    pub meta_description: String,

    /// URL slug: lowercase, hyphen-separated, no leading/trailing hyphen.
    pub slug: String,

    /// Up to 5 unique tags, first-occurrence order.
    pub tags: Vec<String>,

    /// Alt text per image, keyed by the image's content URL.
    pub image_alt_texts: BTreeMap<String, String>,
}
