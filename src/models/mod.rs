//! Core data models for the listing assistant.
//!
//! These entities represent the product form, uploaded images, the
//! generated description document, derived SEO metadata, and the draft
//! workflow state. Database-backed records map to tables via
//! `sqlx::FromRow` and serialize naturally as JSON via `serde`.

pub mod description;
pub mod draft;
pub mod form;
pub mod image;
pub mod seo;
pub mod settings;
pub mod state;
