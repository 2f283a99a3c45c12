//! HTTP handlers, grouped by concern. Each handler stays thin: extract,
//! delegate to a service, shape the response.

pub mod export_handlers;
pub mod health_handlers;
pub mod image_handlers;
pub mod listing_handlers;
pub mod settings_handlers;
