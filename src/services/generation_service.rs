//! src/services/generation_service.rs
//!
//! Description generation against the Anthropic Messages API: render a
//! prompt from the form and image keywords, make one authenticated POST,
//! and parse the reply's first content block as a description document.
//! One outbound call per invocation — no retries, no caching, no timeout.
//! The upstream generator is non-deterministic, so identical input does
//! not imply identical output.

use crate::models::{description::DescriptionDocument, form::ProductForm, image::ImageRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Error)]
pub enum GenerationError {
    /// No credential was supplied; checked before any network I/O.
    #[error("no API credential supplied")]
    MissingCredential,
    /// The generation endpoint answered with a non-success status.
    #[error("generation request failed with status {status}")]
    GenerationFailed { status: u16 },
    /// The reply body did not parse as a complete description document.
    /// The whole response is discarded; no partial document is accepted.
    #[error("generation response was not a valid description document: {0}")]
    MalformedResponse(#[from] serde_json::Error),
    /// Transport-level failure reaching the endpoint.
    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

pub type GenerationResult<T> = Result<T, GenerationError>;

/// Client for the external generation endpoint.
///
/// Carries the request parameters (model id, token budget, sampling
/// temperature) and an optional server-side credential; a per-request
/// credential always wins over the configured one.
#[derive(Clone)]
pub struct GenerationService {
    http: reqwest::Client,
    api_base: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct CreateMessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<InputMessage<'a>>,
}

#[derive(Serialize)]
struct InputMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

impl GenerationService {
    pub fn new(
        api_base: impl Into<String>,
        model: impl Into<String>,
        max_tokens: u32,
        temperature: f32,
        api_key: Option<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
            model: model.into(),
            max_tokens,
            temperature,
            api_key,
        }
    }

    /// Generate a fresh description document for a form + image set.
    pub async fn generate(
        &self,
        form: &ProductForm,
        images: &[ImageRecord],
        request_key: Option<&str>,
    ) -> GenerationResult<DescriptionDocument> {
        let key = self.resolve_credential(request_key)?;
        let prompt = build_prompt(form, images);
        self.call(&key, &prompt).await
    }

    /// Enhancement pass: rewrite an already-accepted document wholesale.
    pub async fn enhance(
        &self,
        document: &DescriptionDocument,
        request_key: Option<&str>,
    ) -> GenerationResult<DescriptionDocument> {
        let key = self.resolve_credential(request_key)?;
        let prompt = build_enhancement_prompt(document)?;
        self.call(&key, &prompt).await
    }

    fn resolve_credential(&self, request_key: Option<&str>) -> GenerationResult<String> {
        request_key
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .or_else(|| self.api_key.clone())
            .ok_or(GenerationError::MissingCredential)
    }

    async fn call(&self, key: &str, prompt: &str) -> GenerationResult<DescriptionDocument> {
        let body = CreateMessageRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: vec![InputMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(format!("{}/v1/messages", self.api_base))
            .header(API_KEY_HEADER, key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("generation endpoint returned {}", status);
            return Err(GenerationError::GenerationFailed {
                status: status.as_u16(),
            });
        }

        let payload = response.text().await?;
        parse_response(&payload)
    }
}

/// Parse the Messages API reply: the first text content block must contain
/// a JSON-encoded description document. Either the full document parses or
/// the call fails.
pub fn parse_response(payload: &str) -> GenerationResult<DescriptionDocument> {
    let envelope: MessagesResponse = serde_json::from_str(payload)?;
    let text = envelope
        .content
        .iter()
        .find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            ContentBlock::Other => None,
        })
        .ok_or_else(|| {
            GenerationError::MalformedResponse(serde::de::Error::custom(
                "response carried no text content block",
            ))
        })?;
    Ok(serde_json::from_str(text)?)
}

/// Assemble the generation prompt from form fields and image keywords.
pub fn build_prompt(form: &ProductForm, images: &[ImageRecord]) -> String {
    let visual_keywords = if images.is_empty() {
        String::new()
    } else {
        format!(
            "Visual Keywords from Images: {}\n\n",
            images
                .iter()
                .map(|img| img.visual_keywords.join(", "))
                .collect::<Vec<_>>()
                .join("; ")
        )
    };

    format!(
        "Create a detailed product description for an antique/collectible item with these specifications:\n\
         \n\
         Title: {title}\n\
         Category: {category}\n\
         Materials: {materials}\n\
         Dimensions: {dimensions}\n\
         Price: ${price}\n\
         Additional Details: {details}\n\
         \n\
         {visual_keywords}\
         Please provide a structured response with these sections:\n\
         1. Product Details (technical specifications)\n\
         2. Description (engaging narrative)\n\
         3. Distinguishing Characteristics (5 key features)\n\
         4. Condition Report\n\
         5. Provenance/History\n\
         6. Collector Value Assessment\n\
         7. Additional Details\n\
         8. Shipping & Handling Information\n\
         \n\
         Format as JSON matching this structure:\n\
         {schema}",
        title = form.title,
        category = form.category,
        materials = form.materials,
        dimensions = form.dimensions_display(),
        price = form.price,
        details = form.details,
        visual_keywords = visual_keywords,
        schema = DOCUMENT_SCHEMA,
    )
}

/// Assemble the enhancement prompt around the serialized current document.
pub fn build_enhancement_prompt(document: &DescriptionDocument) -> GenerationResult<String> {
    let current = serde_json::to_string_pretty(document)?;
    Ok(format!(
        "Rewrite and enhance the following product description for an antique/collectible item. \
         Strengthen the narrative, keep every factual detail accurate, and return the complete \
         document.\n\
         \n\
         Current description (JSON):\n\
         {current}\n\
         \n\
         Format the response as JSON with the same structure and field names as the input:\n\
         {schema}",
        current = current,
        schema = DOCUMENT_SCHEMA,
    ))
}

/// The canonical response schema sent with every prompt: nested `details`,
/// camelCase field names.
const DOCUMENT_SCHEMA: &str = r#"{
  "title": "string",
  "details": {
    "category": "string",
    "originPeriod": "string",
    "age": "string",
    "materials": "string",
    "dimensions": "string",
    "condition": "string",
    "itemNumber": "string",
    "price": "string"
  },
  "description": ["string array of paragraphs"],
  "distinguishingCharacteristics": ["string array"],
  "conditionReport": "string",
  "provenanceHistory": "string",
  "collectorValue": "string",
  "additionalDetails": "string",
  "shippingHandling": "string"
}"#;
