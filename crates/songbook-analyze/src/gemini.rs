//! Gemini classification client
//!
//! Sends rendered page images to the Gemini generateContent API and parses
//! the detected piece list. The whole songbook goes in one request: the
//! model needs to see consecutive pages to tell where one piece ends and
//! the next begins.
//!
//! The response schema pins the output to a JSON array of
//! `{title, startPage, endPage}` records, which deserializes straight into
//! [`Piece`]. Titles are carried through untouched; whether they are
//! correct is between the model and the user's review pass.

use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use songbook_layout::Piece;

use crate::error::{AnalyzeError, Result};

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const ANALYSIS_PROMPT: &str = r#"You are an expert in choral music who specializes in reading sheet music. Analyze the provided page images and identify every musical piece. For each piece report its title, the page it starts on, and the page it ends on.

Rules:
1. Page numbers are 1-indexed in the order the images are provided (the first image is page 1, the second is page 2, and so on).
2. A piece's title is usually set in large type at the top of its first page.
3. A piece may span one or more pages. Determine precisely where it ends; the end is usually marked by a final double barline or a "Fine" marking.
4. Return the result strictly as a JSON array of objects matching the given schema. Add no explanations and no markdown formatting."#;

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    Image {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

fn piece_list_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING", "description": "Title of the piece." },
                "startPage": { "type": "INTEGER", "description": "Page the piece starts on (1-indexed)." },
                "endPage": { "type": "INTEGER", "description": "Page the piece ends on (1-indexed)." }
            },
            "required": ["title", "startPage", "endPage"]
        }
    })
}

// =============================================================================
// Client
// =============================================================================

/// HTTP client for the Gemini generateContent API
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Create a client using [`DEFAULT_MODEL`]
    pub fn new(api_key: String) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL)
    }

    /// Create a client for a specific model
    pub fn with_model(api_key: String, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: model.into(),
        }
    }

    /// Identify the pieces across the given page images.
    ///
    /// `page_images` are JPEG-encoded pages in document order; their order
    /// defines the page numbers in the result.
    ///
    /// # Errors
    ///
    /// Fails when the request cannot be sent, the API reports an error
    /// status, or the response is not the expected JSON array.
    pub async fn analyze(&self, page_images: &[Vec<u8>]) -> Result<Vec<Piece>> {
        let mut parts = Vec::with_capacity(page_images.len() + 1);
        parts.push(Part::Text {
            text: ANALYSIS_PROMPT.to_string(),
        });
        for image in page_images {
            parts.push(Part::Image {
                inline_data: InlineData {
                    mime_type: "image/jpeg".to_string(),
                    data: base64::engine::general_purpose::STANDARD.encode(image),
                },
            });
        }

        let request = GenerateContentRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: piece_list_schema(),
            },
        };

        let url = format!("{API_BASE}/{}:generateContent", self.model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyzeError::Api { status, body });
        }

        let response: GenerateContentResponse = response.json().await?;
        let text = response
            .candidates
            .first()
            .and_then(|candidate| candidate.content.parts.first())
            .map(|part| part.text.as_str())
            .ok_or(AnalyzeError::EmptyResponse)?;

        let pieces: Vec<Piece> = serde_json::from_str(&extract_json(text))?;
        log::debug!(
            "classifier reported {} pieces across {} pages",
            pieces.len(),
            page_images.len()
        );
        Ok(pieces)
    }
}

/// Extract the JSON payload from a model response, stripping markdown fences.
fn extract_json(text: &str) -> String {
    let text = text.trim();

    // Handle ```json ... ``` wrapper
    if text.starts_with("```") {
        if let Some(start) = text.find('\n') {
            let after_first_line = &text[start + 1..];
            if let Some(end) = after_first_line.rfind("```") {
                return after_first_line[..end].trim().to_string();
            }
        }
    }

    // Try to find the JSON array directly
    if let Some(start) = text.find('[') {
        if let Some(end) = text.rfind(']') {
            // ']' before the first '[' is prose, not an array; hand the
            // text to the parser unchanged so it reports the failure
            if start < end {
                return text[start..=end].to_string();
            }
        }
    }

    text.to_string()
}
