//! Curatorial commentary for freshly uploaded works.
//!
//! The call sits outside the store: work creation commits first, then the
//! handler asks for commentary. Any failure here degrades to a fixed
//! fallback string and never touches entity state.

use anyhow::{Context as _, Result, bail};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::CuratorConfig;

/// Returned whenever the curator is unconfigured or unreachable.
pub const FALLBACK_COMMENTARY: &str = "Error connecting with intelligent curatorship.";

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
}

#[derive(Serialize)]
struct RequestContent {
    parts: Vec<TextPart>,
}

#[derive(Serialize, Deserialize)]
struct TextPart {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Clone)]
pub struct Curator {
    config: Option<CuratorConfig>,
    client: reqwest::Client,
}

impl Curator {
    pub fn new(config: Option<CuratorConfig>, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    /// Commentary on a work's stated intent. Infallible by contract: any
    /// error is logged and replaced with [`FALLBACK_COMMENTARY`].
    pub async fn commentary(&self, intent: &str, title: &str) -> String {
        let Some(config) = &self.config else {
            debug!("curator not configured, returning fallback commentary");
            return FALLBACK_COMMENTARY.to_owned();
        };

        match self.generate(config, intent, title).await {
            Ok(text) => text,
            Err(e) => {
                warn!("curator request failed: {e:?}");
                FALLBACK_COMMENTARY.to_owned()
            }
        }
    }

    async fn generate(&self, config: &CuratorConfig, intent: &str, title: &str) -> Result<String> {
        let url = config
            .endpoint
            .join(&format!("models/{}:generateContent", config.model))
            .context("failed to build curator URL")?;
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![TextPart {
                    text: prompt(intent, title),
                }],
            }],
        };

        let res = self
            .client
            .post(url)
            .query(&[("key", config.api_key.as_str())])
            .timeout(Duration::from_secs(config.timeout))
            .json(&request)
            .send()
            .await
            .context("failed to send curator request")?;
        if !res.status().is_success() {
            bail!("curator endpoint returned {}", res.status());
        }

        let response: GenerateResponse = res
            .json()
            .await
            .context("failed to decode curator response")?;
        let text: String = response
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();
        if text.is_empty() {
            bail!("curator response held no text");
        }

        Ok(text)
    }
}

fn prompt(intent: &str, title: &str) -> String {
    format!(
        "You are an art curator for the KOMOREBI platform. \
         Analyze the author's intent for their work titled \"{title}\": \"{intent}\". \
         Provide a brief reflective commentary (max 3 sentences) that helps the author \
         deepen their aesthetic responsibility. \
         Maintain a poetic, serious, and minimalist tone. Response must be in English."
    )
}
