//! Recording test doubles for the pipeline's external capabilities.

use async_trait::async_trait;
use pagecraft::cost::CostLedger;
use pagecraft::error::ApiError;
use pagecraft::image::{ImagePipeline, ImageRequest};
use pagecraft::provider::{GenerationOutput, TextGenerator};
use pagecraft::request::ResolvedMode;
use pagecraft::retrieval::VectorSearch;
use pagecraft::types::{BlockSpecification, ContextChunk, MediaAsset};
use parking_lot::Mutex;

/// Generator that answers every call with the same scripted reply.
pub struct ScriptedGenerator {
    reply: Result<String, String>,
    pub prompts: Mutex<Vec<String>>,
    pub modes: Mutex<Vec<ResolvedMode>>,
}

impl ScriptedGenerator {
    pub fn replying(content: &str) -> Self {
        Self {
            reply: Ok(content.to_string()),
            prompts: Mutex::new(Vec::new()),
            modes: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
            modes: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        prompt: &str,
        mode: &ResolvedMode,
        _block: Option<&BlockSpecification>,
    ) -> Result<GenerationOutput, ApiError> {
        self.prompts.lock().push(prompt.to_string());
        self.modes.lock().push(*mode);
        match &self.reply {
            Ok(content) => Ok(GenerationOutput {
                content: content.clone(),
                prompt_tokens: 120,
                completion_tokens: 80,
                token_count: 200,
                cost_usd: 0.0036,
            }),
            Err(message) => Err(ApiError::ProviderRequestFailed(message.clone())),
        }
    }

    fn service_name(&self) -> &str {
        "openai"
    }
}

/// Vector search that returns fixed chunks, or fails every call.
pub struct StaticSearch {
    chunks: Option<Vec<ContextChunk>>,
    pub queries: Mutex<Vec<String>>,
}

impl StaticSearch {
    pub fn with_chunks(chunks: Vec<ContextChunk>) -> Self {
        Self {
            chunks: Some(chunks),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            chunks: None,
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl VectorSearch for StaticSearch {
    async fn search(
        &self,
        query: &str,
        _k: usize,
        _min_score: f64,
        _namespaces: &[String],
    ) -> Result<Vec<ContextChunk>, ApiError> {
        self.queries.lock().push(query.to_string());
        self.chunks
            .clone()
            .ok_or_else(|| ApiError::RetrievalFailed("connection refused".to_string()))
    }
}

/// Image pipeline that records requests and either succeeds or fails.
pub struct RecordingImages {
    fail: bool,
    pub requests: Mutex<Vec<ImageRequest>>,
}

impl RecordingImages {
    pub fn working() -> Self {
        Self {
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn broken() -> Self {
        Self {
            fail: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl ImagePipeline for RecordingImages {
    async fn request(&self, request: &ImageRequest) -> Result<MediaAsset, ApiError> {
        self.requests.lock().push(request.clone());
        if self.fail {
            return Err(ApiError::ImageFailed("quota exceeded".to_string()));
        }
        Ok(MediaAsset {
            id: "media-42".to_string(),
            url: "https://cdn.example.com/media-42.jpg".to_string(),
            alt_text: request.alt_text.clone(),
            license: "cc0".to_string(),
            width: 1600,
            height: 900,
            cost_usd: 0.04,
        })
    }
}

#[derive(Default)]
pub struct RecordingLedger {
    pub entries: Mutex<Vec<f64>>,
}

impl RecordingLedger {
    pub fn total(&self) -> f64 {
        self.entries.lock().iter().sum()
    }
}

impl CostLedger for RecordingLedger {
    fn add(&self, amount_usd: f64) {
        self.entries.lock().push(amount_usd);
    }
}
