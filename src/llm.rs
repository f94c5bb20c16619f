// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CLIENTE LLM
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Traits e implementações para interação com modelos de linguagem:
// - TextCompleter: completions de chat (agente ReAct e composição do roteiro)
// - Embedder: vetores para indexação e busca por similaridade
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::types::FailureReason;

/// Máximo de textos por requisição de embeddings
const EMBEDDING_BATCH_SIZE: usize = 100;

/// Erros do cliente LLM
#[derive(Debug, Clone, thiserror::Error)]
#[allow(missing_docs)]
pub enum LlmError {
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Rate limit exceeded: {0}")]
    RateLimitError(String),

    #[error("Invalid response format: {0}")]
    ParseError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Model returned an empty response")]
    EmptyResponse,
}

impl LlmError {
    /// Classificação do erro
    pub fn reason(&self) -> FailureReason {
        match self {
            Self::ApiError { .. } => FailureReason::Upstream,
            Self::RateLimitError(_) => FailureReason::UpstreamQuota,
            Self::ParseError(_) | Self::EmptyResponse => FailureReason::ParseEmpty,
            Self::NetworkError(_) => FailureReason::Network,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::ParseError(e.to_string())
        } else {
            Self::NetworkError(e.to_string())
        }
    }
}

/// Texto gerado pelo modelo
#[derive(Debug, Clone)]
pub struct Completion {
    /// Texto gerado
    pub text: String,
    /// Tokens consumidos (0 quando o provedor não informa)
    pub tokens_used: u64,
}

/// Interface de completions de texto.
///
/// `stop` interrompe a geração na primeira ocorrência de qualquer sequência.
#[async_trait]
pub trait TextCompleter: Send + Sync {
    /// Gera uma completion para o prompt
    async fn complete(&self, prompt: &str, stop: &[&str]) -> Result<Completion, LlmError>;
}

/// Interface de embeddings.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Gera embedding para um texto
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError>;

    /// Gera embeddings em batch, na mesma ordem da entrada
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// IMPLEMENTAÇÃO OPENAI
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Cliente para a API OpenAI (ou compatível)
pub struct OpenAiClient {
    api_key: String,
    model: String,
    embedding_model: String,
    base_url: String,
    temperature: f32,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<&'a str>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: u64,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl OpenAiClient {
    /// Cria cliente a partir da configuração explícita
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            embedding_model: config.embedding_model.clone(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            temperature: config.temperature,
            client: reqwest::Client::new(),
        }
    }

    async fn post_json<B: Serialize + ?Sized, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, LlmError> {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, path))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&raw)
                .map(|e| e.error.message)
                .unwrap_or(raw);
            return Err(if status.as_u16() == 429 {
                LlmError::RateLimitError(message)
            } else {
                LlmError::ApiError {
                    status: status.as_u16(),
                    message,
                }
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl TextCompleter for OpenAiClient {
    async fn complete(&self, prompt: &str, stop: &[&str]) -> Result<Completion, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            stop: stop.to_vec(),
        };

        log::debug!("🤖 chat/completions ({} chars de prompt)", prompt.len());
        let response: ChatResponse = self.post_json("chat/completions", &request).await?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LlmError::EmptyResponse)?;

        Ok(Completion {
            text,
            tokens_used: response.usage.map(|u| u.total_tokens).unwrap_or(0),
        })
    }
}

#[async_trait]
impl Embedder for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyResponse)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        let mut vectors = Vec::with_capacity(texts.len());

        for batch in texts.chunks(EMBEDDING_BATCH_SIZE) {
            let request = EmbeddingRequest {
                model: &self.embedding_model,
                input: batch,
            };
            let mut response: EmbeddingResponse = self.post_json("embeddings", &request).await?;

            if response.data.len() != batch.len() {
                return Err(LlmError::ParseError(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    response.data.len()
                )));
            }
            response.data.sort_by_key(|d| d.index);
            vectors.extend(response.data.into_iter().map(|d| d.embedding));
        }

        log::debug!("🧮 {} embeddings gerados", vectors.len());
        Ok(vectors)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// IMPLEMENTAÇÕES MOCK PARA TESTES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Completer com respostas roteirizadas.
///
/// Cada chamada consome a próxima resposta da fila; com a fila vazia
/// devolve `fallback`. Todos os prompts recebidos ficam registrados.
#[derive(Debug, Default)]
pub struct MockCompleter {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    fallback: Option<String>,
    fail_with: Option<LlmError>,
    prompts: Mutex<Vec<String>>,
}

impl MockCompleter {
    /// Sempre responde o mesmo texto
    pub fn always(text: &str) -> Self {
        Self {
            fallback: Some(text.into()),
            ..Self::default()
        }
    }

    /// Responde as mensagens em ordem
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            ..Self::default()
        }
    }

    /// Sempre falha com o erro informado
    pub fn failing(error: LlmError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::default()
        }
    }

    /// Prompts recebidos até agora
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TextCompleter for MockCompleter {
    async fn complete(&self, prompt: &str, _stop: &[&str]) -> Result<Completion, LlmError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        if let Some(error) = &self.fail_with {
            return Err(error.clone());
        }

        let next = self.replies.lock().ok().and_then(|mut r| r.pop_front());

        let text = match next {
            Some(reply) => reply?,
            None => self.fallback.clone().ok_or(LlmError::EmptyResponse)?,
        };

        Ok(Completion {
            tokens_used: (text.len() / 4) as u64,
            text,
        })
    }
}

/// Embedder determinístico baseado em "hashing trick".
///
/// Cada token alfanumérico (minúsculo) incrementa um bucket FNV-1a;
/// o vetor é normalizado. Textos com vocabulário em comum ficam próximos.
#[derive(Debug, Clone)]
pub struct MockEmbedder {
    dimensions: usize,
    fail_with: Option<LlmError>,
    fail_queries_with: Option<LlmError>,
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self {
            dimensions: 64,
            fail_with: None,
            fail_queries_with: None,
        }
    }
}

impl MockEmbedder {
    /// Embedder que sempre falha
    pub fn failing(error: LlmError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::default()
        }
    }

    /// Indexa normalmente, mas falha ao embutir consultas isoladas
    pub fn failing_queries(error: LlmError) -> Self {
        Self {
            fail_queries_with: Some(error),
            ..Self::default()
        }
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let bucket = fnv1a(&token.to_lowercase()) as usize % self.dimensions;
            vector[bucket] += 1.0;
        }
        crate::knowledge::normalize(&mut vector);
        vector
    }
}

fn fnv1a(text: &str) -> u64 {
    text.bytes().fold(0xcbf29ce484222325u64, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(0x100000001b3)
    })
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        if let Some(error) = self.fail_with.as_ref().or(self.fail_queries_with.as_ref()) {
            return Err(error.clone());
        }
        Ok(self.vectorize(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        if let Some(error) = &self.fail_with {
            return Err(error.clone());
        }
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }
}
