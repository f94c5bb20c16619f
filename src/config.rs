// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CONFIGURAÇÃO DO LLM, AGENTE E BASE DE CONHECIMENTO
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Configurações lidas uma única vez das variáveis de ambiente (ou .env)
// e passadas explicitamente para cada componente na construção.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::fmt;
use std::str::FromStr;

/// Página de dicas usada como base de conhecimento.
pub const DEFAULT_SOURCE_URL: &str = "https://www.dicasdeviagem.com/inglaterra/";

/// Seletores CSS das regiões extraídas da página de referência.
pub const DEFAULT_SELECTORS: [&str; 2] = [
    ".postcontentwrap",
    ".pagetitleloading.background-imaged.loading-dark",
];

/// Erros de configuração
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: &'static str, message: String },
}

/// Configuração do provedor de LLM (chat + embeddings).
#[derive(Clone)]
pub struct LlmConfig {
    /// Credencial da API (obrigatória)
    pub api_key: String,
    /// Modelo de chat
    pub model: String,
    /// Modelo de embeddings
    pub embedding_model: String,
    /// URL base da API compatível com OpenAI
    pub api_base_url: String,
    /// Temperatura padrão
    pub temperature: f32,
}

impl LlmConfig {
    /// Cria configuração com os padrões e a chave informada.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "gpt-3.5-turbo".into(),
            embedding_model: "text-embedding-ada-002".into(),
            api_base_url: "https://api.openai.com/v1".into(),
            temperature: 0.7,
        }
    }
}

// Debug manual para nunca vazar a chave em logs
impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("embedding_model", &self.embedding_model)
            .field("api_base_url", &self.api_base_url)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Configuração do agente de pesquisa.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Máximo de ciclos Thought/Action antes de desistir
    pub max_iterations: usize,
    /// URL do template ReAct remoto (None = template embutido)
    pub prompt_url: Option<String>,
    /// Idioma da Wikipedia consultada
    pub wikipedia_lang: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 15,
            prompt_url: None,
            wikipedia_lang: "en".into(),
        }
    }
}

/// Configuração da base de conhecimento (indexação + recuperação).
#[derive(Debug, Clone)]
pub struct KnowledgeConfig {
    /// Página de referência
    pub source_url: String,
    /// Seletores CSS das regiões a extrair
    pub selectors: Vec<String>,
    /// Tamanho máximo do chunk em caracteres
    pub chunk_size: usize,
    /// Sobreposição entre chunks consecutivos
    pub chunk_overlap: usize,
    /// Número de chunks retornados por busca
    pub top_k: usize,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.into(),
            selectors: DEFAULT_SELECTORS.iter().map(|s| s.to_string()).collect(),
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 4,
        }
    }
}

/// Configuração completa da aplicação.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// LLM
    pub llm: LlmConfig,
    /// Agente
    pub agent: AgentConfig,
    /// Base de conhecimento
    pub knowledge: KnowledgeConfig,
}

/// Lê uma variável numérica; valores inválidos são ignorados com aviso.
fn parse_env<T: FromStr>(var: &str) -> Option<T> {
    let raw = std::env::var(var).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("⚠️ {}='{}' inválido, usando padrão", var, raw);
            None
        }
    }
}

fn non_empty_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

/// Carrega configuração do LLM.
///
/// Variáveis suportadas:
/// - `OPENAI_API_KEY`: credencial (obrigatória)
/// - `LLM_MODEL`: modelo de chat (padrão: "gpt-3.5-turbo")
/// - `LLM_EMBEDDING_MODEL`: modelo de embeddings (padrão: "text-embedding-ada-002")
/// - `LLM_API_BASE_URL`: URL base (padrão: "https://api.openai.com/v1")
/// - `LLM_TEMPERATURE`: temperatura (padrão: 0.7)
pub fn load_llm_config() -> Result<LlmConfig, ConfigError> {
    let api_key = non_empty_env("OPENAI_API_KEY").ok_or(ConfigError::MissingVar("OPENAI_API_KEY"))?;
    let mut config = LlmConfig::new(api_key);

    if let Some(model) = non_empty_env("LLM_MODEL") {
        config.model = model;
    }
    if let Some(model) = non_empty_env("LLM_EMBEDDING_MODEL") {
        config.embedding_model = model;
    }
    if let Some(base) = non_empty_env("LLM_API_BASE_URL") {
        url::Url::parse(&base).map_err(|e| ConfigError::InvalidValue {
            var: "LLM_API_BASE_URL",
            message: e.to_string(),
        })?;
        config.api_base_url = base.trim_end_matches('/').to_string();
    }
    if let Some(temperature) = parse_env::<f32>("LLM_TEMPERATURE") {
        config.temperature = temperature;
    }

    log::info!("📦 LLM: {} | embeddings: {}", config.model, config.embedding_model);
    Ok(config)
}

/// Carrega configuração do agente.
///
/// - `AGENT_MAX_ITERATIONS`: máximo de iterações (padrão: 15)
/// - `REACT_PROMPT_URL`: template ReAct remoto (opcional)
/// - `WIKIPEDIA_LANG`: idioma da Wikipedia (padrão: "en")
pub fn load_agent_config() -> AgentConfig {
    let mut config = AgentConfig::default();

    if let Some(max) = parse_env::<usize>("AGENT_MAX_ITERATIONS") {
        if max > 0 {
            config.max_iterations = max;
            log::info!("📦 AGENT_MAX_ITERATIONS={}", max);
        }
    }
    config.prompt_url = non_empty_env("REACT_PROMPT_URL");
    if let Some(lang) = non_empty_env("WIKIPEDIA_LANG") {
        config.wikipedia_lang = lang.trim().to_lowercase();
    }

    config
}

/// Carrega configuração da base de conhecimento.
///
/// - `KNOWLEDGE_SOURCE_URL`: página de referência
/// - `KNOWLEDGE_TOP_K`: chunks retornados (padrão: 4)
pub fn load_knowledge_config() -> Result<KnowledgeConfig, ConfigError> {
    let mut config = KnowledgeConfig::default();

    if let Some(source) = non_empty_env("KNOWLEDGE_SOURCE_URL") {
        url::Url::parse(&source).map_err(|e| ConfigError::InvalidValue {
            var: "KNOWLEDGE_SOURCE_URL",
            message: e.to_string(),
        })?;
        config.source_url = source;
    }
    if let Some(top_k) = parse_env::<usize>("KNOWLEDGE_TOP_K") {
        if top_k > 0 {
            config.top_k = top_k;
        }
    }

    log::info!("📦 Base de conhecimento: {} (top_k={})", config.source_url, config.top_k);
    Ok(config)
}

/// Carrega toda a configuração a partir do ambiente.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    Ok(AppConfig {
        llm: load_llm_config()?,
        agent: load_agent_config(),
        knowledge: load_knowledge_config()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_config_defaults() {
        let config = LlmConfig::new("sk-test");
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.embedding_model, "text-embedding-ada-002");
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_llm_config_debug_hides_key() {
        let config = LlmConfig::new("sk-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_knowledge_config_defaults() {
        let config = KnowledgeConfig::default();
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(config.top_k, 4);
        assert_eq!(config.selectors.len(), 2);
        assert_eq!(config.source_url, DEFAULT_SOURCE_URL);
    }

    #[test]
    fn test_agent_config_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.max_iterations, 15);
        assert!(config.prompt_url.is_none());
        assert_eq!(config.wikipedia_lang, "en");
    }
}
