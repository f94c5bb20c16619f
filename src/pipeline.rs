// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PIPELINE DO ROTEIRO
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Estágios executados em sequência para cada pergunta:
//
//   ┌──────────┐   ┌──────────┐   ┌───────────┐   ┌─────────────┐
//   │ research │ → │ indexing │ → │ retrieval │ → │ composition │
//   └──────────┘   └──────────┘   └───────────┘   └─────────────┘
//
// Cada estágio só começa depois que o anterior terminou. A primeira falha
// interrompe a execução e vira um `PipelineError` com o estágio de origem.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::fmt;
use std::sync::Arc;

use crate::agent::{AgentError, ResearchAgent};
use crate::composer::{ComposeError, ItineraryComposer};
use crate::config::AppConfig;
use crate::knowledge::{
    ContextRetriever, HttpPageFetcher, IndexError, KnowledgeIndexer, RetrievalError,
};
use crate::llm::OpenAiClient;
use crate::search::{DuckDuckGoSearch, SearchTool, WikipediaLookup};
use crate::types::{FailureReason, ItineraryResponse, Query};
use crate::utils::{StageTimer, StageTimings};

/// Estágio do pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Agente de pesquisa
    Research,
    /// Download, chunking e embeddings da página
    Indexing,
    /// Busca dos chunks mais próximos
    Retrieval,
    /// Geração do roteiro
    Composition,
}

impl Stage {
    /// Nome do estágio
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::Indexing => "indexing",
            Self::Retrieval => "retrieval",
            Self::Composition => "composition",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Falha de um estágio do pipeline
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{stage} failed: {message}")]
pub struct PipelineError {
    /// Estágio que falhou
    pub stage: Stage,
    /// Classificação da falha
    pub reason: FailureReason,
    /// Texto do erro original
    pub message: String,
}

impl PipelineError {
    /// Cria o erro
    pub fn new(stage: Stage, reason: FailureReason, message: impl Into<String>) -> Self {
        Self {
            stage,
            reason,
            message: message.into(),
        }
    }
}

impl From<AgentError> for PipelineError {
    fn from(e: AgentError) -> Self {
        Self::new(Stage::Research, e.reason(), e.to_string())
    }
}

impl From<IndexError> for PipelineError {
    fn from(e: IndexError) -> Self {
        Self::new(Stage::Indexing, e.reason(), e.to_string())
    }
}

impl From<RetrievalError> for PipelineError {
    fn from(e: RetrievalError) -> Self {
        match e {
            RetrievalError::Index(inner) => inner.into(),
            other => Self::new(Stage::Retrieval, other.reason(), other.to_string()),
        }
    }
}

impl From<ComposeError> for PipelineError {
    fn from(e: ComposeError) -> Self {
        Self::new(Stage::Composition, e.reason(), e.to_string())
    }
}

/// Orquestra pesquisa, base de conhecimento e composição
pub struct TravelPipeline {
    agent: ResearchAgent,
    retriever: ContextRetriever,
    composer: ItineraryComposer,
}

impl TravelPipeline {
    /// Monta o pipeline com componentes já construídos
    pub fn new(agent: ResearchAgent, retriever: ContextRetriever, composer: ItineraryComposer) -> Self {
        Self {
            agent,
            retriever,
            composer,
        }
    }

    /// Monta o pipeline com os clientes reais (OpenAI, DuckDuckGo, Wikipedia)
    pub fn from_config(config: &AppConfig) -> Self {
        let client = Arc::new(OpenAiClient::from_config(&config.llm));

        let tools: Vec<Arc<dyn SearchTool>> = vec![
            Arc::new(DuckDuckGoSearch::new()),
            Arc::new(WikipediaLookup::new(&config.agent.wikipedia_lang)),
        ];
        let agent = ResearchAgent::new(client.clone(), tools, &config.agent);

        let indexer = KnowledgeIndexer::new(
            Arc::new(HttpPageFetcher::new()),
            client.clone(),
            config.knowledge.clone(),
        );
        let retriever = ContextRetriever::new(indexer);
        let composer = ItineraryComposer::new(client);

        log::info!("🚀 Pipeline pronto (modelo: {})", config.llm.model);
        Self::new(agent, retriever, composer)
    }

    /// Gera o roteiro para a pergunta
    pub async fn run(&self, query: &Query) -> Result<ItineraryResponse, PipelineError> {
        let invocation = uuid::Uuid::new_v4().to_string();
        let id = &invocation[..8];
        let mut timings = StageTimings::new();

        log::info!("🧭 [{}] Nova requisição: {}", id, query);

        let result = self.run_stages(query, &mut timings).await;
        match &result {
            Ok(itinerary) => log::info!(
                "✅ [{}] Roteiro gerado ({} chars) | {}",
                id,
                itinerary.as_str().chars().count(),
                timings.summary()
            ),
            Err(e) => log::error!("❌ [{}] {} ({})", id, e, e.reason),
        }
        result
    }

    async fn run_stages(
        &self,
        query: &Query,
        timings: &mut StageTimings,
    ) -> Result<ItineraryResponse, PipelineError> {
        let timer = StageTimer::start(Stage::Research.as_str());
        let research = self.agent.collect(query).await?;
        timings.record(Stage::Research.as_str(), timer.stop_and_log());

        let timer = StageTimer::start(Stage::Indexing.as_str());
        let index = self.retriever.indexer().build_index().await?;
        timings.record(Stage::Indexing.as_str(), timer.stop_and_log());

        let timer = StageTimer::start(Stage::Retrieval.as_str());
        let documents = self.retriever.search(&index, query).await?;
        timings.record(Stage::Retrieval.as_str(), timer.stop_and_log());
        drop(index);

        let timer = StageTimer::start(Stage::Composition.as_str());
        let itinerary = self.composer.compose(query, &research, &documents).await?;
        timings.record(Stage::Composition.as_str(), timer.stop_and_log());

        Ok(itinerary)
    }
}
