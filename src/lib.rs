//! # Travel Itinerary - Gerador de Roteiros de Viagem
//!
//! Este crate gera **roteiros de viagem** a partir de uma pergunta em
//! linguagem natural, combinando pesquisa na web com uma base de dicas
//! de viagem indexada a cada requisição.
//!
//! ## Como funciona?
//!
//! Para cada pergunta (ex: "Vou para Londres em agosto, monte um roteiro"):
//! 1. Um agente ReAct pesquisa eventos e preços de passagens (DuckDuckGo + Wikipedia)
//! 2. A página de dicas é baixada, dividida em chunks e indexada por embeddings
//! 3. Os trechos mais próximos da pergunta são recuperados
//! 4. O modelo compõe o roteiro final com tudo isso no prompt
//!
//! ## Arquitetura Principal
//!
//! ### 1. Agente de Pesquisa (`agent`)
//! Loop Thought → Action → Observation até `Final Answer:` ou o limite
//! de iterações.
//!
//! ### 2. Base de Conhecimento (`knowledge`)
//! Extração por seletores CSS, chunking recursivo com sobreposição e
//! busca exaustiva por similaridade cosseno.
//!
//! ### 3. Compositor (`composer`)
//! Prompt fixo de "gerente de agência de viagens".
//!
//! ### 4. Pipeline e Handler (`pipeline`, `handler`)
//! Estágios em sequência com erro tipado por estágio; o handler converte
//! tudo em resposta 200/400 no formato serverless.
//!
//! ## Exemplo de Uso
//!
//! ```rust,ignore
//! use travel_itinerary::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     let handler = ItineraryHandler::new(TravelPipeline::from_config(&config));
//!     let event = serde_json::json!({ "body": "{\"question\": \"Roteiro para Londres\"}" });
//!     let response = handler.handle(event).await;
//!     println!("{}", response.body);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Tipos fundamentais compartilhados por todo o sistema.
///
/// - [`Query`]: pergunta do usuário
/// - [`ResearchSummary`]: resposta do agente de pesquisa
/// - [`DocumentChunk`]: trecho da página de dicas
/// - [`RetrievedDocumentSet`]: trechos recuperados, ranqueados
/// - [`FailureReason`]: classificação comum dos erros
pub mod types;

/// Configuração lida do ambiente e passada explicitamente aos componentes.
pub mod config;

/// Clientes para Large Language Models (LLMs).
///
/// Define as traits `TextCompleter` e `Embedder` e implementações para:
/// - OpenAI (ou API compatível)
/// - Mocks determinísticos para testes
pub mod llm;

/// Ferramentas de busca usadas pelo agente (DuckDuckGo, Wikipedia).
pub mod search;

/// Templates de prompt com placeholders `{nome}`.
pub mod prompt;

/// Agente de pesquisa no formato ReAct.
pub mod agent;

/// Indexação e recuperação da base de conhecimento.
pub mod knowledge;

/// Composição do roteiro final.
pub mod composer;

/// Orquestração dos estágios por requisição.
pub mod pipeline;

/// Handler de eventos serverless (statusCode/headers/body).
pub mod handler;

/// Utilitários de texto, chunking e medição de tempo.
pub mod utils;

/// Servidor HTTP (feature `server`).
#[cfg(feature = "server")]
pub mod server;

// Re-exports principais
pub use agent::ResearchAgent;
pub use composer::ItineraryComposer;
pub use config::{load_config, AgentConfig, AppConfig, KnowledgeConfig, LlmConfig};
pub use handler::{ItineraryHandler, LambdaResponse};
pub use knowledge::{ContextRetriever, KnowledgeIndexer};
pub use pipeline::{PipelineError, Stage, TravelPipeline};
pub use types::*;

/// Versão do crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Imports mais usados
pub mod prelude {
    pub use crate::agent::{AgentError, PromptSource, ResearchAgent};
    pub use crate::composer::{ComposeError, ItineraryComposer};
    pub use crate::config::{load_config, AppConfig};
    pub use crate::handler::{ItineraryHandler, LambdaResponse};
    pub use crate::knowledge::{
        ContextRetriever, IndexError, KnowledgeIndexer, PageFetcher, RetrievalError,
    };
    pub use crate::llm::{Embedder, TextCompleter};
    pub use crate::pipeline::{PipelineError, Stage, TravelPipeline};
    pub use crate::search::SearchTool;
    pub use crate::types::*;
}
