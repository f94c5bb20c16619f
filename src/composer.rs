// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// COMPOSITOR DO ROTEIRO
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Junta contexto da pesquisa, trechos da base de conhecimento e a pergunta
// num único prompt de "gerente de agência de viagens".
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::sync::Arc;

use crate::llm::{LlmError, TextCompleter};
use crate::prompt::{PromptTemplate, TemplateError};
use crate::types::{FailureReason, ItineraryResponse, Query, ResearchSummary, RetrievedDocumentSet};

/// Prompt do roteiro final
pub const ITINERARY_TEMPLATE: &str = "Você é um gerente de uma agência de viagens.
Sua resposta final deverá ser um roteiro completo e detalhado.
Utilize o contexto de eventos e preços de passagens, o input do usuário e também
os documentos relevantes para elaborar o roteiro.
Contexto: {web_context}
Documento relevante: {relevant_documents}
Usuário: {query}
Assistente:";

/// Erros de composição
#[derive(Debug, Clone, thiserror::Error)]
pub enum ComposeError {
    /// Falha do modelo
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Resposta vazia ou só com espaços
    #[error("Model returned an empty itinerary")]
    EmptyItinerary,

    /// Template do roteiro inválido
    #[error("Invalid itinerary prompt: {0}")]
    Template(#[from] TemplateError),
}

impl ComposeError {
    /// Classificação do erro
    pub fn reason(&self) -> FailureReason {
        match self {
            Self::Llm(e) => e.reason(),
            Self::EmptyItinerary => FailureReason::ParseEmpty,
            Self::Template(e) => e.reason(),
        }
    }
}

/// Gera o roteiro final com uma única chamada ao modelo
pub struct ItineraryComposer {
    completer: Arc<dyn TextCompleter>,
    template: PromptTemplate,
}

impl ItineraryComposer {
    /// Cria o compositor com o template fixo
    pub fn new(completer: Arc<dyn TextCompleter>) -> Self {
        Self {
            completer,
            template: PromptTemplate::new(ITINERARY_TEMPLATE),
        }
    }

    /// Monta o prompt (sem chamar o modelo)
    pub fn build_prompt(
        &self,
        query: &Query,
        research: &ResearchSummary,
        documents: &RetrievedDocumentSet,
    ) -> Result<String, ComposeError> {
        let relevant = documents.joined();
        let prompt = self.template.render(&[
            ("web_context", research.as_str()),
            ("relevant_documents", relevant.as_str()),
            ("query", query.as_str()),
        ])?;
        Ok(prompt)
    }

    /// Gera o roteiro
    pub async fn compose(
        &self,
        query: &Query,
        research: &ResearchSummary,
        documents: &RetrievedDocumentSet,
    ) -> Result<ItineraryResponse, ComposeError> {
        let prompt = self.build_prompt(query, research, documents)?;
        log::info!(
            "✍️ Compondo roteiro ({} documentos, prompt de {} chars)",
            documents.len(),
            prompt.chars().count()
        );

        let completion = self.completer.complete(&prompt, &[]).await?;
        if completion.text.trim().is_empty() {
            log::warn!("⚠️ Modelo devolveu roteiro vazio");
            return Err(ComposeError::EmptyItinerary);
        }

        log::info!("🎟️ Tokens: {}", completion.tokens_used);
        Ok(ItineraryResponse(completion.text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockCompleter;
    use crate::types::{ChunkMetadata, DocumentChunk, ScoredChunk};

    fn documents(texts: &[&str]) -> RetrievedDocumentSet {
        RetrievedDocumentSet {
            documents: texts
                .iter()
                .enumerate()
                .map(|(i, text)| ScoredChunk {
                    chunk: DocumentChunk {
                        text: text.to_string(),
                        metadata: ChunkMetadata {
                            source: "https://www.dicasdeviagem.com/inglaterra/".into(),
                            section: "postcontentwrap".into(),
                            chunk_index: i,
                        },
                    },
                    score: 1.0 - i as f32 * 0.1,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_compose_renders_prompt() {
        let completer = Arc::new(MockCompleter::always("Dia 1: chegada em Londres."));
        let composer = ItineraryComposer::new(completer.clone());

        let itinerary = composer
            .compose(
                &Query::new("Londres em agosto"),
                &ResearchSummary("Festival em agosto; voos a R$ 4.000".into()),
                &documents(&["Museus gratuitos.", "Use o Oyster card."]),
            )
            .await
            .unwrap();

        assert_eq!(itinerary.as_str(), "Dia 1: chegada em Londres.");
        let prompts = completer.prompts();
        let prompt = &prompts[0];
        assert!(prompt.starts_with("Você é um gerente de uma agência de viagens."));
        assert!(prompt.contains("Contexto: Festival em agosto; voos a R$ 4.000\n"));
        assert!(prompt.contains("Documento relevante: Museus gratuitos.\n\nUse o Oyster card.\n"));
        assert!(prompt.ends_with("Usuário: Londres em agosto\nAssistente:"));
    }

    #[tokio::test]
    async fn test_empty_documents_still_compose() {
        let composer = ItineraryComposer::new(Arc::new(MockCompleter::always("roteiro")));
        let prompt = composer
            .build_prompt(
                &Query::new("q"),
                &ResearchSummary("ctx".into()),
                &RetrievedDocumentSet::default(),
            )
            .unwrap();
        assert!(prompt.contains("Documento relevante: \n"));
    }

    #[tokio::test]
    async fn test_blank_completion_is_error() {
        let composer = ItineraryComposer::new(Arc::new(MockCompleter::always("  \n ")));
        let err = composer
            .compose(&Query::new("q"), &ResearchSummary("ctx".into()), &documents(&[]))
            .await
            .unwrap_err();
        assert!(matches!(err, ComposeError::EmptyItinerary));
        assert_eq!(err.reason(), FailureReason::ParseEmpty);
    }

    #[tokio::test]
    async fn test_llm_failure() {
        let composer = ItineraryComposer::new(Arc::new(MockCompleter::failing(
            LlmError::ApiError {
                status: 500,
                message: "internal".into(),
            },
        )));
        let err = composer
            .compose(&Query::new("q"), &ResearchSummary("ctx".into()), &documents(&[]))
            .await
            .unwrap_err();
        assert_eq!(err.reason(), FailureReason::Upstream);
    }

    #[test]
    fn test_template_variables() {
        let template = PromptTemplate::new(ITINERARY_TEMPLATE);
        assert_eq!(
            template.variables(),
            &["web_context".to_string(), "relevant_documents".to_string(), "query".to_string()]
        );
    }
}
