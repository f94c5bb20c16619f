// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BASE DE CONHECIMENTO
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Indexação da página de dicas e recuperação dos trechos relevantes:
//
//   fetch HTML → seções (seletores CSS) → chunks → embeddings → índice
//   query → embedding → top-k por similaridade cosseno
//
// O índice é reconstruído a cada chamada e descartado no fim.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

mod index;
mod loader;

pub use index::{cosine, normalize, DimensionMismatch, SimilarityIndex};
pub use loader::{
    extract_sections, FetchError, HttpPageFetcher, PageFetcher, PageSection, StaticPageFetcher,
};

use std::sync::Arc;

use crate::config::KnowledgeConfig;
use crate::llm::{Embedder, LlmError};
use crate::types::{ChunkMetadata, DocumentChunk, FailureReason, Query, RetrievedDocumentSet};
use crate::utils::{split_text, SplitterOptions};

/// Erros de indexação
#[derive(Debug, Clone, thiserror::Error)]
#[allow(missing_docs)]
pub enum IndexError {
    #[error("Failed to load knowledge page: {0}")]
    Fetch(#[from] FetchError),

    #[error("No text found in {url} for the configured selectors")]
    EmptyExtraction { url: String },

    #[error("Failed to embed chunks: {0}")]
    Embedding(#[source] LlmError),

    #[error("Embedder returned {got} vectors for {expected} chunks")]
    VectorCountMismatch { expected: usize, got: usize },

    #[error(transparent)]
    Dimension(#[from] DimensionMismatch),
}

impl IndexError {
    /// Classificação do erro
    pub fn reason(&self) -> FailureReason {
        match self {
            Self::Fetch(e) => e.reason(),
            Self::EmptyExtraction { .. } => FailureReason::ParseEmpty,
            Self::Embedding(e) => e.reason(),
            Self::VectorCountMismatch { .. } | Self::Dimension(_) => FailureReason::ParseEmpty,
        }
    }
}

/// Erros de recuperação
#[derive(Debug, Clone, thiserror::Error)]
#[allow(missing_docs)]
pub enum RetrievalError {
    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("Failed to embed query: {0}")]
    QueryEmbedding(#[source] LlmError),

    #[error("Query embedding has dimension {got}, index has {expected}")]
    QueryDimension { expected: usize, got: usize },
}

impl RetrievalError {
    /// Classificação do erro
    pub fn reason(&self) -> FailureReason {
        match self {
            Self::Index(e) => e.reason(),
            Self::QueryEmbedding(e) => e.reason(),
            Self::QueryDimension { .. } => FailureReason::ParseEmpty,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// INDEXADOR
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Constrói o índice de similaridade da página de referência
pub struct KnowledgeIndexer {
    fetcher: Arc<dyn PageFetcher>,
    embedder: Arc<dyn Embedder>,
    config: KnowledgeConfig,
}

impl KnowledgeIndexer {
    /// Cria o indexador
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        embedder: Arc<dyn Embedder>,
        config: KnowledgeConfig,
    ) -> Self {
        Self {
            fetcher,
            embedder,
            config,
        }
    }

    /// Configuração em uso
    pub fn config(&self) -> &KnowledgeConfig {
        &self.config
    }

    /// Baixa, divide e extrai os chunks da página, sem embeddings
    pub async fn load_chunks(&self) -> Result<Vec<DocumentChunk>, IndexError> {
        let url = &self.config.source_url;
        let html = self.fetcher.fetch(url).await?;
        let sections = extract_sections(&html, &self.config.selectors)?;

        if sections.is_empty() {
            log::warn!("⚠️ Nenhum texto extraído de {}", url);
            return Err(IndexError::EmptyExtraction { url: url.clone() });
        }

        let options = SplitterOptions::new(self.config.chunk_size, self.config.chunk_overlap);
        let chunks: Vec<DocumentChunk> = sections
            .iter()
            .flat_map(|section| {
                split_text(&section.text, &options)
                    .into_iter()
                    .enumerate()
                    .map(move |(chunk_index, text)| DocumentChunk {
                        text,
                        metadata: ChunkMetadata {
                            source: url.clone(),
                            section: section.class.clone(),
                            chunk_index,
                        },
                    })
            })
            .collect();

        if chunks.is_empty() {
            return Err(IndexError::EmptyExtraction { url: url.clone() });
        }

        log::info!(
            "📄 {} seções → {} chunks de {}",
            sections.len(),
            chunks.len(),
            url
        );
        Ok(chunks)
    }

    /// Constrói um índice novo com todos os chunks da página
    pub async fn build_index(&self) -> Result<SimilarityIndex, IndexError> {
        let chunks = self.load_chunks().await?;
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();

        let vectors = self
            .embedder
            .embed_batch(&texts)
            .await
            .map_err(IndexError::Embedding)?;

        if vectors.len() != chunks.len() {
            return Err(IndexError::VectorCountMismatch {
                expected: chunks.len(),
                got: vectors.len(),
            });
        }

        let mut index = SimilarityIndex::new();
        for (chunk, vector) in chunks.into_iter().zip(vectors) {
            index.add(chunk, vector)?;
        }

        log::info!("🗂️ Índice pronto: {} vetores", index.len());
        Ok(index)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// RECUPERADOR
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Recupera os trechos da página mais próximos da pergunta
pub struct ContextRetriever {
    indexer: KnowledgeIndexer,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl ContextRetriever {
    /// Usa o mesmo embedder do indexador para a query
    pub fn new(indexer: KnowledgeIndexer) -> Self {
        let embedder = Arc::clone(&indexer.embedder);
        let top_k = indexer.config.top_k;
        Self {
            indexer,
            embedder,
            top_k,
        }
    }

    /// Indexador usado para montar o índice
    pub fn indexer(&self) -> &KnowledgeIndexer {
        &self.indexer
    }

    /// Indexa a página e devolve os `top_k` chunks mais similares
    pub async fn retrieve(&self, query: &Query) -> Result<RetrievedDocumentSet, RetrievalError> {
        let index = self.indexer.build_index().await?;
        self.search(&index, query).await
    }

    /// Busca num índice já construído
    pub async fn search(
        &self,
        index: &SimilarityIndex,
        query: &Query,
    ) -> Result<RetrievedDocumentSet, RetrievalError> {
        let vector = self
            .embedder
            .embed(query.as_str())
            .await
            .map_err(RetrievalError::QueryEmbedding)?;

        if let Some(expected) = index.dimension() {
            if expected != vector.len() {
                return Err(RetrievalError::QueryDimension {
                    expected,
                    got: vector.len(),
                });
            }
        }

        let documents = index.search(&vector, self.top_k);
        log::debug!(
            "🔎 {} documentos recuperados (melhor score: {:.3})",
            documents.len(),
            documents.first().map(|d| d.score).unwrap_or(0.0)
        );

        Ok(RetrievedDocumentSet { documents })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockEmbedder;
    use async_trait::async_trait;
    use mockall::mock;

    mock! {
        pub Fetcher {}

        #[async_trait]
        impl PageFetcher for Fetcher {
            async fn fetch(&self, url: &str) -> Result<String, FetchError>;
        }
    }

    fn page(paragraphs: &[&str]) -> String {
        let body: String = paragraphs.iter().map(|p| format!("<p>{}</p>\n\n", p)).collect();
        format!(
            r#"<html><body><div class="postcontentwrap">{}</div></body></html>"#,
            body
        )
    }

    fn indexer_for(html: &str, config: KnowledgeConfig) -> KnowledgeIndexer {
        KnowledgeIndexer::new(
            Arc::new(StaticPageFetcher::new(html)),
            Arc::new(MockEmbedder::default()),
            config,
        )
    }

    #[tokio::test]
    async fn test_build_index_fetches_configured_url() {
        let html = page(&["Londres tem museus gratuitos."]);
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url| url == "https://www.dicasdeviagem.com/inglaterra/")
            .times(1)
            .returning(move |_| Ok(html.clone()));

        let indexer = KnowledgeIndexer::new(
            Arc::new(fetcher),
            Arc::new(MockEmbedder::default()),
            KnowledgeConfig::default(),
        );

        let index = indexer.build_index().await.unwrap();
        assert_eq!(index.len(), 1);
    }

    #[tokio::test]
    async fn test_chunks_carry_metadata_and_respect_size() {
        let paragraph = "Passeio pelo Tâmisa com parada na Tower Bridge. ".repeat(40);
        let html = page(&[&paragraph, &paragraph, &paragraph]);
        let indexer = indexer_for(&html, KnowledgeConfig::default());

        let chunks = indexer.load_chunks().await.unwrap();
        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert!(chunk.text.chars().count() <= 1000);
            assert_eq!(chunk.metadata.section, "postcontentwrap");
            assert_eq!(chunk.metadata.chunk_index, i);
        }
    }

    #[tokio::test]
    async fn test_empty_extraction_is_parse_empty() {
        let indexer = indexer_for(
            "<html><body><p>sem seções</p></body></html>",
            KnowledgeConfig::default(),
        );
        let err = indexer.build_index().await.unwrap_err();
        assert!(matches!(err, IndexError::EmptyExtraction { .. }));
        assert_eq!(err.reason(), FailureReason::ParseEmpty);
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let indexer = KnowledgeIndexer::new(
            Arc::new(StaticPageFetcher::failing(FetchError::Network {
                url: "https://x".into(),
                message: "dns".into(),
            })),
            Arc::new(MockEmbedder::default()),
            KnowledgeConfig::default(),
        );
        let err = indexer.build_index().await.unwrap_err();
        assert_eq!(err.reason(), FailureReason::Network);
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let indexer = KnowledgeIndexer::new(
            Arc::new(StaticPageFetcher::new(&page(&["texto"]))),
            Arc::new(MockEmbedder::failing(LlmError::RateLimitError("quota".into()))),
            KnowledgeConfig::default(),
        );
        let err = indexer.build_index().await.unwrap_err();
        assert!(matches!(err, IndexError::Embedding(_)));
        assert_eq!(err.reason(), FailureReason::UpstreamQuota);
    }

    #[tokio::test]
    async fn test_retrieve_ranks_relevant_chunk_first() {
        let html = page(&[
            "Receitas típicas: fish and chips e chá da tarde.",
            "Passagens aéreas de São Paulo para Londres custam menos em agosto.",
            "O clima no inverno inglês é frio e chuvoso.",
        ]);
        let config = KnowledgeConfig {
            chunk_size: 80,
            chunk_overlap: 0,
            top_k: 2,
            ..KnowledgeConfig::default()
        };
        let retriever = ContextRetriever::new(indexer_for(&html, config));

        let docs = retriever
            .retrieve(&Query::new("passagens aéreas para Londres em agosto"))
            .await
            .unwrap();

        assert_eq!(docs.len(), 2);
        assert!(docs.documents[0].chunk.text.contains("Passagens"));
        assert!(docs.documents[0].score >= docs.documents[1].score);
    }

    #[tokio::test]
    async fn test_retrieve_is_deterministic() {
        let paragraph = "Roteiro de três dias por Londres, Oxford e Cambridge. ".repeat(30);
        let html = page(&[&paragraph, "Dicas de transporte público.", &paragraph]);
        let retriever = ContextRetriever::new(indexer_for(&html, KnowledgeConfig::default()));
        let query = Query::new("roteiro Londres");

        let first = retriever.retrieve(&query).await.unwrap();
        let second = retriever.retrieve(&query).await.unwrap();

        let texts = |set: &RetrievedDocumentSet| set.texts().map(String::from).collect::<Vec<_>>();
        assert_eq!(texts(&first), texts(&second));
        assert!(first.len() <= 4);
    }
}
