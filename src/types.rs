// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TIPOS COMPARTILHADOS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::fmt;

/// Tipo de URL (alias para String)
pub type Url = String;

/// Pergunta do usuário em linguagem natural.
///
/// Opaca: nenhuma validação além da presença.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    /// Cria uma query a partir de qualquer texto
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Texto da query
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resumo textual produzido pelo agente de pesquisa (eventos, passagens...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchSummary(pub String);

impl ResearchSummary {
    /// Texto do resumo
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Roteiro final gerado pelo modelo de linguagem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItineraryResponse(pub String);

impl ItineraryResponse {
    /// Texto do roteiro
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consome a resposta retornando o texto
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Metadados de origem de um chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// URL da página de origem
    pub source: Url,
    /// Classe CSS da seção onde o texto foi encontrado
    pub section: String,
    /// Posição do chunk dentro da seção
    pub chunk_index: usize,
}

/// Trecho contíguo da página de referência
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChunk {
    /// Conteúdo (no máximo `chunk_size` caracteres)
    pub text: String,
    /// Origem do trecho
    pub metadata: ChunkMetadata,
}

/// Chunk recuperado com seu score de similaridade
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// Chunk recuperado
    pub chunk: DocumentChunk,
    /// Similaridade cosseno com a query
    pub score: f32,
}

/// Documentos relevantes, ordenados do mais ao menos similar
#[derive(Debug, Clone, Default)]
pub struct RetrievedDocumentSet {
    /// Chunks ranqueados
    pub documents: Vec<ScoredChunk>,
}

impl RetrievedDocumentSet {
    /// Número de documentos
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Retorna true se nada foi recuperado
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Textos dos chunks na ordem do ranking
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|d| d.chunk.text.as_str())
    }

    /// Concatena os chunks (ordem do ranking) separados por linha em branco
    pub fn joined(&self) -> String {
        self.texts().collect::<Vec<_>>().join("\n\n")
    }
}

/// Motivo de falha, comum a todos os estágios
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Falha de transporte (DNS, conexão, TLS...)
    Network,
    /// Quota ou rate limit do provedor (HTTP 429)
    UpstreamQuota,
    /// Provedor respondeu com erro
    Upstream,
    /// Resposta vazia ou impossível de interpretar
    ParseEmpty,
    /// Entrada inválida (template, corpo da requisição)
    InvalidInput,
}

impl FailureReason {
    /// Retorna o motivo como string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::UpstreamQuota => "upstream-quota",
            Self::Upstream => "upstream",
            Self::ParseEmpty => "parse-empty",
            Self::InvalidInput => "invalid-input",
        }
    }

    /// Classifica um status HTTP de erro
    pub fn from_status(status: u16) -> Self {
        if status == 429 {
            Self::UpstreamQuota
        } else {
            Self::Upstream
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(text: &str, score: f32) -> ScoredChunk {
        ScoredChunk {
            chunk: DocumentChunk {
                text: text.into(),
                metadata: ChunkMetadata {
                    source: "https://example.com".into(),
                    section: "postcontentwrap".into(),
                    chunk_index: 0,
                },
            },
            score,
        }
    }

    #[test]
    fn test_joined_keeps_ranking_order() {
        let set = RetrievedDocumentSet {
            documents: vec![scored("primeiro", 0.9), scored("segundo", 0.5)],
        };
        assert_eq!(set.joined(), "primeiro\n\nsegundo");
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_failure_reason_from_status() {
        assert_eq!(FailureReason::from_status(429), FailureReason::UpstreamQuota);
        assert_eq!(FailureReason::from_status(500), FailureReason::Upstream);
        assert_eq!(FailureReason::UpstreamQuota.as_str(), "upstream-quota");
    }

    #[test]
    fn test_query_display() {
        let query = Query::new("Londres em agosto");
        assert_eq!(query.to_string(), "Londres em agosto");
        assert_eq!(query.as_str(), "Londres em agosto");
    }
}
