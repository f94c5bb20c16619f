// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LOADER DE PÁGINAS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Busca o HTML da página de referência e extrai o texto das regiões
// marcadas pelos seletores CSS configurados.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::collections::HashMap;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use crate::types::FailureReason;
use crate::utils::normalize_paragraphs;

/// Elementos cujo texto nunca faz parte do conteúdo
const SKIPPED_TAGS: [&str; 3] = ["script", "style", "noscript"];

/// Erros de download de página
#[derive(Debug, Clone, thiserror::Error)]
#[allow(missing_docs)]
pub enum FetchError {
    #[error("HTTP {status} fetching {url}")]
    Status { status: u16, url: String },

    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),
}

impl FetchError {
    /// Classificação do erro
    pub fn reason(&self) -> FailureReason {
        match self {
            Self::Status { status, .. } => FailureReason::from_status(*status),
            Self::Network { .. } => FailureReason::Network,
            Self::InvalidSelector(_) => FailureReason::InvalidInput,
        }
    }
}

/// Fonte de páginas HTML (ou texto cru)
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Baixa o corpo da URL como texto
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetcher HTTP real
pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl Default for HttpPageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpPageFetcher {
    /// Cliente HTTP com user agent próprio
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("travel-itinerary/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let network = |e: reqwest::Error| FetchError::Network {
            url: url.to_string(),
            message: e.to_string(),
        };

        log::debug!("🌐 GET {}", url);
        let response = self.client.get(url).send().await.map_err(network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await.map_err(network)?;
        log::debug!("🌐 {} bytes de {}", body.len(), url);
        Ok(body)
    }
}

/// Fetcher em memória para testes e uso offline
#[derive(Debug, Clone, Default)]
pub struct StaticPageFetcher {
    pages: HashMap<String, String>,
    fallback: Option<String>,
    fail_with: Option<FetchError>,
}

impl StaticPageFetcher {
    /// Devolve o mesmo conteúdo para qualquer URL
    pub fn new(body: &str) -> Self {
        Self {
            fallback: Some(body.into()),
            ..Self::default()
        }
    }

    /// Registra conteúdo para uma URL específica
    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }

    /// Sempre falha com o erro informado
    pub fn failing(error: FetchError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::default()
        }
    }
}

#[async_trait]
impl PageFetcher for StaticPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        if let Some(error) = &self.fail_with {
            return Err(error.clone());
        }
        self.pages
            .get(url)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| FetchError::Status {
                status: 404,
                url: url.to_string(),
            })
    }
}

/// Região de texto extraída de uma página
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSection {
    /// Atributo `class` do elemento de origem
    pub class: String,
    /// Texto normalizado (parágrafos separados por linha em branco)
    pub text: String,
}

/// Extrai o texto dos elementos que casam com algum seletor.
///
/// Só os elementos mais externos entram (um match dentro de outro não é
/// duplicado), em ordem de documento. Seções sem texto são descartadas.
pub fn extract_sections(html: &str, selectors: &[String]) -> Result<Vec<PageSection>, FetchError> {
    let selectors = selectors
        .iter()
        .map(|s| Selector::parse(s).map_err(|_| FetchError::InvalidSelector(s.clone())))
        .collect::<Result<Vec<_>, _>>()?;

    let document = Html::parse_document(html);
    let matches_any = |el: &ElementRef<'_>| selectors.iter().any(|s| s.matches(el));

    let sections = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches_any(el))
        .filter(|el| {
            !el.ancestors()
                .filter_map(ElementRef::wrap)
                .any(|ancestor| matches_any(&ancestor))
        })
        .filter_map(|el| {
            let text = normalize_paragraphs(&element_text(el));
            if text.is_empty() {
                return None;
            }
            let class = el
                .value()
                .attr("class")
                .map(|c| c.split_whitespace().collect::<Vec<_>>().join(" "))
                .unwrap_or_default();
            Some(PageSection { class, text })
        })
        .collect();

    Ok(sections)
}

/// Texto visível de um elemento, preservando as quebras de linha do HTML
fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map_or(false, |e| SKIPPED_TAGS.contains(&e.name()))
        });
        if !hidden {
            out.push_str(text);
        }
    }
    out
}
