// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FERRAMENTAS DE BUSCA
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Trait e implementações das ferramentas usadas pelo agente de pesquisa:
// - DuckDuckGo (HTML): eventos e notícias atuais, preços de passagens
// - Wikipedia (MediaWiki API): fatos gerais sobre lugares e atrações
//
// Cada ferramenta recebe um texto livre (Action Input) e devolve a
// observação em texto que volta para o scratchpad do agente.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde::Deserialize;

use crate::types::FailureReason;
use crate::utils::{clean_text, truncate_chars};

const DDG_HTML_ENDPOINT: &str = "https://html.duckduckgo.com/html/";
const DDG_MAX_RESULTS: usize = 5;
const DDG_NO_RESULT: &str = "No good DuckDuckGo Search Result was found";

const WIKI_TOP_K_RESULTS: usize = 3;
const WIKI_MAX_CHARS: usize = 4000;
const WIKI_NO_RESULT: &str = "No good Wikipedia Search Result was found";

const USER_AGENT: &str = concat!("travel-itinerary/", env!("CARGO_PKG_VERSION"));

static RESULT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".result").expect("result selector"));
static SNIPPET_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.result__snippet, .result__snippet").expect("snippet selector"));

/// Erros das ferramentas de busca
#[derive(Debug, Clone, thiserror::Error)]
#[allow(missing_docs)]
pub enum SearchError {
    #[error("Search API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Rate limit exceeded: {0}")]
    RateLimitError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid search response: {0}")]
    ParseError(String),
}

impl SearchError {
    /// Classificação do erro
    pub fn reason(&self) -> FailureReason {
        match self {
            Self::ApiError { status, .. } => FailureReason::from_status(*status),
            Self::RateLimitError(_) => FailureReason::UpstreamQuota,
            Self::NetworkError(_) => FailureReason::Network,
            Self::ParseError(_) => FailureReason::ParseEmpty,
        }
    }

    fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        if status.as_u16() == 429 {
            Self::RateLimitError(message)
        } else {
            Self::ApiError {
                status: status.as_u16(),
                message,
            }
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::ParseError(e.to_string())
        } else {
            Self::NetworkError(e.to_string())
        }
    }
}

/// Ferramenta invocável pelo agente.
///
/// `name` é o identificador que o modelo escreve em `Action:`; a descrição
/// entra no prompt para orientar a escolha.
#[async_trait]
pub trait SearchTool: Send + Sync {
    /// Identificador da ferramenta
    fn name(&self) -> &str;

    /// Descrição mostrada ao modelo
    fn description(&self) -> &str;

    /// Executa a ferramenta e devolve a observação
    async fn run(&self, input: &str) -> Result<String, SearchError>;
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DUCKDUCKGO
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Busca web via endpoint HTML do DuckDuckGo (sem chave de API)
pub struct DuckDuckGoSearch {
    endpoint: String,
    max_results: usize,
    client: reqwest::Client,
}

impl Default for DuckDuckGoSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl DuckDuckGoSearch {
    /// Usa o endpoint HTML público
    pub fn new() -> Self {
        Self {
            endpoint: DDG_HTML_ENDPOINT.into(),
            max_results: DDG_MAX_RESULTS,
            client: http_client(),
        }
    }

    /// Aponta para outro endpoint (proxies, testes)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Extrai os snippets dos resultados de uma página HTML do DuckDuckGo
pub fn parse_ddg_snippets(html: &str, max_results: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&RESULT_SELECTOR)
        .filter_map(|result| {
            result
                .select(&SNIPPET_SELECTOR)
                .next()
                .map(|el| clean_text(&el.text().collect::<String>()))
        })
        .filter(|snippet| !snippet.is_empty())
        .take(max_results)
        .collect()
}

#[async_trait]
impl SearchTool for DuckDuckGoSearch {
    fn name(&self) -> &str {
        "duckduckgo_search"
    }

    fn description(&self) -> &str {
        "A wrapper around DuckDuckGo Search. Useful for when you need to answer questions about current events. Input should be a search query."
    }

    async fn run(&self, input: &str) -> Result<String, SearchError> {
        log::debug!("🦆 DuckDuckGo: {}", input);

        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("q", input)])
            .header("Accept", "text/html")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::from_status(status, body));
        }

        let body = response.text().await?;
        // Html não é Send: o parse acontece todo fora de qualquer await
        let snippets = parse_ddg_snippets(&body, self.max_results);

        if snippets.is_empty() {
            log::debug!("🦆 Nenhum resultado para '{}'", input);
            return Ok(DDG_NO_RESULT.to_string());
        }
        Ok(snippets.join(" "))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// WIKIPEDIA
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Consulta enciclopédica via MediaWiki API
pub struct WikipediaLookup {
    api_url: String,
    top_k_results: usize,
    max_chars: usize,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct WikiSearchResponse {
    query: Option<WikiSearchQuery>,
}

#[derive(Deserialize)]
struct WikiSearchQuery {
    #[serde(default)]
    search: Vec<WikiSearchHit>,
}

#[derive(Deserialize)]
struct WikiSearchHit {
    title: String,
}

#[derive(Deserialize)]
struct WikiExtractResponse {
    query: Option<WikiExtractQuery>,
}

#[derive(Deserialize)]
struct WikiExtractQuery {
    #[serde(default)]
    pages: HashMap<String, WikiPage>,
}

#[derive(Deserialize)]
struct WikiPage {
    title: String,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    missing: Option<serde_json::Value>,
}

impl WikipediaLookup {
    /// Cria ferramenta para o idioma informado ("en", "pt"...)
    pub fn new(lang: &str) -> Self {
        Self {
            api_url: format!("https://{}.wikipedia.org/w/api.php", lang),
            top_k_results: WIKI_TOP_K_RESULTS,
            max_chars: WIKI_MAX_CHARS,
            client: http_client(),
        }
    }

    /// Aponta para outra instalação MediaWiki
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    async fn get_json<R: for<'de> Deserialize<'de>>(
        &self,
        params: &[(&str, &str)],
    ) -> Result<R, SearchError> {
        let response = self.client.get(&self.api_url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::from_status(status, body));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| SearchError::ParseError(e.to_string()))
    }

    async fn search_titles(&self, query: &str) -> Result<Vec<String>, SearchError> {
        let limit = self.top_k_results.to_string();
        let response: WikiSearchResponse = self
            .get_json(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", &limit),
                ("format", "json"),
            ])
            .await?;

        Ok(response
            .query
            .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
            .unwrap_or_default())
    }

    async fn page_summary(&self, title: &str) -> Result<Option<(String, String)>, SearchError> {
        let response: WikiExtractResponse = self
            .get_json(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title),
                ("format", "json"),
            ])
            .await?;

        let page = response
            .query
            .and_then(|q| q.pages.into_values().find(|p| p.missing.is_none()));

        Ok(page.and_then(|p| {
            let extract = p.extract.unwrap_or_default();
            let extract = extract.trim();
            (!extract.is_empty()).then(|| (p.title, extract.to_string()))
        }))
    }
}

/// Formata as páginas encontradas no formato lido pelo agente
pub fn format_wiki_pages(pages: &[(String, String)], max_chars: usize) -> String {
    let joined = pages
        .iter()
        .map(|(title, summary)| format!("Page: {}\nSummary: {}", title, summary))
        .collect::<Vec<_>>()
        .join("\n\n");
    truncate_chars(&joined, max_chars).to_string()
}

#[async_trait]
impl SearchTool for WikipediaLookup {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn description(&self) -> &str {
        "A wrapper around Wikipedia. Useful for when you need to answer general questions about people, places, companies, facts, historical events, or other subjects. Input should be a search query."
    }

    async fn run(&self, input: &str) -> Result<String, SearchError> {
        log::debug!("📚 Wikipedia: {}", input);

        let titles = self.search_titles(input).await?;
        let mut pages = Vec::with_capacity(titles.len());
        for title in titles.iter().take(self.top_k_results) {
            if let Some(page) = self.page_summary(title).await? {
                pages.push(page);
            }
        }

        if pages.is_empty() {
            return Ok(WIKI_NO_RESULT.to_string());
        }
        Ok(format_wiki_pages(&pages, self.max_chars))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// IMPLEMENTAÇÃO MOCK PARA TESTES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Ferramenta mock com resposta fixa; registra as entradas recebidas
#[derive(Debug)]
pub struct MockSearchTool {
    name: String,
    description: String,
    output: Result<String, SearchError>,
    calls: Mutex<Vec<String>>,
}

impl MockSearchTool {
    /// Ferramenta que sempre devolve `output`
    pub fn new(name: &str, output: &str) -> Self {
        Self {
            name: name.into(),
            description: format!("Mock tool {}", name),
            output: Ok(output.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Ferramenta que sempre falha
    pub fn failing(name: &str, error: SearchError) -> Self {
        Self {
            output: Err(error),
            ..Self::new(name, "")
        }
    }

    /// Entradas recebidas até agora
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SearchTool for MockSearchTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn run(&self, input: &str) -> Result<String, SearchError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(input.to_string());
        }
        self.output.clone()
    }
}
