// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// AGENTE DE PESQUISA (REACT)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Loop Thought → Action → Observation sobre as ferramentas de busca até o
// modelo produzir `Final Answer:` ou o limite de iterações ser atingido.
// A resposta final vira o contexto de eventos e passagens do roteiro.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

mod actions;
mod prompts;
mod state;

pub use actions::*;
pub use prompts::{react_template, PromptSource, REACT_TEMPLATE, REACT_VARIABLES};
pub use state::*;

use std::sync::Arc;

use crate::config::AgentConfig;
use crate::knowledge::{FetchError, HttpPageFetcher, PageFetcher};
use crate::llm::{LlmError, TextCompleter};
use crate::prompt::{PromptTemplate, TemplateError};
use crate::search::{SearchError, SearchTool};
use crate::types::{FailureReason, Query, ResearchSummary};

/// Sequência que interrompe a geração antes de o modelo inventar observações
pub const STOP_SEQUENCE: &str = "\nObservation";

/// Resposta quando o limite de iterações é atingido
pub const ITERATION_LIMIT_OUTPUT: &str = "Agent stopped due to iteration limit or time limit.";

/// Erros do agente de pesquisa
#[derive(Debug, Clone, thiserror::Error)]
#[allow(missing_docs)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Tool '{tool}' failed: {source}")]
    Tool {
        tool: String,
        #[source]
        source: SearchError,
    },

    #[error(transparent)]
    OutputParse(#[from] OutputParseError),

    #[error("Failed to fetch agent prompt: {0}")]
    PromptFetch(#[from] FetchError),

    #[error("Invalid agent prompt: {0}")]
    Template(#[from] TemplateError),
}

impl AgentError {
    /// Classificação do erro
    pub fn reason(&self) -> FailureReason {
        match self {
            Self::Llm(e) => e.reason(),
            Self::Tool { source, .. } => source.reason(),
            Self::OutputParse(_) => FailureReason::ParseEmpty,
            Self::PromptFetch(e) => e.reason(),
            Self::Template(e) => e.reason(),
        }
    }
}

/// Agente que pesquisa eventos e preços de passagens na web
pub struct ResearchAgent {
    completer: Arc<dyn TextCompleter>,
    tools: Vec<Arc<dyn SearchTool>>,
    prompt: PromptSource,
    prompt_fetcher: Arc<dyn PageFetcher>,
    max_iterations: usize,
}

impl ResearchAgent {
    /// Cria o agente; o template vem de `config.prompt_url` ou do embutido
    pub fn new(
        completer: Arc<dyn TextCompleter>,
        tools: Vec<Arc<dyn SearchTool>>,
        config: &AgentConfig,
    ) -> Self {
        Self {
            completer,
            tools,
            prompt: PromptSource::from_url(config.prompt_url.as_deref()),
            prompt_fetcher: Arc::new(HttpPageFetcher::new()),
            max_iterations: config.max_iterations.max(1),
        }
    }

    /// Define a origem do template
    pub fn with_prompt_source(mut self, prompt: PromptSource) -> Self {
        self.prompt = prompt;
        self
    }

    /// Define como templates remotos são baixados
    pub fn with_prompt_fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.prompt_fetcher = fetcher;
        self
    }

    /// Nomes das ferramentas disponíveis
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    async fn load_prompt(&self) -> Result<PromptTemplate, AgentError> {
        let template = match &self.prompt {
            PromptSource::Builtin => react_template(REACT_TEMPLATE)?,
            PromptSource::Remote(url) => {
                log::info!("📥 Baixando prompt do agente: {}", url);
                let text = self.prompt_fetcher.fetch(url).await?;
                react_template(&text)?
            }
        };
        Ok(template)
    }

    fn render_tools(&self) -> String {
        self.tools
            .iter()
            .map(|t| format!("{}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    async fn run_tool(&self, action: &AgentAction) -> Result<String, AgentError> {
        let Some(tool) = self.tools.iter().find(|t| t.name() == action.tool) else {
            log::warn!("⚠️ Ferramenta inexistente: {}", action.tool);
            return Ok(format!(
                "{} is not a valid tool, try one of [{}].",
                action.tool,
                self.tool_names().join(", ")
            ));
        };

        tool.run(&action.tool_input)
            .await
            .map_err(|source| AgentError::Tool {
                tool: action.tool.clone(),
                source,
            })
    }

    /// Executa o loop ReAct para a pergunta e devolve a resposta final
    pub async fn collect(&self, query: &Query) -> Result<ResearchSummary, AgentError> {
        let template = self.load_prompt().await?;
        let tools = self.render_tools();
        let tool_names = self.tool_names().join(", ");
        let mut state = AgentState::new();

        log::info!("🔍 Pesquisando: {}", query);

        while state.iterations() < self.max_iterations {
            let scratchpad = state.scratchpad();
            let prompt = template.render(&[
                ("tools", tools.as_str()),
                ("tool_names", tool_names.as_str()),
                ("input", query.as_str()),
                ("agent_scratchpad", scratchpad.as_str()),
            ])?;

            let completion = self.completer.complete(&prompt, &[STOP_SEQUENCE]).await?;
            let output = truncate_at_stop(&completion.text);

            match parse_output(output)? {
                AgentDecision::Finish(finish) => {
                    log::info!(
                        "✅ Pesquisa concluída em {} passos ({} chars)",
                        state.iterations(),
                        finish.output.len()
                    );
                    return Ok(ResearchSummary(finish.output));
                }
                AgentDecision::Act(action) => {
                    log::info!(
                        "📍 Step {} | Action: {} | Input: {}",
                        state.iterations() + 1,
                        action.tool,
                        action.tool_input
                    );
                    let observation = self.run_tool(&action).await?;
                    log::debug!("👀 Observation: {} chars", observation.len());
                    state.record(action, observation);
                }
            }
        }

        log::warn!("⚠️ Limite de {} iterações atingido", self.max_iterations);
        Ok(ResearchSummary(ITERATION_LIMIT_OUTPUT.to_string()))
    }
}

/// Corta a saída na sequência de parada (quando o provedor não cortou)
fn truncate_at_stop(text: &str) -> &str {
    match text.find(STOP_SEQUENCE) {
        Some(pos) => &text[..pos],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::StaticPageFetcher;
    use crate::llm::MockCompleter;
    use crate::search::MockSearchTool;

    fn agent(completer: MockCompleter, tools: Vec<Arc<dyn SearchTool>>) -> ResearchAgent {
        ResearchAgent::new(Arc::new(completer), tools, &AgentConfig::default())
    }

    fn default_tools() -> (Arc<MockSearchTool>, Arc<MockSearchTool>) {
        (
            Arc::new(MockSearchTool::new(
                "duckduckgo_search",
                "Festival de música em Londres de 10 a 12 de agosto.",
            )),
            Arc::new(MockSearchTool::new("wikipedia", "Page: London\nSummary: Capital.")),
        )
    }

    #[tokio::test]
    async fn test_immediate_final_answer() {
        let completer =
            MockCompleter::with_replies([" I now know the final answer\nFinal Answer: Sem eventos."]);
        let agent = agent(completer, vec![]);

        let summary = agent.collect(&Query::new("Londres")).await.unwrap();
        assert_eq!(summary.as_str(), "Sem eventos.");
    }

    #[tokio::test]
    async fn test_tool_use_then_answer() {
        let (ddg, wiki) = default_tools();
        let completer = Arc::new(MockCompleter::with_replies([
            " Preciso buscar eventos.\nAction: duckduckgo_search\nAction Input: \"eventos Londres agosto\"",
            " I now know the final answer\nFinal Answer: Festival de música de 10 a 12 de agosto.",
        ]));
        let agent = ResearchAgent::new(
            completer.clone(),
            vec![ddg.clone(), wiki.clone()],
            &AgentConfig::default(),
        );

        let summary = agent.collect(&Query::new("Roteiro Londres")).await.unwrap();

        assert_eq!(summary.as_str(), "Festival de música de 10 a 12 de agosto.");
        assert_eq!(ddg.calls(), vec!["eventos Londres agosto"]);
        assert!(wiki.calls().is_empty());

        let prompts = completer.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("duckduckgo_search: Mock tool duckduckgo_search"));
        assert!(prompts[0].contains("[duckduckgo_search, wikipedia]"));
        assert!(prompts[0].ends_with("Question: Roteiro Londres\nThought:"));
        assert!(prompts[1].ends_with(
            "Observation: Festival de música em Londres de 10 a 12 de agosto.\nThought: "
        ));
    }

    #[tokio::test]
    async fn test_hallucinated_observation_is_cut() {
        let (ddg, wiki) = default_tools();
        let completer = MockCompleter::with_replies([
            " buscar\nAction: wikipedia\nAction Input: London\nObservation: inventada\nFinal Answer: errado",
            "Final Answer: ok",
        ]);
        let agent = agent(completer, vec![ddg, wiki.clone()]);

        let summary = agent.collect(&Query::new("Londres")).await.unwrap();
        assert_eq!(summary.as_str(), "ok");
        assert_eq!(wiki.calls(), vec!["London"]);
    }

    #[tokio::test]
    async fn test_unknown_tool_becomes_observation() {
        let (ddg, wiki) = default_tools();
        let completer = Arc::new(MockCompleter::with_replies([
            " Action: google\nAction Input: voos",
            " Final Answer: feito",
        ]));
        let agent = ResearchAgent::new(completer.clone(), vec![ddg, wiki], &AgentConfig::default());

        agent.collect(&Query::new("voos")).await.unwrap();

        let prompts = completer.prompts();
        assert!(prompts[1].contains(
            "Observation: google is not a valid tool, try one of [duckduckgo_search, wikipedia]."
        ));
    }

    #[tokio::test]
    async fn test_iteration_limit() {
        let (ddg, _) = default_tools();
        let completer = MockCompleter::always(" Action: duckduckgo_search\nAction Input: voos");
        let config = AgentConfig {
            max_iterations: 3,
            ..AgentConfig::default()
        };
        let agent = ResearchAgent::new(Arc::new(completer), vec![ddg.clone()], &config);

        let summary = agent.collect(&Query::new("voos")).await.unwrap();
        assert_eq!(summary.as_str(), ITERATION_LIMIT_OUTPUT);
        assert_eq!(ddg.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_parse_error_propagates() {
        let agent = agent(MockCompleter::always("Não sei o que fazer."), vec![]);
        let err = agent.collect(&Query::new("x")).await.unwrap_err();
        assert!(matches!(err, AgentError::OutputParse(OutputParseError::MissingAction(_))));
        assert_eq!(err.reason(), FailureReason::ParseEmpty);
    }

    #[tokio::test]
    async fn test_tool_failure_propagates() {
        let failing = Arc::new(MockSearchTool::failing(
            "duckduckgo_search",
            SearchError::RateLimitError("202 Ratelimit".into()),
        ));
        let completer = MockCompleter::always(" Action: duckduckgo_search\nAction Input: voos");
        let agent = agent(completer, vec![failing]);

        let err = agent.collect(&Query::new("voos")).await.unwrap_err();
        assert!(matches!(err, AgentError::Tool { .. }));
        assert_eq!(err.reason(), FailureReason::UpstreamQuota);
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        let agent = agent(
            MockCompleter::failing(LlmError::NetworkError("timeout".into())),
            vec![],
        );
        let err = agent.collect(&Query::new("x")).await.unwrap_err();
        assert_eq!(err.reason(), FailureReason::Network);
    }

    #[tokio::test]
    async fn test_remote_prompt() {
        let url = "https://prompts.example/react";
        let remote = "Tools: {tools} ({tool_names})\nQ: {input}\nThought:{agent_scratchpad}";
        let completer = Arc::new(MockCompleter::always("Final Answer: remoto"));
        let agent = ResearchAgent::new(completer.clone(), vec![], &AgentConfig::default())
            .with_prompt_source(PromptSource::Remote(url.into()))
            .with_prompt_fetcher(Arc::new(StaticPageFetcher::default().with_page(url, remote)));

        let summary = agent.collect(&Query::new("Ushuaia")).await.unwrap();
        assert_eq!(summary.as_str(), "remoto");
        assert_eq!(completer.prompts()[0], "Tools:  ()\nQ: Ushuaia\nThought:");
    }

    #[tokio::test]
    async fn test_remote_prompt_missing_variables() {
        let agent = agent(MockCompleter::always("Final Answer: x"), vec![])
            .with_prompt_source(PromptSource::Remote("https://p".into()))
            .with_prompt_fetcher(Arc::new(StaticPageFetcher::new("Q: {input}")));

        let err = agent.collect(&Query::new("x")).await.unwrap_err();
        assert!(matches!(err, AgentError::Template(_)));
        assert_eq!(err.reason(), FailureReason::InvalidInput);
    }

    #[test]
    fn test_truncate_at_stop() {
        assert_eq!(truncate_at_stop("a\nObservation: b"), "a");
        assert_eq!(truncate_at_stop("sem parada"), "sem parada");
    }
}
