// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// AÇÕES DO AGENTE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Interpretação da saída do modelo no formato ReAct:
//
//   Thought: ...
//   Action: <ferramenta>
//   Action Input: <entrada>
//
// ou
//
//   Thought: I now know the final answer
//   Final Answer: <resposta>
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use once_cell::sync::Lazy;
use regex::Regex;

/// Marcador da resposta final
pub const FINAL_ANSWER_MARKER: &str = "Final Answer:";

static ACTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
        .expect("action regex")
});
static ACTION_ONLY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)").expect("action-only regex"));
static ACTION_INPUT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)").expect("action-input regex")
});

/// Chamada de ferramenta decidida pelo modelo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentAction {
    /// Nome da ferramenta
    pub tool: String,
    /// Entrada (sem espaços e aspas nas pontas)
    pub tool_input: String,
    /// Saída completa do modelo que gerou a ação
    pub log: String,
}

/// Resposta final do agente
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentFinish {
    /// Resposta final, sem espaços nas pontas
    pub output: String,
    /// Saída completa do modelo
    pub log: String,
}

/// Resultado da interpretação de uma saída do modelo
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentDecision {
    /// Executar uma ferramenta
    Act(AgentAction),
    /// Encerrar com a resposta final
    Finish(AgentFinish),
}

/// Saída do modelo fora do formato esperado
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OutputParseError {
    /// `Final Answer:` e `Action:` na mesma saída
    #[error("Parsing LLM output produced both a final answer and a parse-able action: {0}")]
    AnswerAndAction(String),

    /// Nem resposta final nem `Action:`
    #[error("Invalid Format: Missing 'Action:' after 'Thought:'. Could not parse LLM output: `{0}`")]
    MissingAction(String),

    /// `Action:` sem `Action Input:`
    #[error("Invalid Format: Missing 'Action Input:' after 'Action:'. Could not parse LLM output: `{0}`")]
    MissingActionInput(String),

    /// Formato não reconhecido
    #[error("Could not parse LLM output: `{0}`")]
    Unparseable(String),
}

/// Interpreta a saída do modelo.
///
/// Uma ação válida junto com `Final Answer:` é erro: o modelo precisa
/// escolher entre agir e responder.
pub fn parse_output(text: &str) -> Result<AgentDecision, OutputParseError> {
    let includes_answer = text.contains(FINAL_ANSWER_MARKER);

    if let Some(caps) = ACTION_RE.captures(text) {
        if includes_answer {
            return Err(OutputParseError::AnswerAndAction(text.to_string()));
        }
        let tool = caps[1].trim().to_string();
        let tool_input = caps[2].trim_matches(' ').trim_matches('"').to_string();
        return Ok(AgentDecision::Act(AgentAction {
            tool,
            tool_input,
            log: text.to_string(),
        }));
    }

    if includes_answer {
        let output = text
            .rsplit(FINAL_ANSWER_MARKER)
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        return Ok(AgentDecision::Finish(AgentFinish {
            output,
            log: text.to_string(),
        }));
    }

    if !ACTION_ONLY_RE.is_match(text) {
        Err(OutputParseError::MissingAction(text.to_string()))
    } else if !ACTION_INPUT_RE.is_match(text) {
        Err(OutputParseError::MissingActionInput(text.to_string()))
    } else {
        Err(OutputParseError::Unparseable(text.to_string()))
    }
}
