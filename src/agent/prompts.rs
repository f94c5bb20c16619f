// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PROMPT REACT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::prompt::{PromptTemplate, TemplateError};

/// Variáveis que todo template ReAct precisa declarar
pub const REACT_VARIABLES: [&str; 4] = ["tools", "tool_names", "input", "agent_scratchpad"];

/// Template ReAct padrão (registro público `hwchase17/react`)
pub const REACT_TEMPLATE: &str = "Answer the following questions as best you can. You have access to the following tools:

{tools}

Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{tool_names}]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question

Begin!

Question: {input}
Thought:{agent_scratchpad}";

/// De onde vem o template do agente
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSource {
    /// Cópia embutida de `REACT_TEMPLATE`
    Builtin,
    /// Baixado a cada execução
    Remote(String),
}

impl PromptSource {
    /// `Remote` quando há URL configurada
    pub fn from_url(url: Option<&str>) -> Self {
        match url {
            Some(url) => Self::Remote(url.to_string()),
            None => Self::Builtin,
        }
    }
}

/// Valida um template ReAct (embutido ou remoto)
pub fn react_template(text: &str) -> Result<PromptTemplate, TemplateError> {
    let template = PromptTemplate::new(text);
    template.require(&REACT_VARIABLES)?;
    Ok(template)
}
