// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ESTADO DO AGENTE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Passos já executados (ação + observação) e o scratchpad que os devolve
// ao modelo na iteração seguinte.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use super::actions::AgentAction;

const OBSERVATION_PREFIX: &str = "Observation: ";
const THOUGHT_PREFIX: &str = "Thought: ";

/// Um ciclo Thought/Action/Observation concluído
#[derive(Debug, Clone)]
pub struct AgentStep {
    /// Ação decidida pelo modelo
    pub action: AgentAction,
    /// Saída da ferramenta
    pub observation: String,
}

/// Passos intermediários de uma execução do agente
#[derive(Debug, Clone, Default)]
pub struct AgentState {
    steps: Vec<AgentStep>,
}

impl AgentState {
    /// Estado vazio (sem passos)
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra um passo concluído
    pub fn record(&mut self, action: AgentAction, observation: String) {
        self.steps.push(AgentStep {
            action,
            observation,
        });
    }

    /// Número de iterações já executadas
    pub fn iterations(&self) -> usize {
        self.steps.len()
    }

    /// Texto que continua o prompt após `Thought:`
    pub fn scratchpad(&self) -> String {
        let mut thoughts = String::new();
        for step in &self.steps {
            thoughts.push_str(&step.action.log);
            thoughts.push('\n');
            thoughts.push_str(OBSERVATION_PREFIX);
            thoughts.push_str(&step.observation);
            thoughts.push('\n');
            thoughts.push_str(THOUGHT_PREFIX);
        }
        thoughts
    }
}
