// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PROMPT TEMPLATES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Templates com placeholders `{nome}` usados pelo agente ReAct e pelo
// compositor do roteiro. A substituição é feita numa única passada: valores
// inseridos nunca são reinterpretados como placeholders.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::types::FailureReason;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex"));

/// Erros de template
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// Placeholder sem valor no render
    #[error("Missing value for prompt variable '{0}'")]
    MissingVariable(String),

    /// Template sem um placeholder obrigatório
    #[error("Prompt template has no '{{{0}}}' placeholder")]
    MissingPlaceholder(String),
}

impl TemplateError {
    /// Classificação do erro
    pub fn reason(&self) -> FailureReason {
        FailureReason::InvalidInput
    }
}

/// Template de prompt com variáveis nomeadas
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    variables: Vec<String>,
}

impl PromptTemplate {
    /// Cria template descobrindo os placeholders (ordem de primeira aparição)
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let mut variables: Vec<String> = Vec::new();
        for caps in PLACEHOLDER.captures_iter(&template) {
            let name = caps[1].to_string();
            if !variables.contains(&name) {
                variables.push(name);
            }
        }
        Self { template, variables }
    }

    /// Variáveis encontradas no template
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Texto cru do template
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Verifica que o template declara todos os placeholders exigidos
    pub fn require(&self, names: &[&str]) -> Result<(), TemplateError> {
        match names.iter().find(|n| !self.variables.iter().any(|v| v.as_str() == **n)) {
            Some(missing) => Err(TemplateError::MissingPlaceholder(missing.to_string())),
            None => Ok(()),
        }
    }

    /// Renderiza o template; toda variável do template precisa de valor
    pub fn render(&self, values: &[(&str, &str)]) -> Result<String, TemplateError> {
        if let Some(missing) = self
            .variables
            .iter()
            .find(|v| !values.iter().any(|(name, _)| *name == v.as_str()))
        {
            return Err(TemplateError::MissingVariable(missing.clone()));
        }

        let rendered = PLACEHOLDER.replace_all(&self.template, |caps: &Captures<'_>| {
            let name = &caps[1];
            values
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, value)| value.to_string())
                .unwrap_or_default()
        });

        Ok(rendered.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variables_in_order_without_duplicates() {
        let template = PromptTemplate::new("{a} e {b}, depois {a} de novo");
        assert_eq!(template.variables(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_render_substitutes_all() {
        let template = PromptTemplate::new("Contexto: {ctx}\nUsuário: {query}");
        let out = template
            .render(&[("ctx", "chove em Londres"), ("query", "roteiro")])
            .unwrap();
        assert_eq!(out, "Contexto: chove em Londres\nUsuário: roteiro");
    }

    #[test]
    fn test_render_does_not_rescan_values() {
        let template = PromptTemplate::new("{a}|{b}");
        let out = template.render(&[("a", "{b}"), ("b", "x")]).unwrap();
        assert_eq!(out, "{b}|x");
    }

    #[test]
    fn test_render_missing_variable() {
        let template = PromptTemplate::new("{a} {b}");
        let err = template.render(&[("a", "1")]).unwrap_err();
        assert_eq!(err, TemplateError::MissingVariable("b".into()));
        assert_eq!(err.reason(), FailureReason::InvalidInput);
    }

    #[test]
    fn test_require_placeholders() {
        let template = PromptTemplate::new("Question: {input}");
        assert!(template.require(&["input"]).is_ok());
        assert_eq!(
            template.require(&["input", "tools"]),
            Err(TemplateError::MissingPlaceholder("tools".into()))
        );
    }

    #[test]
    fn test_non_identifier_braces_are_literal() {
        let template = PromptTemplate::new("json: {\"k\": 1} {x}");
        assert_eq!(template.variables(), &["x".to_string()]);
        assert_eq!(template.render(&[("x", "ok")]).unwrap(), "json: {\"k\": 1} ok");
    }
}
