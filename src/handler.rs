// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// HANDLER DE INVOCAÇÃO (EVENTO SERVERLESS)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Recebe um evento no formato API Gateway/Lambda:
//
//   { "body": "{\"question\": \"...\"}" }
//
// e devolve `{ statusCode, headers, body }`. Só existem dois status:
// 200 (roteiro gerado) e 400 (qualquer falha).
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::pipeline::TravelPipeline;
use crate::types::Query;

/// Pergunta usada quando o corpo não traz `question`
pub const MISSING_QUESTION: &str = "Parametro question não fornecido";

/// Mensagem de sucesso
pub const SUCCESS_MESSAGE: &str = "Tarefa concluída com sucesso";

/// Resposta no formato esperado pelo API Gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LambdaResponse {
    /// 200 ou 400
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// Sempre `Content-Type: application/json`
    pub headers: BTreeMap<String, String>,
    /// Corpo já serializado em JSON
    pub body: String,
}

impl LambdaResponse {
    fn json(status_code: u16, body: Value) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            status_code,
            headers,
            body: body.to_string(),
        }
    }

    /// 200 com o roteiro em `details`
    pub fn success(details: &str) -> Self {
        Self::json(200, json!({ "message": SUCCESS_MESSAGE, "details": details }))
    }

    /// 400 com o texto do erro em `message`
    pub fn failure(message: &str) -> Self {
        Self::json(400, json!({ "message": message }))
    }

    /// Corpo desserializado
    pub fn body_json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Corpo da requisição inválido
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// `body` não é JSON válido
    #[error("Invalid request body: {0}")]
    InvalidJson(String),

    /// `body` é JSON, mas não um objeto
    #[error("Invalid request body: expected a JSON object")]
    NotAnObject,
}

/// Extrai a pergunta do evento.
///
/// `body` pode ser uma string JSON ou um objeto; ausente ou `null` conta
/// como `{}`. Sem `question` textual, usa [`MISSING_QUESTION`].
pub fn extract_query(event: &Value) -> Result<Query, RequestError> {
    let parsed;
    let body = match event.get("body") {
        None | Some(Value::Null) => None,
        Some(Value::String(raw)) => {
            parsed = serde_json::from_str::<Value>(raw)
                .map_err(|e| RequestError::InvalidJson(e.to_string()))?;
            Some(&parsed)
        }
        Some(other) => Some(other),
    };

    let question = match body {
        None => None,
        Some(Value::Object(map)) => map.get("question").and_then(Value::as_str),
        Some(_) => return Err(RequestError::NotAnObject),
    };

    Ok(Query::new(question.unwrap_or(MISSING_QUESTION)))
}

/// Ponto de entrada por requisição
pub struct ItineraryHandler {
    pipeline: TravelPipeline,
}

impl ItineraryHandler {
    /// Cria o handler sobre um pipeline pronto
    pub fn new(pipeline: TravelPipeline) -> Self {
        Self { pipeline }
    }

    /// Processa um evento; nunca falha, erros viram 400
    pub async fn handle(&self, event: Value) -> LambdaResponse {
        let query = match extract_query(&event) {
            Ok(query) => query,
            Err(e) => {
                log::warn!("⚠️ {}", e);
                return LambdaResponse::failure(&e.to_string());
            }
        };

        if query.as_str() == MISSING_QUESTION {
            log::warn!("⚠️ Requisição sem question, usando texto padrão");
        }

        match self.pipeline.run(&query).await {
            Ok(itinerary) => LambdaResponse::success(itinerary.as_str()),
            Err(e) => LambdaResponse::failure(&e.to_string()),
        }
    }
}
