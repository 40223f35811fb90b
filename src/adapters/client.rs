use crate::core::single_flight::SingleFlight;
use crate::domain::model::{ConversationTurn, TranslateRequest, TranslateResponse};
use crate::utils::error::{Result, TranslateError};
use reqwest::{Client, StatusCode};
use serde_json::Value;

/// 呼叫 `/api/translate` 的客戶端；同一時間只保留最新的請求
#[derive(Debug)]
pub struct TranslationClient {
    client: Client,
    endpoint: String,
    flight: SingleFlight,
}

impl TranslationClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/api/translate", base_url.trim_end_matches('/')),
            flight: SingleFlight::new(),
        }
    }

    /// 送出翻譯請求。被較新的請求取代時回傳 `TranslateError::Cancelled`。
    pub async fn translate(
        &self,
        text: &str,
        history: &[ConversationTurn],
    ) -> Result<TranslateResponse> {
        let ticket = self.flight.begin();
        let request = TranslateRequest {
            text: text.to_string(),
            history: history.to_vec(),
        };

        tracing::debug!("Request #{} to {}", ticket.id(), self.endpoint);
        self.flight
            .run(&ticket, self.send(&request))
            .await
            .unwrap_or(Err(TranslateError::Cancelled))
    }

    async fn send(&self, request: &TranslateRequest) -> Result<TranslateResponse> {
        let response = self.client.post(&self.endpoint).json(request).send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body: Value = response.json().await.unwrap_or(Value::Null);
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("translation request failed")
            .to_string();

        if status == StatusCode::BAD_REQUEST {
            return Err(TranslateError::EmptyInput { message });
        }
        Err(TranslateError::UpstreamError {
            status: Some(status.as_u16()),
            message,
            detail: body.get("detail").cloned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::TranslationMode;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_translate_posts_text_and_history() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/translate")
                .json_body(json!({
                    "text": "把圆改成红色",
                    "history": [{"role": "user", "content": "画一个圆"}]
                }));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "explanation": "ok",
                    "commands": ["SetColor(c, \"red\")"],
                    "needClarification": false,
                    "mode": "model"
                }));
        });

        let client = TranslationClient::new(&server.base_url());
        let response = client
            .translate("把圆改成红色", &[ConversationTurn::user("画一个圆")])
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(response.mode, TranslationMode::Model);
        assert_eq!(response.commands, vec!["SetColor(c, \"red\")"]);
        assert!(response.raw.is_none());
    }

    #[tokio::test]
    async fn test_server_errors_are_mapped() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/translate");
            then.status(500)
                .header("Content-Type", "application/json")
                .json_body(json!({"error": "Model request failed: quota exceeded", "detail": {"code": 429}}));
        });

        let client = TranslationClient::new(&server.base_url());
        let err = client.translate("画一个圆", &[]).await.unwrap_err();

        assert_eq!(err.upstream_detail(), Some(&json!({"code": 429})));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_superseded_request_is_discarded() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/api/translate")
                .json_body_partial(r#"{"text": "慢"}"#);
            then.status(200)
                .delay(std::time::Duration::from_secs(2))
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "explanation": "slow",
                    "commands": [],
                    "needClarification": true,
                    "mode": "model"
                }));
        });
        server.mock(|when, then| {
            when.method(POST)
                .path("/api/translate")
                .json_body_partial(r#"{"text": "快"}"#);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "explanation": "fast",
                    "commands": ["A = (1, 1)"],
                    "needClarification": false,
                    "mode": "model"
                }));
        });

        let client = TranslationClient::new(&server.base_url());
        let (slow, fast) = tokio::join!(client.translate("慢", &[]), async {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            client.translate("快", &[]).await
        });

        assert!(matches!(slow, Err(TranslateError::Cancelled)));
        assert_eq!(fast.unwrap().explanation, "fast");
    }

    #[tokio::test]
    async fn test_bad_request_is_an_input_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/translate");
            then.status(400)
                .header("Content-Type", "application/json")
                .json_body(json!({"error": "text is required"}));
        });

        let client = TranslationClient::new(&server.base_url());
        let err = client.translate(" ", &[]).await.unwrap_err();

        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_wrong_endpoint_is_not_an_input_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/translate");
            then.status(404).body("Not Found");
        });

        let client = TranslationClient::new(&server.base_url());
        let err = client.translate("画一个圆", &[]).await.unwrap_err();

        match err {
            TranslateError::UpstreamError { status, .. } => assert_eq!(status, Some(404)),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
