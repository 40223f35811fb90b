use serde::{Deserialize, Serialize};

use crate::core::sanitizer::sanitize_commands;

/// 有序的指令批次；順序即相依順序
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandBatch(Vec<String>);

impl CommandBatch {
    /// 以清理後的候選行建立批次
    pub fn sanitized<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(sanitize_commands(lines))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationMode {
    Fallback,
    Model,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranslationResult {
    pub mode: TranslationMode,
    pub explanation: String,
    pub commands: CommandBatch,
    pub needs_clarification: bool,
    pub raw_model_output: Option<String>,
}

/// 解析或規則產生的中間結果：說明文字與指令
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub explanation: String,
    pub commands: Vec<String>,
}

/// `/api/translate` 的回應格式，伺服器與客戶端共用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub explanation: String,
    pub commands: Vec<String>,
    pub need_clarification: bool,
    pub mode: TranslationMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl TranslateResponse {
    pub fn from_result(result: TranslationResult, include_raw: bool) -> Self {
        Self {
            explanation: result.explanation,
            commands: result.commands.into_inner(),
            need_clarification: result.needs_clarification,
            mode: result.mode,
            raw: if include_raw {
                result.raw_model_output
            } else {
                None
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<ConversationTurn>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_serializes_camel_case_without_raw() {
        let result = TranslationResult {
            mode: TranslationMode::Model,
            explanation: "ok".to_string(),
            commands: CommandBatch::sanitized(["A = (0, 0)"]),
            needs_clarification: false,
            raw_model_output: Some("raw".to_string()),
        };

        let json = serde_json::to_value(TranslateResponse::from_result(result, false)).unwrap();

        assert_eq!(json["needClarification"], serde_json::json!(false));
        assert_eq!(json["mode"], serde_json::json!("model"));
        assert_eq!(json["commands"], serde_json::json!(["A = (0, 0)"]));
        assert!(json.get("raw").is_none());
    }

    #[test]
    fn test_batch_is_sanitized_on_construction() {
        let batch = CommandBatch::sanitized(["  A = (1, 2) ", "", "// note", "Execute({\"x\"})"]);
        assert_eq!(batch.as_slice(), ["A = (1, 2)"]);
    }
}
