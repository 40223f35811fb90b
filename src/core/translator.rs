use crate::adapters::openai::OpenAiChatClient;
use crate::config::TranslatorConfig;
use crate::core::extractor::extract_commands;
use crate::core::fallback::generate_fallback;
use crate::core::history::normalize_history;
use crate::domain::model::{
    CommandBatch, ConversationTurn, Draft, Role, TranslationMode, TranslationResult,
};
use crate::domain::ports::{ChatMessage, ChatRequest, ChatRole, LanguageModel};
use crate::utils::error::{Result, TranslateError};
use serde_json::Value;

pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You translate geometry requests into GeoGebra commands.

Output format:
- Briefly explain the construction in the user's language.
- Put every command inside exactly one fenced block opened with ```geogebra and closed with ```.
- One command per line. No comments, no blank lines, no numbering inside the block.
- Define objects before using them, e.g. `A = (0, 0)` before `Circle(A, 3)`.
- Use GeoGebra syntax: points `P = (x, y)`, polar points `P = (r; θ)`, sliders `a = Slider(min, max, step)`,
  implicit curves `c: x^2 + y^2 = 9`, functions `f(x) = x^2`, `Text("label", (x, y))`, `SetColor(obj, "red")`,
  `StartAnimation(a, true)` to animate a slider.

Multi-turn policy:
- Earlier turns show the commands already applied to the construction. Reuse their object names.
- Only emit commands that are new or change existing objects; never repeat the whole construction.
- Never use scripting commands (SetClickScript, SetUpdateScript, RunClickScript, RunUpdateScript, Execute, Button)
  unless the user explicitly asks for them.

If the request is ambiguous, ask a short clarifying question and do not output a command block."#;

/// 模型沒有給任何說明、也沒有指令時回給使用者的提示
pub const DEFAULT_CLARIFICATION: &str =
    "我需要更多信息才能生成作图指令：请说明对象名称、坐标或尺寸、参数的取值范围，以及是否需要动画。";

const DEFAULT_MODEL_EXPLANATION: &str = "已生成 GeoGebra 指令。";

/// 自然語言到指令的協調者：依設定走規則模式或模型模式
pub struct Translator<M: LanguageModel> {
    config: TranslatorConfig,
    model: M,
    system_prompt: String,
}

impl Translator<OpenAiChatClient> {
    pub fn from_config(config: TranslatorConfig) -> Result<Self> {
        let client = OpenAiChatClient::new(&config)?;
        Ok(Self::new(config, client))
    }
}

impl<M: LanguageModel> Translator<M> {
    pub fn new(config: TranslatorConfig, model: M) -> Self {
        Self {
            config,
            model,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn mode(&self) -> TranslationMode {
        if self.config.has_credential() {
            TranslationMode::Model
        } else {
            TranslationMode::Fallback
        }
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    pub async fn translate(&self, text: &str, history: Option<&Value>) -> Result<TranslationResult> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TranslateError::empty_input());
        }

        match self.mode() {
            TranslationMode::Fallback => {
                tracing::info!("No model credential configured, using fallback rules");
                Ok(finish(TranslationMode::Fallback, generate_fallback(text), None))
            }
            TranslationMode::Model => {
                let history = normalize_history(history);
                let request = self.build_request(text, &history);
                tracing::debug!(
                    "Sending {} messages to model '{}'",
                    request.messages.len(),
                    self.config.model
                );

                let reply = self.model.complete(&request).await?;
                tracing::debug!("Model replied with {} chars", reply.len());

                let draft = extract_commands(Some(reply.as_str()));
                Ok(finish(TranslationMode::Model, draft, Some(reply)))
            }
        }
    }

    /// 組裝系統指示、清理後的歷史與目前的使用者訊息
    pub fn build_request(&self, text: &str, history: &[ConversationTurn]) -> ChatRequest {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage {
            role: ChatRole::System,
            content: self.system_prompt.clone(),
        });
        messages.extend(history.iter().map(|turn| ChatMessage {
            role: match turn.role {
                Role::User => ChatRole::User,
                Role::Assistant => ChatRole::Assistant,
            },
            content: turn.content.clone(),
        }));
        messages.push(ChatMessage {
            role: ChatRole::User,
            content: text.to_string(),
        });

        ChatRequest {
            messages,
            temperature: self.config.temperature,
        }
    }
}

/// 回應邊界：無論來源都再清理一次指令
fn finish(mode: TranslationMode, draft: Draft, raw_model_output: Option<String>) -> TranslationResult {
    let commands = CommandBatch::sanitized(draft.commands);
    let needs_clarification = commands.is_empty();

    let explanation = match (draft.explanation.is_empty(), needs_clarification) {
        (false, _) => draft.explanation,
        (true, true) => DEFAULT_CLARIFICATION.to_string(),
        (true, false) => DEFAULT_MODEL_EXPLANATION.to_string(),
    };

    tracing::info!(
        "Translation finished: mode={:?}, commands={}, clarification={}",
        mode,
        commands.len(),
        needs_clarification
    );

    TranslationResult {
        mode,
        explanation,
        commands,
        needs_clarification,
        raw_model_output,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct FakeModel {
        reply: String,
        fail: bool,
        requests: Arc<Mutex<Vec<ChatRequest>>>,
    }

    impl FakeModel {
        fn replying(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                ..Self::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LanguageModel for FakeModel {
        async fn complete(&self, request: &ChatRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(TranslateError::UpstreamError {
                    status: Some(502),
                    message: "bad gateway".to_string(),
                    detail: None,
                });
            }
            Ok(self.reply.clone())
        }
    }

    fn model_config() -> TranslatorConfig {
        TranslatorConfig::default().with_api_key("sk-test")
    }

    #[tokio::test]
    async fn test_without_credential_uses_fallback_and_never_calls_model() {
        let model = FakeModel::replying("```geogebra\nA = (9, 9)\n```");
        let translator = Translator::new(TranslatorConfig::default(), model.clone());

        let result = translator.translate("画一个圆", None).await.unwrap();

        assert_eq!(result.mode, TranslationMode::Fallback);
        assert_eq!(result.commands.as_slice(), ["O = (0, 0)", "Circle(O, 5)"]);
        assert!(!result.needs_clarification);
        assert!(result.raw_model_output.is_none());
        assert!(model.calls().is_empty());
    }

    #[tokio::test]
    async fn test_fallback_without_match_needs_clarification() {
        let translator = Translator::new(TranslatorConfig::default(), FakeModel::default());

        let result = translator.translate("画一个正方形", None).await.unwrap();

        assert_eq!(result.mode, TranslationMode::Fallback);
        assert!(result.commands.is_empty());
        assert!(result.needs_clarification);
    }

    #[tokio::test]
    async fn test_blank_text_is_rejected_before_any_call() {
        let model = FakeModel::replying("unused");
        let translator = Translator::new(model_config(), model.clone());

        let err = translator.translate("   ", None).await.unwrap_err();

        assert!(matches!(err, TranslateError::EmptyInput { .. }));
        assert!(model.calls().is_empty());
    }

    #[tokio::test]
    async fn test_model_reply_is_extracted_and_sanitized() {
        let reply = "以 A 为圆心画圆。\n```geogebra\nA = (0,0)\nCircle(A, 5)\nExecute({\"B=(1,1)\"})\n```";
        let model = FakeModel::replying(reply);
        let translator = Translator::new(model_config(), model.clone());

        let result = translator.translate("画一个圆", None).await.unwrap();

        assert_eq!(result.mode, TranslationMode::Model);
        assert_eq!(result.commands.as_slice(), ["A = (0,0)", "Circle(A, 5)"]);
        assert_eq!(result.explanation, "以 A 为圆心画圆。");
        assert!(!result.needs_clarification);
        assert_eq!(result.raw_model_output.as_deref(), Some(reply));
    }

    #[tokio::test]
    async fn test_fenceless_reply_is_a_clarification() {
        let model = FakeModel::replying("你希望椭圆的长轴是多少？");
        let translator = Translator::new(model_config(), model);

        let result = translator.translate("画椭圆", None).await.unwrap();

        assert!(result.needs_clarification);
        assert!(result.commands.is_empty());
        assert_eq!(result.explanation, "你希望椭圆的长轴是多少？");
    }

    #[tokio::test]
    async fn test_empty_reply_gets_default_clarification() {
        let translator = Translator::new(model_config(), FakeModel::replying("   "));

        let result = translator.translate("画点东西", None).await.unwrap();

        assert!(result.needs_clarification);
        assert_eq!(result.explanation, DEFAULT_CLARIFICATION);
    }

    #[tokio::test]
    async fn test_request_contains_system_history_and_user_turn() {
        let model = FakeModel::replying("```geogebra\nSetColor(c, \"red\")\n```");
        let translator = Translator::new(model_config(), model.clone());
        let history = json!([
            {"role": "user", "content": "画一个圆"},
            {"role": "assistant", "content": "```geogebra\nc = Circle((0,0), 5)\n```"},
            {"role": "system", "content": "dropped"}
        ]);

        translator
            .translate("把圆改成红色", Some(&history))
            .await
            .unwrap();

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        let roles: Vec<ChatRole> = calls[0].messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![ChatRole::System, ChatRole::User, ChatRole::Assistant, ChatRole::User]
        );
        assert_eq!(calls[0].messages[3].content, "把圆改成红色");
        assert_eq!(calls[0].temperature, 0.2);
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let translator = Translator::new(model_config(), FakeModel::failing());

        let err = translator.translate("画一个圆", None).await.unwrap_err();

        assert!(matches!(err, TranslateError::UpstreamError { status: Some(502), .. }));
    }
}
