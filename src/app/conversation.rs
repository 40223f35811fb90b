use crate::adapters::client::TranslationClient;
use crate::core::executor::CommandExecutor;
use crate::core::extractor::render_command_block;
use crate::core::history::cap_turns;
use crate::domain::model::{CommandBatch, ConversationTurn, TranslateResponse};
use crate::domain::ports::GeometrySession;
use crate::utils::error::{Result, TranslateError};

#[derive(Debug)]
pub enum Outcome {
    /// 所有指令都已套用
    Applied {
        response: TranslateResponse,
        applied: usize,
    },
    /// 沒有可執行的指令，僅有說明文字
    Clarification { response: TranslateResponse },
    /// 引擎拒絕了某條指令；之前的指令維持生效
    Failed {
        response: TranslateResponse,
        error: TranslateError,
    },
    /// 被較新的請求取代，結果已丟棄
    Discarded,
}

/// 客戶端的對話控制：送出請求、套用指令、累積歷史。
///
/// `request` 只需要 `&self`，可以在前一個請求尚未完成時再送出；
/// 新請求會取消舊的。每個請求的結果交給 `settle`（需要 `&mut self`），
/// 被取代的請求在那裡變成 `Outcome::Discarded`，不會動到歷史與工作階段。
/// `submit` 是單一請求時的 `request` + `settle`。
#[derive(Debug)]
pub struct Conversation {
    client: TranslationClient,
    executor: CommandExecutor,
    history: Vec<ConversationTurn>,
}

impl Conversation {
    pub fn new(client: TranslationClient) -> Self {
        Self {
            client,
            executor: CommandExecutor::new(),
            history: Vec::new(),
        }
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    pub fn executor(&self) -> &CommandExecutor {
        &self.executor
    }

    /// 只送出請求，不動歷史與工作階段
    pub async fn request(&self, text: &str) -> Result<TranslateResponse> {
        self.client.translate(text, &self.history).await
    }

    pub async fn submit<S>(&mut self, text: &str, session: &mut S) -> Result<Outcome>
    where
        S: GeometrySession + ?Sized,
    {
        let result = self.request(text).await;
        self.settle(text, result, session)
    }

    /// 處理 `request` 的結果；被取代的請求直接丟棄
    pub fn settle<S>(
        &mut self,
        text: &str,
        result: Result<TranslateResponse>,
        session: &mut S,
    ) -> Result<Outcome>
    where
        S: GeometrySession + ?Sized,
    {
        match result {
            Ok(response) => Ok(self.apply(text, response, session)),
            Err(TranslateError::Cancelled) => {
                tracing::debug!("Dropping superseded response for: {}", text);
                Ok(Outcome::Discarded)
            }
            Err(err) => Err(err),
        }
    }

    /// 套用回應中的指令並把這一輪寫入歷史
    pub fn apply<S>(&mut self, text: &str, response: TranslateResponse, session: &mut S) -> Outcome
    where
        S: GeometrySession + ?Sized,
    {
        self.history.push(ConversationTurn::user(text.trim()));
        self.history.push(ConversationTurn::assistant(assistant_content(&response)));
        self.history = cap_turns(std::mem::take(&mut self.history));

        let batch = CommandBatch::sanitized(&response.commands);
        if batch.is_empty() {
            return Outcome::Clarification { response };
        }

        match self.executor.apply(session, &batch) {
            Ok(applied) => Outcome::Applied { response, applied },
            Err(error) => Outcome::Failed { response, error },
        }
    }
}

fn assistant_content(response: &TranslateResponse) -> String {
    if response.commands.is_empty() {
        return response.explanation.clone();
    }
    format!(
        "{}\n\n{}",
        response.explanation,
        render_command_block(&response.commands)
    )
    .trim()
    .to_string()
}
