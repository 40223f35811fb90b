use crate::domain::model::{ConversationTurn, Role};
use serde_json::Value;

/// 保留最近的訊息數（偶數，維持一問一答）
pub const MAX_HISTORY_MESSAGES: usize = 12;
/// 每則訊息保留的最大字元數
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// 清理前端送來的對話歷史。任何格式錯誤的項目都直接略過，不回報錯誤。
pub fn normalize_history(history: Option<&Value>) -> Vec<ConversationTurn> {
    let Some(Value::Array(items)) = history else {
        return Vec::new();
    };

    let turns: Vec<ConversationTurn> = items.iter().filter_map(normalize_turn).collect();
    if turns.len() != items.len() {
        tracing::debug!(
            "History normalized: {} entries in, {} well-formed",
            items.len(),
            turns.len()
        );
    }
    cap_turns(turns)
}

/// 只保留最近 `MAX_HISTORY_MESSAGES` 則，每則截到 `MAX_MESSAGE_CHARS` 字元
pub fn cap_turns(turns: Vec<ConversationTurn>) -> Vec<ConversationTurn> {
    let skip = turns.len().saturating_sub(MAX_HISTORY_MESSAGES);
    turns
        .into_iter()
        .skip(skip)
        .map(|turn| ConversationTurn {
            content: truncate_chars(&turn.content, MAX_MESSAGE_CHARS),
            role: turn.role,
        })
        .collect()
}

fn normalize_turn(item: &Value) -> Option<ConversationTurn> {
    let role = item.get("role")?.as_str().and_then(Role::parse)?;
    let content = item.get("content")?.as_str()?.trim();
    if content.is_empty() {
        return None;
    }

    Some(ConversationTurn {
        role,
        content: truncate_chars(content, MAX_MESSAGE_CHARS),
    })
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}
