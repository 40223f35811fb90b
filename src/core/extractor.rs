use crate::core::sanitizer::sanitize_commands;
use crate::domain::model::Draft;
use regex::Regex;
use std::sync::LazyLock;

pub const COMMAND_FENCE_TAG: &str = "geogebra";

/// ```geogebra ... ``` 區塊；結尾圍欄前不要求換行，僅取第一個區塊
static COMMAND_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)```[ \t]*geogebra\b[ \t]*\r?\n?([\s\S]*?)```")
        .expect("valid command block regex")
});

/// 從模型回覆中取出指令區塊與說明文字。
///
/// 找不到區塊時整段回覆都視為說明，指令為空（需要使用者補充資訊）。
pub fn extract_commands(reply: Option<&str>) -> Draft {
    let reply = reply.unwrap_or_default();

    let Some(captures) = COMMAND_BLOCK.captures(reply) else {
        tracing::debug!("No command block found in model reply ({} chars)", reply.len());
        return Draft {
            explanation: reply.trim().to_string(),
            commands: Vec::new(),
        };
    };

    let (Some(block), Some(body)) = (captures.get(0), captures.get(1)) else {
        return Draft {
            explanation: reply.trim().to_string(),
            commands: Vec::new(),
        };
    };

    let commands = sanitize_commands(body.as_str().lines());
    let explanation = format!("{}{}", &reply[..block.start()], &reply[block.end()..])
        .trim()
        .to_string();

    tracing::debug!("Extracted {} commands from model reply", commands.len());
    Draft {
        explanation,
        commands,
    }
}

/// 將指令序列化成圍欄區塊，供對話歷史使用
pub fn render_command_block<S: AsRef<str>>(commands: &[S]) -> String {
    let mut block = format!("```{}\n", COMMAND_FENCE_TAG);
    for command in commands {
        block.push_str(command.as_ref());
        block.push('\n');
    }
    block.push_str("```");
    block
}
