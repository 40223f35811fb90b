use regex::Regex;
use std::sync::LazyLock;

/// 行首註解：`//`、`#`、`/*`、`*/`
static COMMENT_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(//|#|/\*|\*/)").expect("valid comment regex"));

/// 腳本類指令：點擊/更新腳本的註冊與觸發、任意執行、建立按鈕
static DISALLOWED_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(SetClickScript|SetUpdateScript|RunClickScript|RunUpdateScript|Execute|Button)\s*\(",
    )
    .expect("valid disallowed-command regex")
});

pub fn is_comment(line: &str) -> bool {
    COMMENT_PREFIX.is_match(line)
}

pub fn is_disallowed(line: &str) -> bool {
    DISALLOWED_COMMAND.is_match(line)
}

/// 將候選行過濾為可執行的指令：去空白、去空行、去註解、擋腳本類指令。
/// 結果再次套用不會改變。
pub fn sanitize_commands<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| {
            let line = line.as_ref().trim();
            if line.is_empty() || is_comment(line) {
                return None;
            }
            if is_disallowed(line) {
                tracing::warn!("Dropping scripting command: {}", line);
                return None;
            }
            Some(line.to_string())
        })
        .collect()
}
