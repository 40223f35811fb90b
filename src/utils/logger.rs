use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 日誌輸出格式：終端機用精簡格式，部署用 JSON 行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

/// `RUST_LOG` 未設定時使用的過濾規則
fn default_directives(format: LogFormat, verbose: bool) -> &'static str {
    match (format, verbose) {
        (_, true) => "ggb_translate=debug,tower_http=debug,info",
        (LogFormat::Compact, false) => "ggb_translate=info",
        (LogFormat::Json, false) => "ggb_translate=info,tower_http=info",
    }
}

fn env_filter(format: LogFormat, verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(format, verbose)))
}

/// 安裝全域 subscriber；重複呼叫時保留第一次的設定
pub fn init_logger(format: LogFormat, verbose: bool) {
    let registry = tracing_subscriber::registry().with(env_filter(format, verbose));

    let installed = match format {
        LogFormat::Compact => registry
            .with(fmt::layer().with_target(verbose).compact())
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .try_init(),
    };

    if installed.is_err() {
        tracing::debug!("Logger already initialized; keeping existing subscriber");
    }
}

pub fn init_cli_logger(verbose: bool) {
    init_logger(LogFormat::Compact, verbose);
}

pub fn init_json_logger() {
    init_logger(LogFormat::Json, false);
}
