use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("Input validation error: {message}")]
    EmptyInput { message: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Model request failed: {message}")]
    UpstreamError {
        status: Option<u16>,
        message: String,
        detail: Option<serde_json::Value>,
    },

    #[error("Malformed model response: {message}")]
    MalformedResponse { message: String },

    #[error("Geometry session is not ready")]
    SessionNotReady,

    #[error("Command batch is empty")]
    EmptyBatch,

    #[error("Command {} rejected by geometry engine: {command}", .index + 1)]
    CommandRejected { index: usize, command: String },

    #[error("Request was superseded by a newer request")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Upstream,
    Execution,
    Transport,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TranslateError {
    pub fn empty_input() -> Self {
        Self::EmptyInput {
            message: "text is required".to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptyInput { .. } => ErrorCategory::Input,
            Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => ErrorCategory::Configuration,
            Self::HttpError(_) | Self::UpstreamError { .. } | Self::MalformedResponse { .. } => {
                ErrorCategory::Upstream
            }
            Self::SessionNotReady | Self::EmptyBatch | Self::CommandRejected { .. } => {
                ErrorCategory::Execution
            }
            Self::Cancelled => ErrorCategory::Transport,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Transport => ErrorSeverity::Low,
            ErrorCategory::Input | ErrorCategory::Upstream => ErrorSeverity::Medium,
            ErrorCategory::Execution | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 對應 HTTP 狀態碼：輸入錯誤為 400，其餘一律 500
    pub fn status_code(&self) -> u16 {
        match self.category() {
            ErrorCategory::Input => 400,
            _ => 500,
        }
    }

    /// 上游錯誤附帶的原始回應內容（若有）
    pub fn upstream_detail(&self) -> Option<&serde_json::Value> {
        match self {
            Self::UpstreamError { detail, .. } => detail.as_ref(),
            _ => None,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::EmptyInput { .. } => "请输入要构造的几何图形描述".to_string(),
            Self::UpstreamError { message, .. } => format!("模型服务请求失败: {}", message),
            Self::HttpError(e) if e.is_timeout() => "模型服务请求超时".to_string(),
            Self::HttpError(_) => "无法连接到模型服务".to_string(),
            Self::MalformedResponse { .. } => "模型服务返回了无法解析的结果".to_string(),
            Self::CommandRejected { index, command } => {
                format!("第 {} 条指令执行失败: {}", index + 1, command)
            }
            Self::SessionNotReady => "几何画板尚未就绪".to_string(),
            Self::EmptyBatch => "没有可执行的指令".to_string(),
            Self::Cancelled => "请求已被新的请求取代".to_string(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Describe the construction in a few words, e.g. 画一个圆",
            ErrorCategory::Configuration => "Check the CLI flags, environment variables and TOML config file",
            ErrorCategory::Upstream => "Verify the model base URL, API key and network connectivity, then retry",
            ErrorCategory::Execution => "Inspect the failing command; commands applied before it remain in the construction",
            ErrorCategory::Transport => "No action needed",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, TranslateError>;
