use crate::config::{ModelArgs, ServerConfig};
use crate::utils::error::{Result, TranslateError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid placeholder regex"));

/// 設定檔；每個欄位都是選填，只覆蓋有寫的部分
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub server: Option<ServerSection>,
    pub model: Option<ModelSection>,
    pub diagnostics: Option<DiagnosticsSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelSection {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub name: Option<String>,
    pub temperature: Option<f32>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticsSection {
    pub debug_raw: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TranslateError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| TranslateError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OPENAI_API_KEY})；找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_PLACEHOLDER
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn apply_to(&self, config: &mut ServerConfig) {
        if let Some(port) = self.server.as_ref().and_then(|s| s.port) {
            config.port = port;
        }

        self.apply_model_to(&mut config.model);

        if let Some(debug_raw) = self.diagnostics.as_ref().and_then(|d| d.debug_raw) {
            config.debug_raw = debug_raw;
        }
    }

    /// 只套用 `[model]` 區段；`ggb-ask` 也會用到
    pub fn apply_model_to(&self, args: &mut ModelArgs) {
        let Some(model) = &self.model else {
            return;
        };

        if let Some(api_key) = &model.api_key {
            // 未替換的佔位符等同未設定
            if !ENV_PLACEHOLDER.is_match(api_key) {
                args.api_key = Some(api_key.clone());
            }
        }
        if let Some(base_url) = &model.base_url {
            args.base_url = base_url.clone();
        }
        if let Some(name) = &model.name {
            args.model = name.clone();
        }
        if let Some(temperature) = model.temperature {
            args.temperature = temperature;
        }
        if let Some(timeout) = model.timeout_seconds {
            args.timeout_seconds = timeout;
        }
    }
}
