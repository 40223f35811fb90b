pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{client::TranslationClient, openai::OpenAiChatClient};
pub use app::{api::router, conversation::Conversation};
pub use config::{ServerConfig, TranslatorConfig};
pub use crate::core::{executor::CommandExecutor, translator::Translator};
pub use utils::error::{Result, TranslateError};
