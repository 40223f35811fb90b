pub mod executor;
pub mod extractor;
pub mod fallback;
pub mod history;
pub mod sanitizer;
pub mod single_flight;
pub mod translator;

pub use crate::domain::model::{CommandBatch, ConversationTurn, TranslationMode, TranslationResult};
pub use crate::domain::ports::{GeometrySession, LanguageModel};
pub use crate::utils::error::Result;
