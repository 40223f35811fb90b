// Adapters layer: concrete implementations for external systems (model backend, translation server).

pub mod client;
pub mod openai;
