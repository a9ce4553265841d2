#![forbid(unsafe_code)]

pub mod classify;
pub mod cli;
pub mod content_type;
pub mod export;
pub mod formats;
pub mod generate;
pub mod llm;
pub mod logging;
pub mod openai;
pub mod output;
pub mod prompt;
pub mod render;
pub mod store;
pub mod structure;
