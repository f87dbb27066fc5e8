pub mod api;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod models;
pub mod service;

pub use config::{AppConfig, EngineSettings};
pub use db::create_pool;
pub use engine::QuoteEngine;
pub use error::{QuoteError, QuoteResult};
pub use service::QuoteService;
