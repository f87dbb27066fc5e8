pub mod export;
pub mod quote_service;

pub use export::snapshot_to_csv;
pub use quote_service::{preview_all, PreviewEntry, QuoteOutcome, QuoteService};
