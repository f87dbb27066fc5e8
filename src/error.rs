use thiserror::Error;

/// 报价引擎与服务层错误
#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("Project description is empty")]
    EmptyDescription,

    #[error("No customer bound to the quotation")]
    CustomerNotBound,

    #[error("Customer {0} not found")]
    CustomerNotFound(i64),

    #[error("Invalid catalog entry '{name}': {reason}")]
    InvalidCatalogEntry { name: String, reason: String },

    #[error("Quotation {0} not found")]
    QuotationNotFound(String),

    #[error("Stored quotation {quote_no} is corrupt: {reason}")]
    CorruptQuotation { quote_no: String, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Worker failed: {0}")]
    Worker(String),

    #[error("Export failed: {0}")]
    Export(String),
}

impl QuoteError {
    /// 调用方可重新提交输入修复的前置条件错误
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            QuoteError::EmptyDescription
                | QuoteError::CustomerNotBound
                | QuoteError::CustomerNotFound(_)
                | QuoteError::QuotationNotFound(_)
        )
    }
}

pub type QuoteResult<T> = Result<T, QuoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_classification() {
        assert!(QuoteError::EmptyDescription.is_rejection());
        assert!(QuoteError::CustomerNotBound.is_rejection());
        assert!(QuoteError::CustomerNotFound(9).is_rejection());
        assert!(!QuoteError::Worker("panicked".into()).is_rejection());
        assert!(!QuoteError::CorruptQuotation {
            quote_no: "QT-20261018-001".into(),
            reason: "unknown unit 'bag'".into(),
        }
        .is_rejection());
        assert!(!QuoteError::InvalidCatalogEntry {
            name: "Ceiling Fan".into(),
            reason: "negative rate".into(),
        }
        .is_rejection());
    }
}
