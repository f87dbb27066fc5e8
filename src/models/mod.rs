pub mod customer;
pub mod draft;
pub mod line_item;
pub mod material;
pub mod quotation;
pub mod totals;

pub use customer::{Customer, CustomerRef};
pub use draft::{DraftSnapshot, ItemAggregator, ProposalOutcome, QuotationDraft};
pub use line_item::{LineItem, Unit};
pub use material::Material;
pub use quotation::{
    format_quote_number, quote_number_prefix, QuotationItemRecord, QuotationRecord,
    SavedQuotation,
};
pub use totals::Totals;
