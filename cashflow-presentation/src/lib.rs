#![warn(clippy::uninlined_format_args)]

pub mod error_presenter;
pub mod settlement_presenter;
pub mod strings;

pub use error_presenter::{format_ledger_error, format_parse_error};
pub use settlement_presenter::{SettlementPresenter, SettlementView};
