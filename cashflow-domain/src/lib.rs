#![warn(clippy::uninlined_format_args)]

pub mod ledger;
pub mod model;
pub mod services;

pub use ledger::{CreditorSelection, Ledger, LedgerError};
pub use model::{Channel, ChannelSet, Party, PartyId, ResidualBalance, SettlementInstruction};
pub use services::{Deadlock, SettlementEngine, SettlementReport, SettlementRun, Termination};
