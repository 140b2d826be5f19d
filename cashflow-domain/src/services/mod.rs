pub mod settlement_engine;

pub use settlement_engine::{
    Deadlock, SettlementEngine, SettlementReport, SettlementRun, Termination,
};
