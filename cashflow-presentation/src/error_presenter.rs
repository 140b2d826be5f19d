use crate::strings;
use cashflow_domain::LedgerError;
use cashflow_parser::ParseError;

pub fn format_ledger_error(error: &LedgerError) -> String {
    let detail = match error {
        LedgerError::EmptyLedger => "the ledger lists no parties".to_string(),
        LedgerError::DuplicateParty { name } => format!("'{name}' is listed more than once"),
        LedgerError::UnbalancedLedger { total } => {
            format!("balances must sum to zero but sum to {total}")
        }
        other => other.to_string(),
    };
    format!("{}: {detail}", strings::SETTLEMENT_REJECTED)
}

pub fn format_parse_error(error: &ParseError) -> String {
    match error {
        ParseError::SyntaxError { line, detail } | ParseError::InvalidAmount { line, detail } => {
            format!("{} (line {line}): {detail}", strings::LEDGER_PARSE_FAILED)
        }
    }
}
