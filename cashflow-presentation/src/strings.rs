pub const SETTLED: &str = "Cash Flow settled successfully.";
pub const RESIDUAL_HEADER: &str = "Outstanding balances:";
pub const SETTLEMENT_REJECTED: &str = "Settlement rejected";
pub const LEDGER_PARSE_FAILED: &str = "Could not read the ledger";

pub fn payment(
    payer: impl std::fmt::Display,
    currency: impl std::fmt::Display,
    amount: i64,
    payee: impl std::fmt::Display,
    channel: impl std::fmt::Display,
) -> String {
    format!("{payer} pays {currency} {amount} to {payee} via {channel}")
}

pub fn deadlocked(debtor: impl std::fmt::Display) -> String {
    format!("Cash Flow could not be settled: {debtor} has no creditor sharing a payment mode.")
}

pub fn residual(name: impl std::fmt::Display, amount: i64) -> String {
    let sign = if amount > 0 { "+" } else { "" };
    format!("  {name}: {sign}{amount}")
}
