use std::collections::HashSet;

use thiserror::Error;

use crate::model::{Channel, Party, PartyId, ResidualBalance};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Ledger has no parties")]
    EmptyLedger,
    #[error("Party '{name}' is declared more than once")]
    DuplicateParty { name: String },
    #[error("Sum of balances must be zero (found {total})")]
    UnbalancedLedger { total: i128 },
    #[error("Unknown party {0}")]
    UnknownParty(PartyId),
    #[error("Invalid transfer of {amount} from {debtor} to {creditor}")]
    InvalidTransfer {
        debtor: PartyId,
        creditor: PartyId,
        amount: i64,
    },
}

/// Outcome of looking for a creditor the debtor can pay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CreditorSelection {
    Found { creditor: PartyId, channel: Channel },
    NoCompatibleCreditor,
}

/// Mutable balance and channel state for every party of one settlement run.
///
/// Balances always sum to zero: construction rejects anything else and
/// [`Ledger::apply_transfer`] moves equal and opposite amounts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ledger {
    parties: Vec<Party>,
}

impl Ledger {
    pub fn try_new(parties: impl IntoIterator<Item = Party>) -> Result<Self, LedgerError> {
        let parties: Vec<Party> = parties.into_iter().collect();
        if parties.is_empty() {
            tracing::error!(reject_reason = "empty", "Ledger construction rejected");
            return Err(LedgerError::EmptyLedger);
        }

        let mut seen = HashSet::with_capacity(parties.len());
        for party in &parties {
            if !seen.insert(party.name.as_str()) {
                tracing::error!(
                    reject_reason = "duplicate_party",
                    name = %party.name,
                    "Ledger construction rejected"
                );
                return Err(LedgerError::DuplicateParty {
                    name: party.name.clone(),
                });
            }
        }

        // Subtotals can leave i64 even when the final sum is zero.
        let total = sum_balances(&parties);
        if total != 0 {
            tracing::error!(
                reject_reason = "unbalanced",
                total,
                party_count = parties.len(),
                "Ledger construction rejected"
            );
            return Err(LedgerError::UnbalancedLedger { total });
        }

        Ok(Self { parties })
    }

    pub fn len(&self) -> usize {
        self.parties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parties.is_empty()
    }

    pub fn parties(&self) -> &[Party] {
        &self.parties
    }

    pub fn party(&self, id: PartyId) -> Option<&Party> {
        self.parties.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (PartyId, &Party)> + '_ {
        self.parties
            .iter()
            .enumerate()
            .map(|(idx, party)| (PartyId(idx), party))
    }

    pub fn total(&self) -> i128 {
        sum_balances(&self.parties)
    }

    pub fn is_settled(&self) -> bool {
        self.parties.iter().all(Party::is_settled)
    }

    /// Non-zero balances in input order.
    pub fn residual_balances(&self) -> Vec<ResidualBalance> {
        self.iter()
            .filter(|(_, party)| !party.is_settled())
            .map(|(party, p)| ResidualBalance {
                party,
                amount: p.net_amount,
            })
            .collect()
    }

    /// Party with the most negative balance; the earliest one wins ties.
    pub fn max_debtor(&self) -> Option<PartyId> {
        let mut best: Option<(PartyId, i64)> = None;
        for (id, party) in self.iter() {
            match best {
                Some((_, amount)) if party.net_amount >= amount => {}
                _ => best = Some((id, party.net_amount)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Largest positive balance among parties sharing a channel with `debtor`.
    ///
    /// Ties go to the earliest party. The channel is the first of the debtor's
    /// channels that the chosen creditor also accepts.
    pub fn best_creditor_for(&self, debtor: PartyId) -> CreditorSelection {
        let Some(debtor_party) = self.party(debtor) else {
            return CreditorSelection::NoCompatibleCreditor;
        };

        let mut best: Option<(PartyId, i64, &Channel)> = None;
        for (id, party) in self.iter() {
            if id == debtor || !party.is_creditor() {
                continue;
            }
            let Some(channel) = debtor_party.channels.first_shared_with(&party.channels) else {
                continue;
            };
            match best {
                Some((_, amount, _)) if party.net_amount <= amount => {}
                _ => best = Some((id, party.net_amount, channel)),
            }
        }

        match best {
            Some((creditor, _, channel)) => CreditorSelection::Found {
                creditor,
                channel: channel.clone(),
            },
            None => CreditorSelection::NoCompatibleCreditor,
        }
    }

    /// Moves `amount` from `creditor`'s claim onto `debtor`'s debt.
    ///
    /// Neither balance may cross zero.
    pub fn apply_transfer(
        &mut self,
        debtor: PartyId,
        creditor: PartyId,
        amount: i64,
    ) -> Result<(), LedgerError> {
        let debtor_balance = self
            .party(debtor)
            .ok_or(LedgerError::UnknownParty(debtor))?
            .net_amount;
        let creditor_balance = self
            .party(creditor)
            .ok_or(LedgerError::UnknownParty(creditor))?
            .net_amount;

        let invalid = LedgerError::InvalidTransfer {
            debtor,
            creditor,
            amount,
        };
        if amount <= 0 || debtor == creditor {
            return Err(invalid);
        }
        if amount as u64 > debtor_balance.min(0).unsigned_abs() || amount > creditor_balance {
            return Err(invalid);
        }

        self.parties[debtor.index()].net_amount += amount;
        self.parties[creditor.index()].net_amount -= amount;
        Ok(())
    }
}

fn sum_balances(parties: &[Party]) -> i128 {
    parties
        .iter()
        .map(|party| i128::from(party.net_amount))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// Identity helper giving `#[case]` literals their slice type, since rstest
    /// binds case values with an untyped `let`.
    fn spec<'a>(s: &'a [(&'a str, i64, &'a [&'a str])]) -> &'a [(&'a str, i64, &'a [&'a str])] {
        s
    }

    fn ledger(parties: &[(&str, i64, &[&str])]) -> Ledger {
        Ledger::try_new(
            parties
                .iter()
                .map(|&(name, amount, channels)| Party::new(name, amount, channels.iter().copied())),
        )
        .expect("ledger should be valid")
    }

    #[rstest]
    #[case::empty(spec(&[]), LedgerError::EmptyLedger)]
    #[case::unbalanced(
        spec(&[("A", 50, &["X"]), ("B", -40, &["X"])]),
        LedgerError::UnbalancedLedger { total: 10 }
    )]
    #[case::single_nonzero(spec(&[("A", 50, &["X"])]), LedgerError::UnbalancedLedger { total: 50 })]
    #[case::duplicate(
        spec(&[("A", 10, &["X"]), ("A", -10, &["X"])]),
        LedgerError::DuplicateParty { name: "A".to_string() }
    )]
    #[case::beyond_i64(
        spec(&[("A", i64::MAX, &["X"]), ("B", 1, &["X"])]),
        LedgerError::UnbalancedLedger { total: i128::from(i64::MAX) + 1 }
    )]
    fn rejects_invalid_ledgers(
        #[case] parties: &[(&str, i64, &[&str])],
        #[case] expected: LedgerError,
    ) {
        let result = Ledger::try_new(
            parties
                .iter()
                .map(|&(name, amount, channels)| Party::new(name, amount, channels.iter().copied())),
        );
        assert_eq!(result, Err(expected));
    }

    #[rstest]
    #[case::min_first(spec(&[("A", i64::MIN, &["X"]), ("B", i64::MAX, &["X"]), ("C", 1, &["X"])]))]
    #[case::overflow_order_independent(
        spec(&[("B", i64::MAX, &["X"]), ("C", 1, &["X"]), ("A", i64::MIN, &["X"])])
    )]
    #[case::negative_subtotals(
        spec(&[("A", i64::MIN, &["X"]), ("B", -1, &["X"]), ("C", i64::MAX, &["X"]), ("D", 2, &["X"])])
    )]
    fn accepts_extreme_but_balanced_amounts(#[case] parties: &[(&str, i64, &[&str])]) {
        let ledger = ledger(parties);
        assert_eq!(ledger.total(), 0);
        assert_eq!(ledger.len(), parties.len());
    }

    #[rstest]
    #[case::most_negative(spec(&[("A", -10, &["X"]), ("B", -30, &["X"]), ("C", 40, &["X"])]), 1)]
    #[case::tie_first_wins(spec(&[("A", 20, &["X"]), ("B", -10, &["X"]), ("C", -10, &["X"])]), 1)]
    #[case::all_zero(spec(&[("A", 0, &["X"]), ("B", 0, &["X"])]), 0)]
    fn max_debtor_cases(#[case] parties: &[(&str, i64, &[&str])], #[case] expected: usize) {
        assert_eq!(ledger(parties).max_debtor(), Some(PartyId(expected)));
    }

    #[rstest]
    #[case::only_compatible_creditor(
        spec(&[("A", -300, &["UPI"]), ("B", 100, &["UPI", "Cash"]), ("C", 200, &["Cash"])]),
        CreditorSelection::Found { creditor: PartyId(1), channel: Channel::new("UPI") }
    )]
    #[case::largest_compatible(
        spec(&[("A", -300, &["X"]), ("B", 100, &["X"]), ("C", 200, &["X"])]),
        CreditorSelection::Found { creditor: PartyId(2), channel: Channel::new("X") }
    )]
    #[case::tie_first_wins(
        spec(&[("A", -200, &["X"]), ("B", 100, &["X"]), ("C", 100, &["X"])]),
        CreditorSelection::Found { creditor: PartyId(1), channel: Channel::new("X") }
    )]
    #[case::debtor_channel_order(
        spec(&[("A", -100, &["Card", "Cash", "UPI"]), ("B", 100, &["UPI", "Cash"])]),
        CreditorSelection::Found { creditor: PartyId(1), channel: Channel::new("Cash") }
    )]
    #[case::disjoint(
        spec(&[("A", -100, &["UPI"]), ("B", 100, &["Cash"])]),
        CreditorSelection::NoCompatibleCreditor
    )]
    #[case::settled_parties_skipped(
        spec(&[("A", -100, &["UPI"]), ("B", 0, &["UPI"]), ("C", 100, &["Cash"])]),
        CreditorSelection::NoCompatibleCreditor
    )]
    fn best_creditor_cases(
        #[case] parties: &[(&str, i64, &[&str])],
        #[case] expected: CreditorSelection,
    ) {
        assert_eq!(ledger(parties).best_creditor_for(PartyId(0)), expected);
    }

    #[test]
    fn best_creditor_for_unknown_debtor() {
        let ledger = ledger(&[("A", 0, &["X"])]);
        assert_eq!(
            ledger.best_creditor_for(PartyId(7)),
            CreditorSelection::NoCompatibleCreditor
        );
    }

    #[test]
    fn apply_transfer_moves_equal_and_opposite_amounts() {
        let mut ledger = ledger(&[("A", -300, &["X"]), ("B", 100, &["X"]), ("C", 200, &["X"])]);

        ledger
            .apply_transfer(PartyId(0), PartyId(1), 100)
            .expect("transfer should apply");

        assert_eq!(ledger.party(PartyId(0)).map(|p| p.net_amount), Some(-200));
        assert_eq!(ledger.party(PartyId(1)).map(|p| p.net_amount), Some(0));
        assert_eq!(ledger.total(), 0);
        assert_eq!(
            ledger.residual_balances(),
            vec![
                ResidualBalance { party: PartyId(0), amount: -200 },
                ResidualBalance { party: PartyId(2), amount: 200 },
            ]
        );
    }

    #[rstest]
    #[case::zero_amount(0, 1, 0)]
    #[case::negative_amount(0, 1, -5)]
    #[case::exceeds_creditor(0, 1, 150)]
    #[case::exceeds_debtor(2, 1, 50)]
    #[case::self_transfer(0, 0, 10)]
    fn apply_transfer_rejects_invalid(
        #[case] debtor: usize,
        #[case] creditor: usize,
        #[case] amount: i64,
    ) {
        let mut ledger = ledger(&[("A", -300, &["X"]), ("B", 100, &["X"]), ("C", 200, &["X"])]);
        let before = ledger.clone();

        let result = ledger.apply_transfer(PartyId(debtor), PartyId(creditor), amount);

        assert!(matches!(result, Err(LedgerError::InvalidTransfer { .. })));
        assert_eq!(ledger, before);
    }

    #[test]
    fn apply_transfer_rejects_unknown_party() {
        let mut ledger = ledger(&[("A", -10, &["X"]), ("B", 10, &["X"])]);
        assert_eq!(
            ledger.apply_transfer(PartyId(0), PartyId(5), 10),
            Err(LedgerError::UnknownParty(PartyId(5)))
        );
    }
}
