use std::iter::FusedIterator;

use crate::{
    ledger::{CreditorSelection, Ledger, LedgerError},
    model::{Party, PartyId, ResidualBalance, SettlementInstruction},
};

/// Remaining debts that no channel-compatible pairing can reduce.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deadlock {
    /// Debtor that found no creditor sharing one of its channels.
    pub debtor: PartyId,
    /// Non-zero balances at the moment the run stopped, in input order.
    pub residual: Vec<ResidualBalance>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Termination {
    Settled,
    Deadlocked(Deadlock),
}

impl Termination {
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Settled)
    }
}

/// Result of a completed settlement run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettlementReport {
    pub instructions: Vec<SettlementInstruction>,
    pub termination: Termination,
    /// Ledger state after the last instruction.
    pub ledger: Ledger,
}

/// Greedy, channel-constrained settlement service.
///
/// Each step pairs the largest debtor with the largest creditor it shares a
/// channel with and moves `min(|debt|, claim)` between them.
#[derive(Clone, Copy, Debug, Default)]
pub struct SettlementEngine;

impl SettlementEngine {
    /// Builds a ledger from `parties` and settles it.
    pub fn settle(
        &self,
        parties: impl IntoIterator<Item = Party>,
    ) -> Result<SettlementReport, LedgerError> {
        let ledger = Ledger::try_new(parties)?;
        Ok(self.settle_ledger(ledger))
    }

    pub fn settle_ledger(&self, ledger: Ledger) -> SettlementReport {
        self.run(ledger).into_report()
    }

    /// Starts an incremental run; instructions are produced one per `next()`.
    pub fn run(&self, ledger: Ledger) -> SettlementRun {
        tracing::debug!(party_count = ledger.len(), "Settlement run started");
        SettlementRun {
            ledger,
            emitted: Vec::new(),
            termination: None,
        }
    }
}

/// In-progress settlement over an owned ledger.
///
/// Yields instructions until the ledger is settled or deadlocked; afterwards
/// [`SettlementRun::termination`] reports which.
#[derive(Debug)]
pub struct SettlementRun {
    ledger: Ledger,
    emitted: Vec<SettlementInstruction>,
    termination: Option<Termination>,
}

impl SettlementRun {
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn instructions(&self) -> &[SettlementInstruction] {
        &self.emitted
    }

    /// `None` while the run is still going.
    pub fn termination(&self) -> Option<&Termination> {
        self.termination.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.termination.is_some()
    }

    /// Drives the run to its terminal state and returns everything it produced.
    pub fn into_report(mut self) -> SettlementReport {
        while self.next().is_some() {}
        let termination = self.termination.unwrap_or(Termination::Settled);
        SettlementReport {
            instructions: self.emitted,
            termination,
            ledger: self.ledger,
        }
    }

    fn step(&mut self) -> Result<SettlementInstruction, Termination> {
        let Some(debtor) = self.ledger.max_debtor() else {
            return Err(Termination::Settled);
        };
        let debtor_party = &self.ledger.parties()[debtor.index()];
        // The most negative balance is non-negative only once everything is zero.
        if !debtor_party.is_debtor() {
            tracing::info!(
                instruction_count = self.emitted.len(),
                "Settlement completed"
            );
            return Err(Termination::Settled);
        }

        let debt = debtor_party.net_amount;

        let (creditor, channel) = match self.ledger.best_creditor_for(debtor) {
            CreditorSelection::Found { creditor, channel } => (creditor, channel),
            CreditorSelection::NoCompatibleCreditor => {
                let residual = self.ledger.residual_balances();
                tracing::warn!(
                    debtor = %debtor,
                    debt,
                    residual_count = residual.len(),
                    instruction_count = self.emitted.len(),
                    "Settlement deadlocked: no creditor shares a channel with the debtor"
                );
                return Err(Termination::Deadlocked(Deadlock { debtor, residual }));
            }
        };

        let claim = self.ledger.parties()[creditor.index()].net_amount;
        // claim > 0, so the minimum always fits back into i64
        let amount = debt.unsigned_abs().min(claim.unsigned_abs()) as i64;

        let applied = self.ledger.apply_transfer(debtor, creditor, amount);
        debug_assert!(
            applied.is_ok(),
            "selected pairing must form a valid transfer: {applied:?}"
        );

        tracing::debug!(
            debtor = %debtor,
            creditor = %creditor,
            amount,
            channel = %channel,
            step = self.emitted.len() + 1,
            "Settlement step"
        );

        // Every step zeroes at least one side, and zeroed balances stay zero.
        debug_assert!(self.emitted.len() < self.ledger.len().saturating_sub(1));

        Ok(SettlementInstruction {
            from: debtor,
            to: creditor,
            amount,
            channel,
        })
    }
}

impl Iterator for SettlementRun {
    type Item = SettlementInstruction;

    fn next(&mut self) -> Option<Self::Item> {
        if self.termination.is_some() {
            return None;
        }
        match self.step() {
            Ok(instruction) => {
                self.emitted.push(instruction.clone());
                Some(instruction)
            }
            Err(termination) => {
                self.termination = Some(termination);
                None
            }
        }
    }
}

impl FusedIterator for SettlementRun {}
