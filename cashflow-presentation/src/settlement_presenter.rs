use crate::strings;
use cashflow_domain::{Ledger, PartyId, SettlementInstruction, SettlementReport, Termination};
use std::borrow::Cow;

pub struct SettlementPresenter;

/// Rendered plan: one line per instruction, then the outcome summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementView {
    pub instruction_lines: Vec<String>,
    pub summary_lines: Vec<String>,
    pub settled: bool,
}

impl SettlementView {
    pub fn to_text(&self) -> String {
        self.instruction_lines
            .iter()
            .chain(&self.summary_lines)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl SettlementPresenter {
    pub fn render(report: &SettlementReport, currency: &str) -> SettlementView {
        let instruction_lines = report
            .instructions
            .iter()
            .map(|instruction| Self::render_instruction(&report.ledger, instruction, currency))
            .collect();

        let summary_lines = match &report.termination {
            Termination::Settled => vec![strings::SETTLED.to_string()],
            Termination::Deadlocked(deadlock) => {
                let mut lines = Vec::with_capacity(deadlock.residual.len() + 2);
                lines.push(strings::deadlocked(party_label(
                    &report.ledger,
                    deadlock.debtor,
                )));
                lines.push(strings::RESIDUAL_HEADER.to_string());
                for residual in &deadlock.residual {
                    lines.push(strings::residual(
                        party_label(&report.ledger, residual.party),
                        residual.amount,
                    ));
                }
                lines
            }
        };

        SettlementView {
            instruction_lines,
            summary_lines,
            settled: report.termination.is_settled(),
        }
    }

    pub fn render_instruction(
        ledger: &Ledger,
        instruction: &SettlementInstruction,
        currency: &str,
    ) -> String {
        strings::payment(
            party_label(ledger, instruction.from),
            currency,
            instruction.amount,
            party_label(ledger, instruction.to),
            &instruction.channel,
        )
    }
}

fn party_label(ledger: &Ledger, id: PartyId) -> Cow<'_, str> {
    match ledger.party(id) {
        Some(party) => Cow::Borrowed(party.name.as_str()),
        None => Cow::Owned(id.to_string()),
    }
}
