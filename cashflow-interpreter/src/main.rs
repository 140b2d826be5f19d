#![warn(clippy::uninlined_format_args)]

mod bootstrap;

use std::{borrow::Cow, env, fs, process};

use bootstrap::{AppConfig, init_logging};
use cashflow_domain::{Party, SettlementEngine};
use cashflow_parser::{LedgerSource, parse_ledger};
use cashflow_presentation::{
    SettlementPresenter, SettlementView, format_ledger_error, format_parse_error,
};

type CliResult<T> = Result<T, Cow<'static, str>>;

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_DEADLOCKED: i32 = 2;

fn main() {
    let config = AppConfig::from_env();
    init_logging(&config);

    let result = run(&config);
    match &result {
        Ok(view) => println!("{}", view.to_text()),
        Err(err) => eprintln!("Error: {err}"),
    }

    let code = exit_code(&result);
    if code != EXIT_SUCCESS {
        process::exit(code);
    }
}

fn exit_code(result: &CliResult<SettlementView>) -> i32 {
    match result {
        Ok(view) if view.settled => EXIT_SUCCESS,
        Ok(_) => EXIT_DEADLOCKED,
        Err(_) => EXIT_FAILURE,
    }
}

fn run(config: &AppConfig) -> CliResult<SettlementView> {
    let Some(path) = env::args().nth(1) else {
        return Err("Usage: cashflow <ledger-file>".into());
    };

    let source =
        fs::read_to_string(&path).map_err(|err| format!("Failed to read '{path}': {err}"))?;

    settle_source(&source, config)
}

fn settle_source(source: &str, config: &AppConfig) -> CliResult<SettlementView> {
    let ledger = parse_ledger(source).map_err(|err| format_parse_error(&err))?;
    tracing::debug!(party_count = ledger.parties.len(), "Ledger parsed");

    let report = SettlementEngine
        .settle(to_parties(&ledger))
        .map_err(|err| format_ledger_error(&err))?;

    Ok(SettlementPresenter::render(&report, &config.currency))
}

fn to_parties(ledger: &LedgerSource<'_>) -> Vec<Party> {
    ledger
        .iter()
        .map(|decl| Party::new(decl.name, decl.amount, decl.channels.iter().copied()))
        .collect()
}
