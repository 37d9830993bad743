pub mod allocation;
pub mod household;
pub mod report;
pub mod storage;
pub mod system;

use hb_core::{parse_money, IncomeDetails};
use hb_domain::IncomeKind;

use crate::cli::context::CommandError;
use crate::cli::registry::CommandRegistry;

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    let entries = system::definitions()
        .into_iter()
        .chain(household::definitions())
        .chain(allocation::definitions())
        .chain(report::definitions())
        .chain(storage::definitions())
        .chain(std::iter::once(system::exit_definition()));
    for entry in entries {
        registry.register(entry);
    }
}

pub(crate) fn parse_amount(arg: Option<&&str>, usage: &str) -> Result<u64, CommandError> {
    let raw = arg.ok_or_else(|| CommandError::InvalidArguments(format!("usage: {usage}")))?;
    Ok(parse_money(raw)?)
}

/// Converts a 1-based row argument into a draft index.
pub(crate) fn parse_row(arg: Option<&&str>, usage: &str) -> Result<usize, CommandError> {
    let raw = arg.ok_or_else(|| CommandError::InvalidArguments(format!("usage: {usage}")))?;
    match raw.parse::<usize>() {
        Ok(row) if row > 0 => Ok(row - 1),
        _ => Err(CommandError::InvalidArguments(format!(
            "row must be a positive number, got `{raw}`"
        ))),
    }
}

/// `[kind] [note..]`: a leading income kind is optional, the rest is the note.
pub(crate) fn parse_income_details(args: &[&str]) -> IncomeDetails {
    let (kind, rest) = match args.split_first() {
        Some((first, rest)) => match first.parse::<IncomeKind>() {
            Ok(kind) => (kind, rest),
            Err(_) => (IncomeKind::default(), args),
        },
        None => (IncomeKind::default(), args),
    };
    let note = rest.join(" ");
    IncomeDetails {
        kind,
        note: (!note.trim().is_empty()).then_some(note),
    }
}
