use hb_core::{CategoryProgress, SummaryService};
use uuid::Uuid;

use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "summary",
            "Show this month's progress per category",
            "summary",
            cmd_summary,
        ),
        CommandEntry::new(
            "history",
            "List the active user's recent incomes",
            "history [limit]",
            cmd_history,
        ),
    ]
}

fn cmd_summary(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let month = context.month;
    output::section(format!("Shared categories, {}", month.display_name()));
    let shared = SummaryService::shared_summary(&context.household, month);
    if shared.is_empty() {
        io::print_info("No shared categories this month.");
    } else {
        let mut columns = vec![TableColumn::left("Category")];
        columns.extend(context.household.users.iter().map(TableColumn::right));
        columns.push(TableColumn::right("Total"));
        columns.push(TableColumn::right("Progress"));
        let mut table = Table::new(columns);
        for row in &shared {
            let mut cells = vec![row.name.clone()];
            cells.extend(row.users.iter().map(|share| {
                let mark = if share.done { " *" } else { "" };
                format!(
                    "{}/{}{mark}",
                    context.format_amount(share.contributed),
                    context.format_amount(share.personal_cap)
                )
            }));
            cells.push(format_total(context, &row.progress));
            cells.push(format_ratio(&row.progress));
            table.push(cells);
        }
        output::raw(table.render());
        io::print_hint("`*` marks a member who has covered their share.");
    }

    let Some(user) = context.user.clone() else {
        return Ok(());
    };
    output::section(format!("Personal categories for {user}"));
    let personal = SummaryService::personal_summary(&context.household, month, &user)?;
    if personal.is_empty() {
        io::print_info(format!("{user} has no personal categories this month."));
        return Ok(());
    }
    let mut table = Table::new(vec![
        TableColumn::left("Category"),
        TableColumn::right("Contributed"),
        TableColumn::right("Limit"),
        TableColumn::right("Progress"),
    ]);
    for row in &personal {
        table.push(vec![
            row.name.clone(),
            context.format_amount(row.contributed_by_user),
            context.format_amount(row.progress.limit_total),
            format_ratio(&row.progress),
        ]);
    }
    output::raw(table.render());
    Ok(())
}

fn cmd_history(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let limit = match args.first() {
        Some(raw) => match raw.parse::<usize>() {
            Ok(limit) if limit > 0 => limit,
            _ => {
                return Err(CommandError::InvalidArguments(format!(
                    "limit must be a positive number, got `{raw}`"
                )))
            }
        },
        None => context.config.history_limit,
    };
    let user = context.require_user()?;
    let incomes = SummaryService::income_history(&context.household, &user, limit);
    output::section(format!("Income history for {user}"));
    if incomes.is_empty() {
        io::print_info(format!("No incomes recorded for {user} yet."));
        return Ok(());
    }
    let mut table = Table::new(vec![
        TableColumn::left("Id"),
        TableColumn::left("Date"),
        TableColumn::left("Kind"),
        TableColumn::right("Amount"),
        TableColumn::left("Note"),
    ]);
    for income in incomes {
        table.push(vec![
            short_id(income.id),
            income.recorded_at.format("%Y-%m-%d").to_string(),
            income.kind.to_string(),
            context.format_amount(income.amount),
            income.note.clone().unwrap_or_default(),
        ]);
    }
    output::raw(table.render());
    Ok(())
}

fn format_total(context: &ShellContext, progress: &CategoryProgress) -> String {
    format!(
        "{}/{}",
        context.format_amount(progress.contributed),
        context.format_amount(progress.limit_total)
    )
}

fn format_ratio(progress: &CategoryProgress) -> String {
    let mark = if progress.done { " done" } else { "" };
    format!("{:.0}%{mark}", progress.ratio * 100.0)
}

fn short_id(id: Uuid) -> String {
    let mut short = id.simple().to_string();
    short.truncate(8);
    short
}
