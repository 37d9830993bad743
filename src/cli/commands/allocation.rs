use hb_core::{
    parse_money, AllocationService, AppliedAllocation, IncomeDetails, OvercommitPolicy,
    PlanService,
};

use super::{parse_amount, parse_income_details, parse_row};
use crate::cli::context::{CliMode, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};
use crate::errors::BudgetError;

const NOTHING_TO_DISTRIBUTE: &str = "Nothing to distribute: every category is full for this month.";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "plan",
            "Show remaining capacity, optionally with a suggested split",
            "plan [amount]",
            cmd_plan,
        ),
        CommandEntry::new(
            "allocate",
            "Split an income proportionally and record it",
            "allocate <amount> [salary|biweekly|other] [note..]",
            cmd_allocate,
        ),
        CommandEntry::new(
            "draft",
            "Start an editable allocation",
            "draft <amount>",
            cmd_draft,
        ),
        CommandEntry::new(
            "set",
            "Change a draft row without pinning it",
            "set <row> <amount>",
            cmd_set,
        ),
        CommandEntry::new(
            "pin",
            "Pin a draft row so rebalancing keeps it",
            "pin <row> [amount]",
            cmd_pin,
        ),
        CommandEntry::new("unpin", "Release a pinned draft row", "unpin <row>", cmd_unpin),
        CommandEntry::new(
            "rebalance",
            "Spread the rest of the draft over unpinned rows",
            "rebalance [scale]",
            cmd_rebalance,
        ),
        CommandEntry::new(
            "apply",
            "Record the draft as an income and its contributions",
            "apply [salary|biweekly|other] [note..]",
            cmd_apply,
        ),
    ]
}

fn cmd_plan(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let user = context.require_user()?;
    let amount = args.first().map(|raw| parse_money(raw)).transpose()?;
    let plan = PlanService::build_plan(&context.household, &user, context.month)?;

    output::section(format!("Plan for {user}, {}", context.month.display_name()));
    if plan.is_empty() {
        io::print_info(NOTHING_TO_DISTRIBUTE);
        return Ok(());
    }

    let suggestion = amount.map(|amount| AllocationService::suggest(&plan, amount));
    let mut columns = vec![
        TableColumn::right("#"),
        TableColumn::left("Category"),
        TableColumn::right("Cap"),
        TableColumn::right("Contributed"),
        TableColumn::right("Remaining"),
    ];
    if suggestion.is_some() {
        columns.push(TableColumn::right("Suggested"));
    }
    let mut table = Table::new(columns);
    for (idx, line) in plan.iter().enumerate() {
        let mut row = vec![
            (idx + 1).to_string(),
            line.name.clone(),
            context.format_amount(line.personal_cap),
            context.format_amount(line.contributed),
            context.format_amount(line.capacity),
        ];
        if let Some(suggestion) = &suggestion {
            row.push(context.format_amount(suggestion.assigned[idx]));
        }
        table.push(row);
    }
    output::raw(table.render());
    io::print_info(format!(
        "Total remaining: {}",
        context.format_amount(PlanService::total_capacity(&plan))
    ));
    if let Some(suggestion) = suggestion.filter(|s| s.leftover > 0) {
        io::print_warning(format!(
            "Funds not placed: {}",
            context.format_amount(suggestion.leftover)
        ));
    }
    Ok(())
}

fn cmd_allocate(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let amount = parse_amount(
        args.first(),
        "allocate <amount> [salary|biweekly|other] [note..]",
    )?;
    let details = parse_income_details(args.get(1..).unwrap_or_default());
    let user = context.require_user()?;
    let applied = AllocationService::auto_allocate(
        &mut context.household,
        &user,
        context.month,
        amount,
        details.clone(),
        context.clock.as_ref(),
    )?;
    report_applied(context, &user, amount, &details, &applied);
    if applied.income_id.is_some() {
        context.save_household()?;
    }
    Ok(())
}

fn cmd_draft(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let amount = parse_amount(args.first(), "draft <amount>")?;
    if amount == 0 {
        return Err(BudgetError::InvalidInput("amount must be greater than zero".into()).into());
    }
    let user = context.require_user()?;
    if context.draft.is_some()
        && context.mode == CliMode::Interactive
        && !io::confirm_action(&context.theme, "Discard the current draft?", false)?
    {
        return Ok(());
    }
    let draft = AllocationService::draft(&context.household, &user, context.month, amount)?;
    if draft.rows.is_empty() {
        io::print_info(NOTHING_TO_DISTRIBUTE);
    }
    context.draft = Some(draft);
    print_draft(context)?;
    io::print_hint("Adjust rows with `set`, `pin` and `unpin`, then `rebalance` and `apply`.");
    Ok(())
}

fn cmd_set(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    const USAGE: &str = "set <row> <amount>";
    let row = parse_row(args.first(), USAGE)?;
    let amount = parse_amount(args.get(1), USAGE)?;
    context.require_draft_mut()?.set_assigned(row, amount)?;
    print_draft(context)
}

fn cmd_pin(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let row = parse_row(args.first(), "pin <row> [amount]")?;
    let amount = args.get(1).map(|raw| parse_money(raw)).transpose()?;
    context.require_draft_mut()?.pin(row, amount)?;
    print_draft(context)
}

fn cmd_unpin(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let row = parse_row(args.first(), "unpin <row>")?;
    context.require_draft_mut()?.unpin(row)?;
    print_draft(context)
}

fn cmd_rebalance(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let policy = match args.first().map(|arg| arg.to_ascii_lowercase()) {
        None => OvercommitPolicy::Reject,
        Some(arg) if arg == "scale" => OvercommitPolicy::ScaleDown,
        Some(other) => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown rebalance mode `{other}` (use `rebalance` or `rebalance scale`)"
            )))
        }
    };
    let draft = context.require_draft_mut()?;
    let amount = draft.amount;
    let report = draft.rebalance(policy)?;

    if let Some(pinned) = report.scaled_from {
        io::print_warning(format!(
            "Pinned rows totalled {}; scaled down to fit {}.",
            context.format_amount(pinned),
            context.format_amount(amount)
        ));
    }
    print_draft(context)?;
    if report.leftover > 0 {
        io::print_warning(format!(
            "Funds not placed: {}",
            context.format_amount(report.leftover)
        ));
    }
    Ok(())
}

fn cmd_apply(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let details = parse_income_details(args);
    let draft = context.draft.take().ok_or(CommandError::NoDraft)?;
    match AllocationService::apply(
        &mut context.household,
        &draft,
        details.clone(),
        context.clock.as_ref(),
    ) {
        Ok(applied) => {
            report_applied(context, &draft.user, draft.amount, &details, &applied);
            if applied.income_id.is_some() {
                context.save_household()?;
            }
            Ok(())
        }
        Err(err) => {
            context.draft = Some(draft);
            Err(err.into())
        }
    }
}

fn print_draft(context: &ShellContext) -> CommandResult {
    let draft = context.require_draft()?;
    output::section(format!(
        "Draft for {}: {} in {}",
        draft.user,
        context.format_amount(draft.amount),
        draft.month.display_name()
    ));
    let mut table = Table::new(vec![
        TableColumn::right("#"),
        TableColumn::left("Category"),
        TableColumn::right("Remaining"),
        TableColumn::right("Assigned"),
        TableColumn::left("Pinned"),
    ]);
    for (idx, row) in draft.rows.iter().enumerate() {
        table.push(vec![
            (idx + 1).to_string(),
            row.line.name.clone(),
            context.format_amount(row.line.capacity),
            context.format_amount(row.assigned),
            if row.fixed { "yes".into() } else { String::new() },
        ]);
    }
    output::raw(table.render());

    let assigned = draft.assigned_total();
    io::print_info(format!(
        "Assigned {} of {}",
        context.format_amount(assigned),
        context.format_amount(draft.amount)
    ));
    if assigned > draft.amount {
        io::print_warning(format!(
            "Rows exceed the amount by {}; run `rebalance` before applying.",
            context.format_amount(assigned - draft.amount)
        ));
    }
    Ok(())
}

fn report_applied(
    context: &ShellContext,
    user: &str,
    amount: u64,
    details: &IncomeDetails,
    applied: &AppliedAllocation,
) {
    if applied.income_id.is_none() {
        io::print_info(NOTHING_TO_DISTRIBUTE);
        io::print_hint(format!(
            "No income was recorded; {} is still unassigned.",
            context.format_amount(amount)
        ));
        return;
    }

    let mut table = Table::new(vec![
        TableColumn::left("Category"),
        TableColumn::right("Amount"),
    ]);
    for (budget_id, contributed) in &applied.contributions {
        let name = context
            .household
            .budget_entry(*budget_id)
            .map(|entry| entry.name().to_string())
            .unwrap_or_else(|| budget_id.to_string());
        table.push(vec![name, context.format_amount(*contributed)]);
    }
    output::raw(table.render());
    io::print_success(format!(
        "Recorded {} income of {} for {user}.",
        details.kind,
        context.format_amount(amount)
    ));
    if applied.leftover > 0 {
        io::print_warning(format!(
            "Funds not placed: {}",
            context.format_amount(applied.leftover)
        ));
    }
}
