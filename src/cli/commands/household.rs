use std::path::PathBuf;

use hb_core::CoreError;
use hb_domain::MonthKey;

use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("users", "List household members", "users", cmd_users),
        CommandEntry::new("user", "Select the active user", "user <name>", cmd_user),
        CommandEntry::new(
            "month",
            "Show or switch the budgeting month",
            "month [YYYY-MM]",
            cmd_month,
        ),
        CommandEntry::new(
            "templates",
            "Load users and categories from a YAML or JSON file",
            "templates [path]",
            cmd_templates,
        ),
    ]
}

fn cmd_users(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if context.household.users.is_empty() {
        io::print_info("No users yet. Load a template file with `templates <path>`.");
        return Ok(());
    }
    for user in &context.household.users {
        let marker = if context.user.as_deref() == Some(user.as_str()) {
            "*"
        } else {
            " "
        };
        io::print_info(format!("{marker} {user}"));
    }
    Ok(())
}

fn cmd_user(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = args
        .first()
        .ok_or_else(|| CommandError::InvalidArguments("usage: user <name>".into()))?;
    if !context.household.has_user(name) {
        return Err(CoreError::UnknownUser(name.to_string()).into());
    }
    if context.user.as_deref() != Some(*name) {
        context.draft = None;
    }
    context.user = Some(name.to_string());
    context.config.last_user = Some(name.to_string());
    context.persist_config()?;
    io::print_success(format!("Active user: {name}"));
    Ok(())
}

fn cmd_month(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(raw) = args.first() else {
        io::print_info(format!(
            "Current month: {} ({})",
            context.month.display_name(),
            context.month
        ));
        return Ok(());
    };
    let month: MonthKey = raw
        .parse()
        .map_err(|err| CommandError::InvalidArguments(format!("{err}")))?;
    context.month = month;
    context.draft = None;
    let created = context.household.ensure_month(month);
    if created > 0 {
        context.save_household()?;
        io::print_info(format!(
            "Created {created} budgets for {}.",
            month.display_name()
        ));
    }
    io::print_success(format!("Switched to {}.", month.display_name()));
    Ok(())
}

fn cmd_templates(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = args
        .first()
        .map(PathBuf::from)
        .unwrap_or_else(|| context.config.resolve_template_path());
    let count = context.import_templates(&path)?;
    context.draft = None;
    context.config.template_path = Some(path.clone());
    context.persist_config()?;
    context.save_household()?;
    io::print_success(format!(
        "Loaded {count} categories for {} users from {}.",
        context.household.users.len(),
        path.display()
    ));

    let mut table = Table::new(vec![
        TableColumn::left("Key"),
        TableColumn::left("Category"),
        TableColumn::left("Type"),
        TableColumn::right("Limit"),
    ]);
    for template in &context.household.templates {
        table.push(vec![
            template.key.clone(),
            template.name.clone(),
            template.kind.to_string(),
            context.format_amount(template.limit_total),
        ]);
    }
    output::raw(table.render());
    Ok(())
}
