use hb_core::storage::{HouseholdBackupInfo, HouseholdStorage};

use crate::cli::context::{CliMode, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("save", "Write the household to disk", "save", cmd_save),
        CommandEntry::new(
            "backup",
            "Snapshot the household into the backups folder",
            "backup [note..]",
            cmd_backup,
        ),
        CommandEntry::new(
            "backups",
            "List saved backups, newest first",
            "backups",
            cmd_backups,
        ),
        CommandEntry::new(
            "restore",
            "Replace the household with a backup",
            "restore <number|file>",
            cmd_restore,
        ),
    ]
}

fn cmd_save(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let path = context.save_household()?;
    io::print_success(format!("Saved household to {}.", path.display()));
    Ok(())
}

fn cmd_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let note = args.join(" ");
    let note = (!note.trim().is_empty()).then_some(note.as_str());
    let info = context
        .storage
        .backup_household(&context.config.household_name, &context.household, note)?;
    io::print_success(format!("Created backup {}.", info.id));
    Ok(())
}

fn cmd_backups(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let backups = context
        .storage
        .list_backup_metadata(&context.config.household_name)?;
    if backups.is_empty() {
        io::print_info("No backups yet. Create one with `backup [note]`.");
        return Ok(());
    }
    let mut table = Table::new(vec![
        TableColumn::right("#"),
        TableColumn::left("Backup"),
        TableColumn::left("Created"),
        TableColumn::right("Size"),
    ]);
    for (idx, backup) in backups.iter().enumerate() {
        table.push(vec![
            (idx + 1).to_string(),
            backup.name.clone(),
            backup
                .created_at
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".into()),
            format!("{} B", backup.size_bytes),
        ]);
    }
    output::raw(table.render());
    io::print_hint("Restore one with `restore <number>`.");
    Ok(())
}

fn cmd_restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let selector = args
        .first()
        .ok_or_else(|| CommandError::InvalidArguments("usage: restore <number|file>".into()))?;
    let backups = context.storage.list_backups(&context.config.household_name)?;
    let backup = select_backup(&backups, selector)?;

    if context.mode == CliMode::Interactive
        && !io::confirm_action(
            &context.theme,
            &format!("Replace the current household with {}?", backup.id),
            false,
        )?
    {
        return Ok(());
    }

    let mut household = context.storage.restore_backup(backup)?;
    household.ensure_month(context.month);
    tracing::info!(backup = %backup.id, "restored household backup");
    context.household = household;
    context.draft = None;
    if let Some(user) = context.user.clone() {
        if !context.household.has_user(&user) {
            context.user = None;
            io::print_warning(format!("{user} is not part of the restored household."));
        }
    }
    context.save_household()?;
    io::print_success(format!("Restored {}.", backup.id));
    Ok(())
}

/// Picks a backup by its 1-based position in `backups` or by file name.
fn select_backup<'a>(
    backups: &'a [HouseholdBackupInfo],
    selector: &str,
) -> Result<&'a HouseholdBackupInfo, CommandError> {
    let found = match selector.parse::<usize>() {
        Ok(position) => position.checked_sub(1).and_then(|idx| backups.get(idx)),
        Err(_) => backups.iter().find(|backup| {
            backup.id == selector || backup.id.strip_suffix(".json") == Some(selector)
        }),
    };
    found.ok_or_else(|| {
        CommandError::InvalidArguments(format!(
            "no backup matches `{selector}`; run `backups` to list them"
        ))
    })
}
