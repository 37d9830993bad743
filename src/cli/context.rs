//! Shell state, dispatch, and error reporting.

use std::{
    io,
    path::{Path, PathBuf},
};

use dialoguer::theme::ColorfulTheme;
use hb_config::{load_templates, Config, ConfigError, ConfigManager};
use hb_core::{
    format_money, storage::HouseholdStorage, AllocationDraft, Clock, CoreError, MoneyError,
    MoneyFormat,
};
use hb_domain::{Household, MonthKey};
use hb_storage_json::{JsonHouseholdStorage, StoragePaths};
use rustyline::error::ReadlineError;
use strsim::levenshtein;

use super::commands;
use super::io as cli_io;
use super::output::{self, OutputPreferences};
use super::registry::{CommandEntry, CommandRegistry};
use crate::errors::{BudgetError, CliError};
use crate::utils::{clock::SystemClock, paths::app_data_dir};

const SUGGESTION_DISTANCE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("No user selected. Use `user <name>` first.")]
    NoUserSelected,
    #[error("No draft in progress. Use `draft <amount>` first.")]
    NoDraft,
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] BudgetError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CoreError> for CommandError {
    fn from(err: CoreError) -> Self {
        CommandError::Core(err.into())
    }
}

impl From<MoneyError> for CommandError {
    fn from(err: MoneyError) -> Self {
        CommandError::Core(err.into())
    }
}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        CommandError::Core(err.into())
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<ReadlineError> for CliError {
    fn from(err: ReadlineError) -> Self {
        CliError::Command(err.to_string())
    }
}

/// Everything a command can touch: the loaded household, preferences, the active
/// user and month, and the allocation draft being edited.
pub struct ShellContext {
    pub(crate) mode: CliMode,
    pub(crate) registry: CommandRegistry,
    pub(crate) theme: ColorfulTheme,
    pub(crate) storage: JsonHouseholdStorage,
    pub(crate) config_manager: ConfigManager,
    pub(crate) config: Config,
    pub(crate) household: Household,
    pub(crate) user: Option<String>,
    pub(crate) month: MonthKey,
    pub(crate) draft: Option<AllocationDraft>,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_data_root(mode, &app_data_dir(), Box::new(SystemClock))
    }

    pub fn with_data_root(
        mode: CliMode,
        data_root: &Path,
        clock: Box<dyn Clock>,
    ) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let storage = JsonHouseholdStorage::new(StoragePaths::under(data_root))?;
        let config_manager = ConfigManager::with_base_dir(data_root.to_path_buf())?;
        let config = config_manager.load()?;
        output::set_preferences(OutputPreferences {
            color_enabled: config.ui_color_enabled && mode == CliMode::Interactive,
            quiet_mode: false,
        });

        let household = if storage.exists(&config.household_name) {
            storage.load_household(&config.household_name)?
        } else {
            Household::new(config.household_name.clone())
        };
        let month = clock.current_month();
        tracing::debug!(
            data_root = %data_root.display(),
            household = %household.name,
            %month,
            "shell context ready"
        );

        let mut app = ShellContext {
            mode,
            registry,
            theme: ColorfulTheme::default(),
            storage,
            config_manager,
            config,
            household,
            user: None,
            month,
            draft: None,
            clock,
            running: true,
        };
        app.bootstrap();
        Ok(app)
    }

    fn bootstrap(&mut self) {
        if self.household.templates.is_empty() {
            if let Some(path) = self.config.template_path.clone().filter(|path| path.exists()) {
                match self.import_templates(&path) {
                    Ok(count) => cli_io::print_info(format!(
                        "Loaded {count} categories from {}.",
                        path.display()
                    )),
                    Err(err) => cli_io::print_warning(format!(
                        "Could not load templates from {}: {err}",
                        path.display()
                    )),
                }
            }
        }
        self.household.ensure_month(self.month);
        self.user = self
            .config
            .last_user
            .clone()
            .filter(|user| self.household.has_user(user));
    }

    /// Merges a template file into the household and creates this month's budgets.
    pub(crate) fn import_templates(&mut self, path: &Path) -> Result<usize, CommandError> {
        let set = load_templates(path)?;
        let count = set.categories.len();
        self.household.register_users(set.users);
        for template in set.categories {
            self.household.upsert_template(template);
        }
        self.household.ensure_month(self.month);
        tracing::info!(path = %path.display(), categories = count, "imported templates");
        Ok(count)
    }

    pub(crate) fn money_format(&self) -> MoneyFormat {
        MoneyFormat {
            symbol: self.config.currency_symbol.clone(),
            grouping_separator: self.config.grouping_separator,
        }
    }

    pub(crate) fn format_amount(&self, amount: u64) -> String {
        format_money(amount, &self.money_format())
    }

    pub(crate) fn require_user(&self) -> Result<String, CommandError> {
        self.user.clone().ok_or(CommandError::NoUserSelected)
    }

    pub(crate) fn require_draft(&self) -> Result<&AllocationDraft, CommandError> {
        self.draft.as_ref().ok_or(CommandError::NoDraft)
    }

    pub(crate) fn require_draft_mut(&mut self) -> Result<&mut AllocationDraft, CommandError> {
        self.draft.as_mut().ok_or(CommandError::NoDraft)
    }

    pub(crate) fn persist_config(&self) -> CommandResult {
        self.config_manager.save(&self.config)?;
        Ok(())
    }

    /// Writes the household document and returns where it landed.
    pub(crate) fn save_household(&self) -> Result<PathBuf, CommandError> {
        let name = &self.config.household_name;
        self.storage.save_household(name, &self.household)?;
        Ok(self.storage.household_path(name))
    }

    /// `household[ana 2026-01]> `, with `*` after the month while a draft is open.
    pub(crate) fn prompt(&self) -> String {
        format!(
            "{}[{} {}{}]> ",
            self.config.household_name,
            self.user.as_deref().unwrap_or("-"),
            self.month,
            if self.draft.is_some() { "*" } else { "" }
        )
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));

        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, &needle), name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= SUGGESTION_DISTANCE {
                cli_io::print_info(format!("Suggestion: `{name}`?"));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(cli_io::confirm_action(&self.theme, "Exit shell?", true)?)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                self.print_error(&message);
                cli_io::print_hint("Use `help <command>` for usage details.");
            }
            CommandError::NoUserSelected => {
                self.print_warning(&CommandError::NoUserSelected.to_string());
                cli_io::print_hint("Use `users` to list household members.");
            }
            CommandError::Core(BudgetError::InvalidAmount(message))
            | CommandError::Core(BudgetError::InvalidInput(message)) => {
                self.print_warning(&message);
            }
            CommandError::Core(BudgetError::UnknownUser(user)) => {
                self.print_warning(&format!("Unknown user `{user}`."));
                cli_io::print_hint("Use `users` to list household members.");
            }
            CommandError::Core(BudgetError::AllocationRejected(message)) => {
                self.print_error(&message);
                cli_io::print_hint(
                    "Nothing was recorded. Adjust the pinned rows or run `rebalance scale`.",
                );
            }
            other => self.print_error(&other.to_string()),
        }
        Ok(())
    }

    pub(crate) fn print_error(&self, message: &str) {
        cli_io::print_error(message);
    }

    pub(crate) fn print_warning(&self, message: &str) {
        cli_io::print_warning(message);
    }
}

#[cfg(test)]
pub(crate) fn process_script(
    context: &mut ShellContext,
    lines: &[&str],
) -> Result<(), CliError> {
    for line in lines {
        match crate::cli::shell::handle_line(context, line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err)?,
        }
    }
    Ok(())
}
