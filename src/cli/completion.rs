//! Tab completion and inline usage hints driven by the household being edited.

use hb_domain::MonthKey;

use crate::cli::context::ShellContext;

const INCOME_KINDS: [&str; 3] = ["salary", "biweekly", "other"];
const REBALANCE_MODES: [&str; 1] = ["scale"];

/// Snapshot of what the completer may offer, refreshed before every prompt.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct CompletionState {
    commands: Vec<(String, String)>,
    users: Vec<String>,
    draft_rows: usize,
    month: Option<MonthKey>,
}

impl CompletionState {
    pub(crate) fn from_context(context: &ShellContext) -> Self {
        let commands = context
            .registry
            .list()
            .map(|entry| {
                let arguments = entry
                    .usage
                    .strip_prefix(entry.name)
                    .unwrap_or(entry.usage)
                    .trim()
                    .to_string();
                (entry.name.to_string(), arguments)
            })
            .collect();
        Self {
            commands,
            users: context.household.users.clone(),
            draft_rows: context.draft.as_ref().map_or(0, |draft| draft.rows.len()),
            month: Some(context.month),
        }
    }

    fn command_names(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|(name, _)| name.as_str())
    }

    fn arguments_of(&self, command: &str) -> Option<&str> {
        self.commands
            .iter()
            .find(|(name, _)| name == command)
            .map(|(_, arguments)| arguments.as_str())
    }

    /// Values that make sense for argument `index` of `command`.
    fn argument_values(&self, command: &str, index: usize) -> Vec<String> {
        match (command, index) {
            ("user", 0) => self.users.clone(),
            ("set" | "pin" | "unpin", 0) => (1..=self.draft_rows).map(|row| row.to_string()).collect(),
            ("apply", 0) | ("allocate", 1) => INCOME_KINDS.iter().map(|kind| kind.to_string()).collect(),
            ("rebalance", 0) => REBALANCE_MODES.iter().map(|mode| mode.to_string()).collect(),
            ("month", 0) => self
                .month
                .map(|month| {
                    [month.previous(), month, month.next()]
                        .iter()
                        .map(MonthKey::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            ("help", 0) => self.command_names().map(str::to_string).collect(),
            _ => Vec::new(),
        }
    }
}

/// Returns where the word under the cursor starts and the candidates that extend it.
pub(crate) fn complete(state: &CompletionState, line: &str, pos: usize) -> (usize, Vec<String>) {
    let prefix = line.get(..pos).unwrap_or(line);
    let start = prefix
        .char_indices()
        .filter(|(_, ch)| ch.is_whitespace())
        .last()
        .map_or(0, |(idx, ch)| idx + ch.len_utf8());
    let word = prefix[start..].to_lowercase();
    let before: Vec<&str> = prefix[..start].split_whitespace().collect();

    let pool: Vec<String> = match before.split_first() {
        None => state.command_names().map(str::to_string).collect(),
        Some((command, args)) => state.argument_values(&command.to_lowercase(), args.len()),
    };
    let mut candidates: Vec<String> = pool
        .into_iter()
        .filter(|candidate| candidate.to_lowercase().starts_with(&word))
        .collect();
    candidates.dedup();
    (start, candidates)
}

/// Usage of the command just typed, shown after the cursor until an argument is entered.
pub(crate) fn usage_hint(state: &CompletionState, line: &str, pos: usize) -> Option<String> {
    if pos != line.len() || !line.ends_with(char::is_whitespace) {
        return None;
    }
    let mut words = line.split_whitespace();
    let command = words.next()?.to_lowercase();
    if words.next().is_some() {
        return None;
    }
    state
        .arguments_of(&command)
        .filter(|arguments| !arguments.is_empty())
        .map(str::to_string)
}
