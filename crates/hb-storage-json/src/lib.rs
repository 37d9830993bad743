use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};
use hb_core::{
    storage::{household_warnings, HouseholdBackupInfo, HouseholdStorage},
    CoreError,
};
use hb_domain::Household;

const FILE_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// Directories used by [`JsonHouseholdStorage`].
#[derive(Debug, Clone)]
pub struct StoragePaths {
    pub household_root: PathBuf,
    pub backup_root: PathBuf,
}

impl StoragePaths {
    /// `<data_root>/households` and `<data_root>/backups`.
    pub fn under(data_root: &Path) -> Self {
        Self {
            household_root: data_root.join("households"),
            backup_root: data_root.join("backups"),
        }
    }
}

/// Filesystem-backed JSON persistence for households and their backups.
#[derive(Debug, Clone)]
pub struct JsonHouseholdStorage {
    households_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonHouseholdStorage {
    pub fn new(paths: StoragePaths) -> Result<Self, CoreError> {
        Self::with_retention(paths, DEFAULT_RETENTION)
    }

    pub fn with_retention(paths: StoragePaths, retention: usize) -> Result<Self, CoreError> {
        fs::create_dir_all(&paths.household_root)?;
        fs::create_dir_all(&paths.backup_root)?;
        Ok(Self {
            households_dir: paths.household_root,
            backups_dir: paths.backup_root,
            retention: retention.max(1),
        })
    }

    pub fn household_path(&self, name: &str) -> PathBuf {
        self.households_dir
            .join(format!("{}.{}", canonical_name(name), FILE_EXTENSION))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.household_path(name).exists()
    }

    /// Backups of `name`, newest first, with their parsed timestamps and sizes.
    pub fn list_backup_metadata(&self, name: &str) -> Result<Vec<BackupMetadata>, CoreError> {
        let mut rows = Vec::new();
        for entry in self.list_backups(name)? {
            let size_bytes = fs::metadata(&entry.path).map(|meta| meta.len()).unwrap_or(0);
            rows.push(BackupMetadata {
                created_at: parse_backup_timestamp(&entry.id),
                name: entry.id,
                size_bytes,
                path: entry.path,
            });
        }
        rows.sort_by_key(|meta| Reverse(meta.created_at));
        Ok(rows)
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(name))
    }

    fn write_backup_file(
        &self,
        household: &Household,
        name: &str,
        note: Option<&str>,
    ) -> Result<HouseholdBackupInfo, CoreError> {
        let dir = self.backup_dir(name);
        fs::create_dir_all(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut stem = format!("{}_{}", canonical_name(name), timestamp);
        if let Some(label) = sanitize_backup_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        let file_name = format!("{stem}.{FILE_EXTENSION}");
        let path = dir.join(&file_name);
        write_file(&path, &serialize_household(household)?)?;
        self.prune_backups(name)?;
        tracing::info!(household = name, backup = %file_name, "wrote household backup");
        Ok(HouseholdBackupInfo {
            household: canonical_name(name),
            id: file_name,
            created_at: timestamp,
            path,
        })
    }

    fn prune_backups(&self, name: &str) -> Result<(), CoreError> {
        let entries = self.list_backups(name)?;
        for entry in entries.into_iter().skip(self.retention) {
            tracing::debug!(backup = %entry.id, "pruning old backup");
            let _ = fs::remove_file(entry.path);
        }
        Ok(())
    }
}

impl HouseholdStorage for JsonHouseholdStorage {
    fn save_household(&self, name: &str, household: &Household) -> Result<(), CoreError> {
        save_household_to_path(household, &self.household_path(name))
    }

    fn load_household(&self, name: &str) -> Result<Household, CoreError> {
        let path = self.household_path(name);
        if !path.exists() {
            return Err(CoreError::HouseholdNotFound(name.to_string()));
        }
        load_household_from_path(&path)
    }

    fn backup_household(
        &self,
        name: &str,
        household: &Household,
        note: Option<&str>,
    ) -> Result<HouseholdBackupInfo, CoreError> {
        self.write_backup_file(household, name, note)
    }

    fn list_backups(&self, name: &str) -> Result<Vec<HouseholdBackupInfo>, CoreError> {
        let dir = self.backup_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let slug = canonical_name(name);
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(HouseholdBackupInfo {
                    household: slug.clone(),
                    id: file_name.to_string(),
                    created_at: backup_timestamp_label(file_name).unwrap_or_default(),
                    path: path.clone(),
                });
            }
        }
        entries.sort_by(|a, b| {
            parse_backup_timestamp(&b.id)
                .cmp(&parse_backup_timestamp(&a.id))
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(entries)
    }

    fn restore_backup(&self, backup: &HouseholdBackupInfo) -> Result<Household, CoreError> {
        if !backup.path.exists() {
            return Err(CoreError::Storage(format!("backup `{}` not found", backup.id)));
        }
        let household = load_household_from_path(&backup.path)?;
        self.save_household(&backup.household, &household)?;
        Ok(household)
    }
}

/// Writes the household to a temporary sibling file and renames it over `path`.
pub fn save_household_to_path(household: &Household, path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    write_file(&tmp, &serialize_household(household)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Loads a household, logging any dangling references it carries.
pub fn load_household_from_path(path: &Path) -> Result<Household, CoreError> {
    let data = fs::read_to_string(path)?;
    let household: Household =
        serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))?;
    for warning in household_warnings(&household) {
        tracing::warn!(path = %path.display(), "{warning}");
    }
    Ok(household)
}

#[derive(Debug, Clone)]
pub struct BackupMetadata {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub size_bytes: u64,
    pub path: PathBuf,
}

/// Lowercase slug used for file names; anything outside `[a-z0-9]` becomes `_`.
pub fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "household".into()
    } else {
        sanitized
    }
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Finds the `YYYYmmdd_HHMM` pair in a backup file name. Notes never contain `_`,
/// so the pair sits right after the slug or right before the extension.
fn backup_timestamp_label(file_name: &str) -> Option<String> {
    let stem = file_name.strip_suffix(&format!(".{FILE_EXTENSION}"))?;
    let segments: Vec<&str> = stem.split('_').collect();
    segments
        .windows(2)
        .rev()
        .find(|pair| is_digits(pair[0], 8) && is_digits(pair[1], 4))
        .map(|pair| format!("{}_{}", pair[0], pair[1]))
}

fn parse_backup_timestamp(file_name: &str) -> Option<DateTime<Utc>> {
    let label = backup_timestamp_label(file_name)?;
    NaiveDateTime::parse_from_str(&label, BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_file(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

fn serialize_household(household: &Household) -> Result<String, CoreError> {
    serde_json::to_string_pretty(household).map_err(|err| CoreError::Serde(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_are_filesystem_safe() {
        assert_eq!(canonical_name("Casa Pérez"), "casa_p_rez");
        assert_eq!(canonical_name("  "), "household");
        assert_eq!(canonical_name("home-2026"), "home_2026");
    }

    #[test]
    fn backup_notes_are_slugged() {
        assert_eq!(sanitize_backup_note(Some("Before  Jan. pay")), Some("before-jan-pay".into()));
        assert_eq!(sanitize_backup_note(Some("***")), None);
        assert_eq!(sanitize_backup_note(None), None);
    }

    #[test]
    fn backup_timestamps_are_found_with_or_without_notes() {
        assert_eq!(
            backup_timestamp_label("home_20260105_0930.json").as_deref(),
            Some("20260105_0930")
        );
        assert_eq!(
            backup_timestamp_label("my_home_20260105_0930_before-pay.json").as_deref(),
            Some("20260105_0930")
        );
        assert!(parse_backup_timestamp("home_latest.json").is_none());
    }
}
