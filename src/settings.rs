//! The settings document: the UI's last-used option values.
//!
//! A single pretty-printed JSON record on disk, created with defaults on first
//! launch and afterwards read-modify-written one field at a time.

use crate::error::Result;
use crate::profile::{ClickOptions, FieldValue, ProfileField};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Opens the document, writing the defaults if it does not exist yet.
    pub fn open_or_create(path: impl Into<PathBuf>) -> Result<Self> {
        let file = Self::new(path);
        if !file.path.exists() {
            info!("Creating default settings at {}", file.path.display());
            file.write(&ClickOptions::default())?;
        }
        Ok(file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document, or `None` if it is missing or unreadable.
    pub fn get(&self) -> Option<ClickOptions> {
        match self.read() {
            Ok(options) => Some(options),
            Err(e) => {
                error!("Error reading settings file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Sets one field and writes the document back.
    ///
    /// Does nothing if the current document cannot be read. Setting either
    /// repeat-mode flag also writes the complement into the other.
    pub fn save_field(&self, field: &str, value: &FieldValue) {
        let Some(mut options) = self.get() else {
            return;
        };

        let applied = field
            .parse::<ProfileField>()
            .and_then(|field| options.set(field, value));
        if let Err(e) = applied {
            error!("Ignoring settings update for '{}': {}", field, e);
            return;
        }

        self.save(&options);
    }

    /// Applies several already validated fields in one write.
    pub fn save_fields(&self, updates: &[(ProfileField, FieldValue)]) {
        let Some(mut options) = self.get() else {
            return;
        };
        if let Err(e) = options.apply(updates) {
            error!("Ignoring settings update: {}", e);
            return;
        }
        self.save(&options);
    }

    /// Replaces the whole document, logging failures.
    pub fn save(&self, options: &ClickOptions) {
        match self.write(options) {
            Ok(()) => debug!("Settings saved to {}", self.path.display()),
            Err(e) => error!("Error saving settings to {}: {}", self.path.display(), e),
        }
    }

    fn read(&self) -> Result<ClickOptions> {
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write(&self, options: &ClickOptions) -> Result<()> {
        let json = serde_json::to_string_pretty(options)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
