//! Editing session over one alarm table.
//!
//! A [`Session`] carries the two pieces of state an alarm editor needs between user
//! actions: the file currently selected and the id of the record currently being edited.
//! It runs every check (file selected, id present, id unique, target exists) before it
//! asks the [`Store`] to write, so a rejected action leaves the file untouched.

use std::path::{Path, PathBuf};

use crate::codec::DELIMITER;
use crate::error::Error;
use crate::store::Store;
use crate::types::{AlarmEntry, DisplayRow};

/// Selected file and edit target of an alarm editor.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Session {
    /// The table all operations act on.
    active_path: Option<PathBuf>,
    /// Id of the record loaded for editing, if any.
    edit_target: Option<String>,
}

/// Trim the id and reject entries a single line cannot hold.
fn validate(mut entry: AlarmEntry) -> Result<AlarmEntry, Error> {
    entry.id = entry.id.trim().to_string();
    if entry.id.is_empty() {
        return Err(Error::Validation("ID is required".to_string()));
    }
    let fields = [
        ("ID", &entry.id),
        ("ObservationType", &entry.observation_type),
        ("Details1", &entry.details1),
        ("Details2", &entry.details2),
        ("Details3", &entry.details3),
        ("Class", &entry.class),
        ("Message", &entry.message),
    ];
    if let Some((name, _)) = fields.iter().find(|(_, value)| value.contains(DELIMITER)) {
        return Err(Error::Validation(format!(
            "{name} must not contain '{DELIMITER}'"
        )));
    }
    Ok(entry)
}

impl Session {
    /// A session with no file selected.
    pub fn new() -> Session {
        Session::default()
    }

    /// The selected file, if any.
    pub fn active_path(&self) -> Option<&Path> {
        self.active_path.as_deref()
    }

    /// The id of the record being edited, if any.
    pub fn edit_target(&self) -> Option<&str> {
        self.edit_target.as_deref()
    }

    fn store(&self) -> Result<Store, Error> {
        self.active_path
            .as_ref()
            .map(Store::new)
            .ok_or(Error::NoActiveFile)
    }

    /// Create a fresh table at `path` and select it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be written; the session keeps its
    /// previous selection in that case.
    pub fn create(&mut self, path: impl Into<PathBuf>) -> Result<(), Error> {
        let store = Store::create(path)?;
        self.active_path = Some(store.path().to_path_buf());
        self.edit_target = None;
        Ok(())
    }

    /// Select an existing table, creating a header-only file if it is missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the missing file cannot be created.
    pub fn open(&mut self, path: impl Into<PathBuf>) -> Result<(), Error> {
        let store = Store::open(path)?;
        tracing::info!(path = %store.path().display(), "alarm table loaded");
        self.active_path = Some(store.path().to_path_buf());
        self.edit_target = None;
        Ok(())
    }

    /// Rows of the selected table in display order; empty when nothing is selected.
    pub fn rows(&self) -> Vec<DisplayRow> {
        self.store().map(|s| s.display_rows()).unwrap_or_default()
    }

    /// Add a new entry to the selected table.
    ///
    /// # Errors
    ///
    /// * [`Error::NoActiveFile`] - no table selected.
    /// * [`Error::Validation`] - empty id, or a value containing the delimiter.
    /// * [`Error::DuplicateId`] - the id is already used.
    /// * [`Error::Io`] - the append failed.
    pub fn add(&mut self, entry: AlarmEntry) -> Result<(), Error> {
        let store = self.store()?;
        let entry = validate(entry)?;
        if store.exists(&entry.id, None) {
            return Err(Error::DuplicateId { id: entry.id });
        }
        store.append(&entry.into_record())
    }

    /// Load the record with identifier `id` for editing.
    ///
    /// Returns the stored values so a form can be populated with them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActiveFile`] or [`Error::NotFound`].
    pub fn begin_edit(&mut self, id: &str) -> Result<AlarmEntry, Error> {
        let record = self.store()?.find(id)?;
        self.edit_target = Some(record.id().to_string());
        Ok(AlarmEntry::from_record(&record))
    }

    /// Leave edit mode without writing.
    pub fn cancel_edit(&mut self) {
        self.edit_target = None;
    }

    /// Save `entry` over the record being edited.
    ///
    /// The new id may equal the old one; it must not equal any other record's id. Edit
    /// mode ends only when the save succeeds.
    ///
    /// # Errors
    ///
    /// * [`Error::NoActiveFile`] / [`Error::NotEditing`] - nothing to save to.
    /// * [`Error::Validation`] - empty id, or a value containing the delimiter.
    /// * [`Error::DuplicateId`] - another record already uses the new id.
    /// * [`Error::NotFound`] - the edited record disappeared from the file.
    /// * [`Error::Io`] - the rewrite failed.
    pub fn save(&mut self, entry: AlarmEntry) -> Result<(), Error> {
        let store = self.store()?;
        let original_id = self.edit_target.clone().ok_or(Error::NotEditing)?;
        let entry = validate(entry)?;
        if store.exists(&entry.id, Some(original_id.as_str())) {
            return Err(Error::DuplicateId { id: entry.id });
        }
        store.update(&original_id, entry.into_record())?;
        self.edit_target = None;
        Ok(())
    }

    /// Delete the record with identifier `id`.
    ///
    /// Deleting the record being edited also ends edit mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActiveFile`], [`Error::NotFound`], or [`Error::Io`].
    pub fn delete(&mut self, id: &str) -> Result<(), Error> {
        self.store()?.remove(id)?;
        if self.edit_target.as_deref() == Some(id) {
            self.edit_target = None;
        }
        Ok(())
    }
}
