//! Record store for alarmtab.
//!
//! A [`Store`] is a handle on one alarm table file. It holds no records in memory: every
//! operation decodes the whole file, and every mutation except [`Store::append`] rewrites
//! the whole file. The file is not locked. When two processes mutate the same path, the
//! later rewrite wins and the earlier change is lost without notice.
//!
//! Identifier uniqueness is enforced by callers through [`Store::exists`] before they call
//! [`Store::append`] or [`Store::update`]; neither method re-checks it.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use crate::codec::{self, VERSION_STAMP};
use crate::error::Error;
use crate::types::{DEFAULT_OPERATOR, DisplayRow, Record, SCHEMA, column};

/// Handle on an alarm table file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    /// Path of the UTF-16LE table file.
    path: PathBuf,
}

/// Split decoded lines into the metadata block (version and header lines) and the data
/// block.
///
/// A file that starts with the version line always carries two metadata lines: the
/// version line and whatever line follows it, so a hand-edited header still counts as
/// metadata. A file without a version line whose first line is the column header (as
/// written by [`codec::ensure_initialized`]) has that one metadata line. Otherwise the
/// first two lines are metadata if at least three lines exist, and every line is data
/// when fewer exist.
fn split_header_block(mut lines: Vec<Record>) -> (Vec<Record>, Vec<Record>) {
    let meta = if lines.first().is_some_and(is_version_line) {
        lines.len().min(2)
    } else if lines.first().is_some_and(is_header_line) {
        1
    } else if lines.len() >= 3 {
        2
    } else {
        0
    };
    let data = lines.split_off(meta);
    (lines, data)
}

fn is_version_line(record: &Record) -> bool {
    record.id() == VERSION_STAMP
}

/// The schema names in order, ignoring empty cells past the last column.
fn is_header_line(record: &Record) -> bool {
    record.fields.len() >= SCHEMA.len()
        && record.fields.iter().zip(SCHEMA).all(|(f, s)| f == s)
        && record.fields[SCHEMA.len()..].iter().all(String::is_empty)
}

impl Store {
    /// A handle on `path`. Nothing is read or created.
    pub fn new(path: impl Into<PathBuf>) -> Store {
        Store { path: path.into() }
    }

    /// Adopt an existing table, creating a header-only file if `path` does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the missing file cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Store, Error> {
        let store = Store::new(path);
        codec::ensure_initialized(&store.path)?;
        Ok(store)
    }

    /// Create (or overwrite) a fresh table with a byte-order mark, version line and header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be written.
    pub fn create(path: impl Into<PathBuf>) -> Result<Store, Error> {
        let store = Store::new(path);
        codec::create_fresh(&store.path)?;
        tracing::info!(path = %store.path.display(), "created alarm table");
        Ok(store)
    }

    /// Path of the table file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Data records in file order, without the version and header lines.
    ///
    /// Never fails; an unreadable file has no records.
    pub fn list_data_records(&self) -> Vec<Record> {
        let (_, data) = split_header_block(codec::decode_all(&self.path));
        tracing::debug!(path = %self.path.display(), records = data.len(), "listed records");
        data
    }

    /// Whether a data record uses `id`, ignoring records whose id equals `exclude_id`.
    ///
    /// Pass the id being edited as `exclude_id` so that saving a record without changing
    /// its id does not report the record as its own duplicate.
    pub fn exists(&self, id: &str, exclude_id: Option<&str>) -> bool {
        self.list_data_records()
            .iter()
            .any(|record| record.id() == id && Some(record.id()) != exclude_id)
    }

    /// The first data record with identifier `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no data record has that id.
    pub fn find(&self, id: &str) -> Result<Record, Error> {
        self.list_data_records()
            .into_iter()
            .find(|record| record.id() == id)
            .ok_or_else(|| Error::NotFound { id: id.to_string() })
    }

    /// Append one record as a new line at the end of the file.
    ///
    /// Every field is sanitized and a short record is padded to the schema width. A
    /// missing file is created with a header line (no byte-order mark, no version line)
    /// before the record is appended. This is the only mutation that does not rewrite the
    /// whole file, and it does not check uniqueness.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be created or appended to.
    pub fn append(&self, record: &Record) -> Result<(), Error> {
        let sanitized = Record::new(
            record
                .fields
                .iter()
                .map(|value| codec::sanitize_field(Some(value.as_str()))),
        );
        let line = codec::encode_line(&sanitized);

        codec::ensure_initialized(&self.path)?;
        codec::append_line(&self.path, &line)?;
        tracing::info!(path = %self.path.display(), id = record.id(), "appended record");
        Ok(())
    }

    /// Replace the first data record with identifier `original_id` by `new_record`.
    ///
    /// The replacement is padded to the schema width and the whole file is rewritten.
    /// The caller must already have checked that `new_record`'s id is unused by any other
    /// record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] without writing if no record matches, or [`Error::Io`]
    /// if the rewrite fails (the file may then be partially written).
    pub fn update(&self, original_id: &str, new_record: Record) -> Result<(), Error> {
        let (mut lines, mut data) = split_header_block(codec::decode_all(&self.path));
        let slot = data
            .iter_mut()
            .find(|record| record.id() == original_id)
            .ok_or_else(|| Error::NotFound {
                id: original_id.to_string(),
            })?;
        let new_id = new_record.id().to_string();
        *slot = new_record.padded();

        lines.append(&mut data);
        codec::encode_all(&self.path, &lines)?;
        tracing::info!(
            path = %self.path.display(),
            original_id,
            id = %new_id,
            "updated record"
        );
        Ok(())
    }

    /// Remove the first data record with identifier `id` and rewrite the file.
    ///
    /// Only the first match is removed; later records with the same id stay.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] without writing if no record matches, or [`Error::Io`]
    /// if the rewrite fails.
    pub fn remove(&self, id: &str) -> Result<(), Error> {
        let (mut lines, mut data) = split_header_block(codec::decode_all(&self.path));
        let index = data
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| Error::NotFound { id: id.to_string() })?;
        data.remove(index);

        lines.append(&mut data);
        codec::encode_all(&self.path, &lines)?;
        tracing::info!(path = %self.path.display(), id, "removed record");
        Ok(())
    }

    /// Display rows for every data record, in display order.
    pub fn display_rows(&self) -> Vec<DisplayRow> {
        order_for_display(self.list_data_records())
            .iter()
            .map(derive_display_row)
            .collect()
    }
}

/// An identifier that parses as an integer, kept as sign + normalized decimal digits so
/// that arbitrarily long values compare by magnitude.
#[derive(Debug, PartialEq, Eq)]
struct IntegerKey {
    negative: bool,
    /// Decimal digits without leading zeros; `"0"` for zero.
    digits: String,
}

impl IntegerKey {
    /// Parse an integer literal: optional surrounding whitespace, optional sign, ASCII
    /// digits with single `_` separators between digits.
    fn parse(text: &str) -> Option<IntegerKey> {
        let text = text.trim();
        let (negative, body) = match text.as_bytes().first()? {
            b'-' => (true, &text[1..]),
            b'+' => (false, &text[1..]),
            _ => (false, text),
        };
        if body.is_empty() || body.starts_with('_') || body.ends_with('_') || body.contains("__")
        {
            return None;
        }
        if !body.chars().all(|c| c.is_ascii_digit() || c == '_') {
            return None;
        }
        let digits: String = body.chars().filter(char::is_ascii_digit).collect();
        let trimmed = digits.trim_start_matches('0');
        let digits = if trimmed.is_empty() { "0" } else { trimmed };
        Some(IntegerKey {
            negative: negative && digits != "0",
            digits: digits.to_string(),
        })
    }

    fn cmp_magnitude(&self, other: &IntegerKey) -> Ordering {
        self.digits
            .len()
            .cmp(&other.digits.len())
            .then_with(|| self.digits.cmp(&other.digits))
    }
}

impl Ord for IntegerKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.cmp_magnitude(other),
            (true, true) => other.cmp_magnitude(self),
        }
    }
}

impl PartialOrd for IntegerKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Display sort key: every numeric id sorts before every non-numeric id.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum DisplayKey<'a> {
    Numeric(IntegerKey),
    Text(&'a str),
}

impl<'a> DisplayKey<'a> {
    fn of(record: &'a Record) -> DisplayKey<'a> {
        let id = record.id();
        match IntegerKey::parse(id) {
            Some(key) => DisplayKey::Numeric(key),
            None => DisplayKey::Text(id),
        }
    }
}

/// Order records for presentation.
///
/// Records whose id parses as an integer come first, ordered by value (`"2"` before
/// `"10"`); the rest follow, ordered by string. The sort is stable, so records with equal
/// keys keep their file order.
pub fn order_for_display(mut records: Vec<Record>) -> Vec<Record> {
    records.sort_by(|a, b| DisplayKey::of(a).cmp(&DisplayKey::of(b)));
    records
}

/// Project a data record into the `(id, condition, class, message)` view.
///
/// `condition` is `Details1 Details2 Details3` joined by spaces and trimmed. A record too
/// short to carry `Details2` shows the `=` operator there.
pub fn derive_display_row(record: &Record) -> DisplayRow {
    let get = |index| record.field(index).unwrap_or("");
    let details1 = get(column::DETAILS1);
    let details2 = record.field(column::DETAILS2).unwrap_or(DEFAULT_OPERATOR);
    let details3 = get(column::DETAILS3);
    DisplayRow {
        id: record.id().to_string(),
        condition: format!("{details1} {details2} {details3}").trim().to_string(),
        class: get(column::CLASS).to_string(),
        message: get(column::MESSAGE).to_string(),
    }
}
