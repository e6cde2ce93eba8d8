//! Core domain types for alarmtab.
//!
//! This module defines the fixed column schema of an alarm table, the [`Record`] row type
//! shared by the codec and the store, the [`DisplayRow`] projection handed to presentation
//! layers, and [`AlarmEntry`], the form-level submission that is turned into a full record.

use std::fmt;

/// Column names of an alarm table, in on-disk order.
///
/// The order is part of the file contract with the external alarm configuration tool and
/// must never change. Every record written to disk has exactly `SCHEMA.len()` fields.
pub const SCHEMA: [&str; 15] = [
    "ID",
    "ObservationType",
    "Details1",
    "Details2",
    "Details3",
    "Details4",
    "Details5",
    "Details6",
    "Deactivation",
    "Class",
    "Message",
    "MinPendingTime",
    "Latch1",
    "Latch2",
    "HigherPrioAlarm",
];

/// Number of fields in every record (`SCHEMA.len()`).
pub const SCHEMA_LEN: usize = SCHEMA.len();

/// Field indices into a [`Record`], matching [`SCHEMA`].
pub mod column {
    pub const ID: usize = 0;
    pub const OBSERVATION_TYPE: usize = 1;
    pub const DETAILS1: usize = 2;
    pub const DETAILS2: usize = 3;
    pub const DETAILS3: usize = 4;
    pub const DEACTIVATION: usize = 8;
    pub const CLASS: usize = 9;
    pub const MESSAGE: usize = 10;
    pub const MIN_PENDING_TIME: usize = 11;
    pub const LATCH1: usize = 12;
    pub const LATCH2: usize = 13;
    pub const HIGHER_PRIO_ALARM: usize = 14;
}

/// Observation types offered for new entries.
pub const OBSERVATION_TYPES: [&str; 3] = ["Digital", "Analog", "Other"];

/// Alarm classes offered for new entries.
pub const ALARM_CLASSES: [&str; 3] = ["Error", "Warning", "Info"];

/// Comparison values offered for the `Details3` slot.
pub const CONDITION_VALUES: [&str; 2] = ["TRUE", "FALSE"];

/// Comparison operator written into `Details2` by every entry submission.
pub const DEFAULT_OPERATOR: &str = "=";

/// One row of the alarm table: an ordered sequence of field values aligned to [`SCHEMA`].
///
/// The version stamp and the column header are rows too; the store decides which rows are
/// metadata and which are data. Field 0 is the row's identifier. It is stored as an opaque
/// string and compared by exact, case-sensitive equality.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    /// Field values in column order.
    pub fields: Vec<String>,
}

impl Record {
    /// Build a record from any sequence of string-like values. No padding is applied.
    pub fn new<I, S>(fields: I) -> Record
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Record {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// The identifier (field 0), or `""` for a record with no fields.
    pub fn id(&self) -> &str {
        self.field(column::ID).unwrap_or("")
    }

    /// The value at `index`, or `None` if the record is shorter than that.
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Right-pad with empty strings until the record has [`SCHEMA_LEN`] fields.
    ///
    /// Records that are already at least that long are left untouched.
    pub fn pad(&mut self) {
        if self.fields.len() < SCHEMA_LEN {
            self.fields.resize(SCHEMA_LEN, String::new());
        }
    }

    /// Consuming variant of [`Record::pad`].
    pub fn padded(mut self) -> Record {
        self.pad();
        self
    }
}

/// Projection of a data record into the four columns an alarm table view shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    /// Identifier (field 0).
    pub id: String,
    /// `Details1 Details2 Details3`, space-joined and trimmed, e.g. `"Motor.Fault = TRUE"`.
    pub condition: String,
    /// Alarm class.
    pub class: String,
    /// Alarm message text.
    pub message: String,
}

impl fmt::Display for DisplayRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.id, self.condition, self.class, self.message
        )
    }
}

/// A single add/edit submission: the subset of columns an operator fills in.
///
/// Every other column of the resulting record is left empty. `details2` always carries the
/// comparison operator, so a finished entry reads as `Details1 = Details3` in the table.
///
/// # Fields
///
/// * `id` - Unique alarm identifier.
/// * `observation_type` - One of [`OBSERVATION_TYPES`] in normal use.
/// * `details1` - The observed variable, e.g. `PLC_PRG.bMotorFault`.
/// * `details2` - Comparison operator, [`DEFAULT_OPERATOR`].
/// * `details3` - Value compared against, one of [`CONDITION_VALUES`] in normal use.
/// * `class` - One of [`ALARM_CLASSES`] in normal use.
/// * `message` - Text shown when the alarm is raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmEntry {
    pub id: String,
    pub observation_type: String,
    pub details1: String,
    pub details2: String,
    pub details3: String,
    pub class: String,
    pub message: String,
}

impl Default for AlarmEntry {
    fn default() -> Self {
        AlarmEntry {
            id: String::new(),
            observation_type: OBSERVATION_TYPES[0].to_string(),
            details1: String::new(),
            details2: DEFAULT_OPERATOR.to_string(),
            details3: CONDITION_VALUES[0].to_string(),
            class: ALARM_CLASSES[0].to_string(),
            message: String::new(),
        }
    }
}

impl AlarmEntry {
    /// An entry with the given id and default values everywhere else.
    pub fn with_id(id: impl Into<String>) -> AlarmEntry {
        AlarmEntry {
            id: id.into(),
            ..AlarmEntry::default()
        }
    }

    /// Recover the editable columns of a stored record.
    ///
    /// `details2` is reset to the operator because submissions always rewrite it.
    pub fn from_record(record: &Record) -> AlarmEntry {
        let get = |index| record.field(index).unwrap_or("").to_string();
        AlarmEntry {
            id: get(column::ID),
            observation_type: get(column::OBSERVATION_TYPE),
            details1: get(column::DETAILS1),
            details2: DEFAULT_OPERATOR.to_string(),
            details3: get(column::DETAILS3),
            class: get(column::CLASS),
            message: get(column::MESSAGE),
        }
    }

    /// Lay the entry out as a full [`SCHEMA_LEN`]-field record.
    ///
    /// Values are passed through [`crate::codec::sanitize_field`], so the record is safe to
    /// write on either the append or the rewrite path.
    pub fn into_record(self) -> Record {
        let mut record = Record::default().padded();
        let slots = [
            (column::ID, self.id),
            (column::OBSERVATION_TYPE, self.observation_type),
            (column::DETAILS1, self.details1),
            (column::DETAILS2, self.details2),
            (column::DETAILS3, self.details3),
            (column::CLASS, self.class),
            (column::MESSAGE, self.message),
        ];
        for (index, value) in slots {
            record.fields[index] = crate::codec::sanitize_field(Some(value.as_str()));
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_has_fifteen_columns_in_contract_order() {
        assert_eq!(SCHEMA_LEN, 15);
        assert_eq!(SCHEMA[column::ID], "ID");
        assert_eq!(SCHEMA[column::OBSERVATION_TYPE], "ObservationType");
        assert_eq!(SCHEMA[column::DETAILS1], "Details1");
        assert_eq!(SCHEMA[column::DEACTIVATION], "Deactivation");
        assert_eq!(SCHEMA[column::CLASS], "Class");
        assert_eq!(SCHEMA[column::MESSAGE], "Message");
        assert_eq!(SCHEMA[column::MIN_PENDING_TIME], "MinPendingTime");
        assert_eq!(SCHEMA[column::LATCH1], "Latch1");
        assert_eq!(SCHEMA[column::LATCH2], "Latch2");
        assert_eq!(SCHEMA[column::HIGHER_PRIO_ALARM], "HigherPrioAlarm");
    }

    #[test]
    fn pad_extends_short_record_with_empty_strings() {
        let record = Record::new(["7", "Digital"]).padded();
        assert_eq!(record.fields.len(), SCHEMA_LEN);
        assert_eq!(record.fields[0], "7");
        assert!(record.fields[2..].iter().all(String::is_empty));
    }

    #[test]
    fn pad_leaves_long_record_untouched() {
        let long: Vec<String> = (0..20).map(|i| i.to_string()).collect();
        let record = Record::new(long.clone()).padded();
        assert_eq!(record.fields, long);
    }

    #[test]
    fn id_of_empty_record_is_empty() {
        assert_eq!(Record::default().id(), "");
        assert_eq!(Record::default().field(3), None);
    }

    #[test]
    fn default_entry_matches_form_defaults() {
        let entry = AlarmEntry::default();
        assert_eq!(entry.observation_type, "Digital");
        assert_eq!(entry.details2, "=");
        assert_eq!(entry.details3, "TRUE");
        assert_eq!(entry.class, "Error");
    }

    #[test]
    fn into_record_places_columns_and_leaves_rest_empty() {
        let entry = AlarmEntry {
            id: "12".into(),
            observation_type: "Analog".into(),
            details1: "GVL.bPumpFault".into(),
            details2: "=".into(),
            details3: "FALSE".into(),
            class: "Warning".into(),
            message: "Pump\nfault \"P1\"".into(),
        };

        let record = entry.into_record();

        assert_eq!(record.fields.len(), SCHEMA_LEN);
        assert_eq!(record.id(), "12");
        assert_eq!(record.fields[column::OBSERVATION_TYPE], "Analog");
        assert_eq!(record.fields[column::DETAILS1], "GVL.bPumpFault");
        assert_eq!(record.fields[column::DETAILS2], "=");
        assert_eq!(record.fields[column::DETAILS3], "FALSE");
        assert_eq!(record.fields[column::CLASS], "Warning");
        assert_eq!(record.fields[column::MESSAGE], "Pump fault 'P1'");
        for index in [5, 6, 7, 8, 11, 12, 13, 14] {
            assert_eq!(record.fields[index], "", "column {index} should be empty");
        }
    }

    #[test]
    fn from_record_recovers_editable_columns() {
        let original = AlarmEntry {
            id: "abc".into(),
            message: "Door open".into(),
            ..AlarmEntry::default()
        };
        let record = original.clone().into_record();
        assert_eq!(AlarmEntry::from_record(&record), original);
    }

    #[test]
    fn from_record_resets_operator() {
        let mut record = AlarmEntry::with_id("1").into_record();
        record.fields[column::DETAILS2] = ">".into();
        assert_eq!(AlarmEntry::from_record(&record).details2, "=");
    }

    #[test]
    fn display_row_formats_tab_separated() {
        let row = DisplayRow {
            id: "3".into(),
            condition: "x = TRUE".into(),
            class: "Info".into(),
            message: "hello".into(),
        };
        assert_eq!(row.to_string(), "3\tx = TRUE\tInfo\thello");
    }
}
