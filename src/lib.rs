//! alarmtab: a store for CODESYS alarm tables kept as UTF-16LE, semicolon-delimited files.

pub mod codec;
pub mod error;
pub mod session;
pub mod store;
pub mod types;

pub use error::{Error, Outcome};
pub use session::Session;
pub use store::{Store, derive_display_row, order_for_display};
pub use types::{AlarmEntry, DisplayRow, Record, SCHEMA, SCHEMA_LEN};
