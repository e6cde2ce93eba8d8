//! Text codec for the alarm table file.
//!
//! The file is UTF-16LE text: one record per line, fields separated by `;`, lines
//! terminated by CRLF regardless of platform. A freshly created file starts with a
//! byte-order mark, a version stamp line, and the column header line.
//!
//! The first half of this module is pure data transformation (text <-> bytes, line <->
//! [`Record`]). The second half reads and writes whole files with those helpers. Reading
//! never fails: an unreadable or undecodable file decodes to an empty sequence so that
//! listing a foreign file degrades to an empty table. Writing propagates [`Error::Io`].

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::error::Error;
use crate::types::{Record, SCHEMA, SCHEMA_LEN};

/// UTF-16LE byte-order mark, written only by [`create_fresh`].
pub const BOM: [u8; 2] = [0xFF, 0xFE];

/// Field delimiter.
pub const DELIMITER: char = ';';

/// Line terminator, written explicitly on every platform.
pub const LINE_TERMINATOR: &str = "\r\n";

/// Contents of cell 0 of the version line.
pub const VERSION_STAMP: &str = "#Version: 1.0.0.0";

/// Encode text as UTF-16LE code units, without a byte-order mark.
pub fn encode_utf16le(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

/// Decode UTF-16LE bytes into a `String`.
///
/// A leading byte-order mark is consumed rather than surfaced as U+FEFF.
///
/// # Errors
///
/// Returns an [`io::ErrorKind::InvalidData`] error if the byte count is odd or the data
/// contains an unpaired surrogate.
pub fn decode_utf16le(bytes: &[u8]) -> io::Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("truncated UTF-16LE data: {} bytes", bytes.len()),
        ));
    }
    let body = bytes.strip_prefix(&BOM[..]).unwrap_or(bytes);
    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// The version stamp as a full-width row: cell 0 holds [`VERSION_STAMP`], the other
/// `SCHEMA_LEN - 1` cells are empty. No terminator.
pub fn version_line() -> String {
    let mut line = String::from(VERSION_STAMP);
    line.extend(std::iter::repeat_n(DELIMITER, SCHEMA_LEN - 1));
    line
}

/// The column header: schema names joined by the delimiter. No terminator.
pub fn header_line() -> String {
    SCHEMA.join(";")
}

/// Whether `c` ends a line.
///
/// Covers CR and LF plus the other Unicode line boundaries (VT, FF, FS, GS, RS, NEL,
/// LINE SEPARATOR, PARAGRAPH SEPARATOR) so foreign files split the same way they would in
/// a general-purpose text reader.
fn is_line_boundary(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r'
            | '\u{0B}'
            | '\u{0C}'
            | '\u{1C}'
            | '\u{1D}'
            | '\u{1E}'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

/// Split text into lines on any line boundary. `\r\n` counts as a single boundary.
///
/// Terminators are not included in the returned slices. A trailing terminator does not
/// produce a trailing empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !is_line_boundary(c) {
            continue;
        }
        lines.push(&text[start..i]);
        start = i + c.len_utf8();
        if c == '\r' && matches!(chars.peek(), Some((_, '\n'))) {
            chars.next();
            start += 1;
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Parse one non-blank line into a padded [`Record`].
///
/// Each field is trimmed of surrounding whitespace, then of surrounding `"` characters,
/// then of surrounding `'` characters (legacy quoting).
pub fn parse_line(line: &str) -> Record {
    Record::new(
        line.split(DELIMITER)
            .map(|field| field.trim().trim_matches('"').trim_matches('\'')),
    )
    .padded()
}

/// Encode one record as a terminated line: padded to the schema width, joined by the
/// delimiter, followed by CRLF.
///
/// Fields are written verbatim; sanitization is the caller's job (see [`sanitize_field`]).
pub fn encode_line(record: &Record) -> String {
    let mut line = if record.fields.len() < SCHEMA_LEN {
        record.clone().padded().fields.join(";")
    } else {
        record.fields.join(";")
    };
    line.push_str(LINE_TERMINATOR);
    line
}

/// Make a value safe to store in a single field.
///
/// `None` becomes the empty string. Otherwise every `\n` and `\r` is replaced with a
/// space and every `"` with `'`. The function is total and idempotent.
pub fn sanitize_field(value: Option<&str>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    value
        .chars()
        .map(|c| match c {
            '\n' | '\r' => ' ',
            '"' => '\'',
            other => other,
        })
        .collect()
}

/// Parse decoded file text into records, skipping blank and whitespace-only lines.
pub fn decode_text(text: &str) -> Vec<Record> {
    split_lines(text)
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
        .collect()
}

/// Create `path` with only the header line if it does not exist yet.
///
/// Existing files are never touched. The created file has neither a byte-order mark nor
/// a version line; only [`create_fresh`] writes those.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be created or written.
pub fn ensure_initialized(path: &Path) -> Result<(), Error> {
    if path.exists() {
        return Ok(());
    }
    let mut header = header_line();
    header.push_str(LINE_TERMINATOR);
    fs::write(path, encode_utf16le(&header))?;
    tracing::debug!(path = %path.display(), "created header-only alarm file");
    Ok(())
}

/// Create or overwrite `path` as a fresh, empty alarm table.
///
/// Writes the byte-order mark, the version line, and the header line, each line
/// terminated by CRLF.
///
/// # Errors
///
/// Returns [`Error::Io`] if the path is not writable. The caller must not treat the file
/// as initialized in that case.
pub fn create_fresh(path: &Path) -> Result<(), Error> {
    let mut text = version_line();
    text.push_str(LINE_TERMINATOR);
    text.push_str(&header_line());
    text.push_str(LINE_TERMINATOR);

    let mut bytes = Vec::with_capacity(BOM.len() + text.len() * 2);
    bytes.extend_from_slice(&BOM);
    bytes.extend_from_slice(&encode_utf16le(&text));

    let mut file = File::create(path)?;
    file.write_all(&bytes)?;
    file.sync_all()?;
    tracing::debug!(path = %path.display(), "created fresh alarm file");
    Ok(())
}

/// Read every non-blank line of `path` as a padded [`Record`].
///
/// The version and header lines are included when present; the store decides which lines
/// are data. Never fails: a missing, unreadable, or undecodable file yields an empty
/// vector and a log entry.
pub fn decode_all(path: &Path) -> Vec<Record> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "alarm file does not exist");
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read alarm file");
            return Vec::new();
        }
    };
    match decode_utf16le(&bytes) {
        Ok(text) => decode_text(&text),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "alarm file is not UTF-16LE");
            Vec::new()
        }
    }
}

/// Overwrite `path` with `lines`, one CRLF-terminated UTF-16LE line per record.
///
/// No byte-order mark is written. The rewrite is not atomic: a failure part-way through
/// can leave the file truncated.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened or written.
pub fn encode_all(path: &Path, lines: &[Record]) -> Result<(), Error> {
    let text: String = lines.iter().map(encode_line).collect();
    let mut file = File::create(path)?;
    file.write_all(&encode_utf16le(&text))?;
    file.sync_all()?;
    tracing::debug!(path = %path.display(), lines = lines.len(), "rewrote alarm file");
    Ok(())
}

/// Append one pre-encoded line to `path` without rewriting the rest of the file.
pub(crate) fn append_line(path: &Path, line: &str) -> Result<(), Error> {
    let mut file = OpenOptions::new().append(true).open(path)?;
    file.write_all(&encode_utf16le(line))?;
    file.sync_all()?;
    Ok(())
}
