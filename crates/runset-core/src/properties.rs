//! The generated `embulk.properties` file.
//!
//! Properties are collected in memory and written once, right before the run
//! set is copied. The first property set in a run creates a temporary file
//! and stages it for copy as `embulk.properties`; if no property is ever set,
//! no file is created at all.
//!
//! The file uses the Java `.properties` text form so Embulk can load it with
//! `java.util.Properties#load`.

use std::io::{Seek, Write};
use std::path::PathBuf;

use indexmap::IndexMap;
use parking_lot::Mutex;
use tempfile::NamedTempFile;

use crate::copy::{CopyInstruction, DuplicatePolicy};
use crate::error::{InstallError, Result};

/// File name of the generated properties file at the top of the embulk home.
pub const EMBULK_PROPERTIES_FILE: &str = "embulk.properties";

/// Comment written as the first line of the generated file.
pub const PROPERTIES_HEADER: &str = "Generated by the \"org.embulk.embulk-runset\" installer.";

#[cfg(windows)]
const LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
const LINE_SEPARATOR: &str = "\n";

enum SinkState {
    NotStarted,
    Staged { file: NamedTempFile },
}

struct Inner {
    state: SinkState,
    values: IndexMap<String, String>,
}

/// Lazily staged accumulator for `embulk.properties`.
pub struct PropertiesSink {
    temporary_dir: PathBuf,
    inner: Mutex<Inner>,
}

impl PropertiesSink {
    /// Create a sink whose temporary file will live under `temporary_dir`.
    pub fn new(temporary_dir: impl Into<PathBuf>) -> Self {
        Self {
            temporary_dir: temporary_dir.into(),
            inner: Mutex::new(Inner {
                state: SinkState::NotStarted,
                values: IndexMap::new(),
            }),
        }
    }

    /// Set a property.
    ///
    /// The first call creates the temporary file and returns the copy
    /// instruction that places it into the run set. Every later call returns
    /// `None`.
    pub fn set(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Option<CopyInstruction>> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let staged = if matches!(inner.state, SinkState::NotStarted) {
            let file = self.create_source()?;
            let instruction =
                CopyInstruction::new(file.path(), EMBULK_PROPERTIES_FILE, DuplicatePolicy::Include);
            tracing::debug!(source = %file.path().display(), "staged embulk.properties");
            inner.state = SinkState::Staged { file };
            Some(instruction)
        } else {
            None
        };

        inner.values.insert(key.into(), value.into());
        Ok(staged)
    }

    fn create_source(&self) -> Result<NamedTempFile> {
        let io_err = |e| InstallError::Properties {
            path: self.temporary_dir.clone(),
            source: e,
        };
        std::fs::create_dir_all(&self.temporary_dir).map_err(io_err)?;
        tempfile::Builder::new()
            .prefix("embulk.")
            .suffix(".properties")
            .tempfile_in(&self.temporary_dir)
            .map_err(io_err)
    }

    pub fn is_staged(&self) -> bool {
        matches!(self.inner.lock().state, SinkState::Staged { .. })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().values.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().values.is_empty()
    }

    /// Snapshot of the properties in insertion order.
    pub fn entries(&self) -> Vec<(String, String)> {
        self.inner
            .lock()
            .values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Path of the staged temporary file, if any property was set.
    pub fn source_path(&self) -> Option<PathBuf> {
        match &self.inner.lock().state {
            SinkState::NotStarted => None,
            SinkState::Staged { file } => Some(file.path().to_path_buf()),
        }
    }

    /// Write the staged file. Does nothing if no property was ever set.
    ///
    /// The file is rewritten from the start on every call, so it always
    /// holds the current properties. Returns the path that was written.
    pub fn write(&self) -> Result<Option<PathBuf>> {
        let inner = self.inner.lock();
        let SinkState::Staged { file } = &inner.state else {
            return Ok(None);
        };

        let path = file.path().to_path_buf();
        let text = store(&inner.values, PROPERTIES_HEADER);
        let io_err = |e| InstallError::Properties {
            path: path.clone(),
            source: e,
        };
        let mut out: &std::fs::File = file.as_file();
        out.set_len(0).map_err(io_err)?;
        out.rewind().map_err(io_err)?;
        out.write_all(&to_latin1(&text)).map_err(io_err)?;
        out.flush().map_err(io_err)?;

        tracing::info!(path = %path.display(), entries = inner.values.len(), "wrote embulk.properties");
        Ok(Some(path))
    }
}

impl std::fmt::Debug for PropertiesSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertiesSink")
            .field("temporary_dir", &self.temporary_dir)
            .field("staged", &self.is_staged())
            .field("entries", &self.len())
            .finish()
    }
}

/// Render properties the way `java.util.Properties#store` does.
pub fn store(values: &IndexMap<String, String>, comment: &str) -> String {
    let mut out = String::new();
    write_comment(&mut out, comment);
    // chrono has no zone abbreviations for local time, so the date is in UTC.
    let timestamp = chrono::Utc::now().format("%a %b %d %H:%M:%S UTC %Y");
    write_comment(&mut out, &timestamp.to_string());
    for (key, value) in values {
        out.push_str(&escape(key, true));
        out.push('=');
        out.push_str(&escape(value, false));
        out.push_str(LINE_SEPARATOR);
    }
    out
}

fn write_comment(out: &mut String, comment: &str) {
    out.push('#');
    let mut chars = comment.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str(LINE_SEPARATOR);
                if !matches!(chars.peek(), Some('#') | Some('!')) {
                    out.push('#');
                }
            }
            c if (c as u32) > 0xff => push_unicode_escapes(out, c),
            c => out.push(c),
        }
    }
    out.push_str(LINE_SEPARATOR);
}

/// Escape a key or value for a `.properties` line.
///
/// Spaces are escaped everywhere in keys, and only when leading in values.
pub fn escape(s: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.chars().enumerate() {
        match c {
            ' ' if i == 0 || is_key => out.push_str("\\ "),
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{000c}' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || (c as u32) > 0x7e => push_unicode_escapes(&mut out, c),
            c => out.push(c),
        }
    }
    out
}

fn push_unicode_escapes(out: &mut String, c: char) {
    let mut units = [0u16; 2];
    for unit in c.encode_utf16(&mut units) {
        out.push_str(&format!("\\u{:04X}", unit));
    }
}

// Everything above 0xff has been escaped, so each char fits in one byte.
fn to_latin1(text: &str) -> Vec<u8> {
    text.chars().map(|c| c as u32 as u8).collect()
}
