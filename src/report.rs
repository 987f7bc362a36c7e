//! Pipe-delimited session report.
//!
//! Fields are written verbatim; a `|` inside a title or room shifts the
//! columns of that row. Such rows are logged but not escaped, since the
//! consumers of this file split on every pipe.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::warn;

use crate::catalog::SessionCard;
use crate::schedule::ScheduleInfo;

pub const DELIMITER: &str = "|";

pub const HEADER: &str = "Session Number|Session Type|Session Title|Session Interest|Start Time|End Time|Room and Building|Day of Week";

/// One output row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub number: String,
    pub session_type: String,
    pub title: String,
    pub interested: bool,
    pub start: String,
    pub end: String,
    pub room: String,
    pub weekday: String,
}

impl SessionRecord {
    pub fn new(card: &SessionCard, schedule: &ScheduleInfo) -> Self {
        Self {
            number: card.number.clone(),
            session_type: card.session_type.clone(),
            title: card.title.clone(),
            interested: card.interested,
            start: schedule.start_display(),
            end: schedule.end_display(),
            room: schedule.room.clone().unwrap_or_default(),
            weekday: schedule.weekday.clone(),
        }
    }

    fn fields(&self) -> [&str; 8] {
        [
            self.number.as_str(),
            self.session_type.as_str(),
            self.title.as_str(),
            if self.interested { "True" } else { "False" },
            self.start.as_str(),
            self.end.as_str(),
            self.room.as_str(),
            self.weekday.as_str(),
        ]
    }

    /// The row as written, without its line terminator.
    pub fn to_line(&self) -> String {
        self.fields().join(DELIMITER).trim().to_string()
    }

    fn has_embedded_delimiter(&self) -> bool {
        self.fields().iter().any(|field| field.contains(DELIMITER))
    }
}

/// Writes the header on creation, then one flushed line per record.
pub struct ReportWriter<W: Write> {
    out: W,
    rows: usize,
}

impl ReportWriter<BufWriter<File>> {
    /// Create (or truncate) the report file at `path`.
    pub fn create(path: &Path) -> io::Result<Self> {
        Self::new(BufWriter::new(File::create(path)?))
    }
}

impl<W: Write> ReportWriter<W> {
    pub fn new(mut out: W) -> io::Result<Self> {
        writeln!(out, "{HEADER}")?;
        out.flush()?;
        Ok(Self { out, rows: 0 })
    }

    /// Append one record. Each row is flushed so an aborted run keeps
    /// everything written before the failure.
    pub fn write(&mut self, record: &SessionRecord) -> io::Result<()> {
        if record.has_embedded_delimiter() {
            warn!(
                number = record.number.as_str(),
                title = record.title.as_str(),
                "field contains the delimiter, row columns will shift"
            );
        }
        writeln!(self.out, "{}", record.to_line())?;
        self.out.flush()?;
        self.rows += 1;
        Ok(())
    }

    /// Number of data rows written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
