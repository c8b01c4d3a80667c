use chrono::Local;

use crate::shared::constants::AUDIT_TIMESTAMP_FORMAT;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditEntry {
    pub timestamp: String,
    pub message: String,
}

impl std::fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.timestamp, self.message)
    }
}

/// Append-only diagnostic trail of an output session.
///
/// Keeps every entry; callers display only a recent window.
#[derive(Clone, Debug, Default)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `message` stamped with the local wall-clock time
    /// (`HH:MM:SS.mmm`) and echoes it at debug level.
    pub fn record(&mut self, message: impl Into<String>) {
        let timestamp = Local::now().format(AUDIT_TIMESTAMP_FORMAT).to_string();
        self.record_at(timestamp, message);
    }

    pub fn record_at(&mut self, timestamp: impl Into<String>, message: impl Into<String>) {
        let entry = AuditEntry {
            timestamp: timestamp.into(),
            message: message.into(),
        };
        log::debug!("{entry}");
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// The last `window` entries, oldest first.
    pub fn recent(&self, window: usize) -> &[AuditEntry] {
        let start = self.entries.len().saturating_sub(window);
        &self.entries[start..]
    }

    /// Renders the last `window` entries as `timestamp | message` rows under
    /// a header.
    pub fn table(&self, window: usize) -> Vec<String> {
        let recent = self.recent(window);
        let width = recent
            .iter()
            .map(|e| e.timestamp.len())
            .max()
            .unwrap_or(0)
            .max("Timestamp".len());

        let mut rows = Vec::with_capacity(recent.len() + 2);
        rows.push(format!("{:width$} | Message", "Timestamp"));
        rows.push(format!("{}-+-{}", "-".repeat(width), "-".repeat(40)));
        for entry in recent {
            rows.push(format!("{:width$} | {}", entry.timestamp, entry.message));
        }
        rows
    }
}
