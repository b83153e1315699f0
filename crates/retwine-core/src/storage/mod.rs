//! Loading of dataset records and recovered content.
//!
//! Thin I/O wrappers around the core: message and user rows come from the
//! dataset's CSV exports, recovered content arrives as line-delimited JSON
//! produced by the external hydration step, paired 1:1 with a companion log
//! recording `Total: <N>, collected: <M>` statistics.
//!
//! All loaders fail at file granularity: a malformed line aborts that file
//! with the offending line number, and a multi-dataset batch driver decides
//! whether to continue with the remaining datasets.

pub mod export;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::engine::errors::BuildError;
use crate::engine::records::{MessageRecord, RecoveredRecord, UserRecord};

/// Loads message rows from a CSV dataset export.
pub fn load_message_records(path: &Path) -> Result<Vec<MessageRecord>, BuildError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    tracing::debug!(path = %path.display(), rows = rows.len(), "loaded message records");
    Ok(rows)
}

/// Loads user rows from a CSV dataset export.
pub fn load_user_records(path: &Path) -> Result<Vec<UserRecord>, BuildError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    tracing::debug!(path = %path.display(), rows = rows.len(), "loaded user records");
    Ok(rows)
}

/// Loads recovered-content records from a line-delimited JSON file.
///
/// Blank lines are skipped; any other unparseable line is a malformed-record
/// error carrying its 1-based line number.
pub fn load_recovered_records(path: &Path) -> Result<Vec<RecoveredRecord>, BuildError> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: RecoveredRecord =
            serde_json::from_str(&line).map_err(|e| BuildError::MalformedRecord {
                line: index + 1,
                reason: e.to_string(),
            })?;
        records.push(record);
    }
    tracing::debug!(path = %path.display(), records = records.len(), "loaded recovered content");
    Ok(records)
}

/// Recovery statistics from a hydration companion log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryStats {
    /// Number of message ids submitted for recovery.
    pub total: u64,
    /// Number of messages actually recovered.
    pub collected: u64,
}

impl RecoveryStats {
    /// Fraction of submitted ids that were recovered, in `[0, 1]`.
    pub fn recall(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.collected as f64 / self.total as f64
    }
}

/// Parses the `Total: <N>, collected: <M>` line of a recovery log.
///
/// The log may carry other diagnostic lines; the first line with both fields
/// wins. A log without one is malformed.
pub fn parse_recovery_log(text: &str) -> Result<RecoveryStats, BuildError> {
    for (index, line) in text.lines().enumerate() {
        let Some(rest) = line.trim().strip_prefix("Total:") else {
            continue;
        };
        let Some((total_part, collected_part)) = rest.split_once(',') else {
            continue;
        };
        let Some(collected_part) = collected_part.trim().strip_prefix("collected:") else {
            continue;
        };
        let parse = |s: &str, field: &str| {
            s.trim().parse::<u64>().map_err(|_| BuildError::MalformedRecord {
                line: index + 1,
                reason: format!("unparseable {field} count '{}'", s.trim()),
            })
        };
        return Ok(RecoveryStats {
            total: parse(total_part, "total")?,
            collected: parse(collected_part, "collected")?,
        });
    }
    Err(BuildError::MalformedRecord {
        line: 0,
        reason: "recovery log carries no 'Total: <N>, collected: <M>' line".into(),
    })
}
