use std::path::PathBuf;
use thiserror::Error;

/// Everything that can abort a report run.
#[derive(Error, Debug)]
pub enum ReportError {
    /// A required source column is missing from the header row.
    #[error("Schema mismatch: required column \"{column}\" not found in header")]
    SchemaMismatch { column: String },

    /// A `Created` cell did not match `dd/Mon/yy hh:mm AM`.
    #[error("Unparseable timestamp \"{value}\" on line {line}")]
    UnparseableTimestamp { line: u64, value: String },

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_mismatch_names_the_column() {
        let err = ReportError::SchemaMismatch {
            column: "Labels.2".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Schema mismatch: required column \"Labels.2\" not found in header"
        );
    }

    #[test]
    fn unparseable_timestamp_names_line_and_value() {
        let err = ReportError::UnparseableTimestamp {
            line: 7,
            value: "2025-06-02".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("line 7"));
        assert!(msg.contains("2025-06-02"));
    }

    #[test]
    fn file_read_keeps_path_and_cause() {
        let err = ReportError::FileRead {
            path: PathBuf::from("/missing/warren.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/missing/warren.csv"));
        assert!(msg.contains("no such file"));
    }
}
