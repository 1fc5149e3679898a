use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the processed data files
#[derive(Error, Debug)]
pub enum DashboardError {
    /// One of the two source files does not exist
    #[error("Data file not found: {}", .path.display())]
    SourceNotFound { path: PathBuf },

    /// A source file exists but could not be parsed
    #[error("Failed to parse {}{}: {message}", .path.display(), line_suffix(.line))]
    Parse {
        path: PathBuf,
        line: Option<u64>,
        message: String,
    },

    /// Any other I/O failure while reading a source file
    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn line_suffix(line: &Option<u64>) -> String {
    line.map(|l| format!(" (line {})", l)).unwrap_or_default()
}

impl DashboardError {
    /// Build a parse error from a csv error, keeping its line position
    pub(crate) fn from_csv(path: &std::path::Path, err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line());

        match err.into_kind() {
            csv::ErrorKind::Io(source) => DashboardError::Io {
                path: path.to_path_buf(),
                source,
            },
            csv::ErrorKind::Deserialize { err, .. } => DashboardError::Parse {
                path: path.to_path_buf(),
                line,
                message: err.to_string(),
            },
            other => DashboardError::Parse {
                path: path.to_path_buf(),
                line,
                message: format!("{:?}", other),
            },
        }
    }
}

pub type DashboardResult<T> = Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_message_names_file_and_line() {
        let err = DashboardError::Parse {
            path: PathBuf::from("data/processed/forecast_summary.csv"),
            line: Some(4),
            message: "invalid float literal".to_string(),
        };

        assert_eq!(
            err.to_string(),
            "Failed to parse data/processed/forecast_summary.csv (line 4): invalid float literal"
        );
    }

    #[test]
    fn test_parse_error_without_line() {
        let err = DashboardError::Parse {
            path: PathBuf::from("ts.csv"),
            line: None,
            message: "missing field `Type`".to_string(),
        };

        assert_eq!(err.to_string(), "Failed to parse ts.csv: missing field `Type`");
    }
}
