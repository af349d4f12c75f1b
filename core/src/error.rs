use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, BaselineError>;

#[derive(Debug, thiserror::Error)]
pub enum BaselineError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("file exists: {} (pass --overwrite to replace it)", .path.display())]
    OutputExists { path: PathBuf },
    #[error("failed to parse report {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },
    #[error("report {source_name}: <{element}> is missing the '{attribute}' attribute")]
    MissingAttribute {
        source_name: String,
        element: &'static str,
        attribute: &'static str,
    },
    #[error("value for host {host} contains both quote characters and cannot be quoted: {value}")]
    UnquotableValue { host: String, value: String },
    #[error("invalid line pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl BaselineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(source_name: &str, message: impl Into<String>) -> Self {
        Self::Parse {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }
}
