use crate::error::{BaselineError, Result};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditTemplate {
    path: PathBuf,
    lines: Vec<String>,
}

impl AuditTemplate {
    pub fn new(path: impl Into<PathBuf>, source: &str) -> Self {
        Self {
            path: path.into(),
            // Split on `\n` only, so joining with `\n` reproduces the source.
            lines: source.split('\n').map(str::to_string).collect(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path).map_err(|err| BaselineError::io(path, err))?;
        Ok(Self::new(path, &source))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}
