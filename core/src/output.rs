use crate::baseline::{BaselineAudit, BaselineOptions};
use crate::error::{BaselineError, Result};
use std::fs;

pub fn write_baseline(audit: &BaselineAudit, options: &BaselineOptions) -> Result<()> {
    let path = &audit.path;
    if path.is_file() && !options.overwrite {
        return Err(BaselineError::OutputExists { path: path.clone() });
    }

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| BaselineError::io(parent, err))?;
    }
    fs::write(path, &audit.contents).map_err(|err| BaselineError::io(path, err))
}
