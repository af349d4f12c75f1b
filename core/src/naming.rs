use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputTarget {
    #[default]
    PerHost,
    Override(PathBuf),
}

impl OutputTarget {
    pub fn resolve(&self, template: &Path, host: &str) -> PathBuf {
        match self {
            OutputTarget::PerHost => host_file_name(template, host),
            OutputTarget::Override(path) => path.clone(),
        }
    }
}

pub fn host_file_name(template: &Path, host: &str) -> PathBuf {
    let file_name = template
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    // The host goes before the text after the last dot, even for dotfiles.
    let name = match file_name.rsplit_once('.') {
        Some((stem, extension)) => format!("{stem}.{host}.{extension}"),
        None => format!("{file_name}.{host}"),
    };

    template.with_file_name(name)
}
