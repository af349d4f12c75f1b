use std::fmt::Display;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]/[month]/[day] [hour]:[minute]:[second]");

/// Progress and warning output for a run.
///
/// Progress goes to stdout unless a machine-readable summary owns stdout, in
/// which case it is sent to stderr instead.
#[derive(Debug, Clone, Copy)]
pub struct Console {
    verbose: bool,
    timestamp: bool,
    progress_to_stderr: bool,
}

impl Console {
    pub fn new(verbose: bool, timestamp: bool, progress_to_stderr: bool) -> Self {
        Self {
            verbose,
            timestamp,
            progress_to_stderr,
        }
    }

    pub fn info(&self, message: impl Display) {
        self.progress(&self.render(None, message));
    }

    /// Only shown with `--verbose`.
    pub fn detail(&self, message: impl Display) {
        if self.verbose {
            self.info(message);
        }
    }

    pub fn warn(&self, message: impl Display) {
        eprintln!("{}", self.render(Some("[warn]"), message));
    }

    fn progress(&self, line: &str) {
        if self.progress_to_stderr {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }

    fn render(&self, level: Option<&str>, message: impl Display) -> String {
        let mut line = String::new();
        if self.timestamp {
            let now = OffsetDateTime::now_utc()
                .format(TIMESTAMP_FORMAT)
                .unwrap_or_else(|_| "unknown".to_string());
            line.push_str(&now);
            line.push(' ');
        }
        if let Some(level) = level {
            line.push_str(level);
            line.push(' ');
        }
        line.push_str(&message.to_string());
        line
    }
}
