pub mod baseline;
pub mod classify;
pub mod error;
pub mod naming;
pub mod output;
pub mod report;
pub mod rewrite;
pub mod template;

pub use baseline::{build_baselines, BaselineAudit, BaselineOptions};
pub use classify::{LineClassifier, LineKind, PatternClassifier};
pub use error::{BaselineError, Result};
pub use naming::{host_file_name, OutputTarget};
pub use output::write_baseline;
pub use report::{extract_values, parse_report, HostValues, ReportSource, ValueTable};
pub use rewrite::{quote_value, strip_quotes, AuditRewriter, RewriteOutcome};
pub use template::AuditTemplate;
