use crate::classify::LineClassifier;
use crate::error::Result;
use crate::naming::OutputTarget;
use crate::report::ValueTable;
use crate::rewrite::AuditRewriter;
use crate::template::AuditTemplate;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct BaselineOptions {
    pub target: OutputTarget,
    pub overwrite: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BaselineAudit {
    pub template: PathBuf,
    pub host: String,
    pub path: PathBuf,
    pub items: usize,
    pub inserted: usize,
    pub inserted_in_conditions: usize,
    #[serde(skip)]
    pub contents: String,
}

pub fn build_baselines<C: LineClassifier>(
    templates: &[AuditTemplate],
    table: &ValueTable,
    rewriter: &AuditRewriter<C>,
    options: &BaselineOptions,
) -> Result<Vec<BaselineAudit>> {
    let mut audits = Vec::with_capacity(templates.len() * table.len());

    for template in templates {
        for (host, values) in table.hosts() {
            let outcome = rewriter.rewrite(template, host, values)?;
            audits.push(BaselineAudit {
                template: template.path().to_path_buf(),
                host: host.to_string(),
                path: options.target.resolve(template.path(), host),
                items: outcome.items,
                inserted: outcome.inserted,
                inserted_in_conditions: outcome.inserted_in_conditions,
                contents: outcome.text(),
            });
        }
    }

    Ok(audits)
}
