use crate::classify::{LineClassifier, LineKind, PatternClassifier};
use crate::error::{BaselineError, Result};
use crate::report::HostValues;
use crate::template::AuditTemplate;

const KNOWN_GOOD_KEY: &str = "known_good";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub lines: Vec<String>,
    pub items: usize,
    pub inserted: usize,
    pub inserted_in_conditions: usize,
}

impl RewriteOutcome {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

#[derive(Debug, Default)]
struct RewriteState<'v> {
    in_item: bool,
    in_condition: bool,
    known_good: Option<&'v str>,
    indent: String,
}

impl<'v> RewriteState<'v> {
    fn open_item(&mut self) {
        self.in_item = true;
        self.known_good = None;
        self.indent.clear();
    }

    fn close_item(&mut self) {
        self.in_item = false;
        self.known_good = None;
        self.indent.clear();
    }
}

#[derive(Debug, Clone)]
pub struct AuditRewriter<C = PatternClassifier> {
    classifier: C,
}

impl AuditRewriter<PatternClassifier> {
    pub fn with_default_patterns() -> Result<Self> {
        Ok(Self::new(PatternClassifier::new()?))
    }
}

impl<C: LineClassifier> AuditRewriter<C> {
    pub fn new(classifier: C) -> Self {
        Self { classifier }
    }

    pub fn rewrite(
        &self,
        template: &AuditTemplate,
        host: &str,
        values: &HostValues,
    ) -> Result<RewriteOutcome> {
        let source = template.lines();
        let mut state = RewriteState::default();
        let mut outcome = RewriteOutcome {
            lines: Vec::with_capacity(source.len()),
            ..RewriteOutcome::default()
        };

        for line in source {
            match self.classifier.classify(line) {
                LineKind::ConditionEnd => state.in_condition = false,
                LineKind::ConditionStart => state.in_condition = true,
                LineKind::ItemStart => state.open_item(),
                LineKind::ItemEnd => {
                    // An empty observed value still clears an earlier match but
                    // is never written out.
                    if let Some(value) = state.known_good.filter(|value| !value.is_empty()) {
                        let quoted =
                            quote_value(value).ok_or_else(|| BaselineError::UnquotableValue {
                                host: host.to_string(),
                                value: value.to_string(),
                            })?;
                        let eol = if line.ends_with('\r') { "\r" } else { "" };
                        outcome.lines.push(format!(
                            "{}{KNOWN_GOOD_KEY} : {quoted}{eol}",
                            state.indent
                        ));
                        outcome.inserted += 1;
                        if state.in_condition {
                            outcome.inserted_in_conditions += 1;
                        }
                    }
                    if state.in_item {
                        outcome.items += 1;
                    }
                    state.close_item();
                }
                LineKind::Description { indent, value } => {
                    if let Some(observed) = values.get(strip_quotes(value)) {
                        state.known_good = Some(observed.as_str());
                        state.indent = indent.to_string();
                    }
                }
                LineKind::Plain => {}
            }
            outcome.lines.push(line.clone());
        }

        Ok(outcome)
    }
}

pub fn strip_quotes(raw: &str) -> &str {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) if is_quote(first) && first == last => chars.as_str(),
        (Some(first), None) if is_quote(first) => "",
        _ => trimmed,
    }
}

pub fn quote_value(value: &str) -> Option<String> {
    match (value.contains('"'), value.contains('\'')) {
        (true, true) => None,
        (true, false) => Some(format!("'{value}'")),
        (false, _) => Some(format!("\"{value}\"")),
    }
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}
