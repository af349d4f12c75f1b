use crate::error::Result;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    ConditionStart,
    ConditionEnd,
    ItemStart,
    ItemEnd,
    Description {
        indent: &'a str,
        value: &'a str,
    },
    Plain,
}

pub trait LineClassifier {
    fn classify<'a>(&self, line: &'a str) -> LineKind<'a>;
}

#[derive(Debug, Clone)]
pub struct PatternClassifier {
    condition_start: Regex,
    condition_end: Regex,
    item_start: Regex,
    item_end: Regex,
    description: Regex,
}

impl PatternClassifier {
    pub fn new() -> Result<Self> {
        Ok(Self {
            condition_start: Regex::new(
                r#"^\s*<condition\s+type\s*:\s*["'](and|or)["']\s*>\s*$"#,
            )?,
            condition_end: Regex::new(r"^\s*</condition\s*>\s*$")?,
            item_start: Regex::new(r"^\s*<(item|custom_item)>\s*$")?,
            item_end: Regex::new(r"^\s*</(item|custom_item)>\s*$")?,
            description: Regex::new(r"^(\s*)description\s*:")?,
        })
    }
}

impl LineClassifier for PatternClassifier {
    fn classify<'a>(&self, line: &'a str) -> LineKind<'a> {
        if self.condition_end.is_match(line) {
            return LineKind::ConditionEnd;
        }
        if self.condition_start.is_match(line) {
            return LineKind::ConditionStart;
        }
        if self.item_start.is_match(line) {
            return LineKind::ItemStart;
        }
        if self.item_end.is_match(line) {
            return LineKind::ItemEnd;
        }
        if let Some(captures) = self.description.captures(line) {
            let indent = captures.get(1).map_or("", |m| m.as_str());
            let value = line.split_once(':').map_or("", |(_, rest)| rest);
            return LineKind::Description { indent, value };
        }
        LineKind::Plain
    }
}
