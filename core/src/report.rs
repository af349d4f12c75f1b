use crate::error::{BaselineError, Result};
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Reader;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const CHECK_NAME_TAG: &str = "compliance-check-name";
const ACTUAL_VALUE_TAG: &str = "compliance-actual-value";

// Element depths below the document root.
const REPORT_DEPTH: usize = 2;
const HOST_DEPTH: usize = 3;
const ITEM_DEPTH: usize = 4;
const FIELD_DEPTH: usize = 5;

pub type HostValues = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValueTable {
    hosts: BTreeMap<String, HostValues>,
}

impl ValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_host(&mut self, host: impl Into<String>, values: HostValues) -> Option<HostValues> {
        self.hosts.insert(host.into(), values)
    }

    pub fn host(&self, host: &str) -> Option<&HostValues> {
        self.hosts.get(host)
    }

    pub fn hosts(&self) -> impl Iterator<Item = (&str, &HostValues)> {
        self.hosts
            .iter()
            .map(|(name, values)| (name.as_str(), values))
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    // Replaces a host's whole mapping; mappings are never combined.
    pub fn merge(&mut self, other: ValueTable) {
        for (host, values) in other.hosts {
            self.hosts.insert(host, values);
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportSource {
    pub name: String,
    pub contents: Vec<u8>,
}

impl ReportSource {
    pub fn new(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read(path).map_err(|err| BaselineError::io(path, err))?;
        Ok(Self::new(path.display().to_string(), contents))
    }
}

pub fn extract_values(reports: &[ReportSource]) -> Result<ValueTable> {
    let mut table = ValueTable::new();
    for report in reports {
        table.merge(parse_report(&report.contents, &report.name)?);
    }
    Ok(table)
}

pub fn parse_report(xml: &[u8], source_name: &str) -> Result<ValueTable> {
    let mut reader = Reader::from_reader(xml);

    let mut buf = Vec::new();
    let mut table = ValueTable::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut in_report = false;
    let mut current_host: Option<String> = None;
    let mut current_item: Option<ItemBuilder> = None;
    let mut current_field: Option<FieldCapture> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(element)) => {
                if seen_root && depth == 0 {
                    return Err(BaselineError::parse(
                        source_name,
                        "content after the root element",
                    ));
                }
                seen_root = true;
                depth += 1;
                let attributes = read_attributes(&element, source_name)?;
                match depth {
                    REPORT_DEPTH => in_report = element.name() == QName(b"Report"),
                    HOST_DEPTH if in_report && element.name() == QName(b"ReportHost") => {
                        let host = host_name(&attributes, source_name)?;
                        table.insert_host(host.clone(), HostValues::new());
                        current_host = Some(host);
                    }
                    ITEM_DEPTH
                        if current_host.is_some() && element.name() == QName(b"ReportItem") =>
                    {
                        current_item = Some(ItemBuilder::default());
                    }
                    FIELD_DEPTH if current_item.is_some() => {
                        current_field = FieldKind::from_tag(element.name()).map(FieldCapture::new);
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(element)) => {
                if seen_root && depth == 0 {
                    return Err(BaselineError::parse(
                        source_name,
                        "content after the root element",
                    ));
                }
                seen_root = true;
                let attributes = read_attributes(&element, source_name)?;
                match depth + 1 {
                    HOST_DEPTH if in_report && element.name() == QName(b"ReportHost") => {
                        let host = host_name(&attributes, source_name)?;
                        table.insert_host(host, HostValues::new());
                    }
                    FIELD_DEPTH => {
                        if let (Some(item), Some(kind)) =
                            (current_item.as_mut(), FieldKind::from_tag(element.name()))
                        {
                            item.record(FieldCapture::new(kind));
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(_)) => {
                match depth {
                    FIELD_DEPTH => {
                        if let (Some(item), Some(field)) = (current_item.as_mut(), current_field.take())
                        {
                            item.record(field);
                        }
                    }
                    ITEM_DEPTH => {
                        if let Some(item) = current_item.take() {
                            let values = current_host
                                .as_deref()
                                .and_then(|host| table.hosts.get_mut(host));
                            if let (Some(values), Some((description, value))) =
                                (values, item.finish())
                            {
                                values.insert(description, value);
                            }
                        }
                    }
                    HOST_DEPTH => current_host = None,
                    REPORT_DEPTH => in_report = false,
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Text(text)) => {
                let raw = std::str::from_utf8(&text)
                    .map_err(|err| BaselineError::parse(source_name, err.to_string()))?;
                let decoded = unescape(&normalize_line_endings(raw))
                    .map_err(|err| BaselineError::parse(source_name, err.to_string()))?
                    .into_owned();
                if depth == 0 {
                    if !decoded.trim().is_empty() {
                        return Err(BaselineError::parse(
                            source_name,
                            "text outside the root element",
                        ));
                    }
                } else if depth == FIELD_DEPTH {
                    if let Some(field) = current_field.as_mut() {
                        field.text.push_str(&decoded);
                    }
                }
            }
            Ok(Event::CData(data)) => {
                if depth == FIELD_DEPTH {
                    if let Some(field) = current_field.as_mut() {
                        let raw = String::from_utf8_lossy(&data);
                        field.text.push_str(&normalize_line_endings(&raw));
                    }
                }
            }
            Ok(Event::Eof) => {
                if !seen_root {
                    return Err(BaselineError::parse(source_name, "no root element found"));
                }
                if depth > 0 {
                    return Err(BaselineError::parse(
                        source_name,
                        format!("unexpected end of document with {depth} unclosed element(s)"),
                    ));
                }
                break;
            }
            Err(err) => {
                return Err(BaselineError::parse(
                    source_name,
                    format!("{err} (near byte {})", reader.buffer_position()),
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(table)
}

fn read_attributes(element: &BytesStart<'_>, source_name: &str) -> Result<Vec<(String, String)>> {
    let mut attributes = Vec::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|err| BaselineError::parse(source_name, err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| BaselineError::parse(source_name, err.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(attributes)
}

fn host_name(attributes: &[(String, String)], source_name: &str) -> Result<String> {
    attributes
        .iter()
        .find(|(key, _)| key == "name")
        .map(|(_, value)| value.clone())
        .ok_or_else(|| BaselineError::MissingAttribute {
            source_name: source_name.to_string(),
            element: "ReportHost",
            attribute: "name",
        })
}

// XML end-of-line handling: `\r\n` and a lone `\r` both become `\n`.
fn normalize_line_endings(raw: &str) -> Cow<'_, str> {
    if raw.contains('\r') {
        Cow::Owned(raw.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(raw)
    }
}

#[derive(Debug, Clone, Copy)]
enum FieldKind {
    CheckName,
    ActualValue,
}

impl FieldKind {
    fn from_tag(name: QName<'_>) -> Option<Self> {
        let tag = String::from_utf8_lossy(name.as_ref());
        if tag.contains(CHECK_NAME_TAG) {
            Some(FieldKind::CheckName)
        } else if tag.contains(ACTUAL_VALUE_TAG) {
            Some(FieldKind::ActualValue)
        } else {
            None
        }
    }
}

struct FieldCapture {
    kind: FieldKind,
    text: String,
}

impl FieldCapture {
    fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            text: String::new(),
        }
    }
}

// `value` stays `None` until an actual-value field is seen.
#[derive(Default)]
struct ItemBuilder {
    description: String,
    value: Option<String>,
}

impl ItemBuilder {
    fn record(&mut self, field: FieldCapture) {
        match field.kind {
            FieldKind::CheckName => self.description = field.text.trim().to_string(),
            FieldKind::ActualValue => self.value = Some(field.text),
        }
    }

    fn finish(self) -> Option<(String, String)> {
        if self.description.is_empty() {
            return None;
        }
        self.value.map(|value| (self.description, value))
    }
}
