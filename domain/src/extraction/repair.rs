//! Repair cascade for JSON-like objects embedded in model output.
//!
//! Models wrap objects in prose and markdown fences, leave trailing commas,
//! drop separators between lines, stop mid-string, or forget closing braces.
//! Each fix is a pure `&str -> String` function; [`extract_object`] tries
//! them in a fixed order and the first one that yields a JSON object wins.
//!
//! | Order | Strategy | Fix |
//! |-------|----------|-----|
//! | 1 | [`RepairStrategy::Direct`] | none |
//! | 2 | [`RepairStrategy::OuterObject`] | strip fences, cut the outer `{...}` |
//! | 3 | [`RepairStrategy::Separators`] | add missing commas between lines, drop trailing commas |
//! | 4 | [`RepairStrategy::CloseString`] | close an unterminated string |
//! | 5 | [`RepairStrategy::CloseBraces`] | append missing closing braces/brackets |
//! | 6 | [`RepairStrategy::Combined`] | 3 + 4 + 5 |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::LazyLock;

static MISSING_SEPARATOR: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r#"("|\d|true|false|null|\]|\})([ \t]*\r?\n\s*)(")"#)
        .expect("missing separator pattern is valid")
});

static TRAILING_COMMA: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r",(\s*[}\]])").expect("trailing comma pattern is valid")
});

/// A single repair strategy in the cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairStrategy {
    Direct,
    OuterObject,
    Separators,
    CloseString,
    CloseBraces,
    Combined,
}

impl RepairStrategy {
    /// All strategies in cascade order.
    pub const CASCADE: [RepairStrategy; 6] = [
        RepairStrategy::Direct,
        RepairStrategy::OuterObject,
        RepairStrategy::Separators,
        RepairStrategy::CloseString,
        RepairStrategy::CloseBraces,
        RepairStrategy::Combined,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RepairStrategy::Direct => "direct",
            RepairStrategy::OuterObject => "outer_object",
            RepairStrategy::Separators => "separators",
            RepairStrategy::CloseString => "close_string",
            RepairStrategy::CloseBraces => "close_braces",
            RepairStrategy::Combined => "combined",
        }
    }

    /// Produce the candidate text this strategy would parse.
    pub fn apply(&self, raw: &str) -> String {
        let cleaned = strip_fences(raw);
        let object = locate_object(&cleaned).unwrap_or(cleaned.trim());
        match self {
            RepairStrategy::Direct => raw.trim().to_string(),
            RepairStrategy::OuterObject => object.to_string(),
            RepairStrategy::Separators => fix_separators(object),
            RepairStrategy::CloseString => close_string(object),
            RepairStrategy::CloseBraces => close_braces(object),
            RepairStrategy::Combined => close_braces(&close_string(&fix_separators(object))),
        }
    }
}

impl std::fmt::Display for RepairStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of running the cascade. Never an `Err`: callers decide the fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy_used: Option<RepairStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Extraction {
    fn parsed(data: Map<String, Value>, strategy: RepairStrategy) -> Self {
        Self {
            success: true,
            data: Some(data),
            strategy_used: Some(strategy),
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            strategy_used: None,
            error: Some(error.into()),
        }
    }

    /// Consume into the parsed object, if any.
    pub fn into_data(self) -> Option<Map<String, Value>> {
        self.data
    }
}

/// Run the cascade; the first strategy that yields a JSON object wins.
pub fn extract_object(raw: &str) -> Extraction {
    if raw.trim().is_empty() {
        return Extraction::failed("empty output");
    }

    let mut last_error = String::from("no JSON object found");
    for strategy in RepairStrategy::CASCADE {
        let candidate = strategy.apply(raw);
        match serde_json::from_str::<Value>(&candidate) {
            Ok(Value::Object(map)) => return Extraction::parsed(map, strategy),
            Ok(other) => last_error = format!("expected object, found {}", json_kind(&other)),
            Err(e) => last_error = e.to_string(),
        }
    }

    Extraction::failed(format!("all repair strategies failed: {}", last_error))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Remove markdown fence markers (```json ... ```), keeping the content.
pub fn strip_fences(raw: &str) -> String {
    raw.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Locate the outermost object by brace depth, tracking string and escape
/// state so braces inside string values don't count.
///
/// When the object never closes, everything from the opening brace to the
/// end is returned so later strategies can finish it.
pub fn locate_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in raw[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&raw[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    Some(raw[start..].trim_end())
}

/// Insert commas between adjacent quoted lines and drop trailing commas.
pub fn fix_separators(text: &str) -> String {
    let with_commas = MISSING_SEPARATOR.replace_all(text, "$1,$2$3");
    TRAILING_COMMA.replace_all(&with_commas, "$1").into_owned()
}

/// Count quote characters that are not escaped.
fn unescaped_quotes(text: &str) -> usize {
    let mut count = 0;
    let mut escaped = false;
    for c in text.chars() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => count += 1,
            _ => {}
        }
    }
    count
}

/// With an odd quote count, add a closing quote before the last closing
/// brace, or at the end when there is none.
pub fn close_string(text: &str) -> String {
    if unescaped_quotes(text) % 2 == 0 {
        return text.to_string();
    }
    match text.rfind('}') {
        Some(idx) => format!("{}\"{}", &text[..idx], &text[idx..]),
        None => format!("{}\"", text),
    }
}

/// Append closers for every brace/bracket left open outside of strings.
pub fn close_braces(text: &str) -> String {
    let mut open: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => open.push('}'),
            '[' => open.push(']'),
            '}' | ']' => {
                if open.last() == Some(&c) {
                    open.pop();
                }
            }
            _ => {}
        }
    }

    if open.is_empty() {
        return text.to_string();
    }
    let mut repaired = text.trim_end().to_string();
    while let Some(closer) = open.pop() {
        repaired.push(closer);
    }
    repaired
}
