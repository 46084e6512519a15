//! Detailed-mode judge report parsing.
//!
//! The report is a set of headed sections. Each section is parsed on its
//! own; order does not matter and a missing or unreadable section takes its
//! neutral default instead of failing the whole report.

use super::concise::{JudgeMode, JudgeVerdict, clamp_score};
use super::rating::{Actionable, RiskLevel};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

pub const DEFAULT_CONSENSUS_SCORE: f64 = 50.0;
pub const DEFAULT_CONFIDENCE: f64 = 75.0;
pub const DEFAULT_RISK: RiskLevel = RiskLevel::Medium;
pub const DEFAULT_ACTIONABLE: Actionable = Actionable::Caution;
pub const DEFAULT_BEST_ANSWER: &str = "No synthesized answer provided";

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("number pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Section {
    ConsensusScore,
    BestAnswer,
    Confidence,
    Risk,
    Actionable,
    Agreements,
    Disagreements,
    Recommendation,
}

impl Section {
    const NAMES: [(&'static str, Section); 12] = [
        ("consensus score", Section::ConsensusScore),
        ("agreement score", Section::ConsensusScore),
        ("best answer", Section::BestAnswer),
        ("confidence", Section::Confidence),
        ("risk level", Section::Risk),
        ("risk", Section::Risk),
        ("actionable", Section::Actionable),
        ("key agreements", Section::Agreements),
        ("agreements", Section::Agreements),
        ("key disagreements", Section::Disagreements),
        ("disagreements", Section::Disagreements),
        ("recommendation", Section::Recommendation),
    ];
}

fn strip_bold(text: &str) -> &str {
    text.trim_start().trim_start_matches("**").trim_start()
}

/// Recognize a section heading.
///
/// A heading is a known section name that is either marked (`#` or `**`)
/// or followed by a colon. Returns the section and any inline content.
fn heading(line: &str) -> Option<(Section, &str)> {
    let trimmed = line.trim();
    let after_hashes = trimmed.trim_start_matches('#');
    let mut marked = after_hashes.len() != trimmed.len();
    let rest = after_hashes.trim_start();
    if rest.starts_with("**") {
        marked = true;
    }
    let rest = strip_bold(rest);
    let lower = rest.to_lowercase();

    let (name, section) = Section::NAMES
        .iter()
        .find(|(name, _)| {
            lower.starts_with(name)
                && !lower[name.len()..]
                    .chars()
                    .next()
                    .is_some_and(char::is_alphanumeric)
        })?;

    let after = strip_bold(rest.get(name.len()..)?);
    let (colon, after) = match after.strip_prefix(':') {
        Some(stripped) => (true, stripped),
        None => (false, after),
    };
    let inline = strip_bold(after).trim_end_matches("**").trim();

    if !marked && !colon {
        return None;
    }
    if !colon && !inline.is_empty() {
        // marked line that merely starts with a section word
        return None;
    }
    Some((*section, inline))
}

/// Split the report into section bodies. A repeated heading keeps the first.
fn split_sections(raw: &str) -> HashMap<Section, String> {
    fn flush(entry: Option<(Section, Vec<String>)>, sections: &mut HashMap<Section, String>) {
        if let Some((section, lines)) = entry {
            sections
                .entry(section)
                .or_insert_with(|| lines.join("\n").trim().to_string());
        }
    }

    let mut sections: HashMap<Section, String> = HashMap::new();
    let mut current: Option<(Section, Vec<String>)> = None;

    for line in raw.lines() {
        if let Some((section, inline)) = heading(line) {
            flush(current.take(), &mut sections);
            let lines = if inline.is_empty() {
                Vec::new()
            } else {
                vec![inline.to_string()]
            };
            current = Some((section, lines));
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(line.to_string());
        }
    }
    flush(current.take(), &mut sections);

    sections.retain(|_, body| !body.is_empty());
    sections
}

fn first_number(text: &str) -> Option<f64> {
    NUMBER.find(text).and_then(|m| m.as_str().parse().ok())
}

/// Bullet or numbered list items, markers removed
fn list_items(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            let item = line.trim().trim_start_matches(['-', '*', '•']).trim_start();
            let digits = item.len() - item.trim_start_matches(|c: char| c.is_ascii_digit()).len();
            let item = match item[digits..].strip_prefix(['.', ')']) {
                Some(rest) if digits > 0 => rest,
                _ => item,
            };
            item.trim().to_string()
        })
        .filter(|item| !item.is_empty())
        .collect()
}

/// Parse a detailed judge report. Never fails.
pub fn parse_detailed(raw: &str) -> JudgeVerdict {
    let sections = split_sections(raw);
    let get = |s: Section| sections.get(&s).map(String::as_str);

    let consensus_score = get(Section::ConsensusScore)
        .and_then(first_number)
        .map(|v| clamp_score(v, DEFAULT_CONSENSUS_SCORE))
        .unwrap_or(DEFAULT_CONSENSUS_SCORE);
    let confidence = get(Section::Confidence)
        .and_then(first_number)
        .map(|v| clamp_score(v, DEFAULT_CONFIDENCE))
        .unwrap_or(DEFAULT_CONFIDENCE);
    let risk_level = get(Section::Risk)
        .and_then(RiskLevel::scan)
        .unwrap_or(DEFAULT_RISK);
    let actionable = get(Section::Actionable)
        .and_then(Actionable::scan)
        .unwrap_or(DEFAULT_ACTIONABLE);
    let best_answer = get(Section::BestAnswer)
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_BEST_ANSWER.to_string());

    JudgeVerdict {
        consensus_score,
        best_answer,
        confidence,
        actionable,
        risk_level,
        agreements: get(Section::Agreements).map(list_items).unwrap_or_default(),
        disagreements: get(Section::Disagreements)
            .map(list_items)
            .unwrap_or_default(),
        recommendation: get(Section::Recommendation).map(str::to_string),
        mode: JudgeMode::Detailed,
        domain: None,
        fallback: sections.is_empty(),
    }
}
