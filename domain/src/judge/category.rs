//! Query domain classification.
//!
//! Categories are checked in a fixed priority order; the first match wins.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static FINANCIAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(stocks?|shares?|invest\w*|trad(e|es|ing)|portfolio|dividends?|earnings|market cap|bonds?|crypto\w*|bitcoin|etfs?|forex|buy|sell|ticker|valuation|p/e)\b",
    )
    .expect("financial pattern is valid")
});

static TECHNICAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(code|coding|programming|software|api|database|algorithm|bug|debug\w*|deploy\w*|server|compiler|rust|python|javascript|typescript|kubernetes|docker|sql|function)\b",
    )
    .expect("technical pattern is valid")
});

static MEDICAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(health|medical|medicine|symptoms?|diagnos\w*|treatments?|disease|doctor|drugs?|dosage|patients?|therapy|clinical)\b",
    )
    .expect("medical pattern is valid")
});

static LEGAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(legal|law|lawsuit|contracts?|liabilit(y|ies)|court|attorney|lawyer|regulations?|complian\w*|copyright|patents?|sue)\b",
    )
    .expect("legal pattern is valid")
});

/// Subject area of a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryDomain {
    Financial,
    Technical,
    Medical,
    Legal,
    General,
}

impl QueryDomain {
    /// Classify query text; financial > technical > medical > legal > general
    pub fn classify(query: &str) -> Self {
        if FINANCIAL.is_match(query) {
            QueryDomain::Financial
        } else if TECHNICAL.is_match(query) {
            QueryDomain::Technical
        } else if MEDICAL.is_match(query) {
            QueryDomain::Medical
        } else if LEGAL.is_match(query) {
            QueryDomain::Legal
        } else {
            QueryDomain::General
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryDomain::Financial => "financial",
            QueryDomain::Technical => "technical",
            QueryDomain::Medical => "medical",
            QueryDomain::Legal => "legal",
            QueryDomain::General => "general",
        }
    }

    /// Evaluation criteria injected into the judge prompt
    pub fn criteria(&self) -> &'static [&'static str] {
        match self {
            QueryDomain::Financial => &[
                "Factual accuracy of figures, prices and dates",
                "Explicit treatment of downside risk and position sizing",
                "Separation of analysis from speculation",
                "Whether the answer could cause financial loss if followed blindly",
            ],
            QueryDomain::Technical => &[
                "Correctness of code, commands and configuration",
                "Handling of edge cases and failure modes",
                "Security implications",
                "Whether the steps are reproducible as written",
            ],
            QueryDomain::Medical => &[
                "Agreement with established clinical guidance",
                "Clear advice to consult a professional where appropriate",
                "Absence of unsafe dosage or treatment claims",
            ],
            QueryDomain::Legal => &[
                "Jurisdiction awareness",
                "Distinction between general information and legal advice",
                "Accuracy of cited statutes or precedent",
            ],
            QueryDomain::General => &[
                "Factual accuracy",
                "Completeness relative to the question",
                "Clarity",
            ],
        }
    }
}

impl std::fmt::Display for QueryDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
