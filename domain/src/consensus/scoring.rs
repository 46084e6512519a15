//! Cross-response agreement scoring.
//!
//! Agreement is the mean pairwise Jaccard similarity of the responses'
//! normalized word sets. This gives:
//!
//! | Input | Agreement |
//! |-------|-----------|
//! | no texts | 0.0 |
//! | one text | 1.0 |
//! | identical texts | 1.0 |
//! | disjoint vocabularies | 0.0 |
//!
//! The mean over unordered pairs is symmetric under reordering, and any
//! pair drifting apart can only lower it.

use std::collections::HashSet;

/// Pairs below this similarity are reported as disagreements.
pub const DIVERGENCE_THRESHOLD: f64 = 0.2;

/// Normalize a text into its set of lowercase alphanumeric words.
fn word_set(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

/// Jaccard similarity between two texts' word sets.
///
/// Two texts with no words at all are considered identical.
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let words_a = word_set(a);
    let words_b = word_set(b);

    if words_a.is_empty() && words_b.is_empty() {
        return 1.0;
    }
    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }

    let intersection = words_a.intersection(&words_b).count();
    let union = words_a.union(&words_b).count();
    intersection as f64 / union as f64
}

/// Agreement score in [0, 1] over a set of successful response texts.
pub fn agreement<S: AsRef<str>>(texts: &[S]) -> f64 {
    match texts.len() {
        0 => 0.0,
        1 => 1.0,
        n => {
            let mut total = 0.0;
            let mut pairs = 0usize;
            for i in 0..n {
                for j in (i + 1)..n {
                    total += jaccard_similarity(texts[i].as_ref(), texts[j].as_ref());
                    pairs += 1;
                }
            }
            (total / pairs as f64).clamp(0.0, 1.0)
        }
    }
}

/// Templated summary line for an agreement score.
pub fn summarize(count: usize, agreement: f64) -> String {
    if count == 0 {
        "No successful responses".to_string()
    } else {
        format!(
            "{} models provided responses with {}% agreement",
            count,
            (agreement * 100.0).round() as i64
        )
    }
}

/// Labeled pairs whose texts diverge strongly, as human-readable notes.
pub fn divergent_pairs<S: AsRef<str>>(labeled: &[(String, S)]) -> Vec<String> {
    let mut notes = Vec::new();
    for i in 0..labeled.len() {
        for j in (i + 1)..labeled.len() {
            let similarity = jaccard_similarity(labeled[i].1.as_ref(), labeled[j].1.as_ref());
            if similarity < DIVERGENCE_THRESHOLD {
                notes.push(format!(
                    "{} and {} diverge ({}% overlap)",
                    labeled[i].0,
                    labeled[j].0,
                    (similarity * 100.0).round() as i64
                ));
            }
        }
    }
    notes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_is_defined() {
        let texts: Vec<String> = vec![];
        assert_eq!(agreement(&texts), 0.0);
        assert_eq!(summarize(0, 0.0), "No successful responses");
    }

    #[test]
    fn singleton_is_full_agreement() {
        assert_eq!(agreement(&["4"]), 1.0);
        assert_eq!(agreement(&["anything at all"]), 1.0);
    }

    #[test]
    fn identical_texts_agree_fully() {
        assert_eq!(agreement(&["The answer is 4", "the answer is 4."]), 1.0);
    }

    #[test]
    fn disjoint_texts_do_not_agree() {
        assert_eq!(agreement(&["alpha beta", "gamma delta"]), 0.0);
    }

    #[test]
    fn symmetric_under_reordering() {
        let a = ["buy the dip now", "hold and wait", "buy now"];
        let b = ["buy now", "buy the dip now", "hold and wait"];
        assert!((agreement(&a) - agreement(&b)).abs() < 1e-12);
    }

    #[test]
    fn more_divergence_never_increases_agreement() {
        let close = agreement(&["rates will rise next quarter", "rates will rise next year"]);
        let far = agreement(&["rates will rise next quarter", "tulips bloom in spring"]);
        assert!(far <= close);
    }

    #[test]
    fn summary_rounds_percentage() {
        assert_eq!(
            summarize(3, 0.666),
            "3 models provided responses with 67% agreement"
        );
    }

    #[test]
    fn divergent_pairs_reported() {
        let labeled = vec![
            ("openai/gpt-4o".to_string(), "buy apple today"),
            ("groq/llama".to_string(), "sell tesla tomorrow"),
            ("anthropic/claude".to_string(), "buy apple today"),
        ];
        let notes = divergent_pairs(&labeled);
        assert_eq!(notes.len(), 2);
        assert!(notes[0].contains("openai/gpt-4o and groq/llama"));
    }
}
