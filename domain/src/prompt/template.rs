//! Prompt templates for judges and debate stages

use crate::debate::{DebateStage, DebateTurn, Persona};
use crate::judge::{JudgeMode, QueryDomain};
use crate::screening::ScreeningMetrics;

/// Weight metadata shown to the trading judge for one model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelMeta {
    pub model: String,
    pub weight: f64,
    pub tier: &'static str,
}

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for the general judge
    pub fn judge_system() -> &'static str {
        r#"You are an impartial judge comparing answers from several independent AI models.
Identify where they agree, where they conflict, and which answer is best supported.
Never invent facts that none of the answers contain."#
    }

    /// User prompt for the general judge
    pub fn judge_prompt(
        question: &str,
        domain: QueryDomain,
        mode: JudgeMode,
        responses: &[(String, String)],
    ) -> String {
        let mut prompt = format!(
            "Question ({} domain):\n{}\n\nEvaluate the answers against these criteria:\n",
            domain, question
        );
        for (i, criterion) in domain.criteria().iter().enumerate() {
            prompt.push_str(&format!("{}. {}\n", i + 1, criterion));
        }

        prompt.push_str("\nAnswers:\n");
        for (model, content) in responses {
            prompt.push_str(&format!("\n--- {} ---\n{}\n", model, content));
        }

        prompt.push('\n');
        prompt.push_str(match mode {
            JudgeMode::Concise => Self::concise_format(),
            JudgeMode::Detailed => Self::detailed_format(),
        });
        prompt
    }

    fn concise_format() -> &'static str {
        r#"Respond with ONLY a JSON object:
{"consensusScore": <0-100>, "bestAnswer": "<one paragraph>", "confidence": <0-100>, "actionable": "Yes|Caution|No", "riskLevel": "None|Low|Medium|High|Critical"}"#
    }

    fn detailed_format() -> &'static str {
        r#"Respond with these sections, each under its own markdown heading:
## Consensus Score
(0-100)
## Best Answer
## Key Agreements
(bullet list)
## Disagreements
(bullet list)
## Confidence
(0-100)
## Risk Level
(None, Low, Medium, High or Critical)
## Actionable
(Yes, Caution or No)
## Recommendation"#
    }

    /// JSON shape every debate persona must answer with
    pub fn decision_format() -> &'static str {
        r#"Respond with ONLY a JSON object:
{"action": "BUY|SELL|HOLD", "symbol": "<ticker or null>", "quantity": <shares or null>, "reasoning": "<2-4 sentences>", "confidence": <0.0-1.0>}"#
    }

    /// System prompt for a debate persona
    pub fn debate_system(persona: Persona) -> String {
        format!(
            "{}\nYou are one voice in a structured trading debate. Be specific and never overstate certainty.",
            persona.brief()
        )
    }

    /// Prompt for one debate stage.
    ///
    /// Refinement rounds embed the whole previous round; every stage also
    /// sees the turns already taken in its own round.
    pub fn debate_stage(
        stage: DebateStage,
        question: &str,
        research: Option<&str>,
        previous_round: &[&DebateTurn],
        current_round: &[&DebateTurn],
    ) -> String {
        let mut prompt = format!("Question: {}\n", question);

        if let Some(research) = research.filter(|r| !r.trim().is_empty()) {
            prompt.push_str(&format!("\nResearch notes:\n{}\n", research));
        }

        if stage.is_refinement() && !previous_round.is_empty() {
            prompt.push_str(&format!("\nRound {} transcript:\n", stage.round - 1));
            for turn in previous_round {
                prompt.push_str(&format!("{}\n", turn.transcript_line()));
            }
        }

        if !current_round.is_empty() {
            prompt.push_str(&format!("\nRound {} so far:\n", stage.round));
            for turn in current_round {
                prompt.push_str(&format!("{}\n", turn.transcript_line()));
            }
        }

        let task = match (stage.persona, stage.is_refinement()) {
            (Persona::Analyst, false) => "Give your initial analysis and decision.",
            (Persona::Analyst, true) => {
                "Refine your analysis in light of the previous round. Change your decision only if the critique warrants it."
            }
            (Persona::Critic, false) => "Critique the analysis above and give your own decision.",
            (Persona::Critic, true) => {
                "Critique the refined analysis, checking whether earlier objections were answered."
            }
            (Persona::Synthesizer, false) => "Weigh both views and commit to a decision.",
            (Persona::Synthesizer, true) => {
                "Produce the final decision, reconciling every view from both rounds."
            }
        };
        prompt.push_str(&format!("\n{} ({})\n\n{}", task, stage, Self::decision_format()));
        prompt
    }

    /// System prompt for the trading/screening judge
    pub fn verdict_system() -> &'static str {
        r#"You are a risk-focused trading judge. You read a multi-model debate and issue one verdict.
When the evidence is thin or contradictory, prefer the conservative action."#
    }

    fn model_table(models: &[ModelMeta]) -> String {
        let mut table = String::from("Model weights:\n");
        for meta in models {
            table.push_str(&format!(
                "- {} (weight {:.2}, {})\n",
                meta.model, meta.weight, meta.tier
            ));
        }
        table
    }

    /// Trading judge prompt over a debate transcript
    pub fn trading_verdict(transcript: &str, models: &[ModelMeta]) -> String {
        format!(
            r#"{}
Debate transcript:
{}

Respond with ONLY a JSON object:
{{"action": "BUY|SELL|HOLD", "symbol": "<ticker or null>", "confidence": <0.0-1.0>, "risk_level": "Low|Medium|High|Critical", "reasoning": "<2-3 sentences>", "key_factors": ["..."]}}"#,
            Self::model_table(models),
            transcript
        )
    }

    /// Screening judge prompt for one candidate
    pub fn screening_verdict(
        transcript: &str,
        models: &[ModelMeta],
        candidate: &ScreeningMetrics,
    ) -> String {
        format!(
            r#"{}
Candidate: {} (composite screening score {:.1}/100, gap {:+.1}%, pre-market volume {})

Debate transcript:
{}

Respond with ONLY a JSON object:
{{"action": "BUY|WATCH|SKIP", "symbol": "{}", "confidence": <0.0-1.0>, "risk_level": "Low|Medium|High|Critical", "reasoning": "<2-3 sentences>", "key_factors": ["..."]}}"#,
            Self::model_table(models),
            candidate.symbol,
            candidate.score(),
            candidate.gap_percent,
            candidate.premarket_volume,
            transcript,
            candidate.symbol
        )
    }
}
