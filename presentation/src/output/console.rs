//! Console output formatter for consensus, judge and debate results

use crate::output::report::AskReport;
use colored::Colorize;
use serde::Serialize;
use verdict_application::RunDebateOutput;
use verdict_domain::{
    ConsensusResult, HealthStatus, JudgeVerdict, ModelHealth, OutputFormat, RiskLevel,
    TradingConsensus, Verdict, VerdictAction,
};

/// Formats results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn format_ask(report: &AskReport, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => Self::format_json(report),
            OutputFormat::Full => Self::ask_full(report),
            OutputFormat::Summary => Self::ask_summary(report),
        }
    }

    pub fn format_debate(output: &RunDebateOutput, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => Self::format_json(output),
            OutputFormat::Full => Self::debate_full(output),
            OutputFormat::Summary => Self::debate_summary(output),
        }
    }

    /// Format as pretty JSON
    pub fn format_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    fn ask_full(report: &AskReport) -> String {
        let result = &report.result;
        let mut output = String::new();

        output.push_str(&Self::header("Consensus Results"));
        output.push('\n');
        output.push_str(&format!("{} {}\n", "Prompt:".cyan().bold(), result.prompt));

        output.push_str(&Self::section_header("Responses"));
        for response in &result.responses {
            let label = format!("── {}/{} ──", response.backend, response.model);
            match &response.error {
                None => output.push_str(&format!(
                    "\n{} {}\n{}\n",
                    label.yellow().bold(),
                    format!(
                        "({}ms, {} tokens, confidence {:.0}%)",
                        response.elapsed_ms,
                        response.tokens.total(),
                        response.confidence * 100.0
                    )
                    .dimmed(),
                    response.text
                )),
                Some(error) => output.push_str(&format!(
                    "\n{}\n{} {}\n",
                    label.red().bold(),
                    "Error:".red(),
                    error
                )),
            }
        }

        output.push_str(&Self::section_header("Consensus"));
        output.push_str(&Self::consensus_block(result));
        for note in &result.consensus.disagreements {
            output.push_str(&format!("  {} {}\n", "!".yellow(), note));
        }
        output.push_str(&format!(
            "\n{} {:.0}ms avg, {:.0}% success, {} tokens\n",
            "Metrics:".cyan().bold(),
            result.metrics.avg_response_time_ms,
            result.metrics.success_rate * 100.0,
            result.metrics.total_tokens
        ));

        if let Some(trading) = &report.trading {
            output.push_str(&Self::section_header("Trading Vote"));
            output.push_str(&Self::trading_block(trading));
        }

        if report.verdict.is_some() || report.judge_error.is_some() {
            output.push_str(&Self::section_header("Judge"));
            output.push_str(&Self::judge_block(report, true));
        }

        output.push_str(&Self::footer());
        output
    }

    fn ask_summary(report: &AskReport) -> String {
        let mut output = String::new();
        output.push_str(&format!("{} {}\n\n", "Q:".bold(), report.result.prompt));
        output.push_str(&Self::consensus_block(&report.result));

        if let Some(trading) = &report.trading {
            output.push('\n');
            output.push_str(&Self::trading_block(trading));
        }

        if report.verdict.is_some() || report.judge_error.is_some() {
            output.push('\n');
            output.push_str(&Self::judge_block(report, false));
        }
        output
    }

    fn consensus_block(result: &ConsensusResult) -> String {
        let succeeded = result.successful_responses().count();
        format!(
            "{} {} ({}/{} backends answered, mean confidence {:.0}%)\n{}\n",
            "Agreement:".cyan().bold(),
            Self::percent_colored(result.consensus.agreement),
            succeeded,
            result.responses.len(),
            result.consensus.confidence * 100.0,
            result.consensus.summary
        )
    }

    fn judge_block(report: &AskReport, detailed: bool) -> String {
        let Some(verdict) = &report.verdict else {
            return format!(
                "{} {}\n",
                "Judge failed:".red().bold(),
                report.judge_error.as_deref().unwrap_or("unknown error")
            );
        };
        Self::judge_verdict(verdict, detailed)
    }

    pub fn judge_verdict(verdict: &JudgeVerdict, detailed: bool) -> String {
        let mut output = String::new();
        if verdict.fallback {
            output.push_str(&format!(
                "{}\n",
                "Judge output could not be parsed; showing safe default".yellow()
            ));
        }
        output.push_str(&format!(
            "{} {}\n",
            "Best answer:".green().bold(),
            verdict.best_answer
        ));
        output.push_str(&format!(
            "{} {:.0}%  {} {:.0}%  {} {}  {} {}\n",
            "Consensus:".cyan(),
            verdict.consensus_score * 100.0,
            "Confidence:".cyan(),
            verdict.confidence * 100.0,
            "Actionable:".cyan(),
            verdict.actionable,
            "Risk:".cyan(),
            Self::risk_colored(verdict.risk_level)
        ));
        if let Some(domain) = &verdict.domain {
            output.push_str(&format!("{} {}\n", "Domain:".cyan(), domain));
        }
        if let Some(recommendation) = &verdict.recommendation {
            output.push_str(&format!("{} {}\n", "Recommendation:".cyan(), recommendation));
        }
        if detailed {
            if !verdict.agreements.is_empty() {
                output.push_str(&format!("\n{}\n", "Agreements:".green().bold()));
                for point in &verdict.agreements {
                    output.push_str(&format!("  * {}\n", point));
                }
            }
            if !verdict.disagreements.is_empty() {
                output.push_str(&format!("\n{}\n", "Disagreements:".yellow().bold()));
                for point in &verdict.disagreements {
                    output.push_str(&format!("  * {}\n", point));
                }
            }
        }
        output
    }

    pub fn trading_block(trading: &TradingConsensus) -> String {
        let mut output = format!(
            "{} {}{} (weighted confidence {:.0}%; buy {} / sell {} / hold {})\n",
            "Vote:".cyan().bold(),
            trading.action.to_string().bold(),
            trading
                .symbol
                .as_deref()
                .map(|s| format!(" {}", s))
                .unwrap_or_default(),
            trading.weighted_confidence * 100.0,
            trading.votes.buy,
            trading.votes.sell,
            trading.votes.hold
        );
        for point in &trading.agreements {
            output.push_str(&format!("  {} {}\n", "+".green(), point));
        }
        for point in &trading.disagreements {
            output.push_str(&format!("  {} {}\n", "-".yellow(), point));
        }
        output
    }

    fn debate_full(output: &RunDebateOutput) -> String {
        let session = &output.session;
        let mut text = String::new();
        text.push_str(&Self::header("Debate"));
        text.push('\n');
        text.push_str(&format!("{} {}\n", "Question:".cyan().bold(), session.question));
        if let Some(subject) = &session.subject {
            text.push_str(&format!("{} {}\n", "Subject:".cyan().bold(), subject));
        }

        let mut round = 0;
        for turn in session.turns() {
            if turn.round != round {
                round = turn.round;
                text.push_str(&Self::section_header(&format!("Round {}", round)));
            }
            text.push_str(&format!(
                "\n{} {}\n{}\n",
                format!("── {} ({}/{}) ──", turn.persona, turn.backend, turn.model)
                    .yellow()
                    .bold(),
                format!("{}ms, {} tokens", turn.elapsed_ms, turn.tokens.total()).dimmed(),
                turn.decision.summary_line()
            ));
        }

        text.push_str(&Self::section_header("Final Decision"));
        text.push_str(&Self::debate_summary(output));
        text.push_str(&Self::footer());
        text
    }

    fn debate_summary(output: &RunDebateOutput) -> String {
        let session = &output.session;
        let mut text = String::new();
        match &session.final_decision {
            Some(last) => text.push_str(&format!(
                "{} {}\n",
                "Decision:".green().bold(),
                last.decision.summary_line()
            )),
            None => text.push_str(&format!("{}\n", "No final decision".red().bold())),
        }
        let duration = session
            .duration_ms()
            .map(|ms| format!(", {:.1}s", ms as f64 / 1000.0))
            .unwrap_or_default();
        text.push_str(&format!(
            "{} {} rounds, {} tokens, ~${:.4}{}\n",
            "Cost:".cyan(),
            session.rounds,
            session.total_tokens.total(),
            session.estimated_cost,
            duration
        ));
        if let Some(verdict) = &output.verdict {
            text.push('\n');
            text.push_str(&Self::verdict_block(verdict));
        }
        if let Some(screening) = &output.screening {
            text.push('\n');
            text.push_str(&Self::verdict_block(screening));
        }
        text
    }

    pub fn verdict_block<A: VerdictAction>(verdict: &Verdict<A>) -> String {
        let mut text = format!(
            "{} {}{} (confidence {:.0}%, risk {})\n{}\n",
            "Verdict:".green().bold(),
            verdict.action.to_string().bold(),
            verdict
                .symbol
                .as_deref()
                .map(|s| format!(" {}", s))
                .unwrap_or_default(),
            verdict.confidence * 100.0,
            Self::risk_colored(verdict.risk_level),
            verdict.reasoning
        );
        for factor in &verdict.key_factors {
            text.push_str(&format!("  * {}\n", factor));
        }
        if verdict.fallback {
            text.push_str(&format!("{}\n", "(conservative fallback)".yellow()));
        }
        text
    }

    pub fn model_health(health: &[ModelHealth]) -> String {
        if health.is_empty() {
            return "No calls recorded yet\n".to_string();
        }
        let mut text = String::new();
        for entry in health {
            let status = match entry.status {
                HealthStatus::Healthy => entry.status.as_str().green(),
                HealthStatus::Degraded => entry.status.as_str().yellow(),
                HealthStatus::Down => entry.status.as_str().red(),
                HealthStatus::Unknown => entry.status.as_str().dimmed(),
            };
            text.push_str(&format!(
                "{:<10} {:<32} {:>9} {:>5.0}% ok {:>7.0}ms ({} calls)\n",
                entry.backend.to_string(),
                entry.model,
                status,
                entry.success_rate * 100.0,
                entry.avg_latency_ms,
                entry.total
            ));
        }
        text
    }

    fn percent_colored(share: f64) -> colored::ColoredString {
        let text = format!("{:.0}%", share * 100.0);
        if share >= 0.7 {
            text.green().bold()
        } else if share >= 0.4 {
            text.yellow().bold()
        } else {
            text.red().bold()
        }
    }

    fn risk_colored(risk: RiskLevel) -> colored::ColoredString {
        let text = risk.to_string();
        match risk {
            RiskLevel::None | RiskLevel::Low => text.green(),
            RiskLevel::Medium => text.yellow(),
            _ => text.red(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_domain::{
        BackendKind, DebateBindings, DebateSession, DebateState, DebateTurn, Decision,
        PersonaBinding, QueryConfig, Response, ScreeningVerdict, TokenUsage, TradeAction,
    };

    fn result() -> ConsensusResult {
        let a = QueryConfig::new(BackendKind::OpenAi, "gpt-4o");
        let b = QueryConfig::new(BackendKind::Anthropic, "claude-sonnet-4-5");
        ConsensusResult::from_responses(
            "Is 7 prime?",
            vec![
                Response::success(&a, "Yes, 7 is prime", 0.9, TokenUsage::new(5, 4), 100),
                Response::failure(&b, "Timed out after 30s", 30_000),
            ],
        )
    }

    #[test]
    fn test_json_output_is_parseable() {
        colored::control::set_override(false);
        let report = AskReport::new(result()).with_judge_error("judge unavailable");
        let json = ConsoleFormatter::format_ask(&report, OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["result"]["prompt"], "Is 7 prime?");
        assert_eq!(value["judge_error"], "judge unavailable");
        assert!(value.get("verdict").is_none());
    }

    #[test]
    fn test_full_output_lists_failures() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format_ask(&AskReport::new(result()), OutputFormat::Full);
        assert!(text.contains("openai/gpt-4o"));
        assert!(text.contains("Error: Timed out after 30s"));
        assert!(text.contains("1/2 backends answered"));
    }

    #[test]
    fn test_summary_shows_judge_failure() {
        colored::control::set_override(false);
        let report = AskReport::new(result()).with_judge_error("no adapter");
        let text = ConsoleFormatter::format_ask(&report, OutputFormat::Summary);
        assert!(text.starts_with("Q: Is 7 prime?"));
        assert!(text.contains("Judge failed: no adapter"));
        assert!(!text.contains("Responses"));
    }

    #[test]
    fn test_debate_summary_shows_decision_and_duration() {
        colored::control::set_override(false);
        let binding = PersonaBinding::new(BackendKind::Anthropic, "claude-sonnet-4");
        let bindings = DebateBindings {
            analyst: binding.clone(),
            critic: binding.clone(),
            synthesizer: binding,
        };
        let mut session = DebateSession::new("Buy NVDA?", 1, bindings);
        for stage in DebateState::plan(1) {
            let turn = DebateTurn {
                round: stage.round,
                persona: stage.persona,
                backend: "anthropic".to_string(),
                model: "claude-sonnet-4".to_string(),
                decision: Decision::new(TradeAction::Hold, "Wait for earnings.", 0.6),
                tokens: TokenUsage::new(100, 20),
                elapsed_ms: 5,
            };
            session.record(turn, 0.0).unwrap();
        }
        session.seal().unwrap();

        let mut screening = ScreeningVerdict::conservative("Judge unavailable");
        screening.symbol = Some("NVDA".to_string());
        let output = RunDebateOutput {
            session,
            verdict: None,
            screening: Some(screening),
        };
        let text = ConsoleFormatter::format_debate(&output, OutputFormat::Summary);
        assert!(text.contains("Decision:"));
        let cost_line = text.lines().find(|l| l.starts_with("Cost:")).unwrap();
        assert!(cost_line.starts_with("Cost: 1 rounds, 360 tokens, ~$0.0000, "));
        assert!(cost_line.ends_with('s'));
        assert!(text.contains("Verdict: SKIP NVDA"));
        assert!(text.contains("(conservative fallback)"));
    }

    #[test]
    fn test_model_health_empty() {
        assert_eq!(ConsoleFormatter::model_health(&[]), "No calls recorded yet\n");
    }
}
