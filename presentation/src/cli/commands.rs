//! CLI command definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use verdict_domain::{
    JudgeMode, OutputFormat, PersonaBinding, QueryConfig, ScreeningMetrics, Sentiment,
    TimeframeClass,
};

/// CLI arguments for verdict
#[derive(Parser, Debug)]
#[command(name = "verdict")]
#[command(author, version, about = "Multi-model consensus and debate for decisions")]
#[command(long_about = r#"
Verdict sends one prompt to several language-model backends at once, scores how
much they agree, and optionally asks a judge model to synthesize a verdict.
For trading questions it can run a sequential analyst / critic / synthesizer
debate and reduce it to a single BUY / SELL / HOLD decision.

Configuration files are loaded from (in priority order):
1. VERDICT_* environment variables
2. --config <path>                    Explicit config file
3. ./verdict.toml or ./.verdict.toml  Project-level config
4. ~/.config/verdict/config.toml      Global config

Example:
  verdict ask -m openai/gpt-4o -m anthropic/claude-sonnet-4-5 "Is NVDA overbought?"
  verdict debate --subject NVDA --timeframe swing "Should I buy NVDA this week?"
  verdict serve --port 8080
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format (full, summary, json)
    #[arg(short, long, global = true, value_parser = parse_output_format)]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Billing tier (free, pro, metered or a custom tier)
    #[arg(long, global = true)]
    pub tier: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fan a prompt out to several models and score their agreement
    Ask(AskArgs),
    /// Run a sequential analyst / critic / synthesizer debate
    Debate(DebateArgs),
    /// Serve the HTTP API
    Serve(ServeArgs),
    /// Show configuration sources or validate the merged configuration
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct AskArgs {
    /// The prompt sent to every model
    pub prompt: String,

    /// Models to query as backend/model (can be specified multiple times)
    #[arg(short, long = "model", value_name = "BACKEND/MODEL", value_parser = parse_binding)]
    pub models: Vec<PersonaBinding>,

    /// Judge model as backend/model; overrides [judge]
    #[arg(long, value_name = "BACKEND/MODEL", value_parser = parse_binding)]
    pub judge: Option<PersonaBinding>,

    /// Judge output mode
    #[arg(long, value_parser = parse_judge_mode)]
    pub judge_mode: Option<JudgeMode>,

    /// Skip the judge step
    #[arg(long)]
    pub no_judge: bool,

    /// Also reduce the answers to a weighted BUY / SELL / HOLD vote
    #[arg(long)]
    pub trading: bool,

    /// Sampling temperature for every model
    #[arg(long)]
    pub temperature: Option<f32>,
}

impl AskArgs {
    pub fn query_configs(&self) -> Vec<QueryConfig> {
        self.models
            .iter()
            .map(|binding| {
                let config = QueryConfig::new(binding.backend.clone(), binding.model.clone());
                match self.temperature {
                    Some(t) => config.with_temperature(t),
                    None => config,
                }
            })
            .collect()
    }
}

#[derive(Args, Debug)]
pub struct DebateArgs {
    /// The question under debate
    pub question: String,

    /// Ticker or topic; enables research lookup and fills the decision symbol
    #[arg(short, long)]
    pub subject: Option<String>,

    /// Analysis horizon (day, swing, position, long-term, ...)
    #[arg(short, long, value_parser = parse_timeframe)]
    pub timeframe: Option<TimeframeClass>,

    /// Number of rounds; overrides [debate] rounds
    #[arg(short, long)]
    pub rounds: Option<u32>,

    #[arg(long, value_name = "BACKEND/MODEL", value_parser = parse_binding)]
    pub analyst: Option<PersonaBinding>,

    #[arg(long, value_name = "BACKEND/MODEL", value_parser = parse_binding)]
    pub critic: Option<PersonaBinding>,

    #[arg(long, value_name = "BACKEND/MODEL", value_parser = parse_binding)]
    pub synthesizer: Option<PersonaBinding>,

    /// Ask a judge model for a final verdict over the transcript
    #[arg(long, value_name = "BACKEND/MODEL", value_parser = parse_binding)]
    pub judge: Option<PersonaBinding>,

    /// Treat the subject as a screening candidate; the judge answers BUY/WATCH/SKIP.
    /// Needs --subject and --judge
    #[arg(long)]
    pub screen: bool,

    /// Gap vs. previous close, in percent
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub gap: f64,

    /// Pre-market share volume
    #[arg(long, default_value_t = 0)]
    pub premarket_volume: u64,

    /// Shares available to short
    #[arg(long)]
    pub shortable: Option<u64>,

    /// Price/earnings ratio
    #[arg(long, allow_negative_numbers = true)]
    pub pe: Option<f64>,

    /// Sentiment score in [-1, 1]
    #[arg(long, allow_negative_numbers = true)]
    pub sentiment: Option<f64>,

    /// Share of positive mentions in [0, 1]
    #[arg(long, default_value_t = 0.5)]
    pub sentiment_ratio: f64,
}

impl DebateArgs {
    /// Screening candidate built from the flags; `None` unless `--screen`
    pub fn screening(&self) -> Option<ScreeningMetrics> {
        if !self.screen {
            return None;
        }
        Some(ScreeningMetrics {
            symbol: self.subject.clone()?.trim().to_uppercase(),
            gap_percent: self.gap,
            premarket_volume: self.premarket_volume,
            shortable_shares: self.shortable,
            pe_ratio: self.pe,
            sentiment: self.sentiment.map(|score| Sentiment {
                score,
                ratio: self.sentiment_ratio,
            }),
        })
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen host; overrides [server] host
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port; overrides [server] port
    #[arg(short, long)]
    pub port: Option<u16>,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    /// List configuration file locations (default)
    Sources,
    /// Validate the merged configuration
    Validate,
    /// Print the merged configuration as TOML
    Show,
}

/// Parse `backend/model` (or `backend:model`)
pub fn parse_binding(s: &str) -> Result<PersonaBinding, String> {
    let (backend, model) = s
        .split_once('/')
        .or_else(|| s.split_once(':'))
        .ok_or_else(|| format!("expected BACKEND/MODEL, got '{}'", s))?;
    let (backend, model) = (backend.trim(), model.trim());
    if backend.is_empty() || model.is_empty() {
        return Err(format!("expected BACKEND/MODEL, got '{}'", s));
    }
    let backend = match backend.parse() {
        Ok(kind) => kind,
        Err(never) => match never {},
    };
    Ok(PersonaBinding::new(backend, model))
}

fn parse_output_format(s: &str) -> Result<OutputFormat, String> {
    s.parse()
}

fn parse_judge_mode(s: &str) -> Result<JudgeMode, String> {
    s.parse()
}

fn parse_timeframe(s: &str) -> Result<TimeframeClass, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_domain::BackendKind;

    #[test]
    fn test_parse_binding() {
        let binding = parse_binding("openai/gpt-4o").unwrap();
        assert_eq!(binding.backend, BackendKind::OpenAi);
        assert_eq!(binding.model, "gpt-4o");

        let binding = parse_binding("claude:claude-sonnet-4-5").unwrap();
        assert_eq!(binding.backend, BackendKind::Anthropic);

        // Only the first separator splits (model ids may contain '/')
        let binding = parse_binding("groq/meta-llama/llama-4-scout").unwrap();
        assert_eq!(binding.model, "meta-llama/llama-4-scout");
    }

    #[test]
    fn test_parse_binding_rejects_bare_names() {
        assert!(parse_binding("gpt-4o").is_err());
        assert!(parse_binding("openai/").is_err());
    }

    #[test]
    fn test_ask_command() {
        let cli = Cli::try_parse_from([
            "verdict",
            "ask",
            "-m",
            "openai/gpt-4o",
            "-m",
            "anthropic/claude-sonnet-4-5",
            "--temperature",
            "0.2",
            "--format",
            "json",
            "Is 7 prime?",
        ])
        .unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Json));
        let Command::Ask(args) = cli.command else {
            panic!("expected ask");
        };
        let configs = args.query_configs();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[1].model, "claude-sonnet-4-5");
        assert_eq!(configs[0].temperature, Some(0.2));
        assert_eq!(args.prompt, "Is 7 prime?");
    }

    #[test]
    fn test_debate_command() {
        let cli = Cli::try_parse_from([
            "verdict",
            "-vv",
            "debate",
            "--subject",
            "NVDA",
            "--timeframe",
            "swing",
            "--rounds",
            "3",
            "--tier",
            "pro",
            "Buy NVDA?",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.tier.as_deref(), Some("pro"));
        let Command::Debate(args) = cli.command else {
            panic!("expected debate");
        };
        assert_eq!(args.timeframe, Some(TimeframeClass::Medium));
        assert_eq!(args.rounds, Some(3));
        assert!(args.analyst.is_none());
        assert!(args.screening().is_none());
    }

    #[test]
    fn test_debate_screening_flags() {
        let cli = Cli::try_parse_from([
            "verdict",
            "debate",
            "--subject",
            "gme",
            "--judge",
            "anthropic/claude-opus-4",
            "--screen",
            "--gap",
            "-8.5",
            "--premarket-volume",
            "3000000",
            "--shortable",
            "4000000",
            "--sentiment",
            "0.4",
            "--sentiment-ratio",
            "0.8",
            "Trade the gap?",
        ])
        .unwrap();
        let Command::Debate(args) = cli.command else {
            panic!("expected debate");
        };
        let candidate = args.screening().unwrap();
        assert_eq!(candidate.symbol, "GME");
        assert_eq!(candidate.gap_percent, -8.5);
        assert_eq!(candidate.premarket_volume, 3_000_000);
        assert_eq!(candidate.shortable_shares, Some(4_000_000));
        assert_eq!(candidate.pe_ratio, None);
        let sentiment = candidate.sentiment.unwrap();
        assert_eq!(sentiment.score, 0.4);
        assert_eq!(sentiment.ratio, 0.8);
    }

    #[test]
    fn test_config_default_action() {
        let cli = Cli::try_parse_from(["verdict", "config"]).unwrap();
        let Command::Config(args) = cli.command else {
            panic!("expected config");
        };
        assert!(args.action.is_none());
        assert!(Cli::try_parse_from(["verdict", "ask", "x", "--format", "xml"]).is_err());
    }
}
