//! CLI entrypoint for verdict
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use verdict_application::{
    ExecutionParams, HealthHistory, JudgeError, NoProgress, NoResultStore, ProgressNotifier,
    ResearchCache, ResultStore, RunConsensusInput, RunConsensusUseCase, RunDebateInput,
    RunDebateUseCase, RunJudgeInput, RunJudgeUseCase, TradingJudgeUseCase,
};
use verdict_domain::{DebateBindings, ModelWeights, OutputFormat, PersonaBinding, QueryConfig};
use verdict_infrastructure::{
    AdapterRegistry, ConfigLoader, DirectoryResearchSource, FileConfig, InMemoryHealthHistory,
    InMemoryResearchStore, JsonlResultStore, Severity,
};
use verdict_presentation::{
    ApiState, AskArgs, AskReport, Cli, Command, ConfigAction, ConsoleFormatter, DebateArgs,
    ProgressReporter, ServeArgs, start_server,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };

    // File logging only for the long-running server
    let log_dir = match &cli.command {
        Command::Serve(_) => config.logging.dir.as_deref().map(expand_home),
        _ => None,
    };
    let _guard = init_logging(cli.verbose, log_dir);

    if !config.output.color {
        colored::control::set_override(false);
    }

    info!("Starting verdict");

    let format = cli.format.or(config.output.format).unwrap_or_default();
    let show_progress = !cli.quiet && config.output.show_progress && format != OutputFormat::Json;

    match cli.command {
        Command::Config(args) => run_config(&cli.config, &config, args.action),
        Command::Ask(args) => {
            let services = Services::build(&config, cli.tier)?;
            run_ask(&services, &config, args, format, show_progress).await
        }
        Command::Debate(args) => {
            let services = Services::build(&config, cli.tier)?;
            run_debate(&services, &config, args, format, show_progress).await
        }
        Command::Serve(args) => {
            let services = Services::build(&config, cli.tier)?;
            run_serve(services, &config, args).await
        }
    }
}

/// Initialize tracing; returns the file writer guard when logging to a directory
fn init_logging(verbose: u8, log_dir: Option<PathBuf>) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "verdict.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Long-lived collaborators shared by every use case
struct Services {
    registry: Arc<AdapterRegistry>,
    health: Arc<dyn HealthHistory>,
    results: Arc<dyn ResultStore>,
    research: ResearchCache,
    params: ExecutionParams,
    weights: ModelWeights,
}

impl Services {
    fn build(config: &FileConfig, tier: Option<String>) -> Result<Self> {
        let issues = config.validate();
        for issue in issues.iter().filter(|i| i.severity == Severity::Warning) {
            warn!("{}", issue);
        }
        let errors: Vec<_> = issues.iter().filter(|i| i.is_error()).collect();
        if !errors.is_empty() {
            for issue in &errors {
                eprintln!("{}", issue);
            }
            bail!(
                "Configuration has {} error(s); run `verdict config validate`",
                errors.len()
            );
        }

        let registry = AdapterRegistry::from_config(config)?;
        if registry.is_empty() {
            warn!("No backend adapters available; every call will fail");
        }

        let results: Arc<dyn ResultStore> = match config.logging.results_path.as_deref() {
            Some(path) => match JsonlResultStore::new(expand_home(path)) {
                Some(store) => Arc::new(store),
                None => Arc::new(NoResultStore),
            },
            None => Arc::new(NoResultStore),
        };

        let mut research = ResearchCache::new(Arc::new(InMemoryResearchStore::new()));
        if let Some(dir) = config.research.dir.as_deref() {
            let source = DirectoryResearchSource::new(expand_home(dir));
            research = research.with_source(Arc::new(source));
        }

        let mut params = config.execution_params();
        if let Some(tier) = tier {
            params = params.with_default_tier(tier);
        }

        Ok(Self {
            registry: Arc::new(registry),
            health: Arc::new(InMemoryHealthHistory::new()),
            results,
            research,
            params,
            weights: config.model_weights(),
        })
    }

    fn consensus(&self) -> RunConsensusUseCase<AdapterRegistry> {
        RunConsensusUseCase::new(Arc::clone(&self.registry))
            .with_health(Arc::clone(&self.health))
            .with_results(Arc::clone(&self.results))
            .with_params(self.params.clone())
    }

    fn debate(&self) -> RunDebateUseCase<AdapterRegistry> {
        RunDebateUseCase::new(Arc::clone(&self.registry))
            .with_health(Arc::clone(&self.health))
            .with_results(Arc::clone(&self.results))
            .with_research(self.research.clone())
            .with_weights(self.weights.clone())
            .with_params(self.params.clone())
    }
}

fn progress_for(show_progress: bool) -> Box<dyn ProgressNotifier> {
    if show_progress {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(NoProgress)
    }
}

async fn run_ask(
    services: &Services,
    config: &FileConfig,
    args: AskArgs,
    format: OutputFormat,
    show_progress: bool,
) -> Result<()> {
    let mut configs = args.query_configs();
    if configs.is_empty() {
        configs = fallback_models(config);
    }
    if configs.is_empty() {
        bail!("No models given. Use -m BACKEND/MODEL (repeatable) or configure [debate] bindings.");
    }

    let progress = progress_for(show_progress);
    let input = RunConsensusInput::new(args.prompt.clone(), configs);
    let result = services
        .consensus()
        .execute_with_progress(input, progress.as_ref())
        .await?;

    let mut report = AskReport::new(result);

    if args.trading {
        let trading = TradingJudgeUseCase::new(Arc::clone(&services.registry))
            .with_weights(services.weights.clone())
            .heuristic(&report.result);
        report = report.with_trading(trading);
    }

    let judge = args.judge.clone().or_else(|| config.judge.binding());
    if let (false, Some(judge)) = (args.no_judge, judge) {
        let mode = args
            .judge_mode
            .unwrap_or_else(|| config.judge.parse_mode().0);
        let use_case = RunJudgeUseCase::new(Arc::clone(&services.registry))
            .with_health(Arc::clone(&services.health))
            .with_params(services.params.clone());
        let input = RunJudgeInput::new(judge).with_mode(mode);
        match use_case
            .execute_with_progress(&report.result, input, progress.as_ref())
            .await
        {
            Ok(verdict) => report = report.with_verdict(verdict),
            Err(JudgeError::Billing(e)) => return Err(e.into()),
            Err(e) => {
                warn!("Judge step failed: {}", e);
                report = report.with_judge_error(e.to_string());
            }
        }
    }

    println!("{}", ConsoleFormatter::format_ask(&report, format));
    Ok(())
}

/// Distinct debate persona models, used when `ask` names none
fn fallback_models(config: &FileConfig) -> Vec<QueryConfig> {
    let Some(bindings) = config.debate.bindings() else {
        return Vec::new();
    };
    let mut seen: Vec<PersonaBinding> = Vec::new();
    for binding in [bindings.analyst, bindings.critic, bindings.synthesizer] {
        if !seen.contains(&binding) {
            seen.push(binding);
        }
    }
    seen.into_iter()
        .map(|b| QueryConfig::new(b.backend, b.model))
        .collect()
}

async fn run_debate(
    services: &Services,
    config: &FileConfig,
    args: DebateArgs,
    format: OutputFormat,
    show_progress: bool,
) -> Result<()> {
    if args.screen && (args.subject.is_none() || args.judge.is_none()) {
        bail!("--screen needs --subject and --judge");
    }
    let screening = args.screening();

    let configured = config.debate.bindings();
    let analyst = args
        .analyst
        .or_else(|| configured.as_ref().map(|b| b.analyst.clone()));
    let critic = args
        .critic
        .or_else(|| configured.as_ref().map(|b| b.critic.clone()));
    let synthesizer = args
        .synthesizer
        .or_else(|| configured.as_ref().map(|b| b.synthesizer.clone()));
    let (Some(analyst), Some(critic), Some(synthesizer)) = (analyst, critic, synthesizer) else {
        bail!(
            "Debate needs analyst, critic and synthesizer models; pass --analyst/--critic/--synthesizer or configure [debate]"
        );
    };
    let bindings = DebateBindings {
        analyst,
        critic,
        synthesizer,
    };

    let mut input = RunDebateInput::new(args.question, bindings);
    if let Some(subject) = args.subject {
        input = input.with_subject(subject);
    }
    if let Some(timeframe) = args.timeframe {
        input = input.with_timeframe(timeframe);
    }
    if let Some(rounds) = args.rounds {
        input = input.with_rounds(rounds);
    }
    if let Some(candidate) = screening {
        input = input.with_screening(candidate);
    }
    if let Some(judge) = args.judge {
        input = input.with_judge(judge);
    }

    let progress = progress_for(show_progress);
    let output = services
        .debate()
        .execute_with_progress(input, progress.as_ref())
        .await?;

    println!("{}", ConsoleFormatter::format_debate(&output, format));
    Ok(())
}

async fn run_serve(services: Services, config: &FileConfig, args: ServeArgs) -> Result<()> {
    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    let address = format!("{}:{}", host, port);

    let state = ApiState::new(
        services.consensus(),
        services.debate(),
        Arc::clone(&services.health),
    )
    .with_default_bindings(config.debate.bindings());

    println!("verdict API listening on http://{}", address);
    start_server(state, &address)
        .await
        .with_context(|| format!("HTTP server on {} failed", address))
}

fn run_config(
    explicit: &Option<PathBuf>,
    config: &FileConfig,
    action: Option<ConfigAction>,
) -> Result<()> {
    match action.unwrap_or(ConfigAction::Sources) {
        ConfigAction::Sources => {
            println!("Configuration sources (highest priority first):");
            println!("  Env:      VERDICT_* (use __ for nesting, e.g. VERDICT_SERVER__PORT)");
            for source in ConfigLoader::sources(explicit.as_deref()) {
                let location = source
                    .path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(built-in)".to_string());
                let mark = if source.found { "found" } else { "not found" };
                println!("  {:<9} {} [{}]", format!("{}:", source.label), location, mark);
            }
            Ok(())
        }
        ConfigAction::Validate => {
            let issues = config.validate();
            if issues.is_empty() {
                println!("Configuration is valid");
                return Ok(());
            }
            for issue in &issues {
                println!("{}", issue);
            }
            let errors = issues.iter().filter(|i| i.is_error()).count();
            if errors > 0 {
                bail!("{} error(s), {} warning(s)", errors, issues.len() - errors);
            }
            Ok(())
        }
        ConfigAction::Show => {
            let text = toml::to_string_pretty(config).context("Failed to render configuration")?;
            println!("{}", text);
            Ok(())
        }
    }
}
