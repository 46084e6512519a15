//! Subscription-backed vendor CLI adapter
//!
//! Runs a locally authenticated CLI (e.g. `claude -p <prompt>`) and takes
//! stdout as the completion text. The CLI reports no token usage.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;
use verdict_application::{AdapterError, BackendAdapter, Completion};
use verdict_domain::{AdapterClass, BackendKind, QueryConfig};

pub struct CliAdapter {
    name: String,
    backend: BackendKind,
    class: AdapterClass,
    program: String,
    args: Vec<String>,
    /// Flag that selects the model, e.g. `--model`
    model_flag: Option<String>,
}

impl CliAdapter {
    /// Returns `None` if `program` is not on `PATH`
    pub fn try_new(
        name: impl Into<String>,
        backend: BackendKind,
        class: AdapterClass,
        program: impl Into<String>,
        args: Vec<String>,
    ) -> Option<Self> {
        let program = program.into();
        let name = name.into();
        if which::which(&program).is_err() {
            debug!(adapter = %name, program = %program, "CLI not found, adapter disabled");
            return None;
        }
        Some(Self::new(name, backend, class, program, args))
    }

    pub fn new(
        name: impl Into<String>,
        backend: BackendKind,
        class: AdapterClass,
        program: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            backend,
            class,
            program: program.into(),
            args,
            model_flag: None,
        }
    }

    /// Pass the bound model as `<flag> <model>` on every call
    pub fn with_model_flag(mut self, flag: impl Into<String>) -> Self {
        self.model_flag = Some(flag.into());
        self
    }

    /// Full argument list for one call
    fn command_args(&self, system: Option<&str>, prompt: &str, config: &QueryConfig) -> Vec<String> {
        let mut args = self.args.clone();
        if let Some(flag) = &self.model_flag
            && !config.model.is_empty()
        {
            args.push(flag.clone());
            args.push(config.model.clone());
        }
        args.push(Self::prompt_argument(system, prompt));
        args
    }

    /// Positional prompt argument; the system prompt is prepended
    fn prompt_argument(system: Option<&str>, prompt: &str) -> String {
        match system {
            Some(system) if !system.trim().is_empty() => format!("{}\n\n{}", system, prompt),
            _ => prompt.to_string(),
        }
    }
}

#[async_trait]
impl BackendAdapter for CliAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn backend(&self) -> &BackendKind {
        &self.backend
    }

    fn class(&self) -> AdapterClass {
        self.class
    }

    async fn complete(
        &self,
        system: Option<&str>,
        prompt: &str,
        config: &QueryConfig,
    ) -> Result<Completion, AdapterError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.command_args(system, prompt, config));
        cmd.kill_on_drop(true);

        debug!(adapter = %self.name, program = %self.program, model = %config.model, "Running CLI backend");
        let output = cmd.output().await.map_err(|e| {
            AdapterError::Connection(format!("Failed to execute {}: {}", self.program, e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AdapterError::Other(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if stdout.is_empty() {
            return Err(AdapterError::MalformedPayload(format!(
                "{} produced no output",
                self.program
            )));
        }
        Ok(Completion::new(stdout))
    }
}
