//! Run orchestration
//!
//! Sequences one run of the harness:
//! `Ready -> Populated -> Parsed -> Executed -> Written`, or `Unavailable`
//! if the services never come up. Only `Unavailable` ends a run with an
//! error; failed commands are recorded in the transcript like any other.

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;

use crate::command::{parse_file, CommandResult, ParseDiagnostic};
use crate::common::paths::resolve_in;
use crate::common::{Config, Result};
use crate::executor::CommandExecutor;
use crate::readiness::wait_for_services;
use crate::router::ServiceRouter;
use crate::seed::{populate, SeedReport, SEED_PLAN};
use crate::transcript::Transcript;

/// Stage of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Ready,
    Populated,
    Parsed,
    Executed,
    Written,
    Unavailable,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Ready => "ready",
            RunState::Populated => "populated",
            RunState::Parsed => "parsed",
            RunState::Executed => "executed",
            RunState::Written => "written",
            RunState::Unavailable => "unavailable",
        };
        f.write_str(name)
    }
}

/// Outcome of a completed run
#[derive(Debug)]
pub struct RunSummary {
    /// Commands executed, one transcript block each
    pub executed: usize,
    /// Commands whose call did not return the success status
    pub failed: usize,
    /// Statements dropped by the parser
    pub diagnostics: Vec<ParseDiagnostic>,
    /// Population outcome, if population ran
    pub seed: Option<SeedReport>,
    /// Where the transcript was written
    pub output: PathBuf,
}

/// Drives a run from readiness check to transcript
pub struct Orchestrator {
    config: Config,
    work_dir: PathBuf,
    router: ServiceRouter,
    executor: CommandExecutor,
    client: reqwest::Client,
}

impl Orchestrator {
    /// Build an orchestrator; relative file names resolve against `work_dir`
    pub fn new(config: Config, work_dir: impl Into<PathBuf>) -> Result<Self> {
        let router = ServiceRouter::from_config(&config.services)?;
        let executor = CommandExecutor::new(router.clone(), config.timeouts.request())?;
        let client = reqwest::Client::builder()
            .user_agent(concat!("pet-query-runner/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            config,
            work_dir: work_dir.into(),
            router,
            executor,
            client,
        })
    }

    /// Run every stage in order
    pub async fn run(&self) -> Result<RunSummary> {
        println!("\n{}", "Waiting for services...".cyan());
        let attempts = match wait_for_services(
            &self.client,
            &self.router,
            &self.config.readiness,
            self.config.timeouts.probe(),
        )
        .await
        {
            Ok(attempts) => attempts,
            Err(e) => {
                enter(RunState::Unavailable);
                println!("  {} {}", "✗".red(), e);
                return Err(e);
            }
        };
        println!("  {} Services ready after {} attempt(s)", "✓".green(), attempts);
        tokio::time::sleep(self.config.readiness.settle()).await;
        enter(RunState::Ready);

        let seed = if self.config.seed.enabled {
            println!("\n{}", "Populating stores...".cyan());
            let report = populate(
                &self.client,
                &self.router,
                SEED_PLAN,
                self.config.timeouts.seed_request(),
            )
            .await;
            let mark = if report.failures == 0 {
                "✓".green()
            } else {
                "!".yellow()
            };
            println!(
                "  {} {} pet types created, {} failed calls",
                mark,
                report.ids.len(),
                report.failures
            );
            tokio::time::sleep(self.config.seed.settle()).await;
            Some(report)
        } else {
            None
        };
        enter(RunState::Populated);

        let input = resolve_in(&self.work_dir, &self.config.files.input);
        let parsed = parse_file(&input)?;
        println!(
            "\n{} {} ({} commands)",
            "Commands:".cyan(),
            input.display().to_string().dimmed(),
            parsed.commands.len()
        );
        for diagnostic in &parsed.diagnostics {
            println!("  {} dropped {}", "!".yellow(), diagnostic);
        }
        enter(RunState::Parsed);

        let total = parsed.commands.len();
        let mut transcript = Transcript::new();
        let mut failed = 0;
        for (i, command) in parsed.commands.into_iter().enumerate() {
            let step = i + 1;
            let label = command.to_string();
            let success = command.success_status();
            tracing::debug!("Executing command {}/{}: {}", step, total, label);

            let result = self.executor.execute(command).await;
            print_step(step, &label, &result, success);
            if result.status != success {
                failed += 1;
            }
            transcript.push(result);
        }
        enter(RunState::Executed);

        let output = resolve_in(&self.work_dir, &self.config.files.output);
        transcript.write_to(&output)?;
        enter(RunState::Written);

        println!(
            "\n{} {} results written to {}\n",
            "✓".green().bold(),
            transcript.len(),
            output.display()
        );

        Ok(RunSummary {
            executed: transcript.len(),
            failed,
            diagnostics: parsed.diagnostics,
            seed,
            output,
        })
    }
}

fn enter(state: RunState) {
    tracing::info!(state = %state, "Run state changed");
}

fn print_step(step: usize, label: &str, result: &CommandResult, success: u16) {
    let mark = if result.status == success {
        "✓".green()
    } else {
        "✗".red()
    };
    println!(
        "  {} Step {}: {} -> {}",
        mark,
        step,
        label.dimmed(),
        result.status
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_names() {
        assert_eq!(RunState::Ready.to_string(), "ready");
        assert_eq!(RunState::Unavailable.to_string(), "unavailable");
    }

    #[test]
    fn test_invalid_endpoint_fails_construction() {
        let mut config = Config::default();
        config.services.store_2_url = "store-two".to_string();
        assert!(Orchestrator::new(config, ".").is_err());
    }
}
