use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use errand_client::{
    bootstrap, with_timeout, ClientConfig, LoadingIndicator, LogPresenter, ViewModel,
};
use errand_core::{ErrorInfo, LogOnError, Outcome};
use tracing::info;

/// Drives one request through the orchestrator against a simulated backend.
#[derive(Debug, Parser)]
#[command(name = "errand-demo")]
struct Args {
    /// Which request lifecycle to exercise.
    #[arg(value_enum, default_value_t = Scenario::Success)]
    scenario: Scenario,

    #[arg(long, env = "ERRAND_DEBUG")]
    debug: bool,

    /// `EnvFilter` directive, e.g. `errand_client=debug`.
    #[arg(long, env = "ERRAND_LOG")]
    log: Option<String>,

    #[arg(long, env = "ERRAND_JSON_LOGS")]
    json_logs: bool,

    #[arg(long, env = "ERRAND_REQUEST_TIMEOUT_MS", default_value_t = 20_000)]
    request_timeout_ms: u64,

    /// Simulated backend latency.
    #[arg(long, default_value_t = 300)]
    latency_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scenario {
    /// Work resolves with a value.
    Success,
    /// Work resolves with a business-rule failure.
    Business,
    /// Backend never answers; the request deadline expires.
    Network,
    /// The user dismisses the loading indicator mid-flight.
    Cancel,
    /// The view model is destroyed mid-flight.
    Destroy,
}

impl Args {
    fn config(&self) -> ClientConfig {
        ClientConfig {
            debug: self.debug,
            log_filter: self.log.clone(),
            json_logs: self.json_logs,
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            ..ClientConfig::default()
        }
    }
}

/// Loading indicator drawn as status lines on stdout.
struct ConsoleIndicator;

impl ConsoleIndicator {
    fn draw(line: &str) {
        writeln!(std::io::stdout().lock(), "{line}").ok_or_log("console indicator");
    }
}

impl LoadingIndicator for ConsoleIndicator {
    fn show(&self, cancelable: bool) {
        if cancelable {
            Self::draw("[loading...] (dismiss to cancel)");
        } else {
            Self::draw("[loading...]");
        }
    }

    fn hide(&self) {
        Self::draw("[done]");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = args.config();
    bootstrap::init(&config, Arc::new(LogPresenter)).context("bootstrap failed")?;

    let vm = ViewModel::builder("demo")
        .indicator(Arc::new(ConsoleIndicator))
        .config(&config)
        .build();

    let latency = Duration::from_millis(args.latency_ms);
    let deadline = config.request_timeout;
    let scenario = args.scenario;

    let handle = vm.request(|r| {
        r.on_start(|| info!("request started"))
            .on_request(move |ctx| async move {
                info!(request_id = %ctx.id(), ?scenario, "calling backend");
                match scenario {
                    Scenario::Business => {
                        tokio::time::sleep(latency).await;
                        Ok(Outcome::failure(ErrorInfo::business("insufficient balance")))
                    }
                    Scenario::Network => {
                        match with_timeout(deadline, std::future::pending::<()>()).await {
                            Ok(()) => Ok(Outcome::success("unreachable".to_string())),
                            Err(timeout) => Err(anyhow::Error::new(timeout)),
                        }
                    }
                    Scenario::Success | Scenario::Cancel | Scenario::Destroy => {
                        tokio::time::sleep(latency).await;
                        Ok(Outcome::success("profile loaded".to_string()))
                    }
                }
            })
            .on_success(|value| info!(%value, "request succeeded"))
            .on_fail(|error| info!(kind = %error.kind(), "local failure hook"))
            .on_complete(|| info!("request completed"))
    });

    let interrupt_after = latency / 3;
    match scenario {
        Scenario::Cancel => {
            tokio::time::sleep(interrupt_after).await;
            let dismissed = vm.loading().dismiss_by_user();
            info!(dismissed, "user dismissed loading");
        }
        Scenario::Destroy => {
            tokio::time::sleep(interrupt_after).await;
            vm.destroy();
        }
        Scenario::Success | Scenario::Business | Scenario::Network => {}
    }

    handle.join().await.ok_or_log("request task");
    let drained = vm.wait_idle().await;
    info!(drained, "demo finished");
    Ok(())
}
