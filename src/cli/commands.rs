use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use http::header::{self, HeaderValue};
use http::Method;
use std::path::PathBuf;
use tracing::info;

use super::demo::{demo_app, demo_router, sample_requests};
use crate::context::{Request, ResponseHandle};
use crate::dispatcher::Dispatcher;
use crate::logging::init_logging_with_config;
use crate::runtime_config::RuntimeConfig;
use crate::scheduler::TaskQueue;
use crate::server::App;

/// Command-line interface for the chainrouter demo
///
/// Mounts a small users API and drives requests through it on a
/// [`TaskQueue`], printing each response.
#[derive(Parser, Debug)]
#[command(name = "chainrouter-demo")]
#[command(about = "chainrouter demo application", long_about = None)]
pub struct Cli {
    /// Hide failure details from responses
    #[arg(long, global = true, env = "CHAINR_PRODUCTION")]
    pub production: bool,

    /// Log level: trace/debug/info/warn/error
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// TOML runtime configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The subcommand to execute (default: `run`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available demo commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Send the built-in sample requests through the demo app
    Run,
    /// Print the mounted route table
    Routes,
    /// Send one request through the demo app
    Request {
        /// HTTP method
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Origin-form target, e.g. `/api/v1/users/1?verbose=true`
        target: String,

        /// JSON request body
        #[arg(short, long)]
        body: Option<String>,
    },
}

impl Cli {
    /// Runtime configuration with command-line overrides applied
    ///
    /// # Errors
    ///
    /// Fails when `--config` names a file that cannot be loaded.
    pub fn runtime_config(&self) -> Result<RuntimeConfig> {
        let mut config = match &self.config {
            Some(path) => RuntimeConfig::from_file(path)?,
            None => RuntimeConfig::from_env(),
        };
        if self.production {
            config.production = true;
        }
        if let Some(level) = &self.log_level {
            config.logging.log_level.clone_from(level);
        }
        Ok(config)
    }
}

/// Outcome of one request driven to completion
#[derive(Debug, Clone)]
pub struct Exchanged {
    pub method: Method,
    pub target: String,
    pub response: ResponseHandle,
}

/// Build a request, hand it to `app` and drive `queue` until it is idle
///
/// # Errors
///
/// Fails when `target` is not a valid request target.
pub fn send(
    app: &App,
    queue: &TaskQueue,
    method: Method,
    target: &str,
    body: Option<&str>,
) -> Result<Exchanged> {
    let mut request = Request::new(method.clone(), target)
        .with_context(|| format!("Invalid request target: {target}"))?;
    if let Some(body) = body {
        request = request
            .with_header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            )
            .with_body(body.as_bytes().to_vec());
    }

    let response = app.handle(request);
    let steps = queue.run_until_idle();
    info!(
        method = %method,
        target = %target,
        steps = steps,
        status = response.status().as_u16(),
        "Request completed"
    );

    Ok(Exchanged {
        method,
        target: target.to_string(),
        response,
    })
}

fn print_exchange(exchanged: &Exchanged) {
    let res = &exchanged.response;
    let ended = if res.is_ended() { "" } else { " (not ended)" };
    let body = res.body_text();
    if body.is_empty() {
        println!(
            "{} {} -> {}{ended}",
            exchanged.method,
            exchanged.target,
            res.status()
        );
    } else {
        println!(
            "{} {} -> {}{ended} {body}",
            exchanged.method,
            exchanged.target,
            res.status()
        );
    }
}

/// Parse the command line and run the selected command
///
/// # Errors
///
/// Fails on configuration, logging or route compilation errors.
pub fn run_cli() -> Result<()> {
    run(Cli::parse())
}

/// Run a parsed command line
///
/// # Errors
///
/// Fails on configuration, logging or route compilation errors.
pub fn run(cli: Cli) -> Result<()> {
    let config = cli.runtime_config()?;
    init_logging_with_config(&config.logging)?;

    let queue = TaskQueue::new();
    let dispatcher = Dispatcher::from_config(queue.clone(), &config);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let app = demo_app(dispatcher).context("Failed to mount demo routes")?;
            for (method, target, body) in sample_requests() {
                print_exchange(&send(&app, &queue, method, target, body)?);
            }
        }
        Commands::Routes => {
            demo_router()
                .mount(None)
                .context("Failed to mount demo routes")?
                .dump_routes();
        }
        Commands::Request {
            method,
            target,
            body,
        } => {
            let method: Method = method
                .to_uppercase()
                .parse()
                .with_context(|| format!("Invalid HTTP method: {method}"))?;
            let app = demo_app(dispatcher).context("Failed to mount demo routes")?;
            print_exchange(&send(&app, &queue, method, &target, body.as_deref())?);
        }
    }
    Ok(())
}
