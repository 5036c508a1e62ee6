//! metahook - libvirt hook for the metadata API
//!
//! libvirt runs this with `<object> <operation> <sub-operation> <extra>`.
//! It records the call, then starts or stops the metadata API. It always
//! exits 0 so libvirt never fails an operation because of the hook.

use anyhow::{Context, Result};
use clap::Parser;
use metahook_config::load_config_or_default;
use metahook_core::Dispatcher;
use metahook_host_linux::LinuxHost;
use metahook_util::{DEFAULT_CONFIG_PATH, METAHOOK_CONFIG_ENV, METAHOOK_LOG_ENV};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// metahook - start/stop the metadata API with libvirt networks
#[derive(Parser, Debug)]
#[command(name = "metahook")]
#[command(about = "libvirt hook that starts and stops the metadata API", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(long, env = METAHOOK_CONFIG_ENV, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Arguments passed by libvirt; need not be UTF-8
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    hook_args: Vec<OsString>,
}

impl Args {
    /// Parse arguments without ever exiting non-zero.
    ///
    /// Anything clap rejects is treated as raw hook arguments.
    fn parse_lenient() -> Self {
        match Args::try_parse() {
            Ok(args) => args,
            Err(e) if !e.use_stderr() => {
                // --help / --version
                let _ = e.print();
                std::process::exit(0);
            }
            Err(_) => Args {
                config: metahook_util::default_config_path(),
                hook_args: std::env::args_os().skip(1).collect(),
            },
        }
    }

    /// Hook arguments with invalid UTF-8 replaced by U+FFFD
    fn hook_args_lossy(&self) -> Vec<String> {
        self.hook_args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(METAHOOK_LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let config = load_config_or_default(&args.config);
    info!(
        config_path = %args.config.display(),
        program = %config.program.path.display(),
        "metahook invoked"
    );

    let dispatcher = Dispatcher::new(config, Arc::new(LinuxHost::new()));
    let outcome = runtime.block_on(dispatcher.handle(&args.hook_args_lossy()));

    info!(outcome = ?outcome, "Hook finished");
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse_lenient();
    init_tracing();

    if let Err(e) = run(args) {
        error!(error = ?e, "Hook run failed");
    }

    ExitCode::SUCCESS
}
