//! sdcore-e2e - SD-Core 端到端部署测试
//!
//! Usage:
//! - Full scenario: `sdcore-e2e`
//! - Single step: `sdcore-e2e --step configure`
//! - Terraform deployment: `sdcore-e2e --mode terraform`

use anyhow::Context;
use sdcore_e2e::config::DeployMode;
use sdcore_e2e::services::Step;
use sdcore_e2e::RuntimeConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 解析命令行参数
fn parse_args() -> anyhow::Result<RuntimeConfig> {
    let args: Vec<String> = std::env::args().collect();
    let mut config = RuntimeConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--step" if i + 1 < args.len() => {
                config.step = Step::from_str(&args[i + 1])
                    .with_context(|| format!("unknown step: {}", args[i + 1]))?;
                i += 2;
            }
            "--mode" if i + 1 < args.len() => {
                config.deploy_mode = Some(
                    DeployMode::from_str(&args[i + 1])
                        .with_context(|| format!("unknown deploy mode: {}", args[i + 1]))?,
                );
                i += 2;
            }
            "--channel" if i + 1 < args.len() => {
                config.channel = Some(args[i + 1].clone());
                i += 2;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other => {
                anyhow::bail!("unexpected argument: {}", other);
            }
        }
    }

    Ok(config)
}

fn print_help() {
    println!("sdcore-e2e - SD-Core 端到端部署测试");
    println!();
    println!("USAGE:");
    println!("    sdcore-e2e [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --step <STEP>        deploy | wait | configure | simulate | dashboard | all (default)");
    println!("    --mode <MODE>        juju | terraform, overrides SDCORE_E2E_DEPLOY_MODE");
    println!("    --channel <CHANNEL>  Charm channel, overrides SDCORE_E2E_CHANNEL");
    println!("    -h, --help           Print help information");
    println!();
    println!("ENVIRONMENT:");
    println!("    SDCORE_E2E_MODEL, SDCORE_E2E_COS_MODEL, SDCORE_E2E_TERRAFORM_DIR,");
    println!("    SDCORE_E2E_DEPLOY_TIMEOUT_SECS, SDCORE_E2E_POLL_INTERVAL_SECS, ...");
    println!("    RUST_LOG controls log verbosity (default: info)");
    println!();
    println!("EXAMPLES:");
    println!("    sdcore-e2e                                  # Full scenario");
    println!("    sdcore-e2e --step simulate                  # Re-run the simulation only");
    println!("    sdcore-e2e --mode terraform --channel 1.6/edge");
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = parse_args()?;

    let rt = tokio::runtime::Runtime::new().context("Failed to create runtime")?;
    rt.block_on(sdcore_e2e::run_with_config(config))?;
    Ok(())
}
