use std::io::{self, Write};
use std::path::Path;

use artifacts::ContractSpec;
use clap::Parser;
use cli::Args;
use config::DeployerConfig;
use deployment::Deployer;
use indicatif::ProgressStyle;
use provider::{DeploymentProvider, EthersProvider};
use report::contract_deployment::ContractDeployment;
use report::Report;
use tracing::level_filters::LevelFilter;
use tracing::warn;
use tracing_error::ErrorLayer;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

mod artifacts;
mod cli;
mod config;
mod deployment;
mod provider;
mod report;
mod serde_utils;

const SPINNER_TEMPLATE: &str =
    "{span_child_prefix}{spinner:.green} {span_name}{{{span_fields}}} {elapsed}";

async fn run(args: Args) -> eyre::Result<ContractDeployment> {
    let config = DeployerConfig::load(&args).await?;

    let provider = EthersProvider::new(&config)?;

    deploy_and_report(
        provider,
        &args.contract_name,
        args.report.as_deref(),
        io::stdout(),
    )
    .await
}

/// Deploys `contract`, writes the summary line to `out` and, if asked for,
/// the report. A report that cannot be written does not undo the deployment.
async fn deploy_and_report<P>(
    provider: P,
    contract: &ContractSpec,
    report_path: Option<&Path>,
    mut out: impl Write,
) -> eyre::Result<ContractDeployment>
where
    P: DeploymentProvider,
{
    let deployment = Deployer::new(provider).deploy(contract).await?;

    writeln!(out, "{}", deployment.summary())?;

    if let Some(report_path) = report_path {
        let report = Report::new(deployment.clone());

        if let Err(err) = report.write(report_path).await {
            warn!("Deployed, but the report was not written: {err:#}");
        }
    }

    Ok(deployment)
}

fn exit_code<T>(result: &eyre::Result<T>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

fn print_failure(err: &eyre::Report, mut out: impl Write) -> io::Result<()> {
    writeln!(out, "Error: {err:?}")
}

fn init_tracing() -> eyre::Result<()> {
    let indicatif_layer = IndicatifLayer::new()
        .with_progress_style(ProgressStyle::with_template(SPINNER_TEMPLATE)?);

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(indicatif_layer.get_stderr_writer())
                .with_filter(filter),
        )
        .with(indicatif_layer)
        .with(ErrorLayer::default())
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    dotenv::dotenv().ok();

    init_tracing()?;

    let result = run(Args::parse()).await;

    if let Err(err) = result.as_ref() {
        tracing::error!("{err:#}");
        print_failure(err, io::stderr().lock())?;
    }

    std::process::exit(exit_code(&result))
}
