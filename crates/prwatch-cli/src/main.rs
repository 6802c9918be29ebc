use clap::Parser;
use prwatch_cli::{
    cli::{Cli, Commands},
    PrwatchConfig, RangeArgs, SourceArgs,
};
use std::io;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

mod commands;
use commands::{check, merge, render, run};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let config = match PrwatchConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let (label, result) = match &cli.command {
        Some(Commands::Run {
            sources,
            data_out,
            out,
            range,
        }) => (
            "Run",
            run::handle(sources, data_out.as_deref(), out.as_deref(), range, &config),
        ),
        Some(Commands::Merge { sources, out }) => {
            ("Merge", merge::handle(sources, out.as_deref(), &config))
        }
        Some(Commands::Render { input, out, range }) => (
            "Render",
            render::handle(input.as_deref(), out.as_deref(), range, &config),
        ),
        Some(Commands::Check { sources }) => ("Check", check::handle(sources, &config)),
        None => {
            info!("No subcommand provided; merging and rendering with defaults");
            (
                "Run",
                run::handle(
                    &SourceArgs::default(),
                    None,
                    None,
                    &RangeArgs::default(),
                    &config,
                ),
            )
        }
    };

    match result {
        Ok(()) => {
            info!("{} command successful!", label);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{} command failed: {:?}", label, e);
            ExitCode::FAILURE
        }
    }
}
