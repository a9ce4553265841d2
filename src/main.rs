use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    let cli = siteinsight::cli::Cli::parse();
    siteinsight::logging::init(cli.verbose).context("init logging")?;
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        siteinsight::cli::Command::Structure(args) => {
            siteinsight::generate::run_structure(args).context("structure")?;
        }
        siteinsight::cli::Command::Generate(args) => {
            siteinsight::generate::run(args).await.context("generate")?;
        }
        siteinsight::cli::Command::Export(args) => {
            tokio::task::block_in_place(|| siteinsight::export::run(args)).context("export")?;
        }
        siteinsight::cli::Command::Store {
            command: siteinsight::cli::StoreCommand::List(args),
        } => {
            siteinsight::store::list(args).await.context("store list")?;
        }
        siteinsight::cli::Command::Store {
            command: siteinsight::cli::StoreCommand::Show(args),
        } => {
            siteinsight::store::show(args).await.context("store show")?;
        }
    }

    Ok(())
}
