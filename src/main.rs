use crate::cd::{convert_cd_images, verify_cd_layouts};
use crate::commands::cd::CdCommands;
use crate::commands::{Cli, Commands};
use anyhow::Result;
use clap::Parser;
use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;

mod cd;
mod chd;
mod commands;
mod util;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let logger = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .build();

    let level = logger.filter();
    let pb = MultiProgress::new();

    LogWrapper::new(pb.clone(), logger).try_init()?;
    log::set_max_level(level);

    let cli = Cli::parse();

    match cli.command {
        Commands::Cd(inner) => match inner {
            CdCommands::ToChd(cmd) => convert_cd_images(pb.clone(), cmd).await?,
            CdCommands::Verify(cmd) => verify_cd_layouts(cmd).await?,
        },
    }

    Ok(())
}
