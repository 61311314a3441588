pub mod cli;
pub mod commands;
pub mod render;

use std::process::ExitCode;

use cli::{Args, Commands};
use commands::Context;

pub async fn run(args: Args) -> anyhow::Result<ExitCode> {
    let ctx = Context::from_args(&args)?;
    log::debug!("command: {:?}", args.command);

    match args.command {
        Commands::List { output } => commands::list(&ctx, output).await,
        Commands::Show { id, output } => commands::show(&ctx, &id, output).await,
        Commands::Submit(submit) => commands::submit(&ctx, submit).await,
        Commands::Watch { interval } => commands::watch(&ctx, interval).await,
        Commands::Theme { action } => commands::theme(&ctx, action),
        Commands::Stats => commands::stats(&ctx).await,
    }
}
