mod create;
mod delete;
mod get;
mod list;
mod update;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ProgramCommands;
use crate::context::AppContext;

/// Handle `dyel program`.
pub async fn handle(
    action: &ProgramCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ProgramCommands::Create { file } => create::run(file, ctx, flags).await,
        ProgramCommands::Get { id } => get::run(id, ctx, flags).await,
        ProgramCommands::List => list::run(ctx, flags).await,
        ProgramCommands::Update { id, file } => update::run(id, file, ctx, flags).await,
        ProgramCommands::Delete { id } => delete::run(id, ctx, flags).await,
    }
}
