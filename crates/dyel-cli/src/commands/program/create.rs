use dyel_db::ProgramRepository;

use crate::cli::GlobalFlags;
use crate::commands::shared::input::read_draft;
use crate::context::AppContext;
use crate::output::output_program;

pub async fn run(file: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let draft = read_draft(file)?;
    let program = ctx.repo.create(&ctx.call_context(), draft).await?;
    output_program(&program, flags.format)
}
