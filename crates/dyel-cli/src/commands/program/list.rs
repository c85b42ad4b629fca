use dyel_db::ProgramRepository;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output_programs;

pub async fn run(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let programs = ctx.repo.list(&ctx.call_context()).await?;
    output_programs(&programs, flags.format)
}
