use dyel_db::ProgramRepository;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output_program;

pub async fn run(id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let program = ctx.repo.get(&ctx.call_context(), id).await?;
    output_program(&program, flags.format)
}
