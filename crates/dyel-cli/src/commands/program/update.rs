use dyel_db::ProgramRepository;

use crate::cli::GlobalFlags;
use crate::commands::shared::input::read_draft;
use crate::context::AppContext;
use crate::output::output_program;

/// Full replace. The id argument wins over any `id` in the document.
pub async fn run(id: &str, file: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut draft = read_draft(file)?;
    draft.id = Some(id.to_string());
    let program = ctx.repo.update(&ctx.call_context(), draft).await?;
    output_program(&program, flags.format)
}
