use dyel_db::ProgramRepository;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    ctx.repo.delete(&ctx.call_context(), id).await?;
    output(&json!({ "deleted": id }), flags.format)
}
