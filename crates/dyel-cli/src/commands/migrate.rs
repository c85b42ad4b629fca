use serde_json::json;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `dyel migrate`.
///
/// Opening the database already applied pending migrations; this reports
/// where it landed.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let db = ctx.repo.db();
    let version = db.schema_version().await?;
    let target = if db.is_remote() {
        ctx.config.database.url.as_str()
    } else {
        ctx.config.database.path.as_str()
    };

    tracing::info!(version, database = target, "schema up to date");
    output(
        &json!({
            "database": target,
            "schema_version": version,
        }),
        flags.format,
    )
}
