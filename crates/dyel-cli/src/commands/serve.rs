use std::sync::Arc;

use anyhow::Context;
use dyel_http::ApiServer;

use crate::cli::ServeArgs;
use crate::context::AppContext;

/// Handle `dyel serve`: run the HTTP API until Ctrl-C.
pub async fn handle(args: &ServeArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let mut server_config = ctx.config.server.clone();
    if let Some(host) = &args.host {
        server_config.host.clone_from(host);
    }
    if let Some(port) = args.port {
        server_config.port = port;
    }

    let addr = server_config.bind_addr();
    let server = ApiServer::bind(&addr).with_context(|| format!("failed to start server on {addr}"))?;
    server
        .run(
            Arc::clone(&ctx.repo),
            ctx.config.requests.timeout(),
            ctx.shutdown.clone(),
        )
        .await?;
    Ok(())
}
