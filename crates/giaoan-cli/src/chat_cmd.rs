//! `giaoan chat`: refine a saved plan with a natural-language request.

use anyhow::{Context, Result};

use giaoan_core::generation::Generator;
use giaoan_core::workspace::Workspace;
use giaoan_store::KeyValueStore;
use giaoan_store::models::ActivityTab;

use crate::app;
use crate::config::GiaoanConfig;

/// Id of `requested`, or of the most recently saved plan.
pub fn pick_plan<G: Generator, S: KeyValueStore>(
    workspace: &Workspace<G, S>,
    requested: Option<i64>,
) -> Result<i64> {
    match requested {
        Some(id) => Ok(id),
        None => workspace
            .saved_plans()
            .last()
            .map(|p| p.id)
            .context("no saved lesson plans yet; run `giaoan generate` first"),
    }
}

pub async fn run_chat(
    config: &GiaoanConfig,
    message: &str,
    plan: Option<i64>,
    tab: Option<ActivityTab>,
) -> Result<()> {
    let workspace = app::open_workspace(config)?;
    app::require_login(config, workspace.store())?;

    let id = pick_plan(&workspace, plan)?;
    let saved = workspace.load_plan(id)?;

    let Some(reply) = workspace.send_message(message).await? else {
        println!("Nothing to send: the message is empty.");
        return Ok(());
    };

    let state = workspace.snapshot();
    if let Some(parts) = &state.plan {
        print!("{}", app::render_plan_text(parts, saved.request.format, tab));
    }
    println!("AI: {}", reply.content);
    eprintln!("Đã cập nhật giáo án #{id}.");
    Ok(())
}
