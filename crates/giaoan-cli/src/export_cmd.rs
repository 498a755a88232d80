//! `giaoan export`: write a saved plan as a Word-compatible document.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::app;
use crate::chat_cmd::pick_plan;
use crate::config::GiaoanConfig;

pub fn run_export(config: &GiaoanConfig, plan: Option<i64>, output: Option<&Path>) -> Result<()> {
    let workspace = app::open_workspace(config)?;
    app::require_login(config, workspace.store())?;

    let id = pick_plan(&workspace, plan)?;
    workspace.load_plan(id)?;
    let document = workspace.export_document()?;

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&document.file_name));
    std::fs::write(&path, document.bytes())
        .with_context(|| format!("failed to write document to {}", path.display()))?;

    tracing::info!(plan_id = id, path = %path.display(), "lesson plan exported");
    println!("Đã xuất giáo án #{id} ra {}", path.display());
    Ok(())
}
