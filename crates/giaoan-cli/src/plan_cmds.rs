//! CLI handlers for `giaoan plans` subcommands.
//!
//! Implements:
//! - `giaoan plans list`         -- saved plans, oldest first
//! - `giaoan plans show <id>`    -- the request behind a plan
//! - `giaoan plans load <id>`    -- print a plan's sections
//! - `giaoan plans delete <id>`  -- remove a plan

use anyhow::{Result, bail};
use chrono::{DateTime, Local};

use giaoan_core::generation::Generator;
use giaoan_core::workspace::{Workspace, WorkspaceError};
use giaoan_store::KeyValueStore;
use giaoan_store::models::{ActivityTab, SavedLessonPlan};

use crate::PlanCommands;
use crate::app;
use crate::config::GiaoanConfig;

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

/// Dispatch a `PlanCommands` variant to the appropriate handler.
pub fn run_plan_command(command: PlanCommands, config: &GiaoanConfig) -> Result<()> {
    let workspace = app::open_workspace(config)?;
    app::require_login(config, workspace.store())?;

    match command {
        PlanCommands::List => {
            print!("{}", format_plan_list(&workspace.saved_plans()));
            Ok(())
        }
        PlanCommands::Show { id, json } => cmd_show(&workspace, id, json),
        PlanCommands::Load { id, tab } => cmd_load(&workspace, id, tab),
        PlanCommands::Delete { id } => cmd_delete(&workspace, id),
    }
}

/// Creation time encoded in a plan id, in local time.
fn created_at(id: i64) -> String {
    DateTime::from_timestamp_millis(id)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

// -----------------------------------------------------------------------
// giaoan plans list
// -----------------------------------------------------------------------

fn format_plan_list(plans: &[SavedLessonPlan]) -> String {
    if plans.is_empty() {
        return "No saved plans. Use `giaoan generate` to create one.\n".to_string();
    }

    let id_w = plans.iter().map(|p| p.id.to_string().len()).max().unwrap_or(2).max(2);
    let mut out = format!("{:<id_w$}  {:<16}  {:<16}  SUBJECT\n", "ID", "CREATED", "AGE");
    for plan in plans {
        out.push_str(&format!(
            "{:<id_w$}  {:<16}  {:<16}  {}\n",
            plan.id,
            created_at(plan.id),
            plan.request.age_group,
            plan.request.subject,
        ));
    }
    out
}

// -----------------------------------------------------------------------
// giaoan plans show / load / delete
// -----------------------------------------------------------------------

fn cmd_show<G: Generator, S: KeyValueStore>(
    workspace: &Workspace<G, S>,
    id: i64,
    json: bool,
) -> Result<()> {
    let Some(plan) = workspace.saved_plans().into_iter().find(|p| p.id == id) else {
        bail!(WorkspaceError::PlanNotFound(id));
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    let r = &plan.request;
    println!("Plan #{} (created {})", plan.id, created_at(plan.id));
    println!();
    println!("  Lĩnh vực:        {}", r.activity_type);
    println!("  Độ tuổi:         {}", r.age_group);
    println!("  Chủ đề:          {}", r.topic);
    println!("  Đề tài:          {}", r.subject);
    println!("  Thời gian:       {}", r.duration);
    println!("  Ngày soạn:       {}", r.preparation_date);
    println!("  Ngày dạy:        {}", r.teaching_date);
    println!("  Giáo viên:       {}", r.teacher_name);
    println!("  Trường:          {}", r.school_name);
    println!("  Hình thức:       {}", r.format);
    println!();
    for tab in ActivityTab::ALL {
        println!("  {:<22} {} chars", tab.label(), plan.parts.part(tab).chars().count());
    }
    Ok(())
}

fn cmd_load<G: Generator, S: KeyValueStore>(
    workspace: &Workspace<G, S>,
    id: i64,
    tab: Option<ActivityTab>,
) -> Result<()> {
    let plan = workspace.load_plan(id)?;
    print!("{}", app::render_plan_text(&plan.parts, plan.request.format, tab));
    Ok(())
}

fn cmd_delete<G: Generator, S: KeyValueStore>(workspace: &Workspace<G, S>, id: i64) -> Result<()> {
    if !workspace.delete_plan(id)? {
        bail!(WorkspaceError::PlanNotFound(id));
    }
    println!("Plan {id} deleted.");
    Ok(())
}
