//! `giaoan generate`: produce, save and print a new lesson plan.

use anyhow::{Result, bail};

use giaoan_core::workspace::WorkspaceError;
use giaoan_store::models::LessonPlanParts;

use crate::GenerateArgs;
use crate::app::{self, RequestForm};
use crate::config::GiaoanConfig;

impl From<GenerateArgs> for RequestForm {
    fn from(args: GenerateArgs) -> Self {
        Self {
            activity_type: args.activity_type,
            age_group: args.age_group,
            topic: args.topic,
            subject: args.subject,
            duration: args.duration,
            preparation_date: args.preparation_date,
            teaching_date: args.teaching_date,
            teacher_name: args.teacher,
            school_name: args.school,
            format: args.format,
        }
    }
}

pub async fn run_generate(config: &GiaoanConfig, args: GenerateArgs) -> Result<()> {
    let tab = args.tab;
    let json = args.json;
    let request = RequestForm::from(args).into_request(config);

    let workspace = app::open_workspace(config)?;
    app::require_login(config, workspace.store())?;

    eprintln!("Đang soạn Hoạt động học cho \"{}\"...", request.subject.trim());

    let mut state = workspace.subscribe();
    let generation = workspace.generate(request.clone());
    tokio::pin!(generation);

    let mut announced = false;
    let result: Result<LessonPlanParts, WorkspaceError> = loop {
        tokio::select! {
            result = &mut generation => break result,
            Ok(()) = state.changed() => {
                if !announced && state.borrow_and_update().has_pending_sections() {
                    eprintln!("Đã xong Hoạt động học. Đang soạn Hoạt động ngoài trời và Hoạt động góc...");
                    announced = true;
                }
            }
            _ = tokio::signal::ctrl_c() => bail!("interrupted; no plan was saved"),
        }
    };

    let parts = match result {
        Ok(parts) => parts,
        // The plan is complete but could not be saved; still show it.
        Err(e @ WorkspaceError::Store(_)) => {
            if let Some(plan) = workspace.snapshot().plan {
                print!("{}", app::render_plan_text(&plan, request.format, tab));
            }
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&parts)?);
    } else {
        print!("{}", app::render_plan_text(&parts, request.format, tab));
    }

    if let Some(id) = workspace.snapshot().current_plan_id {
        eprintln!("Đã lưu giáo án #{id}.");
    }
    Ok(())
}
