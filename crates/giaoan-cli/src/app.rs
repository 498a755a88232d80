//! Wiring shared by the commands and the HTTP server.
//!
//! - [`open_workspace`] builds the Gemini-backed workspace over the file store.
//! - [`require_login`] enforces the access gate when a credentials URL is set.
//! - [`credentials_client`] builds the HTTP client for the credential list.
//! - [`RequestForm`] fills a plan request from partial input and defaults.
//! - [`render_plan_text`] renders plan sections for the terminal.

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use giaoan_core::access::AccessGate;
use giaoan_core::catalog;
use giaoan_core::format::{render_text, section_format, structure};
use giaoan_core::generation::GeminiClient;
use giaoan_core::planner::LessonPlanner;
use giaoan_core::workspace::Workspace;
use giaoan_store::models::{ActivityTab, LessonPlanParts, LessonPlanRequest, PlanFormat};
use giaoan_store::{FileStore, KeyValueStore};

use crate::config::GiaoanConfig;

pub type AppWorkspace = Workspace<GeminiClient, FileStore>;

/// Build the workspace for `config`, loading saved plans.
pub fn open_workspace(config: &GiaoanConfig) -> Result<AppWorkspace> {
    let client = GeminiClient::new(config.gemini.clone()).context("failed to build Gemini client")?;
    tracing::debug!(model = %config.gemini.model, data_dir = %config.store.data_dir.display(), "opening workspace");
    Ok(Workspace::open(LessonPlanner::new(client), config.store.open()))
}

/// HTTP client for fetching the credential list, bounded by the same
/// timeout as model calls.
pub fn credentials_client(config: &GiaoanConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.gemini.timeout)
        .user_agent(concat!("giaoan/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")
}

/// Fail unless login is not required or has been recorded in `store`.
pub fn require_login<S: KeyValueStore + Clone>(config: &GiaoanConfig, store: &S) -> Result<()> {
    if !config.access_required() {
        return Ok(());
    }
    if AccessGate::new(store.clone()).is_logged_in()? {
        return Ok(());
    }
    bail!("Bạn cần đăng nhập trước khi sử dụng. Chạy `giaoan login`.")
}

// -----------------------------------------------------------------------
// Request form
// -----------------------------------------------------------------------

/// Partially filled plan request, as submitted by a form or flags.
///
/// Missing fields take the catalog defaults, and the teacher and school
/// names fall back to the `[teacher]` config section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestForm {
    pub activity_type: Option<String>,
    pub age_group: Option<String>,
    pub topic: Option<String>,
    pub subject: Option<String>,
    pub duration: Option<String>,
    pub preparation_date: Option<String>,
    pub teaching_date: Option<String>,
    pub teacher_name: Option<String>,
    pub school_name: Option<String>,
    pub format: Option<PlanFormat>,
}

impl RequestForm {
    pub fn into_request(self, config: &GiaoanConfig) -> LessonPlanRequest {
        let defaults = catalog::default_request();
        let request = LessonPlanRequest {
            activity_type: self.activity_type.unwrap_or(defaults.activity_type),
            age_group: self.age_group.unwrap_or(defaults.age_group),
            topic: self.topic.unwrap_or_default(),
            subject: self.subject.unwrap_or_default(),
            duration: self.duration.unwrap_or(defaults.duration),
            preparation_date: self.preparation_date.unwrap_or(defaults.preparation_date),
            teaching_date: self.teaching_date.unwrap_or(defaults.teaching_date),
            teacher_name: self.teacher_name.unwrap_or_else(|| config.teacher_name.clone()),
            school_name: self.school_name.unwrap_or_else(|| config.school_name.clone()),
            format: self.format.unwrap_or(defaults.format),
        };

        if !catalog::is_known_activity_type(&request.activity_type) {
            tracing::warn!(activity_type = %request.activity_type, "activity type is not in the catalog");
        }
        if !catalog::is_known_age_group(&request.age_group) {
            tracing::warn!(age_group = %request.age_group, "age group is not in the catalog");
        }
        request
    }
}

// -----------------------------------------------------------------------
// Terminal rendering
// -----------------------------------------------------------------------

/// Render the selected sections (all when `tab` is `None`) as plain text.
pub fn render_plan_text(
    parts: &LessonPlanParts,
    format: PlanFormat,
    tab: Option<ActivityTab>,
) -> String {
    let tabs = match tab {
        Some(tab) => vec![tab],
        None => ActivityTab::ALL.to_vec(),
    };

    let mut out = String::new();
    for tab in tabs {
        let title = tab.label().to_uppercase();
        out.push_str(&format!("== {title} ==\n\n"));
        out.push_str(&render_text(&structure(
            parts.part(tab),
            section_format(tab, format),
        )));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigFile, Overrides};
    use giaoan_core::access::{AccessError, fetch_credentials};
    use giaoan_store::MemoryStore;
    use giaoan_store::queries::access;

    fn config(credentials_url: Option<&str>) -> GiaoanConfig {
        let mut file = ConfigFile::default();
        file.teacher.name = Some("Cô Hoa".to_string());
        file.teacher.school = Some("MN Hoa Sen".to_string());
        file.access.credentials_url = credentials_url.map(str::to_string);
        file.storage.dir = Some(std::env::temp_dir().join("giaoan-app-test"));
        file.api.key = Some("k".to_string());
        GiaoanConfig::resolve_with(&Overrides::default(), file)
    }

    #[tokio::test]
    async fn credential_fetch_gives_up_on_a_silent_host() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept connections and never answer.
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let mut config = {
            let _lock = crate::test_util::lock_env();
            config(None)
        };
        config.gemini.timeout = std::time::Duration::from_millis(200);
        let client = credentials_client(&config).unwrap();

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(10),
            fetch_credentials(&client, &format!("http://{addr}/users.csv")),
        )
        .await
        .expect("credential fetch should time out on its own");
        assert!(matches!(result, Err(AccessError::Fetch(_))));
    }

    #[test]
    fn form_fills_defaults_and_teacher_section() {
        let _lock = crate::test_util::lock_env();
        let form = RequestForm {
            topic: Some("Gia đình".to_string()),
            subject: Some("Bé yêu mẹ".to_string()),
            ..RequestForm::default()
        };
        let request = form.into_request(&config(None));

        assert_eq!(request.activity_type, catalog::DEFAULT_ACTIVITY_TYPE);
        assert_eq!(request.age_group, catalog::DEFAULT_AGE_GROUP);
        assert_eq!(request.duration, catalog::DEFAULT_DURATION);
        assert_eq!(request.teacher_name, "Cô Hoa");
        assert_eq!(request.school_name, "MN Hoa Sen");
        assert_eq!(request.format, PlanFormat::NoColumns);
        assert_eq!(request.preparation_date, catalog::today());
    }

    #[test]
    fn form_parses_camel_case_json() {
        let form: RequestForm = serde_json::from_str(
            r#"{"topic":"Nước","subject":"Vật chìm nổi","ageGroup":"Trẻ 5-6 tuổi","format":"with-columns"}"#,
        )
        .unwrap();
        assert_eq!(form.age_group.as_deref(), Some("Trẻ 5-6 tuổi"));
        assert_eq!(form.format, Some(PlanFormat::WithColumns));
        assert!(form.teacher_name.is_none());
    }

    #[test]
    fn login_only_required_with_credentials_url() {
        let _lock = crate::test_util::lock_env();
        let store = std::sync::Arc::new(MemoryStore::new());
        assert!(require_login(&config(None), &store).is_ok());

        let gated = config(Some("https://example.test/users.csv"));
        assert!(require_login(&gated, &store).is_err());
        access::set_logged_in(&store).unwrap();
        assert!(require_login(&gated, &store).is_ok());
    }

    #[test]
    fn text_rendering_labels_each_section() {
        let parts = LessonPlanParts {
            learning_activity: "**I. MỤC TIÊU**\nTrẻ biết đếm.".to_string(),
            outdoor_activity: "Quan sát cây".to_string(),
            corner_activity: "Góc xây dựng".to_string(),
        };

        let all = render_plan_text(&parts, PlanFormat::NoColumns, None);
        assert!(all.contains("== HOẠT ĐỘNG HỌC =="));
        assert!(all.contains("== HOẠT ĐỘNG NGOÀI TRỜI =="));
        assert!(all.contains("Góc xây dựng"));

        let outdoor = render_plan_text(&parts, PlanFormat::NoColumns, Some(ActivityTab::Outdoor));
        assert!(outdoor.contains("Quan sát cây"));
        assert!(!outdoor.contains("Trẻ biết đếm"));
    }
}
