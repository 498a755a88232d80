use std::fmt::Write as _;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use giaoan_core::access::{AccessError, AccessGate, fetch_credentials};
use giaoan_core::catalog;
use giaoan_core::export::DOCUMENT_MIME;
use giaoan_core::format::{escape_html, render_html, section_format, structure};
use giaoan_core::generation::Generator;
use giaoan_core::workspace::{PLACEHOLDER, Workspace, WorkspaceError, WorkspaceState};
use giaoan_store::FileStore;
use giaoan_store::models::{ActivityTab, ChatMessage, ChatRole, SavedLessonPlan};

use crate::app::{self, RequestForm};
use crate::config::GiaoanConfig;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "Bạn cần đăng nhập trước khi sử dụng.",
        )
    }
}

impl From<WorkspaceError> for AppError {
    fn from(err: WorkspaceError) -> Self {
        let status = match &err {
            WorkspaceError::MissingTopicOrSubject => StatusCode::BAD_REQUEST,
            WorkspaceError::Planner(_) => StatusCode::BAD_GATEWAY,
            WorkspaceError::Superseded
            | WorkspaceError::NoActivePlan
            | WorkspaceError::ChatBusy => StatusCode::CONFLICT,
            WorkspaceError::PlanNotFound(_) => StatusCode::NOT_FOUND,
            WorkspaceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        let status = match &err {
            AccessError::Fetch(_) => StatusCode::BAD_GATEWAY,
            AccessError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AccessError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Shared server state: one workspace for every client.
pub struct AppState<G> {
    workspace: Workspace<G, FileStore>,
    config: GiaoanConfig,
    http: reqwest::Client,
}

impl<G: Generator> AppState<G> {
    pub fn new(workspace: Workspace<G, FileStore>, config: GiaoanConfig) -> Result<Self> {
        let http = app::credentials_client(&config)?;
        Ok(Self {
            workspace,
            config,
            http,
        })
    }

    fn gate(&self) -> AccessGate<FileStore> {
        AccessGate::new(self.workspace.store().clone())
    }

    /// Reject the request unless login is not required or was recorded.
    fn ensure_access(&self) -> Result<(), AppError> {
        if !self.config.access_required() {
            return Ok(());
        }
        if self.gate().is_logged_in()? {
            Ok(())
        } else {
            Err(AppError::unauthorized())
        }
    }
}

type Shared<G> = Arc<AppState<G>>;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub logged_in: bool,
    pub required: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: Option<ChatMessage>,
    pub state: WorkspaceState,
}

#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    pub tab: Option<ActivityTab>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router<G: Generator + 'static>(state: Shared<G>) -> Router {
    Router::new()
        .route("/", get(index::<G>))
        .route("/api/state", get(get_state::<G>))
        .route("/api/login", post(login::<G>))
        .route("/api/logout", post(logout::<G>))
        .route("/api/generate", post(generate::<G>))
        .route("/api/chat", post(chat::<G>))
        .route("/api/plans", get(list_plans::<G>))
        .route("/api/plans/{id}/load", post(load_plan::<G>))
        .route("/api/plans/{id}", delete(delete_plan::<G>))
        .route("/api/export", get(export::<G>))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(config: &GiaoanConfig, bind: &str, port: u16) -> Result<()> {
    let workspace = app::open_workspace(config)?;
    let app = build_router(Arc::new(AppState::new(workspace, config.clone())?));
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!(gate = config.access_required(), "giaoan serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("giaoan serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C; shutting down");
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index<G: Generator + 'static>(
    State(app): State<Shared<G>>,
    Query(query): Query<ViewQuery>,
) -> Result<Html<String>, AppError> {
    let logged_in = !app.config.access_required() || app.gate().is_logged_in()?;
    let state = app.workspace.snapshot();
    Ok(Html(render_index(
        &state,
        query.tab.unwrap_or_default(),
        logged_in,
    )))
}

async fn get_state<G: Generator + 'static>(
    State(app): State<Shared<G>>,
) -> Result<Json<WorkspaceState>, AppError> {
    app.ensure_access()?;
    Ok(Json(app.workspace.snapshot()))
}

async fn login<G: Generator + 'static>(
    State(app): State<Shared<G>>,
    Json(body): Json<LoginBody>,
) -> Result<Json<LoginResponse>, AppError> {
    let Some(url) = app.config.credentials_url.as_deref() else {
        return Ok(Json(LoginResponse {
            logged_in: true,
            required: false,
        }));
    };

    let credentials = fetch_credentials(&app.http, url).await?;
    app.gate()
        .login(&credentials, body.username.trim(), body.password.trim())?;
    Ok(Json(LoginResponse {
        logged_in: true,
        required: true,
    }))
}

async fn logout<G: Generator + 'static>(
    State(app): State<Shared<G>>,
) -> Result<StatusCode, AppError> {
    app.gate().logout()?;
    Ok(StatusCode::NO_CONTENT)
}

async fn generate<G: Generator + 'static>(
    State(app): State<Shared<G>>,
    Json(form): Json<RequestForm>,
) -> Result<Json<WorkspaceState>, AppError> {
    app.ensure_access()?;
    let request = form.into_request(&app.config);
    app.workspace.generate(request).await?;
    Ok(Json(app.workspace.snapshot()))
}

async fn chat<G: Generator + 'static>(
    State(app): State<Shared<G>>,
    Json(body): Json<ChatBody>,
) -> Result<Json<ChatResponse>, AppError> {
    app.ensure_access()?;
    let reply = app.workspace.send_message(&body.message).await?;
    Ok(Json(ChatResponse {
        reply,
        state: app.workspace.snapshot(),
    }))
}

async fn list_plans<G: Generator + 'static>(
    State(app): State<Shared<G>>,
) -> Result<Json<Vec<SavedLessonPlan>>, AppError> {
    app.ensure_access()?;
    Ok(Json(app.workspace.saved_plans()))
}

async fn load_plan<G: Generator + 'static>(
    State(app): State<Shared<G>>,
    Path(id): Path<i64>,
) -> Result<Json<SavedLessonPlan>, AppError> {
    app.ensure_access()?;
    Ok(Json(app.workspace.load_plan(id)?))
}

async fn delete_plan<G: Generator + 'static>(
    State(app): State<Shared<G>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    app.ensure_access()?;
    if app.workspace.delete_plan(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(WorkspaceError::PlanNotFound(id).into())
    }
}

async fn export<G: Generator + 'static>(
    State(app): State<Shared<G>>,
) -> Result<axum::response::Response, AppError> {
    app.ensure_access()?;
    let document = app.workspace.export_document()?;
    let headers = [
        (header::CONTENT_TYPE, DOCUMENT_MIME.to_string()),
        (header::CONTENT_DISPOSITION, content_disposition(&document.file_name)),
    ];
    Ok((headers, document.bytes()).into_response())
}

/// Bytes escaped in `filename*`: everything except alphanumerics and `-._~`.
const FILENAME_UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// `attachment` disposition with an ASCII fallback name and the UTF-8 name
/// percent-encoded per RFC 5987.
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let encoded = utf8_percent_encode(file_name, FILENAME_UNRESERVED);
    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}

// ---------------------------------------------------------------------------
// HTML view
// ---------------------------------------------------------------------------

const PAGE_STYLE: &str = "body { font-family: 'Times New Roman', serif; max-width: 960px; margin: 0 auto; padding: 16px; }\
nav a { margin-right: 12px; } nav a.active { font-weight: bold; }\
table { width: 100%; border-collapse: collapse; } th, td { border: 1px solid #999; padding: 6px; vertical-align: top; }\
.error { color: #b00020; } .placeholder { color: #666; font-style: italic; }";

/// Form that posts JSON to `/api/generate` and reloads the page.
const GENERATE_SCRIPT: &str = r#"<script>
document.getElementById('generate').addEventListener('submit', async (e) => {
  e.preventDefault();
  const body = Object.fromEntries(new FormData(e.target));
  const res = await fetch('/api/generate', { method: 'POST', headers: { 'Content-Type': 'application/json' }, body: JSON.stringify(body) });
  if (!res.ok) { alert((await res.json()).error); }
  location.reload();
});
</script>"#;

const CHAT_SCRIPT: &str = r#"<script>
document.getElementById('chat').addEventListener('submit', async (e) => {
  e.preventDefault();
  const message = new FormData(e.target).get('message');
  const res = await fetch('/api/chat', { method: 'POST', headers: { 'Content-Type': 'application/json' }, body: JSON.stringify({ message }) });
  if (!res.ok) { alert((await res.json()).error); }
  location.reload();
});
</script>"#;

fn render_options(out: &mut String, name: &str, options: &[&str], selected: &str) {
    let _ = write!(out, "<select name=\"{name}\">");
    for option in options {
        let sel = if *option == selected { " selected" } else { "" };
        let _ = write!(
            out,
            "<option{sel}>{}</option>",
            escape_html(option)
        );
    }
    out.push_str("</select>");
}

fn render_form(out: &mut String) {
    out.push_str("<form id=\"generate\"><fieldset><legend>Soạn giáo án mới</legend>");
    out.push_str("<label>Lĩnh vực ");
    render_options(out, "activityType", &catalog::ACTIVITY_TYPES, catalog::DEFAULT_ACTIVITY_TYPE);
    out.push_str("</label> <label>Độ tuổi ");
    render_options(out, "ageGroup", &catalog::AGE_GROUPS, catalog::DEFAULT_AGE_GROUP);
    out.push_str("</label><br>");
    out.push_str("<label>Chủ đề <input name=\"topic\" required></label> ");
    out.push_str("<label>Đề tài <input name=\"subject\" required></label><br>");
    let _ = write!(
        out,
        "<label>Thời gian <input name=\"duration\" value=\"{}\"></label> ",
        escape_html(catalog::DEFAULT_DURATION)
    );
    out.push_str(
        "<label>Hình thức <select name=\"format\">\
         <option value=\"no-columns\">Không chia cột</option>\
         <option value=\"with-columns\">Chia cột</option></select></label> ",
    );
    out.push_str("<button type=\"submit\">Tạo giáo án</button></fieldset></form>");
    out.push_str(GENERATE_SCRIPT);
}

/// Render the workspace page with `tab` selected.
pub fn render_index(state: &WorkspaceState, tab: ActivityTab, logged_in: bool) -> String {
    let mut out = format!(
        "<!DOCTYPE html><html><head><meta charset=\"UTF-8\"><title>Giáo án</title>\
         <style>{PAGE_STYLE}</style></head><body><h1>Trợ lý soạn giáo án</h1>"
    );

    if !logged_in {
        out.push_str(
            "<p class=\"error\">Bạn cần đăng nhập: gửi POST /api/login với \
             {\"username\", \"password\"}.</p></body></html>",
        );
        return out;
    }

    if let Some(error) = &state.error {
        let _ = write!(out, "<p class=\"error\">{}</p>", escape_html(error));
    }
    if state.loading {
        out.push_str("<p class=\"placeholder\">AI đang soạn giáo án...</p>");
    }

    render_form(&mut out);

    if let Some(plan) = &state.plan {
        out.push_str("<nav>");
        for t in ActivityTab::ALL {
            let class = if t == tab { " class=\"active\"" } else { "" };
            let _ = write!(out, "<a href=\"/?tab={t}\"{class}>{}</a>", t.label());
        }
        out.push_str(" <a href=\"/api/export\">Tải file Word</a></nav>");

        let text = plan.part(tab);
        let _ = write!(out, "<section><h2>{}</h2>", tab.label());
        if text == PLACEHOLDER {
            let _ = write!(out, "<p class=\"placeholder\">{PLACEHOLDER}</p>");
        } else {
            let format = state.request.as_ref().map(|r| r.format).unwrap_or_default();
            out.push_str(&render_html(&structure(text, section_format(tab, format))));
        }
        out.push_str("</section>");
    }

    if !state.chat.is_empty() || state.can_refine() {
        out.push_str("<section><h2>Trò chuyện</h2>");
        for message in &state.chat {
            let who = match message.role {
                ChatRole::User => "Bạn",
                ChatRole::Model => "AI",
            };
            let _ = write!(out, "<p><strong>{who}:</strong> {}</p>", escape_html(&message.content));
        }
        if state.can_refine() {
            out.push_str(
                "<form id=\"chat\"><input name=\"message\" placeholder=\"Yêu cầu chỉnh sửa...\"> \
                 <button type=\"submit\">Gửi</button></form>",
            );
            out.push_str(CHAT_SCRIPT);
        }
        out.push_str("</section>");
    }

    out.push_str("<section><h2>Giáo án đã lưu</h2>");
    if state.saved_plans.is_empty() {
        out.push_str("<p>Chưa có giáo án nào.</p>");
    } else {
        out.push_str("<ul>");
        for plan in state.saved_plans.iter().rev() {
            let current = if state.current_plan_id == Some(plan.id) { " (đang mở)" } else { "" };
            let _ = write!(
                out,
                "<li>#{} {} / {}{current}</li>",
                plan.id,
                escape_html(&plan.request.topic),
                escape_html(&plan.request.subject)
            );
        }
        out.push_str("</ul>");
    }
    out.push_str("</section></body></html>");
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
