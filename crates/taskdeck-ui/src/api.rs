use std::cell::RefCell;

use gloo::net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use taskdeck_shared::{ApiErrorBody, CsrfResponse};
use thiserror::Error;
use web_sys::RequestCredentials;

pub const API_BASE: &str = "/api";

thread_local! {
    static CSRF_TOKEN: RefCell<Option<String>> = const { RefCell::new(None) };
}

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("{}", .body.summary())]
    Status { status: u16, body: ApiErrorBody },
    #[error("network error: {0}")]
    Network(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&ApiErrorBody> {
        match self {
            Self::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

fn url_for(path: &str) -> String {
    format!("{API_BASE}{path}")
}

fn csrf_token() -> Option<String> {
    CSRF_TOKEN.with(|token| token.borrow().clone())
}

fn store_csrf_token(token: String) {
    CSRF_TOKEN.with(|slot| *slot.borrow_mut() = Some(token));
}

/// Mutating requests carry the anti-forgery token fetched at startup.
fn with_csrf(builder: RequestBuilder) -> RequestBuilder {
    match csrf_token() {
        Some(token) => builder.header("X-CSRFToken", &token),
        None => builder,
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let status = response.status();
    if !(200..300).contains(&status) {
        let body = response
            .json::<ApiErrorBody>()
            .await
            .unwrap_or_else(|_| ApiErrorBody::from_message("Request failed"));
        return Err(ApiError::Status { status, body });
    }

    response
        .json::<T>()
        .await
        .map_err(|error| ApiError::Decode(error.to_string()))
}

/// Like [`decode`] but for endpoints whose success body carries nothing
/// the client needs (deletes, reorder acks).
async fn decode_empty(response: Response) -> ApiResult<()> {
    let status = response.status();
    if !(200..300).contains(&status) {
        let body = response
            .json::<ApiErrorBody>()
            .await
            .unwrap_or_else(|_| ApiErrorBody::from_message("Request failed"));
        return Err(ApiError::Status { status, body });
    }
    Ok(())
}

fn network_error(error: gloo::net::Error) -> ApiError {
    ApiError::Network(error.to_string())
}

pub async fn get<T: DeserializeOwned>(
    path: &str,
    params: &[(&'static str, String)],
) -> ApiResult<T> {
    let response = Request::get(&url_for(path))
        .credentials(RequestCredentials::Include)
        .query(params.iter().map(|(key, value)| (*key, value.as_str())))
        .send()
        .await
        .map_err(network_error)?;
    decode(response).await
}

pub async fn post<T: DeserializeOwned, B: Serialize>(path: &str, body: &B) -> ApiResult<T> {
    let request = with_csrf(Request::post(&url_for(path)).credentials(RequestCredentials::Include))
        .json(body)
        .map_err(network_error)?;
    let response = request.send().await.map_err(network_error)?;
    decode(response).await
}

/// POST with an empty JSON body (toggle, logout, instantiate).
pub async fn post_empty<T: DeserializeOwned>(path: &str) -> ApiResult<T> {
    post(path, &serde_json::json!({})).await
}

pub async fn put<T: DeserializeOwned, B: Serialize>(path: &str, body: &B) -> ApiResult<T> {
    let request = with_csrf(Request::put(&url_for(path)).credentials(RequestCredentials::Include))
        .json(body)
        .map_err(network_error)?;
    let response = request.send().await.map_err(network_error)?;
    decode(response).await
}

pub async fn patch<T: DeserializeOwned, B: Serialize>(path: &str, body: &B) -> ApiResult<T> {
    let request = with_csrf(Request::patch(&url_for(path)).credentials(RequestCredentials::Include))
        .json(body)
        .map_err(network_error)?;
    let response = request.send().await.map_err(network_error)?;
    decode(response).await
}

pub async fn delete(path: &str) -> ApiResult<()> {
    let response =
        with_csrf(Request::delete(&url_for(path)).credentials(RequestCredentials::Include))
            .send()
            .await
            .map_err(network_error)?;
    decode_empty(response).await
}

/// Multipart upload: the body is handed to fetch as FormData and no
/// content type is set, so the browser supplies the boundary.
pub async fn upload<T: DeserializeOwned>(path: &str, form: web_sys::FormData) -> ApiResult<T> {
    let request = with_csrf(Request::post(&url_for(path)).credentials(RequestCredentials::Include))
        .body(form)
        .map_err(network_error)?;
    let response = request.send().await.map_err(network_error)?;
    decode(response).await
}

pub mod auth {
    use taskdeck_shared::{LoginPayload, ProfileUpdate, RegisterPayload, UserDto, UserResponse};

    use super::*;

    /// Fetch and store the anti-forgery token. Called once at startup,
    /// before any mutating request.
    pub async fn init_csrf() -> ApiResult<()> {
        let response: CsrfResponse = get("/auth/csrf/", &[]).await?;
        store_csrf_token(response.csrf_token);
        Ok(())
    }

    pub async fn login(payload: &LoginPayload) -> ApiResult<UserResponse> {
        post("/auth/login/", payload).await
    }

    pub async fn register(payload: &RegisterPayload) -> ApiResult<UserResponse> {
        post("/auth/register/", payload).await
    }

    pub async fn logout() -> ApiResult<()> {
        let _: serde_json::Value = post_empty("/auth/logout/").await?;
        Ok(())
    }

    pub async fn current_user() -> ApiResult<UserResponse> {
        get("/auth/user/", &[]).await
    }

    pub async fn update_profile(payload: &ProfileUpdate) -> ApiResult<UserResponse> {
        put("/auth/user/update/", payload).await
    }

    /// Session probe: any failure means "not signed in".
    pub async fn check_session() -> Option<UserDto> {
        match current_user().await {
            Ok(response) => Some(response.user),
            Err(error) => {
                tracing::debug!(error = %error, "session check came back unauthenticated");
                None
            }
        }
    }
}

pub mod todos {
    use taskdeck_shared::filters::TaskQuery;
    use taskdeck_shared::{
        AttachmentDto, BulkActionPayload, CommentDto, CommentPayload, ReorderPayload, SharePayload,
        TaskDto, TaskListResponse, TodoPayload,
    };
    use uuid::Uuid;

    use super::*;

    pub async fn list(query: &TaskQuery) -> ApiResult<Vec<TaskDto>> {
        let response: TaskListResponse = get("/todos/", &query.to_query_pairs()).await?;
        Ok(response.into_tasks())
    }

    pub async fn create(payload: &TodoPayload) -> ApiResult<TaskDto> {
        post("/todos/", payload).await
    }

    pub async fn fetch(id: Uuid) -> ApiResult<TaskDto> {
        get(&format!("/todos/{id}/"), &[]).await
    }

    pub async fn update(id: Uuid, payload: &TodoPayload) -> ApiResult<TaskDto> {
        put(&format!("/todos/{id}/"), payload).await
    }

    pub async fn remove(id: Uuid) -> ApiResult<()> {
        delete(&format!("/todos/{id}/")).await
    }

    pub async fn toggle(id: Uuid) -> ApiResult<TaskDto> {
        post_empty(&format!("/todos/{id}/toggle/")).await
    }

    pub async fn share(id: Uuid, payload: &SharePayload) -> ApiResult<()> {
        let _: serde_json::Value = post(&format!("/todos/{id}/share/"), payload).await?;
        Ok(())
    }

    pub async fn reorder(payload: &ReorderPayload) -> ApiResult<()> {
        let _: serde_json::Value = post("/todos/reorder/", payload).await?;
        Ok(())
    }

    pub async fn bulk_action(payload: &BulkActionPayload) -> ApiResult<()> {
        let _: serde_json::Value = post("/todos/bulk_action/", payload).await?;
        Ok(())
    }

    pub async fn comments(id: Uuid) -> ApiResult<Vec<CommentDto>> {
        get(&format!("/todos/{id}/comments/"), &[]).await
    }

    pub async fn add_comment(id: Uuid, payload: &CommentPayload) -> ApiResult<CommentDto> {
        post(&format!("/todos/{id}/comments/"), payload).await
    }

    pub async fn delete_comment(comment_id: Uuid) -> ApiResult<()> {
        delete(&format!("/comments/{comment_id}/")).await
    }

    pub async fn attachments(id: Uuid) -> ApiResult<Vec<AttachmentDto>> {
        get(&format!("/todos/{id}/attachments/"), &[]).await
    }

    pub async fn upload_attachment(id: Uuid, file: &web_sys::File) -> ApiResult<AttachmentDto> {
        let form = web_sys::FormData::new()
            .map_err(|_| ApiError::Network("failed to build form data".to_string()))?;
        form.append_with_blob("file", file)
            .map_err(|_| ApiError::Network("failed to attach file".to_string()))?;
        upload(&format!("/todos/{id}/attachments/"), form).await
    }

    pub async fn delete_attachment(attachment_id: Uuid) -> ApiResult<()> {
        delete(&format!("/attachments/{attachment_id}/")).await
    }

    pub async fn export(format: &str) -> ApiResult<serde_json::Value> {
        get("/todos/export/", &[("format", format.to_string())]).await
    }

    pub async fn import(file: &web_sys::File) -> ApiResult<serde_json::Value> {
        let form = web_sys::FormData::new()
            .map_err(|_| ApiError::Network("failed to build form data".to_string()))?;
        form.append_with_blob("file", file)
            .map_err(|_| ApiError::Network("failed to attach file".to_string()))?;
        upload("/todos/import/", form).await
    }
}

pub mod categories {
    use taskdeck_shared::{CategoryDto, CategoryPayload};
    use uuid::Uuid;

    use super::*;

    pub async fn list() -> ApiResult<Vec<CategoryDto>> {
        get("/categories/", &[]).await
    }

    pub async fn create(payload: &CategoryPayload) -> ApiResult<CategoryDto> {
        post("/categories/", payload).await
    }

    pub async fn update(id: Uuid, payload: &CategoryPayload) -> ApiResult<CategoryDto> {
        put(&format!("/categories/{id}/"), payload).await
    }

    pub async fn remove(id: Uuid) -> ApiResult<()> {
        delete(&format!("/categories/{id}/")).await
    }
}

pub mod templates {
    use taskdeck_shared::{TaskDto, TemplateDto, TemplatePayload};
    use uuid::Uuid;

    use super::*;

    pub async fn list() -> ApiResult<Vec<TemplateDto>> {
        get("/templates/", &[]).await
    }

    pub async fn create(payload: &TemplatePayload) -> ApiResult<TemplateDto> {
        post("/templates/", payload).await
    }

    pub async fn fetch(id: Uuid) -> ApiResult<TemplateDto> {
        get(&format!("/templates/{id}/"), &[]).await
    }

    pub async fn update(id: Uuid, payload: &TemplatePayload) -> ApiResult<TemplateDto> {
        put(&format!("/templates/{id}/"), payload).await
    }

    pub async fn remove(id: Uuid) -> ApiResult<()> {
        delete(&format!("/templates/{id}/")).await
    }

    /// Instantiate a template into a fresh task.
    pub async fn create_todo(id: Uuid) -> ApiResult<TaskDto> {
        post_empty(&format!("/templates/{id}/create_todo/")).await
    }
}

pub mod stats {
    use taskdeck_shared::{ActivityEntry, DailyActivity, StatsOverview};

    use super::*;

    pub async fn overview() -> ApiResult<StatsOverview> {
        get("/stats/", &[]).await
    }

    pub async fn activity(days: u32) -> ApiResult<Vec<ActivityEntry>> {
        get("/activity/", &[("days", days.to_string())]).await
    }

    pub async fn productivity(start_date: &str, end_date: &str) -> ApiResult<Vec<DailyActivity>> {
        get(
            "/stats/productivity/",
            &[
                ("start_date", start_date.to_string()),
                ("end_date", end_date.to_string()),
            ],
        )
        .await
    }
}

pub mod users {
    use taskdeck_shared::{PreferencesDto, UserDto};

    use super::*;

    pub async fn search(query: &str) -> ApiResult<Vec<UserDto>> {
        get("/users/search/", &[("q", query.to_string())]).await
    }

    pub async fn preferences() -> ApiResult<PreferencesDto> {
        get("/preferences/", &[]).await
    }

    pub async fn update_preferences(payload: &PreferencesDto) -> ApiResult<PreferencesDto> {
        put("/preferences/", payload).await
    }
}

#[cfg(test)]
mod api_tests {
    use super::*;

    #[test]
    fn status_errors_surface_the_body_summary() {
        let error = ApiError::Status {
            status: 400,
            body: ApiErrorBody::from_message("Title is required"),
        };
        assert_eq!(error.to_string(), "Title is required");
        assert_eq!(error.status(), Some(400));
        assert!(!error.is_unauthorized());
    }

    #[test]
    fn unauthorized_is_exactly_401() {
        let error = ApiError::Status {
            status: 401,
            body: ApiErrorBody::default(),
        };
        assert!(error.is_unauthorized());
        assert!(!ApiError::Network("offline".to_string()).is_unauthorized());
    }

    #[test]
    fn paths_are_rooted_at_the_api_prefix() {
        assert_eq!(url_for("/todos/"), "/api/todos/");
        assert_eq!(url_for("/auth/csrf/"), "/api/auth/csrf/");
    }

    #[test]
    fn csrf_token_round_trips_through_the_store() {
        assert!(csrf_token().is_none());
        store_csrf_token("token-123".to_string());
        assert_eq!(csrf_token().as_deref(), Some("token-123"));
    }
}
