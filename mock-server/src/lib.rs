use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const TOKEN_HEADER: &str = "x-access-token";
pub const DEMO_USERNAME: &str = "demo";
pub const DEMO_PASSWORD: &str = "demo-pass";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: u64,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
}

#[derive(Clone, Debug)]
struct Account {
    user: User,
    password: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub file_id: u64,
    pub filename: String,
    pub filesize: u64,
    pub title: String,
    pub description: String,
    pub user_id: u64,
    pub media_type: String,
    pub mime_type: String,
    pub time_added: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaggedFile {
    #[serde(flatten)]
    pub media: MediaItem,
    pub tag: String,
}

#[derive(Deserialize)]
pub struct LoginBody {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: String,
    pub full_name: Option<String>,
}

#[derive(Deserialize)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

#[derive(Deserialize)]
pub struct NewTag {
    pub file_id: u64,
    pub tag: String,
}

#[derive(Deserialize)]
pub struct Page {
    pub start: Option<usize>,
    pub limit: Option<usize>,
}

/// In-memory backend state.
#[derive(Debug, Default)]
pub struct Backend {
    accounts: BTreeMap<u64, Account>,
    sessions: HashMap<String, u64>,
    media: BTreeMap<u64, MediaItem>,
    tags: Vec<(u64, u64, String)>,
    next_user_id: u64,
    next_tag_id: u64,
}

impl Backend {
    /// One demo account owning `media_count` files with ids `1..=media_count`.
    pub fn seeded(media_count: u64) -> Self {
        let mut backend = Backend::default();
        let owner = backend.add_account(
            DEMO_USERNAME,
            DEMO_PASSWORD,
            "demo@example.com",
            Some("Demo User".to_string()),
        );
        for file_id in 1..=media_count {
            backend.media.insert(
                file_id,
                MediaItem {
                    file_id,
                    filename: format!("{file_id:04}.jpg"),
                    filesize: 1024 * file_id,
                    title: format!("Picture {file_id}"),
                    description: String::new(),
                    user_id: owner,
                    media_type: "image".to_string(),
                    mime_type: "image/jpeg".to_string(),
                    time_added: "2024-01-01T00:00:00.000Z".to_string(),
                },
            );
        }
        backend
    }

    fn add_account(
        &mut self,
        username: &str,
        password: &str,
        email: &str,
        full_name: Option<String>,
    ) -> u64 {
        self.next_user_id += 1;
        let user_id = self.next_user_id;
        self.accounts.insert(
            user_id,
            Account {
                user: User {
                    user_id,
                    username: username.to_string(),
                    email: email.to_string(),
                    full_name,
                },
                password: password.to_string(),
            },
        );
        user_id
    }

    fn find_by_username(&self, username: &str) -> Option<&Account> {
        self.accounts.values().find(|a| a.user.username == username)
    }

    fn session_user(&self, headers: &HeaderMap) -> Result<u64, Failure> {
        headers
            .get(TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|token| self.sessions.get(token).copied())
            .ok_or_else(|| Failure::new(StatusCode::UNAUTHORIZED, "Invalid token"))
    }
}

pub type Db = Arc<RwLock<Backend>>;

/// Error body in the backend's `{"message", "error"}` shape.
#[derive(Debug)]
pub struct Failure {
    status: StatusCode,
    message: String,
    error: Option<String>,
}

impl Failure {
    fn new(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            message: message.to_string(),
            error: None,
        }
    }

    fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let body = match self.error {
            Some(error) => json!({ "message": self.message, "error": error }),
            None => json!({ "message": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

pub fn app() -> Router {
    app_with(Backend::seeded(30))
}

pub fn app_with(backend: Backend) -> Router {
    let db: Db = Arc::new(RwLock::new(backend));
    Router::new()
        .route("/media", get(list_media))
        .route("/media/{id}", get(get_media))
        .route("/login", post(login))
        .route("/users", post(create_user).put(update_user))
        .route("/users/user", get(current_user))
        .route("/users/username/{name}", get(check_username))
        .route("/tags/", post(create_tag))
        .route("/tags/{tag}", get(files_by_tag))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, Backend::seeded(30)).await
}

pub async fn serve(listener: TcpListener, backend: Backend) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(backend)).await
}

async fn list_media(State(db): State<Db>, Query(page): Query<Page>) -> Json<Vec<MediaItem>> {
    let backend = db.read().await;
    let items = backend
        .media
        .values()
        .skip(page.start.unwrap_or(0))
        .take(page.limit.unwrap_or(10))
        .cloned()
        .collect();
    Json(items)
}

async fn get_media(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<MediaItem>, Failure> {
    let backend = db.read().await;
    backend
        .media
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, "Media not found"))
}

async fn login(
    State(db): State<Db>,
    Json(body): Json<LoginBody>,
) -> Result<Json<serde_json::Value>, Failure> {
    let mut backend = db.write().await;
    let user = backend
        .find_by_username(&body.username)
        .filter(|a| a.password == body.password)
        .map(|a| a.user.clone())
        .ok_or_else(|| {
            Failure::new(StatusCode::UNAUTHORIZED, "Login failed")
                .with_error("username or password incorrect")
        })?;
    let token = Uuid::new_v4().to_string();
    backend.sessions.insert(token.clone(), user.user_id);
    info!(user_id = user.user_id, "login");
    Ok(Json(json!({
        "message": "Logged in successfully",
        "token": token,
        "user": user,
    })))
}

async fn current_user(State(db): State<Db>, headers: HeaderMap) -> Result<Json<User>, Failure> {
    let backend = db.read().await;
    let user_id = backend.session_user(&headers)?;
    backend
        .accounts
        .get(&user_id)
        .map(|a| Json(a.user.clone()))
        .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, "User not found"))
}

fn validate_account(username: &str, password: Option<&str>, email: &str) -> Result<(), Failure> {
    let invalid = |detail: &str| {
        Failure::new(StatusCode::BAD_REQUEST, "Validation failed").with_error(detail)
    };
    if username.chars().count() < 3 {
        return Err(invalid("username must be at least 3 characters"));
    }
    if password.is_some_and(|p| p.chars().count() < 5) {
        return Err(invalid("password must be at least 5 characters"));
    }
    if !email.contains('@') {
        return Err(invalid("email is invalid"));
    }
    Ok(())
}

async fn create_user(
    State(db): State<Db>,
    Json(input): Json<NewUser>,
) -> Result<(StatusCode, Json<serde_json::Value>), Failure> {
    validate_account(&input.username, Some(&input.password), &input.email)?;
    let mut backend = db.write().await;
    if backend.find_by_username(&input.username).is_some() {
        return Err(Failure::new(StatusCode::CONFLICT, "Username already exists"));
    }
    let user_id = backend.add_account(&input.username, &input.password, &input.email, input.full_name);
    info!(user_id, "user created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "user created", "user_id": user_id })),
    ))
}

async fn update_user(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<UserUpdate>,
) -> Result<Json<serde_json::Value>, Failure> {
    let mut backend = db.write().await;
    let user_id = backend.session_user(&headers)?;
    let current = backend
        .accounts
        .get(&user_id)
        .cloned()
        .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, "User not found"))?;

    let username = input.username.unwrap_or(current.user.username.clone());
    let email = input.email.unwrap_or(current.user.email.clone());
    validate_account(&username, input.password.as_deref(), &email)?;
    if backend
        .find_by_username(&username)
        .is_some_and(|a| a.user.user_id != user_id)
    {
        return Err(Failure::new(StatusCode::CONFLICT, "Username already exists"));
    }

    let account = backend
        .accounts
        .get_mut(&user_id)
        .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, "User not found"))?;
    account.user.username = username;
    account.user.email = email;
    if let Some(full_name) = input.full_name {
        account.user.full_name = Some(full_name).filter(|n| !n.is_empty());
    }
    if let Some(password) = input.password {
        account.password = password;
    }
    info!(user_id, "user updated");
    Ok(Json(json!({ "message": "user info updated" })))
}

async fn check_username(State(db): State<Db>, Path(name): Path<String>) -> Json<serde_json::Value> {
    let backend = db.read().await;
    let available = backend.find_by_username(&name).is_none();
    Json(json!({ "username": name, "available": available }))
}

async fn create_tag(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<NewTag>,
) -> Result<(StatusCode, Json<serde_json::Value>), Failure> {
    let mut backend = db.write().await;
    backend.session_user(&headers)?;
    if !backend.media.contains_key(&input.file_id) {
        return Err(Failure::new(StatusCode::NOT_FOUND, "Media not found"));
    }
    if input.tag.trim().is_empty() {
        return Err(Failure::new(StatusCode::BAD_REQUEST, "Validation failed").with_error("tag is empty"));
    }
    backend.next_tag_id += 1;
    let tag_id = backend.next_tag_id;
    backend.tags.push((tag_id, input.file_id, input.tag));
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Tag added", "tag_id": tag_id })),
    ))
}

async fn files_by_tag(State(db): State<Db>, Path(tag): Path<String>) -> Json<Vec<TaggedFile>> {
    let backend = db.read().await;
    let files = backend
        .tags
        .iter()
        .filter(|(_, _, t)| *t == tag)
        .filter_map(|(_, file_id, t)| {
            backend.media.get(file_id).map(|media| TaggedFile {
                media: media.clone(),
                tag: t.clone(),
            })
        })
        .collect();
    Json(files)
}
