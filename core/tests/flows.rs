//! Profile and media flows against a scripted backend.
//!
//! The scripted transport answers by path and records every request, so the
//! tests can assert exactly which calls a flow made.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use mediashare_core::{
    profile::ProfileEditor, storage, Action, Api, ApiError, AppState, Field, HttpMethod,
    HttpRequest, HttpResponse, MediaPage, MediaShareClient, MemoryStore, ProfileForm,
    SubmitError, Transport, User,
};

const BASE: &str = "http://api.test";

#[derive(Default)]
struct Scripted {
    routes: HashMap<(HttpMethod, String), (u16, String)>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl Scripted {
    fn on(mut self, method: HttpMethod, path: &str, status: u16, body: &str) -> Self {
        self.routes
            .insert((method, format!("{BASE}{path}")), (status, body.to_string()));
        self
    }

    fn seen(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl Transport for Scripted {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, ApiError>> + Send {
        let reply = self
            .routes
            .get(&(request.method, request.path.clone()))
            .cloned();
        self.seen.lock().unwrap().push(request);
        async move {
            let (status, body) = reply.ok_or_else(|| ApiError::Transport("no route".into()))?;
            Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body,
            })
        }
    }
}

fn current_user() -> User {
    User {
        user_id: 4,
        username: "sami".to_string(),
        email: "sami@example.com".to_string(),
        full_name: None,
    }
}

fn logged_in_store() -> MemoryStore {
    let store = MemoryStore::new();
    storage::save_token(&store, "tok").unwrap();
    store
}

fn media(id: u64) -> String {
    format!(r#"{{"file_id":{id},"filename":"{id}.jpg","user_id":4}}"#)
}

#[tokio::test]
async fn unchanged_username_skips_availability_check() {
    // The server would claim the name is taken; it must not be asked.
    let backend = Scripted::default()
        .on(HttpMethod::Get, "/users/username/sami", 200, r#"{"username":"sami","available":false}"#)
        .on(HttpMethod::Put, "/users", 200, r#"{"message":"user info updated"}"#);
    let api = Api::new(MediaShareClient::new(BASE), &backend);
    let store = logged_in_store();
    let user = current_user();
    let editor = ProfileEditor::new(&api, &store, &user);

    assert!(editor.username_ok("sami").await.unwrap());
    editor.submit(&ProfileForm::for_user(&user)).await.unwrap();

    let seen = backend.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, HttpMethod::Put);
}

#[tokio::test]
async fn taken_username_is_rejected_before_update() {
    let backend = Scripted::default().on(
        HttpMethod::Get,
        "/users/username/taken",
        200,
        r#"{"username":"taken","available":false}"#,
    );
    let api = Api::new(MediaShareClient::new(BASE), &backend);
    let store = logged_in_store();
    let user = current_user();

    let form = ProfileForm {
        username: "taken".to_string(),
        ..ProfileForm::for_user(&user)
    };
    let err = ProfileEditor::new(&api, &store, &user)
        .submit(&form)
        .await
        .unwrap_err();

    let errors = err.field_errors().unwrap();
    assert_eq!(errors.get(Field::Username), Some("Username is already taken"));
    assert!(backend.seen().iter().all(|r| r.method == HttpMethod::Get));
}

#[tokio::test]
async fn empty_password_is_left_out_of_the_payload() {
    let backend = Scripted::default().on(HttpMethod::Put, "/users", 200, r#"{"message":"ok"}"#);
    let api = Api::new(MediaShareClient::new(BASE), &backend);
    let store = logged_in_store();
    let user = current_user();

    let form = ProfileForm {
        email: "new@example.com".to_string(),
        ..ProfileForm::for_user(&user)
    };
    let submitted = ProfileEditor::new(&api, &store, &user)
        .submit(&form)
        .await
        .unwrap();
    assert_eq!(submitted.user.email, "new@example.com");

    let put = backend.seen().pop().unwrap();
    assert_eq!(put.header("x-access-token"), Some("tok"));
    let body: serde_json::Value = serde_json::from_str(put.body.as_deref().unwrap()).unwrap();
    assert!(body.get("password").is_none());
    assert!(body.get("confirmPassword").is_none());
    assert_eq!(body["email"], "new@example.com");
}

#[tokio::test]
async fn mismatched_passwords_block_submission() {
    let backend = Scripted::default();
    let api = Api::new(MediaShareClient::new(BASE), &backend);
    let store = logged_in_store();
    let user = current_user();

    let form = ProfileForm {
        password: "hunter22".to_string(),
        confirm_password: "hunter2".to_string(),
        ..ProfileForm::for_user(&user)
    };
    let err = ProfileEditor::new(&api, &store, &user)
        .submit(&form)
        .await
        .unwrap_err();

    assert!(err.field_errors().unwrap().contains(Field::ConfirmPassword));
    assert!(backend.seen().is_empty());
}

#[tokio::test]
async fn missing_token_is_reported() {
    let backend = Scripted::default();
    let api = Api::new(MediaShareClient::new(BASE), &backend);
    let store = MemoryStore::new();
    let user = current_user();

    let err = ProfileEditor::new(&api, &store, &user)
        .submit(&ProfileForm::for_user(&user))
        .await
        .unwrap_err();
    assert!(matches!(err, SubmitError::MissingToken));
    assert!(backend.seen().is_empty());
}

#[tokio::test]
async fn rejected_update_reaches_the_user() {
    let backend = Scripted::default().on(
        HttpMethod::Put,
        "/users",
        409,
        r#"{"message":"Username already exists"}"#,
    );
    let api = Api::new(MediaShareClient::new(BASE), &backend);
    let store = logged_in_store();
    let user = current_user();

    let err = ProfileEditor::new(&api, &store, &user)
        .submit(&ProfileForm::for_user(&user))
        .await
        .unwrap_err();
    assert!(matches!(err, SubmitError::Api(ApiError::Server { status: 409, .. })));

    let state = AppState::new()
        .reduce(Action::LoggedIn(user.clone()))
        .reduce(Action::failed(&err));
    assert_eq!(state.notice.unwrap().message, "Username already exists");
    assert_eq!(state.user, Some(user));
}

#[tokio::test]
async fn hydration_counts_requests() {
    let backend = Scripted::default()
        .on(HttpMethod::Get, "/media?start=10&limit=20", 200, r#"[{"file_id":1},{"file_id":2}]"#)
        .on(HttpMethod::Get, "/media/1", 200, &media(1))
        .on(HttpMethod::Get, "/media/2", 200, &media(2));
    let api = Api::new(MediaShareClient::new(BASE), &backend);

    let items = api.load_media(MediaPage::default()).await.unwrap();
    assert_eq!(items.len(), 2);

    let paths: Vec<String> = backend.seen().into_iter().map(|r| r.path).collect();
    assert_eq!(paths.len(), 3);
    assert_eq!(paths[0], format!("{BASE}/media?start=10&limit=20"));
    assert!(paths.contains(&format!("{BASE}/media/1")));
    assert!(paths.contains(&format!("{BASE}/media/2")));
}

#[tokio::test]
async fn failed_detail_leaves_media_unset() {
    let backend = Scripted::default()
        .on(HttpMethod::Get, "/media?start=10&limit=20", 200, r#"[{"file_id":1},{"file_id":2}]"#)
        .on(HttpMethod::Get, "/media/1", 200, &media(1))
        .on(HttpMethod::Get, "/media/2", 404, r#"{"message":"Media not found"}"#);
    let api = Api::new(MediaShareClient::new(BASE), &backend);

    let state = match api.load_media(MediaPage::default()).await {
        Ok(items) => AppState::new().reduce(Action::MediaLoaded(items)),
        Err(err) => AppState::new().reduce(Action::failed(&err)),
    };

    assert!(state.media.is_none());
    assert_eq!(state.notice.unwrap().message, "Media not found");
    assert_eq!(backend.seen().len(), 3);
}

#[tokio::test]
async fn cleared_full_name_is_sent_empty() {
    let backend = Scripted::default().on(HttpMethod::Put, "/users", 200, r#"{"message":"ok"}"#);
    let api = Api::new(MediaShareClient::new(BASE), &backend);
    let store = logged_in_store();
    let user = User {
        full_name: Some("Sami S".to_string()),
        ..current_user()
    };

    let form = ProfileForm {
        full_name: String::new(),
        ..ProfileForm::for_user(&user)
    };
    let submitted = ProfileEditor::new(&api, &store, &user)
        .submit(&form)
        .await
        .unwrap();
    assert_eq!(submitted.user.full_name, None);

    let put = backend.seen().pop().unwrap();
    let body: serde_json::Value = serde_json::from_str(put.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["full_name"], "");
}
