//! Application state with a single, explicit update path.
//!
//! # Design
//! Views never mutate shared state in place. They turn outcomes into an
//! `Action` and hand it to `AppState::reduce`, which returns the next state.
//! A failed request only ever sets `notice`; data already loaded stays.

use crate::types::{MediaItem, User};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Route {
    #[default]
    Login,
    Home,
    Profile,
    ModifyUser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A message the current view should show once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    LoggedIn(User),
    LoggedOut,
    /// The profile form was saved; `user` is the merged, password-free record.
    ProfileSaved { user: User, message: String },
    MediaLoaded(Vec<MediaItem>),
    RequestFailed(String),
    Navigate(Route),
    DismissNotice,
}

impl Action {
    pub fn failed(err: &impl std::fmt::Display) -> Self {
        Action::RequestFailed(err.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub user: Option<User>,
    pub is_logged_in: bool,
    /// `None` until a media page has loaded successfully.
    pub media: Option<Vec<MediaItem>>,
    pub route: Route,
    pub notice: Option<Notice>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reduce(self, action: Action) -> AppState {
        match action {
            Action::LoggedIn(user) => AppState {
                user: Some(user),
                is_logged_in: true,
                route: Route::Home,
                notice: None,
                ..self
            },
            Action::LoggedOut => AppState {
                media: self.media,
                ..AppState::default()
            },
            Action::ProfileSaved { user, message } => AppState {
                user: Some(user),
                route: Route::Profile,
                notice: Some(Notice {
                    kind: NoticeKind::Success,
                    message,
                }),
                ..self
            },
            Action::MediaLoaded(items) => AppState {
                media: Some(items),
                ..self
            },
            Action::RequestFailed(message) => AppState {
                notice: Some(Notice {
                    kind: NoticeKind::Error,
                    message,
                }),
                ..self
            },
            Action::Navigate(route) => AppState { route, ..self },
            Action::DismissNotice => AppState {
                notice: None,
                ..self
            },
        }
    }
}
