//! Client core for the media-sharing app.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern), and layers the app's flows
//! on top: media hydration, session handling, the profile-edit form and the
//! application state reducer.
//!
//! # Design
//! - `MediaShareClient` is stateless and holds only `base_url`; each
//!   operation is split into `build_*` and `parse_*`.
//! - `Api` pairs the client with a host-supplied `Transport` and exposes
//!   async methods. The core owns no runtime.
//! - Every fallible path returns a `Result`; outcomes reach the UI through
//!   `AppState::reduce`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod media;
pub mod profile;
pub mod session;
pub mod state;
pub mod storage;
pub mod transport;
pub mod types;

pub use api::Api;
pub use client::{MediaShareClient, TOKEN_HEADER};
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use media::{Hydrated, HydrationFailure, HydrationPolicy, MediaPage};
pub use profile::{Field, FieldErrors, ProfileEditor, ProfileForm, SubmitError, Submitted};
pub use session::SessionError;
pub use state::{Action, AppState, Notice, NoticeKind, Route};
pub use storage::{FileStore, MemoryStore, StorageError, TokenStore, USER_TOKEN_KEY};
pub use transport::Transport;
pub use types::{
    Credentials, LoginResponse, MediaItem, MediaListing, MessageResponse, NewTag, NewUser,
    TagCreated, TaggedFile, Thumbnails, User, UserCreated, UserUpdate, UsernameAvailability,
};
