//! Async access layer: build, execute through a `Transport`, parse.
//!
//! Every method returns `Result<_, ApiError>`; failures are logged here and
//! left for the caller to surface.

use tracing::{debug, error};

use crate::client::MediaShareClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::media::{self, Hydrated, HydrationPolicy, MediaPage};
use crate::transport::Transport;
use crate::types::{
    Credentials, LoginResponse, MediaItem, MessageResponse, NewTag, NewUser, TagCreated,
    TaggedFile, User, UserCreated, UserUpdate,
};

#[derive(Debug, Clone)]
pub struct Api<T> {
    client: MediaShareClient,
    transport: T,
}

impl<T: Transport> Api<T> {
    pub fn new(client: MediaShareClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &MediaShareClient {
        &self.client
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let req = self.client.build_login(credentials)?;
        let resp = self.send(req).await?;
        self.client.parse_login(resp).inspect_err(log_failure("login"))
    }

    pub async fn user_by_token(&self, token: &str) -> Result<User, ApiError> {
        let resp = self.send(self.client.build_get_user_by_token(token)).await?;
        self.client.parse_get_user(resp).inspect_err(log_failure("user_by_token"))
    }

    pub async fn create_user(&self, input: &NewUser) -> Result<UserCreated, ApiError> {
        let req = self.client.build_create_user(input)?;
        let resp = self.send(req).await?;
        self.client.parse_create_user(resp).inspect_err(log_failure("create_user"))
    }

    pub async fn update_user(
        &self,
        input: &UserUpdate,
        token: &str,
    ) -> Result<MessageResponse, ApiError> {
        let req = self.client.build_update_user(input, token)?;
        let resp = self.send(req).await?;
        self.client.parse_update_user(resp).inspect_err(log_failure("update_user"))
    }

    /// `true` when no user has claimed `username` yet.
    pub async fn check_username(&self, username: &str) -> Result<bool, ApiError> {
        let resp = self.send(self.client.build_check_username(username)).await?;
        self.client
            .parse_check_username(resp)
            .inspect_err(log_failure("check_username"))
    }

    pub async fn media(&self, file_id: u64) -> Result<MediaItem, ApiError> {
        let resp = self.send(self.client.build_get_media(file_id)).await?;
        self.client.parse_get_media(resp).inspect_err(log_failure("media"))
    }

    /// List a page and hydrate every entry; any failed entry fails the page.
    pub async fn load_media(&self, page: MediaPage) -> Result<Vec<MediaItem>, ApiError> {
        self.load_media_with(page, HydrationPolicy::AllOrNothing)
            .await
            .map(|hydrated| hydrated.items)
    }

    pub async fn load_media_with(
        &self,
        page: MediaPage,
        policy: HydrationPolicy,
    ) -> Result<Hydrated, ApiError> {
        media::hydrate(&self.client, &self.transport, page, policy)
            .await
            .inspect_err(log_failure("load_media"))
    }

    pub async fn create_tag(&self, input: &NewTag, token: &str) -> Result<TagCreated, ApiError> {
        let req = self.client.build_create_tag(input, token)?;
        let resp = self.send(req).await?;
        self.client.parse_create_tag(resp).inspect_err(log_failure("create_tag"))
    }

    pub async fn files_by_tag(&self, tag: &str) -> Result<Vec<TaggedFile>, ApiError> {
        let resp = self.send(self.client.build_files_by_tag(tag)).await?;
        self.client
            .parse_files_by_tag(resp)
            .inspect_err(log_failure("files_by_tag"))
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, path = %request.path, "sending request");
        let response = self
            .transport
            .execute(request)
            .await
            .inspect_err(log_failure("transport"))?;
        debug!(status = response.status, "response received");
        Ok(response)
    }
}

fn log_failure(operation: &'static str) -> impl Fn(&ApiError) {
    move |err| error!(operation, error = %err, "request failed")
}
