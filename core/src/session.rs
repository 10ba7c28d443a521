//! Login, session restore and logout.
//!
//! Each flow returns the `Action` to feed into `AppState::reduce`.

use thiserror::Error;
use tracing::info;

use crate::api::Api;
use crate::error::ApiError;
use crate::state::Action;
use crate::storage::{clear_token, load_token, save_token, StorageError, TokenStore};
use crate::transport::Transport;
use crate::types::Credentials;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Exchange credentials for a token, persist it, and log the user in.
pub async fn sign_in<T: Transport, S: TokenStore + ?Sized>(
    api: &Api<T>,
    store: &S,
    credentials: &Credentials,
) -> Result<Action, SessionError> {
    let login = api.login(credentials).await?;
    save_token(store, &login.token)?;
    info!(user_id = login.user.user_id, "signed in");
    Ok(Action::LoggedIn(login.user))
}

/// Resume a stored session. `Ok(None)` when no token is stored.
///
/// A token the server rejects is an error; it is left in place so the
/// caller decides whether to sign out.
pub async fn restore<T: Transport, S: TokenStore + ?Sized>(
    api: &Api<T>,
    store: &S,
) -> Result<Option<Action>, SessionError> {
    let Some(token) = load_token(store)? else {
        return Ok(None);
    };
    let user = api.user_by_token(&token).await?;
    info!(user_id = user.user_id, "session restored");
    Ok(Some(Action::LoggedIn(user)))
}

pub fn sign_out<S: TokenStore + ?Sized>(store: &S) -> Result<Action, SessionError> {
    clear_token(store)?;
    Ok(Action::LoggedOut)
}
