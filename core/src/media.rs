//! Media listing and hydration.
//!
//! # Design
//! The backend has no bulk detail endpoint, so loading a page of media is
//! one listing request followed by one detail request per entry. Detail
//! requests are issued together and joined; there is no timeout,
//! cancellation or retry beyond what the `Transport` does itself.
//!
//! `HydrationPolicy` decides what a failed detail request means. The
//! default is all-or-nothing: the first failure (in listing order) fails the
//! whole page and no partial collection is returned.

use futures::future::join_all;
use tracing::{debug, warn};

use crate::client::MediaShareClient;
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::MediaItem;

/// Offset/limit pair for the media listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaPage {
    pub start: u32,
    pub limit: u32,
}

impl MediaPage {
    pub const DEFAULT_START: u32 = 10;
    pub const DEFAULT_LIMIT: u32 = 20;

    pub fn new(start: u32, limit: u32) -> Self {
        Self { start, limit }
    }
}

impl Default for MediaPage {
    fn default() -> Self {
        Self::new(Self::DEFAULT_START, Self::DEFAULT_LIMIT)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HydrationPolicy {
    /// Any failed detail request fails the whole page.
    #[default]
    AllOrNothing,
    /// Failed entries are reported next to the items that loaded.
    Isolated,
}

/// A detail request that did not produce an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HydrationFailure {
    pub file_id: u64,
    pub error: ApiError,
}

/// Outcome of a hydration. `failures` is always empty under
/// `HydrationPolicy::AllOrNothing`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hydrated {
    pub items: Vec<MediaItem>,
    pub failures: Vec<HydrationFailure>,
}

/// List a page of media and fetch every entry's detail record.
///
/// Issues exactly one listing request and one detail request per listed
/// entry. Items keep listing order.
pub async fn hydrate<T: Transport>(
    client: &MediaShareClient,
    transport: &T,
    page: MediaPage,
    policy: HydrationPolicy,
) -> Result<Hydrated, ApiError> {
    let response = transport.execute(client.build_list_media(page)).await?;
    let listing = client.parse_list_media(response)?;
    debug!(count = listing.len(), start = page.start, limit = page.limit, "hydrating media listing");

    let details = join_all(listing.iter().map(|entry| async move {
        let response = transport.execute(client.build_get_media(entry.file_id)).await?;
        client.parse_get_media(response)
    }))
    .await;

    let mut hydrated = Hydrated::default();
    for (entry, result) in listing.iter().zip(details) {
        match result {
            Ok(item) => hydrated.items.push(item),
            Err(error) => {
                warn!(file_id = entry.file_id, %error, "media detail request failed");
                if policy == HydrationPolicy::AllOrNothing {
                    return Err(error);
                }
                hydrated.failures.push(HydrationFailure {
                    file_id: entry.file_id,
                    error,
                });
            }
        }
    }
    Ok(hydrated)
}
