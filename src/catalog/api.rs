//! Client for the 7TV v3 REST API that resolves a user into a [`Catalog`].

use futures_util::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::{Catalog, CatalogError, Emote, EmoteSet, ImageFormat, ImageSize};

/// Default base URL of the catalog API.
pub const DEFAULT_API_BASE_URL: &str = "https://7tv.io/v3/";

/// The parts of a user profile the downloader needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// User id as given by the caller.
    pub id: String,
    /// Account name; the per-account directory on disk.
    pub username: String,
    /// Ids of the user's emote sets, in profile order.
    pub emote_set_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    #[serde(default)]
    id: Option<String>,
    username: String,
    #[serde(default)]
    emote_sets: Vec<EmoteSetRef>,
}

#[derive(Debug, Deserialize)]
struct EmoteSetRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct EmoteSetResponse {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    capacity: u32,
    #[serde(default)]
    emotes: Option<Vec<ActiveEmote>>,
}

#[derive(Debug, Deserialize)]
struct ActiveEmote {
    data: EmoteData,
}

#[derive(Debug, Deserialize)]
struct EmoteData {
    id: String,
    name: String,
    host: EmoteHost,
}

#[derive(Debug, Deserialize)]
struct EmoteHost {
    url: String,
    #[serde(default)]
    files: Vec<HostFile>,
}

#[derive(Debug, Deserialize)]
struct HostFile {
    name: String,
    format: String,
}

/// Fetches users and emote sets from the catalog API.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: Url,
}

impl CatalogClient {
    /// Creates a client against `base_url` (e.g. [`DEFAULT_API_BASE_URL`]).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidUrl`] if `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(client: Client, base_url: &str) -> Result<Self, CatalogError> {
        let base_url =
            Url::parse(base_url.trim()).map_err(|_| CatalogError::invalid_url(base_url))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(CatalogError::invalid_url(base_url.as_str()));
        }
        Ok(Self { client, base_url })
    }

    /// Returns the configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, collection: &str, id: &str) -> Result<Url, CatalogError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogError::invalid_url(self.base_url.as_str()))?
            .pop_if_empty()
            .push(collection)
            .push(id.trim());
        Ok(url)
    }

    /// Looks up a user profile by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UserNotFound`] for a non-success status,
    /// [`CatalogError::Network`] or [`CatalogError::Decode`] otherwise.
    #[instrument(skip(self))]
    pub async fn fetch_user(&self, user_id: &str) -> Result<UserProfile, CatalogError> {
        let url = self.endpoint("users", user_id)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| CatalogError::network(url.as_str(), e))?;

        if !response.status().is_success() {
            return Err(CatalogError::user_not_found(
                user_id.trim(),
                response.status().as_u16(),
            ));
        }

        let user: UserResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::decode(url.as_str(), e))?;

        debug!(
            username = %user.username,
            sets = user.emote_sets.len(),
            "fetched user profile"
        );

        Ok(UserProfile {
            id: user.id.unwrap_or_else(|| user_id.trim().to_string()),
            username: user.username,
            emote_set_ids: user.emote_sets.into_iter().map(|set| set.id).collect(),
        })
    }

    /// Fetches one emote set with all of its emotes.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::HttpStatus`], [`CatalogError::Network`] or
    /// [`CatalogError::Decode`].
    #[instrument(skip(self))]
    pub async fn fetch_emote_set(&self, set_id: &str) -> Result<EmoteSet, CatalogError> {
        let url = self.endpoint("emote-sets", set_id)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| CatalogError::network(url.as_str(), e))?;

        if !response.status().is_success() {
            return Err(CatalogError::http_status(
                url.as_str(),
                response.status().as_u16(),
            ));
        }

        let set: EmoteSetResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::decode(url.as_str(), e))?;

        Ok(build_emote_set(set))
    }

    /// Fetches every emote set of `profile` concurrently.
    ///
    /// Sets that fail to load are logged and left out; the rest keep profile order.
    #[instrument(skip(self, profile), fields(username = %profile.username))]
    pub async fn fetch_catalog(&self, profile: &UserProfile) -> Catalog {
        let results = join_all(
            profile
                .emote_set_ids
                .iter()
                .map(|id| self.fetch_emote_set(id)),
        )
        .await;

        let mut sets = Vec::with_capacity(results.len());
        for (id, result) in profile.emote_set_ids.iter().zip(results) {
            match result {
                Ok(set) => sets.push(set),
                Err(e) => warn!(set_id = %id, error = %e, "failed to fetch emote set"),
            }
        }

        info!(sets = sets.len(), "catalog loaded");
        Catalog::new(profile.username.clone(), sets)
    }
}

fn build_emote_set(set: EmoteSetResponse) -> EmoteSet {
    let emotes = set
        .emotes
        .unwrap_or_default()
        .into_iter()
        .map(|active| build_emote(active.data))
        .collect();

    EmoteSet {
        id: set.id,
        name: set.name.trim_matches(' ').to_string(),
        capacity: set.capacity,
        emotes,
    }
}

fn build_emote(data: EmoteData) -> Emote {
    let base = if data.host.url.starts_with("//") {
        format!("https:{}", data.host.url)
    } else {
        data.host.url.clone()
    };
    let base = base.trim_end_matches('/');

    let mut emote = Emote::new(data.id, data.name);
    for file in data.host.files {
        let Ok(format) = file.format.parse::<ImageFormat>() else {
            debug!(emote = %emote.name, format = %file.format, "ignoring unsupported format");
            continue;
        };
        let size_tag = file.name.split('.').next().unwrap_or_default();
        let Ok(size) = size_tag.parse::<ImageSize>() else {
            debug!(emote = %emote.name, file = %file.name, "ignoring file without size tag");
            continue;
        };
        emote.insert_url(format, size, format!("{base}/{}", file.name));
    }
    emote
}
