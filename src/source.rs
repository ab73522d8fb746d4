//! Fetching [`RawPost`]s from a remote source. [`PostSource`] is the seam the
//! query layer ([`crate::query`]) is written against; [`HttpSource`] is the
//! implementation backed by the WordPress `latest-posts` endpoint.
//!
//! Failures are reported as a typed [`FetchOutcome`] rather than an `Err` so
//! that callers which don't care can collapse them into "no posts" with
//! [`FetchOutcome::into_posts`], while callers which do can tell the two
//! apart.

use crate::post::RawPost;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use tracing::{debug, error, warn};
use url::Url;

/// Anything which can produce the full list of posts. Every call is a fresh
/// fetch; implementations must not cache.
pub trait PostSource {
    fn fetch_posts(&self) -> impl Future<Output = FetchOutcome> + Send;
}

/// The result of one fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The source answered with a well-formed list, possibly empty.
    Fetched(Vec<RawPost>),

    /// The fetch or the decoding of its response failed.
    Failed(FetchError),
}

impl FetchOutcome {
    /// Returns the fetched posts, or logs the failure and returns an empty
    /// list.
    pub fn into_posts(self) -> Vec<RawPost> {
        match self {
            FetchOutcome::Fetched(posts) => posts,
            FetchOutcome::Failed(err @ FetchError::NotAnArray(_)) => {
                warn!(error = %err, "unexpected API response format, expected an array");
                Vec::new()
            }
            FetchOutcome::Failed(err) => {
                error!(error = %err, "error fetching WordPress posts");
                Vec::new()
            }
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed(_))
    }
}

impl From<Result<Vec<RawPost>, FetchError>> for FetchOutcome {
    fn from(result: Result<Vec<RawPost>, FetchError>) -> FetchOutcome {
        match result {
            Ok(posts) => FetchOutcome::Fetched(posts),
            Err(err) => FetchOutcome::Failed(err),
        }
    }
}

/// Fetches posts with a single `GET` against a fixed endpoint (normally
/// `{WP_API_URL}/latest-posts`, see [`crate::config::Config`]). No retries
/// and no timeout beyond the client default.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    endpoint: Url,
}

impl HttpSource {
    pub fn new(endpoint: Url) -> HttpSource {
        HttpSource {
            client: Client::new(),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn fetch(&self) -> Result<Vec<RawPost>, FetchError> {
        debug!(endpoint = %self.endpoint, "fetching posts");
        let response = self
            .client
            .get(self.endpoint.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.bytes().await?;
        let posts = decode_posts(&body)?;
        debug!(count = posts.len(), "fetched posts");
        Ok(posts)
    }
}

impl PostSource for HttpSource {
    async fn fetch_posts(&self) -> FetchOutcome {
        self.fetch().await.into()
    }
}

/// Decodes a `latest-posts` response body. The body must be a JSON array
/// and every element must carry a usable `ID`; otherwise the whole body is
/// rejected.
pub fn decode_posts(body: &[u8]) -> Result<Vec<RawPost>, FetchError> {
    let value: Value = serde_json::from_slice(body).map_err(FetchError::Json)?;
    if !value.is_array() {
        return Err(FetchError::NotAnArray(json_kind(&value)));
    }
    serde_json::from_value(value).map_err(FetchError::Schema)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Represents a failure to fetch or decode the post list.
#[derive(Debug)]
pub enum FetchError {
    /// Returned when the request couldn't be sent or its body couldn't be
    /// read.
    Transport(reqwest::Error),

    /// Returned when the server answers with a non-2xx status.
    Status(StatusCode),

    /// Returned when the body isn't JSON.
    Json(serde_json::Error),

    /// Returned when the body is JSON but not an array. Holds the kind of
    /// JSON value that was found instead.
    NotAnArray(&'static str),

    /// Returned when an element of the array isn't a post, e.g. because it
    /// has no usable `ID`.
    Schema(serde_json::Error),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FetchError::Transport(err) => write!(f, "{}", err),
            FetchError::Status(status) => write!(f, "unexpected status: {}", status),
            FetchError::Json(err) => write!(f, "decoding JSON: {}", err),
            FetchError::NotAnArray(kind) => {
                write!(f, "expected a JSON array, found {}", kind)
            }
            FetchError::Schema(err) => write!(f, "decoding posts: {}", err),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Transport(err) => Some(err),
            FetchError::Status(_) => None,
            FetchError::Json(err) => Some(err),
            FetchError::NotAnArray(_) => None,
            FetchError::Schema(err) => Some(err),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    /// Converts [`reqwest::Error`]s into [`FetchError`]. This allows us to use
    /// the `?` operator on requests and response bodies.
    fn from(err: reqwest::Error) -> FetchError {
        FetchError::Transport(err)
    }
}
