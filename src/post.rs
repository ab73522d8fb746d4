//! Defines the [`RawPost`] type as it arrives from the WordPress
//! `latest-posts` endpoint and the canonical shapes it is normalized into:
//! [`PostSummary`], [`PostDetail`], and [`RouteParam`]. See [`convert_date`]
//! for the date-format conversion applied during normalization.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// The identifier of a WordPress post, held in its string form. WordPress
/// sends `ID` as a JSON number; a non-empty JSON string is also accepted and
/// kept verbatim. Anything else (including `null`) fails to deserialize.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PostId(String);

impl PostId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PostId {
    fn deserialize<D>(deserializer: D) -> Result<PostId, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PostIdVisitor;

        impl<'de> Visitor<'de> for PostIdVisitor {
            type Value = PostId;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a numeric post ID or a non-empty string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<PostId, E> {
                Ok(PostId(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<PostId, E> {
                Ok(PostId(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<PostId, E> {
                if !v.is_finite() {
                    return Err(E::invalid_value(de::Unexpected::Float(v), &self));
                }
                // Whole floats stringify without a fractional part (`7.0` is
                // post `7`).
                Ok(PostId(if v.fract() == 0.0 && v.abs() < 1e15 {
                    format!("{}", v as i64)
                } else {
                    v.to_string()
                }))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<PostId, E> {
                if v.is_empty() {
                    return Err(E::invalid_value(de::Unexpected::Str(v), &self));
                }
                Ok(PostId(v.to_owned()))
            }
        }

        deserializer.deserialize_any(PostIdVisitor)
    }
}

/// A post exactly as the remote API describes it. Only `ID` is required; the
/// remaining fields may be missing or `null`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RawPost {
    #[serde(rename = "ID")]
    pub id: PostId,

    #[serde(default)]
    pub post_title: Option<String>,

    /// Formatted as `YYYY-MM-DD HH:mm:ss`.
    #[serde(default)]
    pub post_date: Option<String>,

    /// Rendered HTML.
    #[serde(default)]
    pub post_content: Option<String>,
}

impl RawPost {
    /// The title used for sorting and display. A missing title is empty.
    pub fn title(&self) -> &str {
        self.post_title.as_deref().unwrap_or_default()
    }
}

/// Converts a WordPress date (`YYYY-MM-DD HH:mm:ss`) into its ISO 8601 form
/// (`YYYY-MM-DDTHH:mm:ss`) by replacing the first space with `T`. Only the
/// first space is touched and the calendar values are not validated.
pub fn convert_date(wp_date: &str) -> String {
    wp_date.replacen(' ', "T", 1)
}

/// Formats an ISO date produced by [`convert_date`] for humans, e.g.
/// `January 2, 2024`. Values which don't parse are returned unchanged.
pub fn display_date(iso_date: &str) -> String {
    use chrono::{NaiveDate, NaiveDateTime};

    const HUMAN: &str = "%B %-d, %Y";
    if let Ok(date_time) = NaiveDateTime::parse_from_str(iso_date, "%Y-%m-%dT%H:%M:%S") {
        return date_time.format(HUMAN).to_string();
    }
    match NaiveDate::parse_from_str(iso_date, "%Y-%m-%d") {
        Ok(date) => date.format(HUMAN).to_string(),
        Err(_) => iso_date.to_owned(),
    }
}

/// The listing shape of a post: everything but the body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PostSummary {
    pub id: String,
    pub title: String,
    pub date: String,
}

impl From<&RawPost> for PostSummary {
    fn from(post: &RawPost) -> PostSummary {
        PostSummary {
            id: post.id.to_string(),
            title: post.title().to_owned(),
            date: convert_date(post.post_date.as_deref().unwrap_or_default()),
        }
    }
}

/// The full shape of a post. [`PostDetail::default`] (every field empty) is
/// what a lookup for an unknown ID yields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PostDetail {
    pub id: String,
    pub title: String,
    pub date: String,
    pub content: String,
}

impl From<&RawPost> for PostDetail {
    fn from(post: &RawPost) -> PostDetail {
        let PostSummary { id, title, date } = PostSummary::from(post);
        PostDetail {
            id,
            title,
            date,
            content: post.post_content.clone().unwrap_or_default(),
        }
    }
}

/// One statically generated route, serialized as `{"params": {"id": "..."}}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RouteParam {
    pub params: RouteParams,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RouteParams {
    pub id: String,
}

impl From<&RawPost> for RouteParam {
    fn from(post: &RawPost) -> RouteParam {
        RouteParam {
            params: RouteParams {
                id: post.id.to_string(),
            },
        }
    }
}
