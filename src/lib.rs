//! The library code for the `wpsite` static site generator, which renders a
//! blog whose posts live in a WordPress installation exposing a custom
//! `latest-posts` endpoint. The architecture breaks down into three layers:
//!
//! 1. Fetching raw posts from the endpoint ([`crate::source`])
//! 2. Normalizing them into canonical records ([`crate::post`]) and querying
//!    them: the title-ordered listing, the route list, and single-post lookup
//!    ([`crate::query`])
//! 3. Rendering the index and one page per post to disk ([`crate::build`],
//!    [`crate::write`])
//!
//! Fetching never fails loudly. An unreachable endpoint or a malformed
//! response is logged and reads as a blog without posts; only missing
//! configuration ([`crate::config`]) is fatal.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod collate;
pub mod config;
pub mod post;
pub mod query;
pub mod source;
pub mod value;
pub mod write;
