//! The read operations pages are built from: the sorted post listing, the
//! list of post routes, and single-post lookup. Each operation performs one
//! fresh fetch through its [`PostSource`] and never fails; an unreachable or
//! misbehaving source reads as a blog with no posts (see
//! [`FetchOutcome::into_posts`]). Use [`Posts::fetch`] to observe the failure
//! instead.

use crate::collate::Collation;
use crate::post::{PostDetail, PostSummary, RawPost, RouteParam};
use crate::source::{FetchOutcome, PostSource};

/// Query functions over a [`PostSource`].
pub struct Posts<S> {
    source: S,
}

impl<S: PostSource> Posts<S> {
    pub fn new(source: S) -> Posts<S> {
        Posts { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetches the raw posts without collapsing failures.
    pub async fn fetch(&self) -> FetchOutcome {
        self.source.fetch_posts().await
    }

    /// Returns every post as a [`PostSummary`], ordered by title.
    pub async fn list_sorted(&self) -> Vec<PostSummary> {
        let mut posts = self.fetch().await.into_posts();
        if posts.is_empty() {
            return Vec::new();
        }
        sort_by_title(&mut posts);
        posts.iter().map(PostSummary::from).collect()
    }

    /// Returns one [`RouteParam`] per post in the order the source lists
    /// them. Duplicate IDs yield duplicate routes.
    pub async fn list_identifiers(&self) -> Vec<RouteParam> {
        self.fetch()
            .await
            .into_posts()
            .iter()
            .map(RouteParam::from)
            .collect()
    }

    /// Returns the post whose ID is exactly `id`, or a [`PostDetail`] with
    /// every field empty when there is none.
    pub async fn get_by_id(&self, id: &str) -> PostDetail {
        self.find_by_id(id).await.unwrap_or_default()
    }

    /// Returns the post whose ID is exactly `id`, if any.
    pub async fn find_by_id(&self, id: &str) -> Option<PostDetail> {
        let posts = self.fetch().await.into_posts();
        find(&posts, id).map(PostDetail::from)
    }
}

/// Sorts posts by title using a [`Collation`]. The sort is stable, so posts
/// with equal titles keep their relative order.
pub fn sort_by_title(posts: &mut [RawPost]) {
    let collation = Collation::new();
    posts.sort_by(|a, b| collation.compare(a.title(), b.title()));
}

/// Returns the first post whose ID string equals `id`. No normalization is
/// applied, so `"01"` doesn't match post `1`.
pub fn find<'a>(posts: &'a [RawPost], id: &str) -> Option<&'a RawPost> {
    posts.iter().find(|post| post.id.as_str() == id)
}
