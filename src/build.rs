//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: enumerating post routes,
//! loading each post and the sorted listing through [`crate::query`], and
//! rendering index and post pages ([`crate::write`]).

use crate::config::SiteConfig;
use crate::post::PostDetail;
use crate::query::Posts;
use crate::source::PostSource;
use crate::value::FUNCS;
use crate::write::{Error as WriteError, Writer};
use gtmpl::Template;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Builds the site from a [`SiteConfig`]. Routes come from
/// [`Posts::list_identifiers`] and each post page is loaded with
/// [`Posts::get_by_id`]; the index page lists [`Posts::list_sorted`]. Every
/// step fetches afresh, so a post deleted mid-build yields an empty detail,
/// which is skipped. Returns the number of post pages written.
pub async fn build_site<S: PostSource>(config: &SiteConfig, posts: &Posts<S>) -> Result<usize> {
    // Parse the templates first so a broken theme fails before any fetch.
    let index_template = parse_template(config.index_template.iter())?;
    let posts_template = parse_template(config.posts_template.iter())?;

    let routes = posts.list_identifiers().await;
    info!(routes = routes.len(), "enumerated post routes");

    let mut details: Vec<PostDetail> = Vec::with_capacity(routes.len());
    for route in &routes {
        let id = &route.params.id;
        if !is_safe_file_stem(id) {
            warn!(id = %id, "skipping post with an ID unusable as a file name");
            continue;
        }
        let detail = posts.get_by_id(id).await;
        if detail.id.is_empty() {
            warn!(id = %id, "post disappeared while building, skipping");
            continue;
        }
        details.push(detail);
    }

    let summaries: Vec<_> = posts
        .list_sorted()
        .await
        .into_iter()
        .filter(|summary| is_safe_file_stem(&summary.id))
        .collect();

    // Start from a clean posts directory so posts removed upstream don't
    // linger. The root output directory is left alone in case the user
    // pointed it somewhere with other contents.
    rmdir(&config.posts_output_directory)?;

    let writer = Writer {
        posts_template: &posts_template,
        index_template: &index_template,
        title: &config.title,
        home_page: &config.home_page,
        posts_url: &config.posts_url,
        output_directory: &config.output_directory,
        posts_output_directory: &config.posts_output_directory,
    };
    writer.write_posts(&details)?;
    writer.write_index(&summaries)?;

    info!(
        posts = details.len(),
        output = %config.output_directory.display(),
        "site built"
    );
    Ok(details.len())
}

/// Post IDs become file names; reject anything which could leave the posts
/// directory.
fn is_safe_file_stem(id: &str) -> bool {
    !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '\\'])
}

// Loads the template file contents, joins them with newlines, and parses the
// result into a template with the functions from `value::FUNCS`.
fn parse_template<P: AsRef<Path>>(template_files: impl Iterator<Item = P>) -> Result<Template> {
    let mut contents = String::new();
    for template_file in template_files {
        use std::io::Read;
        let template_file = template_file.as_ref();
        if !contents.is_empty() {
            contents.push('\n');
        }
        File::open(template_file)
            .map_err(|e| Error::OpenTemplateFile {
                path: template_file.to_owned(),
                err: e,
            })?
            .read_to_string(&mut contents)?;
    }

    let mut template = Template::default();
    template.add_funcs(FUNCS);
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during writing,
/// cleaning output directories, parsing template files, and other I/O.
/// Fetch failures are not among them; they read as an empty blog.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors writing pages to disk as HTML files.
    Write(WriteError),

    /// Returned for I/O problems while cleaning output directories.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Write(err) => write!(f, "{}", err),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate(err) => write!(f, "{}", err),
            Error::Io(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Write(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::RawPost;
    use crate::source::{FetchError, FetchOutcome};
    use std::fs;
    use url::Url;

    struct Fixed(Option<Vec<RawPost>>);

    impl PostSource for Fixed {
        async fn fetch_posts(&self) -> FetchOutcome {
            match &self.0 {
                Some(posts) => FetchOutcome::Fetched(posts.clone()),
                None => FetchOutcome::Failed(FetchError::NotAnArray("object")),
            }
        }
    }

    fn site(root: &Path) -> SiteConfig {
        let theme = root.join("theme");
        fs::create_dir_all(&theme).unwrap();
        fs::write(theme.join("index.html"), "{{ range .item }}{{ .id }}:{{ .title }};{{ end }}").unwrap();
        fs::write(theme.join("post.html"), "<h1>{{ .item.title }}</h1>{{ .item.content }}").unwrap();
        let out = root.join("out");
        SiteConfig {
            title: String::from("Blog"),
            home_page: Url::parse("https://example.org/").unwrap(),
            posts_url: Url::parse("https://example.org/posts/").unwrap(),
            index_template: vec![theme.join("index.html")],
            posts_template: vec![theme.join("post.html")],
            posts_output_directory: out.join("posts"),
            output_directory: out,
        }
    }

    fn posts(json: &str) -> Posts<Fixed> {
        Posts::new(Fixed(Some(serde_json::from_str(json).unwrap())))
    }

    #[tokio::test]
    async fn test_build_site() {
        let root = tempfile::tempdir().unwrap();
        let config = site(root.path());

        // A page left over from an earlier build must not survive.
        fs::create_dir_all(&config.posts_output_directory).unwrap();
        fs::write(config.posts_output_directory.join("77.html"), "stale").unwrap();

        let written = build_site(
            &config,
            &posts(
                r#"[
                    {"ID": 2, "post_title": "B", "post_date": "2024-01-02 10:00:00"},
                    {"ID": 1, "post_title": "A", "post_content": "<p>first</p>"},
                    {"ID": "../escape", "post_title": "C"}
                ]"#,
            ),
        )
        .await
        .unwrap();

        assert_eq!(2, written);
        assert_eq!(
            "1:A;2:B;",
            fs::read_to_string(config.output_directory.join("index.html")).unwrap()
        );
        assert_eq!(
            "<h1>A</h1><p>first</p>",
            fs::read_to_string(config.posts_output_directory.join("1.html")).unwrap()
        );
        assert!(config.posts_output_directory.join("2.html").is_file());
        assert!(!config.posts_output_directory.join("77.html").exists());
        assert!(!root.path().join("escape.html").exists());
    }

    #[tokio::test]
    async fn test_build_with_failed_fetch_is_empty_site() {
        let root = tempfile::tempdir().unwrap();
        let config = site(root.path());
        let written = build_site(&config, &Posts::new(Fixed(None))).await.unwrap();
        assert_eq!(0, written);
        assert_eq!(
            "",
            fs::read_to_string(config.output_directory.join("index.html")).unwrap()
        );
    }

    #[tokio::test]
    async fn test_missing_template() {
        let root = tempfile::tempdir().unwrap();
        let mut config = site(root.path());
        config.posts_template = vec![root.path().join("nope.html")];
        assert!(matches!(
            build_site(&config, &posts("[]")).await,
            Err(Error::OpenTemplateFile { .. })
        ));
    }

    #[tokio::test]
    async fn test_demo_theme_escapes_titles() {
        let demo = Path::new(env!("CARGO_MANIFEST_DIR")).join("demo");
        let out = tempfile::tempdir().unwrap();
        let config = SiteConfig::from_project_file(&demo.join("wpsite.yaml"), out.path()).unwrap();
        build_site(
            &config,
            &posts(
                r#"[{
                    "ID": 1,
                    "post_title": "Q&A <script>alert(1)</script>",
                    "post_content": "<p>raw <em>body</em></p>"
                }]"#,
            ),
        )
        .await
        .unwrap();

        let escaped = "Q&amp;A &lt;script&gt;alert(1)&lt;/script&gt;";
        let page = fs::read_to_string(config.posts_output_directory.join("1.html")).unwrap();
        assert!(page.contains(&format!("<h1>{}</h1>", escaped)), "{}", page);
        assert!(page.contains(&format!("<title>{}</title>", escaped)), "{}", page);
        assert!(page.contains("<p>raw <em>body</em></p>"), "{}", page);
        assert!(!page.contains("<script>"), "{}", page);

        let index = fs::read_to_string(config.output_directory.join("index.html")).unwrap();
        assert!(index.contains(&format!(">{}</a>", escaped)), "{}", index);
        assert!(!index.contains("<script>"), "{}", index);
    }

    #[test]
    fn test_is_safe_file_stem() {
        assert!(is_safe_file_stem("42"));
        assert!(is_safe_file_stem("hello-world"));
        for id in ["", ".", "..", "a/b", "..\\x"] {
            assert!(!is_safe_file_stem(id), "{}", id);
        }
    }
}
