//! Configuration. [`Config`] locates the WordPress API and is built once at
//! startup from the environment; [`SiteConfig`] describes the static site
//! and is loaded from a `wpsite.yaml` project file plus the theme's
//! `theme.yaml`.

use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

/// The environment variable holding the WordPress API base URL, e.g.
/// `https://example.org/wp-json/custom/v1`.
pub const API_URL_VAR: &str = "WP_API_URL";

/// The name of the project file [`SiteConfig::from_directory`] looks for.
pub const PROJECT_FILE: &str = "wpsite.yaml";

const LATEST_POSTS: &str = "latest-posts";

/// Where to fetch posts from. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// `{WP_API_URL}/latest-posts`.
    pub posts_endpoint: Url,
}

impl Config {
    /// Builds the configuration from [`API_URL_VAR`]. Fails when the variable
    /// is unset, empty, or not a URL.
    pub fn from_env() -> Result<Config> {
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Config::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(API_URL_VAR) {
            Some(value) if !value.trim().is_empty() => Config::from_api_url(value.trim()),
            _ => Err(Error::MissingVar(API_URL_VAR)),
        }
    }

    pub fn from_api_url(api_url: &str) -> Result<Config> {
        // Without a trailing slash, `Url::join` would replace the last path
        // segment instead of appending to it.
        let with_slash = match api_url.ends_with('/') {
            true => api_url.to_owned(),
            false => format!("{}/", api_url),
        };
        let api_url = Url::parse(&with_slash).map_err(|err| Error::UrlParse {
            value: with_slash.clone(),
            err,
        })?;
        let posts_endpoint = api_url.join(LATEST_POSTS).map_err(|err| Error::UrlParse {
            value: with_slash,
            err,
        })?;
        Ok(Config { posts_endpoint })
    }
}

#[derive(Deserialize)]
struct Project {
    pub title: String,

    /// The URL the site will be served from. Page links are absolute URLs
    /// built on top of it.
    pub site_root: Url,

    #[serde(default = "default_posts_path")]
    pub posts_path: String,
}

fn default_posts_path() -> String {
    String::from("posts")
}

#[derive(Deserialize)]
struct Theme {
    index_template: Vec<PathBuf>,
    posts_template: Vec<PathBuf>,
}

/// Everything needed to render the static site.
#[derive(Clone, Debug)]
pub struct SiteConfig {
    pub title: String,
    pub home_page: Url,
    pub posts_url: Url,
    pub index_template: Vec<PathBuf>,
    pub posts_template: Vec<PathBuf>,
    pub output_directory: PathBuf,
    pub posts_output_directory: PathBuf,
}

impl SiteConfig {
    /// Searches `dir` and then each of its ancestors for [`PROJECT_FILE`]
    /// and loads the first one found.
    pub fn from_directory(dir: &Path, output_directory: &Path) -> Result<SiteConfig> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            return SiteConfig::from_project_file(&path, output_directory);
        }
        match dir.parent() {
            Some(parent) => SiteConfig::from_directory(parent, output_directory),
            None => Err(Error::ProjectNotFound),
        }
    }

    /// Loads a project file and the `theme/theme.yaml` next to it. Template
    /// paths in the theme file are relative to the theme directory.
    pub fn from_project_file(path: &Path, output_directory: &Path) -> Result<SiteConfig> {
        let project: Project = serde_yaml::from_reader(open(path)?)
            .map_err(|err| Error::Yaml { path: path.to_owned(), err })?;
        let project_root = path.parent().ok_or(Error::ProjectNotFound)?;
        let theme_dir = project_root.join("theme");
        let theme_path = theme_dir.join("theme.yaml");
        let theme: Theme = serde_yaml::from_reader(open(&theme_path)?)
            .map_err(|err| Error::Yaml { path: theme_path.clone(), err })?;

        let posts_path = project.posts_path.trim_matches('/').to_owned();
        let posts_url = project
            .site_root
            .join(&format!("{}/", posts_path))
            .map_err(|err| Error::UrlParse {
                value: posts_path.clone(),
                err,
            })?;

        Ok(SiteConfig {
            title: project.title,
            home_page: project.site_root,
            posts_url,
            index_template: theme
                .index_template
                .iter()
                .map(|relpath| theme_dir.join(relpath))
                .collect(),
            posts_template: theme
                .posts_template
                .iter()
                .map(|relpath| theme_dir.join(relpath))
                .collect(),
            output_directory: output_directory.to_owned(),
            posts_output_directory: output_directory.join(&posts_path),
        })
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|err| Error::Io {
        path: path.to_owned(),
        err,
    })
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents a configuration problem. These are fatal.
#[derive(Debug)]
pub enum Error {
    /// Returned when a required environment variable is unset or empty.
    MissingVar(&'static str),

    /// Returned when a configured URL can't be parsed.
    UrlParse { value: String, err: url::ParseError },

    /// Returned when no project file is found in the directory or any of
    /// its ancestors.
    ProjectNotFound,

    /// Returned for I/O problems reading a configuration file.
    Io { path: PathBuf, err: std::io::Error },

    /// Returned when a configuration file isn't valid YAML for its schema.
    Yaml { path: PathBuf, err: serde_yaml::Error },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingVar(var) => write!(f, "Missing `{}` in the environment", var),
            Error::UrlParse { value, err } => write!(f, "Parsing URL `{}`: {}", value, err),
            Error::ProjectNotFound => write!(
                f,
                "Could not find `{}` in any parent directory",
                PROJECT_FILE
            ),
            Error::Io { path, err } => write!(f, "Opening `{}`: {}", path.display(), err),
            Error::Yaml { path, err } => write!(f, "Loading `{}`: {}", path.display(), err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingVar(_) => None,
            Error::UrlParse { err, .. } => Some(err),
            Error::ProjectNotFound => None,
            Error::Io { err, .. } => Some(err),
            Error::Yaml { err, .. } => Some(err),
        }
    }
}
