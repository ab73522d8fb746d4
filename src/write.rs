use crate::post::{PostDetail, PostSummary};
use gtmpl::{Template, Value};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use url::Url;

/// Responsible for templating and writing HTML pages to disk from canonical
/// post records.
pub struct Writer<'a> {
    /// The template for post pages.
    pub posts_template: &'a Template,

    /// The template for the index page.
    pub index_template: &'a Template,

    /// The site title. Made available to both templates as `site_title`, so
    /// that it doesn't collide with `.item.title` on post pages.
    pub title: &'a str,

    /// The URL for the site's home page. Made available to both templates as
    /// `home_page`, typically as the destination for the site-header link.
    pub home_page: &'a Url,

    /// The base URL for post pages. The page for post `{id}` is located at
    /// `{posts_url}{id}.html`, with `{id}.html` percent-encoded as a single
    /// path segment.
    pub posts_url: &'a Url,

    /// The directory in which `index.html` is written.
    pub output_directory: &'a Path,

    /// The directory in which post pages are written, as `{id}.html`.
    pub posts_output_directory: &'a Path,
}

impl Writer<'_> {
    /// Takes a single [`Page`], templates it, and writes it to disk.
    fn write_page(&self, page: &Page) -> Result<()> {
        let mut value = page.to_value();
        if let Value::Object(obj) = &mut value {
            obj.insert(
                "home_page".to_owned(),
                Value::String(self.home_page.to_string()),
            );
            obj.insert("site_title".to_owned(), Value::String(self.title.to_owned()));
        }
        let context = gtmpl::Context::from(value)?;
        page.template
            .execute(&mut std::fs::File::create(&page.file_path)?, &context)?;
        Ok(())
    }

    /// Returns the URL of the page for the post with the given `id`. The ID
    /// is never parsed as a relative URL, so `:`, `?` and `#` stay part of
    /// the file name.
    pub fn post_url(&self, id: &str) -> Result<Url> {
        let mut url = self.posts_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::CannotBeABase(self.posts_url.clone()))?
            .pop_if_empty()
            .push(&format!("{}.html", id));
        Ok(url)
    }

    /// Writes `index.html`, listing `summaries` in the given order. Each item
    /// carries a `url` field pointing at its post page.
    pub fn write_index(&self, summaries: &[PostSummary]) -> Result<()> {
        let items = summaries
            .iter()
            .map(|summary| {
                let mut item = Value::from(summary);
                if let Value::Object(obj) = &mut item {
                    obj.insert(
                        "url".to_owned(),
                        Value::String(self.post_url(&summary.id)?.to_string()),
                    );
                }
                Ok(item)
            })
            .collect::<Result<Vec<Value>>>()?;

        std::fs::create_dir_all(self.output_directory)?;
        self.write_page(&Page {
            item: Value::Array(items),
            file_path: self.output_directory.join("index.html"),
            prev: None,
            next: None,
            template: self.index_template,
        })
    }

    /// Writes one page per post. Pages link to their neighbours in the order
    /// given.
    pub fn write_posts(&self, details: &[PostDetail]) -> Result<()> {
        std::fs::create_dir_all(self.posts_output_directory)?;
        for page in self.post_pages(details)? {
            self.write_page(&page)?;
        }
        Ok(())
    }

    /// Creates all of the post [`Page`]s for a set of [`PostDetail`]s.
    fn post_pages<'t>(&'t self, details: &[PostDetail]) -> Result<Vec<Page<'t>>> {
        let urls = details
            .iter()
            .map(|detail| self.post_url(&detail.id))
            .collect::<Result<Vec<Url>>>()?;

        Ok(details
            .iter()
            .enumerate()
            .map(|(i, detail)| Page {
                item: Value::from(detail),
                file_path: self
                    .posts_output_directory
                    .join(format!("{}.html", detail.id)),
                prev: match i < 1 {
                    true => None,
                    false => Some(urls[i - 1].clone()),
                },
                next: match i + 1 >= details.len() {
                    true => None,
                    false => Some(urls[i + 1].clone()),
                },
                template: self.posts_template,
            })
            .collect())
    }
}

/// An object representing an output HTML file. A [`Page`] can be converted to a
/// [`Value`] and thus rendered in a template via [`Page::to_value`].
struct Page<'a> {
    /// The main item for the page.
    item: Value,

    /// The target location on disk for the output file.
    file_path: PathBuf,

    /// The URL for the previous page, if any.
    prev: Option<Url>,

    /// The URL for the next page, if any.
    next: Option<Url>,

    /// The template with which the page will be rendered.
    template: &'a Template,
}

impl Page<'_> {
    /// Converts a [`Page`] into a [`Value`]. The result is a [`Value::Object`]
    /// with fields `item`, `prev`, and `next` (see [`Page`] for descriptions).
    fn to_value(&self) -> Value {
        let option_to_value = |opt: &Option<Url>| match opt {
            Some(url) => Value::String(url.to_string()),
            None => Value::Nil,
        };

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("item".to_owned(), self.item.clone());
        m.insert("prev".to_owned(), option_to_value(&self.prev));
        m.insert("next".to_owned(), option_to_value(&self.next));
        Value::Object(m)
    }
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template(String),

    /// Returned when the posts URL can't have path segments, e.g.
    /// `mailto:` or `data:` URLs.
    CannotBeABase(Url),

    /// An error writing the output files.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`]. This
    /// allows us to use the `?` operator for fallible template operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => write!(f, "{}", err),
            Error::CannotBeABase(url) => write!(f, "`{}` can't be a base URL", url),
            Error::Io(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(_) => None,
            Error::CannotBeABase(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}
