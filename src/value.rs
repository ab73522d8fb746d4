//! Conversions from canonical post records into template [`Value`]s. Both
//! shapes expose `id`, `title`, `date` (ISO), and `display_date` (see
//! [`display_date`]); [`PostDetail`] adds `content`. Values are passed to
//! templates as-is, so themes escape text fields with the [`html`] function
//! and leave `content` (already HTML) raw.

use crate::post::{display_date, PostDetail, PostSummary};
use gtmpl::{Func, Value};
use pulldown_cmark::escape::escape_html;
use std::collections::HashMap;

/// Functions registered on every site template.
pub const FUNCS: &[(&str, Func)] = &[("html", html as Func)];

/// `{{ html .item.title }}` escapes its argument's text for use in HTML
/// element content and quoted attribute values.
pub fn html(args: &[Value]) -> Result<Value, String> {
    let text = match args {
        [Value::String(s)] => s.clone(),
        [Value::Nil] => String::new(),
        [other] => other.to_string(),
        _ => return Err(String::from("html requires one argument")),
    };
    let mut escaped = String::with_capacity(text.len());
    escape_html(&mut escaped, &text).map_err(|err| err.to_string())?;
    Ok(Value::String(escaped))
}

fn base_fields(id: &str, title: &str, date: &str) -> HashMap<String, Value> {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("id".to_owned(), Value::String(id.to_owned()));
    m.insert("title".to_owned(), Value::String(title.to_owned()));
    m.insert("date".to_owned(), Value::String(date.to_owned()));
    m.insert("display_date".to_owned(), Value::String(display_date(date)));
    m
}

impl From<&PostSummary> for Value {
    fn from(summary: &PostSummary) -> Value {
        Value::Object(base_fields(&summary.id, &summary.title, &summary.date))
    }
}

impl From<&PostDetail> for Value {
    fn from(detail: &PostDetail) -> Value {
        let mut m = base_fields(&detail.id, &detail.title, &detail.date);
        m.insert("content".to_owned(), Value::String(detail.content.clone()));
        Value::Object(m)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
        match value {
            Value::Object(m) => match m.get(key) {
                Some(Value::String(s)) => Some(s),
                _ => None,
            },
            _ => None,
        }
    }

    #[test]
    fn test_detail_value() {
        let detail = PostDetail {
            id: String::from("1"),
            title: String::from("A"),
            date: String::from("2024-01-01T09:00:00"),
            content: String::from("<p>hi</p>"),
        };
        let value = Value::from(&detail);
        assert_eq!(Some("1"), field(&value, "id"));
        assert_eq!(Some("2024-01-01T09:00:00"), field(&value, "date"));
        assert_eq!(Some("January 1, 2024"), field(&value, "display_date"));
        assert_eq!(Some("<p>hi</p>"), field(&value, "content"));
    }

    #[test]
    fn test_summary_value_has_no_content() {
        let value = Value::from(&PostSummary::default());
        assert_eq!(None, field(&value, "content"));
        assert_eq!(Some(""), field(&value, "display_date"));
    }

    #[test]
    fn test_html_escapes_markup() {
        assert_eq!(
            Ok(Value::from("Q&amp;A &lt;b&gt;&quot;x&quot;&lt;/b&gt;")),
            html(&[Value::from("Q&A <b>\"x\"</b>")])
        );
        assert_eq!(Ok(Value::from("")), html(&[Value::Nil]));
        assert!(html(&[]).is_err());
    }
}
