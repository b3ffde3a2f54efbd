//! Markup escaping for untrusted text.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Characters that must not reach markup unescaped.
static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[&<>"'`=/]"#).expect("markup escape class is a valid regex"));

fn entity(ch: &str) -> &'static str {
    match ch {
        "&" => "&amp;",
        "<" => "&lt;",
        ">" => "&gt;",
        "\"" => "&quot;",
        "'" => "&#39;",
        "/" => "&#x2F;",
        "`" => "&#x60;",
        "=" => "&#x3D;",
        _ => "",
    }
}

/// Escape `input` so it can be embedded in HTML text or attribute values.
///
/// Replaces `& < > " ' / `` =` with character references. Escaping is not
/// idempotent: an already escaped `&amp;` becomes `&amp;amp;`.
///
/// ```
/// use saviour::sanitize::escape_html;
///
/// assert_eq!(escape_html("<b>A+</b>"), "&lt;b&gt;A+&lt;&#x2F;b&gt;");
/// ```
#[must_use]
pub fn escape_html(input: &str) -> Cow<'_, str> {
    UNSAFE_CHARS.replace_all(input, |caps: &Captures<'_>| entity(&caps[0]))
}

/// Escape an optional value, treating `None` as the empty string.
#[must_use]
pub fn escape_opt(input: Option<&str>) -> Cow<'_, str> {
    escape_html(input.unwrap_or_default())
}
