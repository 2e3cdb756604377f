//! Just enough HTML handling to pull listing fields out of dealer pages.
//!
//! This is pattern matching over markup, not a parser: it finds opening
//! tags, their attributes and the text up to the first matching close tag.

use regex::Regex;
use std::sync::LazyLock;

static OPEN_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<([a-z][a-z0-9]*)\b([^>]*)>").expect("valid open tag regex")
});
static ANY_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z_:][-a-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("valid attribute regex")
});
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*").expect("valid number regex"));
static MILES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d[\d,]*)\s*mi\b").expect("valid miles regex"));

/// One element found in a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Element<'a> {
    pub name: String,
    pub attrs: &'a str,
    pub inner: &'a str,
    /// Byte offset of the opening tag
    pub start: usize,
}

impl Element<'_> {
    pub fn attr(&self, name: &str) -> Option<String> {
        ATTR_RE.captures_iter(self.attrs).find_map(|caps| {
            if !caps[1].eq_ignore_ascii_case(name) {
                return None;
            }
            caps.get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| decode_entities(m.as_str()))
        })
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_whitespace().any(|token| token == class))
            .unwrap_or(false)
    }

    /// Visible text with tags removed and whitespace collapsed.
    pub fn text(&self) -> String {
        strip_tags(self.inner)
    }
}

/// Elements that never have content or a close tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Every element in document order. `inner` runs to the first close tag of
/// the same name, so nested elements of one kind are not paired correctly.
pub fn elements(html: &str) -> Vec<Element<'_>> {
    let lower = html.to_ascii_lowercase();

    OPEN_TAG_RE
        .captures_iter(html)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps[1].to_ascii_lowercase();
            let attrs = caps.get(2)?.as_str();
            let after = whole.end();
            let self_closing = attrs.trim_end().ends_with('/');
            let inner = if self_closing || VOID_ELEMENTS.contains(&name.as_str()) {
                ""
            } else {
                close_tag_offset(&lower[after..], &name)
                    .map(|offset| &html[after..after + offset])
                    .unwrap_or("")
            };

            Some(Element {
                name,
                attrs,
                inner,
                start: whole.start(),
            })
        })
        .collect()
}

/// Offset of the first `</name>` in `lower`. `</name` must be followed by
/// `>` or whitespace, so `</a` does not match `</abbr>`.
fn close_tag_offset(lower: &str, name: &str) -> Option<usize> {
    let needle = format!("</{}", name);
    let mut from = 0;
    while let Some(found) = lower[from..].find(&needle) {
        let at = from + found;
        let rest = &lower[at + needle.len()..];
        match rest.bytes().next() {
            Some(b'>') => return Some(at),
            Some(b) if b.is_ascii_whitespace() => return Some(at),
            _ => from = at + needle.len(),
        }
    }
    None
}

/// First element carrying one of `classes`, trying the classes in order.
pub fn first_with_class<'e, 'a>(elements: &'e [Element<'a>], classes: &[&str]) -> Option<&'e Element<'a>> {
    classes
        .iter()
        .find_map(|class| elements.iter().find(|e| e.has_class(class)))
}

/// First element with one of the tag names, trying the names in order.
pub fn first_with_tag<'e, 'a>(elements: &'e [Element<'a>], tags: &[&str]) -> Option<&'e Element<'a>> {
    tags.iter()
        .find_map(|tag| elements.iter().find(|e| e.name == *tag))
}

pub fn strip_tags(html: &str) -> String {
    let text = ANY_TAG_RE.replace_all(html, " ");
    let text = decode_entities(&text);
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&#36;", "$")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// First number in the text, ignoring thousands separators: "$13,000" -> 13000.
pub fn parse_int(text: &str) -> Option<u32> {
    NUMBER_RE
        .find(text)
        .and_then(|m| m.as_str().replace(',', "").parse().ok())
}

/// Mileage written as "90,000 mi." anywhere in the text.
pub fn find_miles(text: &str) -> Option<u32> {
    MILES_RE
        .captures(text)
        .and_then(|caps| caps[1].replace(',', "").parse().ok())
}

/// Parts of a listing title such as "Used 2017 Honda Pilot EX-L".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleParts {
    pub year: Option<i32>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub trim: Option<String>,
    /// "new", "cpo" or "used" when the title starts with a condition word
    pub age_category: Option<String>,
}

pub fn parse_title(title: &str) -> TitleParts {
    let tokens: Vec<&str> = title.split_whitespace().collect();
    let mut parts = TitleParts::default();

    parts.age_category = tokens.first().and_then(|first| {
        match first.to_ascii_lowercase().as_str() {
            "new" => Some("new".to_string()),
            "used" => Some("used".to_string()),
            "certified" | "cpo" => Some("cpo".to_string()),
            _ => None,
        }
    });

    let year_at = tokens.iter().position(|t| {
        t.len() == 4
            && t.chars().all(|c| c.is_ascii_digit())
            && t.parse::<i32>().is_ok_and(|y| (1900..=2100).contains(&y))
    });

    let rest: &[&str] = match year_at {
        Some(i) => {
            parts.year = tokens[i].parse().ok();
            &tokens[i + 1..]
        }
        None => &tokens,
    };

    parts.make = rest.first().map(|s| s.to_string());
    parts.model = rest.get(1).map(|s| s.to_string());
    if rest.len() > 2 {
        parts.trim = Some(rest[2..].join(" "));
    }

    parts
}
