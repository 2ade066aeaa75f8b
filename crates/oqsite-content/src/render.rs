//! Markdown to HTML rendering.
//!
//! Rendering matches how the site's articles are written: raw HTML is passed
//! through untouched, bare URLs become links, and a single newline inside a
//! paragraph is a line break rather than a space.

use std::sync::OnceLock;

use pulldown_cmark::{
    html, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, TextMergeStream,
};
use regex::Regex;

/// Top-level domains recognised without a scheme: the common generic set plus
/// two-letter country codes.
const FUZZY_TLDS: &str = "biz|com|edu|gov|net|org|pro|web|xxx|aero|asia|coop|info|museum|name|shop|dev|app|\
a[cdefgilmnoqrstuwxz]|b[abdefghijmnorstvwyz]|c[acdfghiklmnoruvwxyz]|d[ejkmoz]|e[cegrstu]|f[ijkmor]|\
g[abdefghilmnpqrstuwy]|h[kmnrtu]|i[delmnoqrst]|j[emop]|k[eghimnprwyz]|l[abcikrstuvy]|\
m[acdeghklmnopqrstuvwxyz]|n[acefgilopruz]|om|p[aefghklmnrstwy]|qa|r[eosuw]|\
s[abcdeghijklmnortuvxyz]|t[cdfghjklmnortvwz]|u[agksyz]|v[aceginu]|w[fs]|y[et]|z[amw]";

/// Bare link pattern: scheme-qualified or `www.` URLs, email addresses, and
/// bare hostnames ending in a known top-level domain.
fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let host = format!(r"(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+(?:{FUZZY_TLDS})\b");
        let pattern = format!(
            r#"(?i)\b(?:(?P<url>(?:https?://|www\.)[^\s<>"'`]+)|(?P<email>[a-z0-9._%+-]+@{host})|(?P<host>{host}(?:[/?#][^\s<>"'`]*)?))"#
        );
        Regex::new(&pattern).expect("valid URL pattern")
    })
}

/// Markdown renderer with linkify and soft-break handling.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    options: Options,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    /// Create a renderer with the site's Markdown extensions enabled.
    pub fn new() -> Self {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS;

        Self { options }
    }

    /// Render Markdown source to HTML.
    pub fn render(&self, raw: &str) -> String {
        let parser = TextMergeStream::new(Parser::new_ext(raw, self.options));

        let mut state = LinkifyState::default();
        let mut events: Vec<Event<'_>> = Vec::new();

        for event in parser {
            match event {
                Event::SoftBreak => events.push(Event::HardBreak),
                Event::Text(text) if state.allows_links() => linkify(text, &mut events),
                other => {
                    state.observe(&other);
                    events.push(other);
                }
            }
        }

        let mut html_output = String::with_capacity(raw.len() * 3 / 2);
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }
}

/// Render Markdown with the default renderer.
pub fn render_markdown(raw: &str) -> String {
    MarkdownRenderer::new().render(raw)
}

/// Tracks the spans where bare URLs must be left alone.
#[derive(Debug, Default)]
struct LinkifyState {
    code_block: bool,
    link_depth: usize,
    image_depth: usize,
    raw_anchor: bool,
}

impl LinkifyState {
    fn allows_links(&self) -> bool {
        !self.code_block && self.link_depth == 0 && self.image_depth == 0 && !self.raw_anchor
    }

    fn observe(&mut self, event: &Event<'_>) {
        match event {
            Event::Start(Tag::CodeBlock(_)) => self.code_block = true,
            Event::End(TagEnd::CodeBlock) => self.code_block = false,
            Event::Start(Tag::Link { .. }) => self.link_depth += 1,
            Event::End(TagEnd::Link) => self.link_depth = self.link_depth.saturating_sub(1),
            Event::Start(Tag::Image { .. }) => self.image_depth += 1,
            Event::End(TagEnd::Image) => self.image_depth = self.image_depth.saturating_sub(1),
            Event::End(TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item | TagEnd::TableCell) => {
                self.raw_anchor = false;
            }
            Event::InlineHtml(tag) => {
                let lower = tag.to_ascii_lowercase();
                if lower.starts_with("<a ") || lower.starts_with("<a>") {
                    self.raw_anchor = true;
                } else if lower.starts_with("</a") {
                    self.raw_anchor = false;
                }
            }
            _ => {}
        }
    }
}

/// Split a text run around bare URLs, emitting autolinks for each URL.
fn linkify<'a>(text: CowStr<'a>, events: &mut Vec<Event<'a>>) {
    let pattern = url_pattern();
    if !pattern.is_match(&text) {
        events.push(Event::Text(text));
        return;
    }

    let mut cursor = 0;
    for caps in pattern.captures_iter(&text) {
        let Some(found) = caps.get(0) else {
            continue;
        };
        let url = trim_url(found.as_str());
        if url.is_empty() {
            continue;
        }

        let start = found.start();
        let end = start + url.len();

        if start > cursor {
            events.push(Event::Text(CowStr::from(text[cursor..start].to_string())));
        }

        let href = if caps.name("email").is_some() {
            format!("mailto:{url}")
        } else if caps.name("host").is_some()
            || (url.len() >= 4 && url[..4].eq_ignore_ascii_case("www."))
        {
            format!("http://{url}")
        } else {
            url.to_string()
        };

        events.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: CowStr::from(href),
            title: CowStr::Borrowed(""),
            id: CowStr::Borrowed(""),
        }));
        events.push(Event::Text(CowStr::from(url.to_string())));
        events.push(Event::End(TagEnd::Link));

        cursor = end;
    }

    if cursor < text.len() {
        events.push(Event::Text(CowStr::from(text[cursor..].to_string())));
    }
}

/// Drop sentence punctuation and unbalanced closing parens from a URL match.
fn trim_url(url: &str) -> &str {
    let mut trimmed = url;
    loop {
        let Some(last) = trimmed.chars().last() else {
            return trimmed;
        };

        let drop = match last {
            '.' | ',' | ':' | ';' | '!' | '?' => true,
            ')' => trimmed.matches(')').count() > trimmed.matches('(').count(),
            _ => false,
        };

        if !drop {
            return trimmed;
        }
        trimmed = &trimmed[..trimmed.len() - last.len_utf8()];
    }
}

/// Text of the first heading in a Markdown document, if any.
pub fn first_heading(raw: &str) -> Option<String> {
    let mut heading: Option<String> = None;

    for event in Parser::new(raw) {
        match event {
            Event::Start(Tag::Heading { .. }) => heading = Some(String::new()),
            Event::Text(text) | Event::Code(text) => {
                if let Some(ref mut title) = heading {
                    title.push_str(&text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                return heading.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
            }
            _ => {}
        }
    }

    None
}
