//! Message text parser: bold markers, URL detection and paragraph splitting.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static BOLD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold regex pattern is valid"));

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^\s\])]+").expect("URL regex pattern is valid"));

static BLANK_LINES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("paragraph regex pattern is valid"));

/// Characters stripped from the end of a detected URL
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ']', ')', '}', ';', ':', '!'];

/// How the display layer must open a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Navigation {
    /// Open in a new browsing context (tab/window)
    pub new_context: bool,
    /// The opened page gets no handle back to ours
    pub no_opener: bool,
    /// No Referer header is sent
    pub no_referrer: bool,
}

impl Navigation {
    pub const EXTERNAL: Navigation = Navigation {
        new_context: true,
        no_opener: true,
        no_referrer: true,
    };

    /// Value of an HTML `rel` attribute, if any restriction applies
    pub fn rel(&self) -> Option<&'static str> {
        match (self.no_opener, self.no_referrer) {
            (true, true) => Some("noopener noreferrer"),
            (true, false) => Some("noopener"),
            (false, true) => Some("noreferrer"),
            (false, false) => None,
        }
    }
}

/// A clickable URL found in message text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub target: String,
    pub label: String,
    pub navigation: Navigation,
}

impl Link {
    fn external(url: &str) -> Self {
        Self {
            target: url.to_string(),
            label: url.to_string(),
            navigation: Navigation::EXTERNAL,
        }
    }
}

/// Smallest styled unit of rendered text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Fragment {
    Text(String),
    Bold(String),
    Link(Link),
}

impl Fragment {
    /// The characters this fragment shows on screen
    pub fn display_text(&self) -> &str {
        match self {
            Fragment::Text(s) | Fragment::Bold(s) => s,
            Fragment::Link(link) => &link.label,
        }
    }
}

/// A block of fragments separated from its neighbours by blank lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    pub fragments: Vec<Fragment>,
}

impl Paragraph {
    /// Concatenated display text, without any styling
    pub fn plain_text(&self) -> String {
        self.fragments.iter().map(Fragment::display_text).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderedMarkup {
    pub paragraphs: Vec<Paragraph>,
}

impl RenderedMarkup {
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }
}

/// Parse raw message text into paragraphs of styled fragments.
///
/// Passes run in a fixed order: bold spans, then links inside every
/// text-bearing fragment, then paragraph splitting. Delimiters consumed by
/// the bold pass never reach a link target.
pub fn render(text: &str) -> RenderedMarkup {
    let fragments = detect_links(parse_bold(text));
    RenderedMarkup {
        paragraphs: split_paragraphs(fragments),
    }
}

fn parse_bold(text: &str) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    let mut last = 0;

    for caps in BOLD_RE.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        push_text(&mut fragments, &text[last..whole.start()]);
        fragments.push(Fragment::Bold(inner.as_str().to_string()));
        last = whole.end();
    }
    push_text(&mut fragments, &text[last..]);

    fragments
}

fn detect_links(fragments: Vec<Fragment>) -> Vec<Fragment> {
    let mut out = Vec::with_capacity(fragments.len());
    for fragment in fragments {
        match fragment {
            Fragment::Text(s) => split_links(&s, &mut out, push_text),
            Fragment::Bold(s) => split_links(&s, &mut out, push_bold),
            link @ Fragment::Link(_) => out.push(link),
        }
    }
    out
}

/// Cut URLs out of `s`; the pieces around them keep their original style
fn split_links(s: &str, out: &mut Vec<Fragment>, push: fn(&mut Vec<Fragment>, &str)) {
    let mut last = 0;
    for m in URL_RE.find_iter(s) {
        let url = m.as_str().trim_end_matches(TRAILING_PUNCTUATION);
        push(out, &s[last..m.start()]);
        out.push(Fragment::Link(Link::external(url)));
        // Stripped punctuation stays in the following piece
        last = m.start() + url.len();
    }
    push(out, &s[last..]);
}

fn split_paragraphs(fragments: Vec<Fragment>) -> Vec<Paragraph> {
    let mut blocks: Vec<Vec<Fragment>> = Vec::new();
    let mut current = Vec::new();

    for fragment in fragments {
        match fragment {
            // Bold and link fragments never contain a line break
            Fragment::Text(s) => {
                let mut pieces = BLANK_LINES_RE.split(&s);
                if let Some(first) = pieces.next() {
                    push_text(&mut current, first);
                }
                for piece in pieces {
                    blocks.push(std::mem::take(&mut current));
                    push_text(&mut current, piece);
                }
            }
            other => current.push(other),
        }
    }
    blocks.push(current);

    blocks.into_iter().filter_map(trim_block).collect()
}

/// Trim outer whitespace of a block; `None` when nothing is left
fn trim_block(mut fragments: Vec<Fragment>) -> Option<Paragraph> {
    let leading = match fragments.first() {
        Some(Fragment::Text(s)) => Some(s.trim_start().to_string()),
        _ => None,
    };
    if let Some(trimmed) = leading {
        if trimmed.is_empty() {
            fragments.remove(0);
        } else {
            fragments[0] = Fragment::Text(trimmed);
        }
    }

    let trailing = match fragments.last() {
        Some(Fragment::Text(s)) => Some(s.trim_end().to_string()),
        _ => None,
    };
    if let Some(trimmed) = trailing {
        let idx = fragments.len() - 1;
        if trimmed.is_empty() {
            fragments.pop();
        } else {
            fragments[idx] = Fragment::Text(trimmed);
        }
    }

    if fragments.is_empty() {
        None
    } else {
        Some(Paragraph { fragments })
    }
}

/// Append plain text, merging with a preceding plain fragment
fn push_text(out: &mut Vec<Fragment>, s: &str) {
    if s.is_empty() {
        return;
    }
    if let Some(Fragment::Text(prev)) = out.last_mut() {
        prev.push_str(s);
    } else {
        out.push(Fragment::Text(s.to_string()));
    }
}

fn push_bold(out: &mut Vec<Fragment>, s: &str) {
    if !s.is_empty() {
        out.push(Fragment::Bold(s.to_string()));
    }
}
