//! HTML output for rendered messages. Every piece of message text is escaped,
//! so the only tags in the output are the ones emitted here.

use crate::message::{ChatMessage, Sender};

use super::format::{self, Fragment, Link, RenderedMarkup};

/// Escape text for use in HTML content and quoted attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Only web links may become an `href`; anything else could run script
pub fn is_web_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn push_link(out: &mut String, link: &Link) {
    out.push_str("<a href=\"");
    out.push_str(&escape(&link.target));
    out.push('"');
    if link.navigation.new_context {
        out.push_str(" target=\"_blank\"");
    }
    if let Some(rel) = link.navigation.rel() {
        out.push_str(" rel=\"");
        out.push_str(rel);
        out.push('"');
    }
    out.push_str(" style=\"text-decoration: underline;\">");
    out.push_str(&escape(&link.label));
    out.push_str("</a>");
}

/// One `<p>` per paragraph, joined by newlines
pub fn to_html(markup: &RenderedMarkup) -> String {
    let mut paragraphs = Vec::with_capacity(markup.len());
    for paragraph in &markup.paragraphs {
        let mut out = String::from("<p>");
        for fragment in &paragraph.fragments {
            match fragment {
                Fragment::Text(s) => out.push_str(&escape(s)),
                Fragment::Bold(s) => {
                    out.push_str("<strong>");
                    out.push_str(&escape(s));
                    out.push_str("</strong>");
                }
                Fragment::Link(link) => push_link(&mut out, link),
            }
        }
        out.push_str("</p>");
        paragraphs.push(out);
    }
    paragraphs.join("\n")
}

/// Full chat bubble: rendered text plus the list of cited papers
pub fn message_to_html(msg: &ChatMessage) -> String {
    let class = match msg.sender() {
        Sender::User => "bubble bubble-user",
        Sender::Bot => "bubble bubble-bot",
    };
    let mut out = format!("<div class=\"{}\">", class);
    out.push_str(&to_html(&format::render(msg.text())));
    out.push_str("</div>");

    if !msg.papers().is_empty() {
        out.push_str("\n<div class=\"papers\">");
        for paper in msg.papers() {
            if is_web_url(&paper.link) {
                out.push_str(&format!(
                    "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
                    escape(paper.link.trim()),
                    escape(&paper.title)
                ));
            } else {
                out.push_str(&format!("<span>{}</span>", escape(&paper.title)));
            }
        }
        out.push_str("</div>");
    }
    out
}
