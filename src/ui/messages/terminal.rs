//! Plain terminal output for rendered messages.

use colored::Colorize;

use crate::message::{ChatMessage, Sender};

use super::format::{self, Fragment, RenderedMarkup};

/// Paragraphs separated by a blank line; bold and links styled when `styled`
pub fn to_terminal(markup: &RenderedMarkup, styled: bool) -> String {
    markup
        .paragraphs
        .iter()
        .map(|paragraph| {
            paragraph
                .fragments
                .iter()
                .map(|fragment| match fragment {
                    Fragment::Text(s) => s.clone(),
                    Fragment::Bold(s) if styled => s.bold().to_string(),
                    Fragment::Bold(s) => s.clone(),
                    Fragment::Link(link) if styled => link.label.underline().cyan().to_string(),
                    Fragment::Link(link) => link.label.clone(),
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// A whole chat turn with a sender label and the cited papers
pub fn format_message(msg: &ChatMessage, styled: bool) -> String {
    let label = match msg.sender() {
        Sender::User => "you",
        Sender::Bot => "assistant",
    };
    let label = if styled {
        match msg.sender() {
            Sender::User => label.green().bold().to_string(),
            Sender::Bot => label.blue().bold().to_string(),
        }
    } else {
        label.to_string()
    };

    let mut out = format!("{}> {}", label, to_terminal(&format::render(msg.text()), styled));

    if !msg.papers().is_empty() {
        out.push_str("\n\nPapers:");
        for paper in msg.papers() {
            out.push_str(&format!("\n  - {} <{}>", paper.title, paper.link));
        }
    }
    out
}
