//! Message rendering: text parsing and the HTML/terminal emitters.

pub mod format;
pub mod html;
pub mod terminal;

pub use format::{render, Fragment, Link, Navigation, Paragraph, RenderedMarkup};
