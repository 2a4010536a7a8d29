//! scholar-chat client library.
//!
//! This module re-exports the core components for testing and extension.

pub mod backend;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod message;
pub mod protocol;
pub mod state;
pub mod ui;
pub mod validation;


pub use error::{ClientError, Result};
pub use message::{ChatLog, ChatMessage, PaperReference, Sender};
pub use ui::messages::{render, Fragment, Link, Navigation, Paragraph, RenderedMarkup};
