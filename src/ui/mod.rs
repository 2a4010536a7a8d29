//! Presentation helpers shared by every front end.

pub mod messages;
