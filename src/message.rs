use serde::{Deserialize, Serialize};

/// Default number of messages kept in a conversation before trimming
pub const DEFAULT_HISTORY_LIMIT: usize = 2000;
/// Fraction of the limit removed (oldest first) when trimming
const TRIM_DIVISOR: usize = 4;

/// Who authored a turn in the conversation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// A paper the assistant cited in its answer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperReference {
    pub title: String,
    pub link: String,
}

/// One turn in the conversation; never edited after it is created
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "message")]
    text: String,
    sender: Sender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    papers: Option<Vec<PaperReference>>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            papers: None,
        }
    }

    pub fn bot(text: impl Into<String>, papers: Vec<PaperReference>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Bot,
            papers: if papers.is_empty() { None } else { Some(papers) },
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    /// Papers attached to a bot answer, empty when there are none
    pub fn papers(&self) -> &[PaperReference] {
        self.papers.as_deref().unwrap_or(&[])
    }
}

/// Append-only conversation history
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
    limit: usize,
}

impl Default for ChatLog {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A limit of zero is treated as one so the newest message always survives.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            messages: Vec::new(),
            limit: limit.max(1),
        }
    }

    pub fn push(&mut self, msg: ChatMessage) {
        self.messages.push(msg);
        // Drop the oldest block once the history grows past its limit
        if self.messages.len() > self.limit {
            let trim = (self.limit / TRIM_DIVISOR).max(1);
            let excess = self.messages.len() - self.limit;
            self.messages.drain(0..trim.max(excess));
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
