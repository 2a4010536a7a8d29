//! Core client state, separated from any front end.
//!
//! `ClientState` holds everything that describes the session: the
//! conversation, the text being composed, whether a query is in flight and
//! the selected retrieval mode. It is owned by a single controller and only
//! changes through [`ClientState::update`], which consumes the old state and
//! returns the new one together with the backend work to start, if any.

use crate::config::Settings;
use crate::message::{ChatLog, ChatMessage};
use crate::protocol::{BackendAction, QueryMode, QueryRequest, QueryResponse};
use crate::validation;
use tracing::debug;

/// Everything that can happen to the client state
#[derive(Debug, Clone)]
pub enum Action {
    /// The composed text changed
    EditInput(String),
    /// Send the composed text
    Submit,
    ToggleMode,
    SetMode(QueryMode),
    /// The backend answered query `id`
    ReplyReceived { id: u64, response: QueryResponse },
    /// Query `id` failed. `None` means whatever query is pending, as when
    /// the wait gives up or the worker goes away.
    RequestFailed { id: Option<u64>, reason: String },
    ClearHistory,
    DismissError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientState {
    pub log: ChatLog,
    pub input: String,
    pub mode: QueryMode,
    pub last_error: Option<String>,
    /// Id of the query in flight
    pub pending_request: Option<u64>,
    next_request_id: u64,
}

impl ClientState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            log: ChatLog::with_limit(settings.history_limit),
            mode: settings.mode,
            ..Self::default()
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending_request.is_some()
    }

    /// Apply one action.
    pub fn update(mut self, action: Action) -> (Self, Option<BackendAction>) {
        match action {
            Action::EditInput(text) => {
                self.input = text;
                (self, None)
            }
            Action::Submit => self.submit(),
            Action::ToggleMode => {
                self.mode = self.mode.toggled();
                (self, None)
            }
            Action::SetMode(mode) => {
                self.mode = mode;
                (self, None)
            }
            Action::ReplyReceived { id, response } => {
                if self.pending_request != Some(id) {
                    debug!(id, pending = ?self.pending_request, "dropping stale reply");
                    return (self, None);
                }
                let papers = response.paper_references();
                self.log.push(ChatMessage::bot(response.answer, papers));
                self.pending_request = None;
                (self, None)
            }
            Action::RequestFailed { id, reason } => {
                if id.is_some() && id != self.pending_request {
                    debug!(?id, pending = ?self.pending_request, "dropping stale failure");
                    return (self, None);
                }
                self.pending_request = None;
                self.last_error = Some(reason);
                (self, None)
            }
            Action::ClearHistory => {
                self.log.clear();
                (self, None)
            }
            Action::DismissError => {
                self.last_error = None;
                (self, None)
            }
        }
    }

    fn submit(mut self) -> (Self, Option<BackendAction>) {
        // One query at a time; blank input is ignored silently
        if self.is_loading() || self.input.trim().is_empty() {
            return (self, None);
        }

        let text = validation::sanitize_message(&self.input);
        // Length is checked before sanitizing truncates the text
        let checked = validation::validate_message(&self.input)
            .and_then(|_| validation::validate_message(&text));
        if let Err(e) = checked {
            self.last_error = Some(e.to_string());
            return (self, None);
        }

        self.log.push(ChatMessage::user(text.clone()));
        self.input.clear();
        self.last_error = None;

        let id = self.next_request_id;
        self.next_request_id = self.next_request_id.wrapping_add(1);
        self.pending_request = Some(id);

        let request = QueryRequest {
            id,
            message: text,
            mode: self.mode,
        };
        (self, Some(BackendAction::SendQuery(request)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{PaperReference, Sender};
    use crate::protocol::PaperPayload;
    use crate::validation::MAX_MESSAGE_CHARS;

    fn with_input(text: &str) -> ClientState {
        ClientState::new().update(Action::EditInput(text.into())).0
    }

    fn answer(text: &str) -> QueryResponse {
        QueryResponse {
            answer: text.into(),
            papers: vec![],
        }
    }

    fn sent_id(action: Option<BackendAction>) -> u64 {
        match action {
            Some(BackendAction::SendQuery(req)) => req.id,
            other => panic!("expected SendQuery, got {:?}", other),
        }
    }

    #[test]
    fn test_client_state_new() {
        let state = ClientState::new();
        assert!(state.log.is_empty());
        assert!(state.input.is_empty());
        assert!(!state.is_loading());
        assert_eq!(state.mode, QueryMode::Fast);
    }

    #[test]
    fn test_submit_sends_query() {
        let (state, action) = with_input("  What is RAG?  ").update(Action::Submit);
        match action {
            Some(BackendAction::SendQuery(req)) => {
                assert_eq!(req.message, "What is RAG?");
                assert_eq!(req.mode, QueryMode::Fast);
            }
            other => panic!("expected SendQuery, got {:?}", other),
        }
        assert!(state.input.is_empty());
        assert!(state.is_loading());
        assert_eq!(state.log.len(), 1);
        assert_eq!(state.log.last().unwrap().sender(), Sender::User);
    }

    #[test]
    fn test_submit_blank_is_noop() {
        let before = with_input("   \n");
        let (after, action) = before.clone().update(Action::Submit);
        assert!(action.is_none());
        assert_eq!(after, before);
    }

    #[test]
    fn test_submit_while_loading_is_noop() {
        let (state, _) = with_input("first").update(Action::Submit);
        let state = state.update(Action::EditInput("second".into())).0;
        let (state, action) = state.update(Action::Submit);
        assert!(action.is_none());
        assert_eq!(state.input, "second");
        assert_eq!(state.log.len(), 1);
    }

    #[test]
    fn test_submit_too_long_sets_error() {
        let (state, action) = with_input(&"x".repeat(MAX_MESSAGE_CHARS + 1)).update(Action::Submit);
        assert!(action.is_none());
        assert!(state.last_error.is_some());
        assert!(state.log.is_empty());
        assert!(!state.is_loading());
    }

    #[test]
    fn test_reply_appends_bot_message() {
        let (state, _) = with_input("q").update(Action::Submit);
        let reply = QueryResponse {
            answer: "**Yes**, see https://arxiv.org/abs/1.".into(),
            papers: vec![PaperPayload {
                metadata: PaperReference {
                    title: "Paper".into(),
                    link: "https://arxiv.org/abs/1".into(),
                },
            }],
        };
        let id = state.pending_request.unwrap();
        let (state, action) = state.update(Action::ReplyReceived { id, response: reply });
        assert!(action.is_none());
        assert!(!state.is_loading());
        let last = state.log.last().unwrap();
        assert_eq!(last.sender(), Sender::Bot);
        assert_eq!(last.papers().len(), 1);
        assert_eq!(last.papers()[0].title, "Paper");
    }

    #[test]
    fn test_failure_clears_loading() {
        let (state, _) = with_input("q").update(Action::Submit);
        let (state, _) = state.update(Action::RequestFailed {
            id: None,
            reason: "boom".into(),
        });
        assert!(!state.is_loading());
        assert_eq!(state.last_error.as_deref(), Some("boom"));
        // Failures are not added to the conversation
        assert_eq!(state.log.len(), 1);

        let (state, _) = state.update(Action::DismissError);
        assert!(state.last_error.is_none());
    }

    #[test]
    fn test_each_query_gets_a_new_id() {
        let (state, action) = with_input("one").update(Action::Submit);
        let first = sent_id(action);
        assert_eq!(state.pending_request, Some(first));
        let state = state
            .update(Action::ReplyReceived {
                id: first,
                response: answer("a"),
            })
            .0;
        let (_, action) = state
            .update(Action::EditInput("two".into()))
            .0
            .update(Action::Submit);
        assert_ne!(sent_id(action), first);
    }

    #[test]
    fn test_late_reply_is_not_paired_with_next_query() {
        let (state, action) = with_input("first question").update(Action::Submit);
        let first = sent_id(action);
        // The wait gave up on the first query
        let state = state
            .update(Action::RequestFailed {
                id: None,
                reason: "No answer after 65s".into(),
            })
            .0
            .update(Action::DismissError)
            .0;

        let (state, action) = state
            .update(Action::EditInput("second question".into()))
            .0
            .update(Action::Submit);
        let second = sent_id(action);

        // The first answer turns up while the second query is pending
        let (state, _) = state.update(Action::ReplyReceived {
            id: first,
            response: answer("answer to the first"),
        });
        assert_eq!(state.pending_request, Some(second));
        assert_eq!(state.log.last().unwrap().text(), "second question");

        let (state, _) = state.update(Action::RequestFailed {
            id: Some(first),
            reason: "late failure".into(),
        });
        assert!(state.is_loading());
        assert!(state.last_error.is_none());

        let (state, _) = state.update(Action::ReplyReceived {
            id: second,
            response: answer("answer to the second"),
        });
        assert!(!state.is_loading());
        let texts: Vec<&str> = state.log.messages().iter().map(|m| m.text()).collect();
        assert_eq!(
            texts,
            vec!["first question", "second question", "answer to the second"]
        );
    }

    #[test]
    fn test_reply_without_pending_query_is_ignored() {
        let before = with_input("draft");
        let (after, _) = before.clone().update(Action::ReplyReceived {
            id: 0,
            response: answer("unsolicited"),
        });
        assert_eq!(after, before);
    }

    #[test]
    fn test_mode_changes() {
        let (state, _) = ClientState::new().update(Action::ToggleMode);
        assert_eq!(state.mode, QueryMode::Specific);
        let (state, _) = state.update(Action::ToggleMode);
        assert_eq!(state.mode, QueryMode::Fast);
        let (state, _) = state.update(Action::SetMode(QueryMode::Specific));
        let (_, action) = state
            .update(Action::EditInput("deep question".into()))
            .0
            .update(Action::Submit);
        match action {
            Some(BackendAction::SendQuery(req)) => assert_eq!(req.mode, QueryMode::Specific),
            other => panic!("expected SendQuery, got {:?}", other),
        }
    }

    #[test]
    fn test_from_settings() {
        let settings = Settings {
            mode: QueryMode::Specific,
            history_limit: 10,
            ..Settings::default()
        };
        let state = ClientState::from_settings(&settings);
        assert_eq!(state.mode, QueryMode::Specific);
        assert_eq!(state.log.limit(), 10);
    }

    #[test]
    fn test_clear_history() {
        let (state, _) = with_input("q").update(Action::Submit);
        let (state, _) = state.update(Action::ClearHistory);
        assert!(state.log.is_empty());
    }
}

