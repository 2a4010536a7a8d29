use serde::{Deserialize, Serialize};

use crate::message::PaperReference;

/// Retrieval depth requested from the research backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    #[default]
    Fast,
    Specific,
}

impl QueryMode {
    pub fn toggled(self) -> Self {
        match self {
            QueryMode::Fast => QueryMode::Specific,
            QueryMode::Specific => QueryMode::Fast,
        }
    }

    /// Name shown to the user
    pub fn label(self) -> &'static str {
        match self {
            QueryMode::Fast => "Fast",
            QueryMode::Specific => "Deep",
        }
    }

    /// Accepts the wire names plus `deep` as an alias of `specific`
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Some(QueryMode::Fast),
            "specific" | "deep" => Some(QueryMode::Specific),
            _ => None,
        }
    }
}

/// Body of `POST /query`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Client-side sequence number pairing a reply with its question
    #[serde(skip)]
    pub id: u64,
    pub message: String,
    pub mode: QueryMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperPayload {
    pub metadata: PaperReference,
}

/// Body returned by `POST /query`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    #[serde(default)]
    pub papers: Vec<PaperPayload>,
}

impl QueryResponse {
    pub fn paper_references(&self) -> Vec<PaperReference> {
        self.papers.iter().map(|p| p.metadata.clone()).collect()
    }
}

/// Actions sent from the UI to the Backend
#[derive(Debug, Clone)]
pub enum BackendAction {
    /// Ask the research backend a question
    SendQuery(QueryRequest),
    /// Stop the worker thread
    Shutdown,
}

/// Events sent from the Backend to the UI
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// The backend answered query `id`
    Reply { id: u64, response: QueryResponse },
    /// Query `id` failed, or the worker failed outside any query
    Error { id: Option<u64>, message: String },
    /// The worker has exited
    Stopped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_toggle_and_parse() {
        assert_eq!(QueryMode::Fast.toggled(), QueryMode::Specific);
        assert_eq!(QueryMode::Specific.toggled(), QueryMode::Fast);
        assert_eq!(QueryMode::parse("Deep"), Some(QueryMode::Specific));
        assert_eq!(QueryMode::parse(" fast "), Some(QueryMode::Fast));
        assert_eq!(QueryMode::parse("slow"), None);
        assert_eq!(QueryMode::Specific.label(), "Deep");
    }

    #[test]
    fn test_request_wire_format() {
        let req = QueryRequest {
            id: 7,
            message: "transformers?".into(),
            mode: QueryMode::Specific,
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"message":"transformers?","mode":"specific"}"#
        );
        let back: QueryRequest = serde_json::from_str(r#"{"message":"m","mode":"fast"}"#).unwrap();
        assert_eq!(back.id, 0);
    }

    #[test]
    fn test_response_wire_format() {
        let resp: QueryResponse = serde_json::from_str(
            r#"{"answer":"Yes.","papers":[{"metadata":{"title":"T","link":"https://x.org"}}]}"#,
        )
        .unwrap();
        assert_eq!(resp.answer, "Yes.");
        assert_eq!(
            resp.paper_references(),
            vec![PaperReference {
                title: "T".into(),
                link: "https://x.org".into()
            }]
        );

        // Papers are optional
        let bare: QueryResponse = serde_json::from_str(r#"{"answer":"No."}"#).unwrap();
        assert!(bare.papers.is_empty());
    }
}
