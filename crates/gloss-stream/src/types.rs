//! Request types for the summarization backend

use serde::{Deserialize, Serialize};

/// Extracted content of the page being viewed. Extraction itself is someone
/// else's job; this is just the shape that crosses context boundaries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    pub url: String,
    pub title: String,
    pub text: String,
}

impl PageContent {
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            text: text.into(),
        }
    }
}

/// Streaming endpoints exposed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Summarize the full page content.
    Summarize,
    /// Ask a follow-up question about an already-summarized page.
    Followup,
    /// Unified endpoint; the backend classifies intent from the query.
    Chat,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Summarize => "/api/summarize",
            Endpoint::Followup => "/api/followup",
            Endpoint::Chat => "/api/chat",
        }
    }
}

/// Body for `POST /api/summarize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeRequest {
    pub page_url: String,
    pub page_text: String,
    #[serde(default)]
    pub page_title: String,
}

/// Body for `POST /api/followup`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpRequest {
    pub page_url: String,
    pub user_query: String,
}

/// Body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub page_url: String,
    pub page_text: String,
    #[serde(default)]
    pub page_title: String,
    pub query: String,
}

impl ChatRequest {
    /// Build a chat request from extracted page content and a user query.
    pub fn from_page(page: &PageContent, query: impl Into<String>) -> Self {
        Self {
            page_url: page.url.clone(),
            page_text: page.text.clone(),
            page_title: page.title.clone(),
            query: query.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(Endpoint::Summarize.path(), "/api/summarize");
        assert_eq!(Endpoint::Followup.path(), "/api/followup");
        assert_eq!(Endpoint::Chat.path(), "/api/chat");
    }

    #[test]
    fn test_chat_request_from_page() {
        let page = PageContent::new("https://docs.example.com/guide", "Guide", "body text");
        let req = ChatRequest::from_page(&page, "Summarize this page");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["page_url"], "https://docs.example.com/guide");
        assert_eq!(json["query"], "Summarize this page");
        assert_eq!(json["page_title"], "Guide");
    }
}
