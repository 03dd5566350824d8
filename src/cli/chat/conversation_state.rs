use crate::backend_client::{AskResponse, BackendError};

/// Shown as the tool name when the backend did not report one.
pub const NO_TOOL: &str = "None";

const FALLBACK_ERROR: &str = "Something went wrong";

/// Handed out by [`ConversationTurn::begin_send`] and given back with the
/// result. Results for anything but the newest ticket are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    generation: u64,
    message: String,
}

impl RequestTicket {
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The single exchange on screen: what the user typed and what came back.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    message: String,
    tool_called: String,
    response_text: String,
    error_text: String,
    demo_mode: Option<bool>,
    is_loading: bool,
    generation: u64,
}

impl ConversationTurn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tool_called(&self) -> &str {
        &self.tool_called
    }

    pub fn response_text(&self) -> &str {
        &self.response_text
    }

    pub fn error_text(&self) -> &str {
        &self.error_text
    }

    /// Whether the backend said it answered in demo mode, if it said at all.
    pub fn demo_mode(&self) -> Option<bool> {
        self.demo_mode
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn set_message(&mut self, message: &str) {
        self.message = message.to_string();
    }

    pub fn can_send(&self) -> bool {
        !self.is_loading && !self.message.trim().is_empty()
    }

    pub fn can_clear(&self) -> bool {
        !self.is_loading
    }

    pub fn send_label(&self) -> &'static str {
        if self.is_loading {
            "Sending..."
        } else {
            "Ask"
        }
    }

    pub fn show_error(&self) -> bool {
        !self.error_text.is_empty()
    }

    pub fn show_result(&self) -> bool {
        !self.tool_called.is_empty() || !self.response_text.is_empty()
    }

    /// Tool name as displayed in the result block.
    pub fn display_tool(&self) -> &str {
        if self.tool_called.is_empty() {
            NO_TOOL
        } else {
            &self.tool_called
        }
    }

    /// Start a Send. Returns `None` without touching anything when sending
    /// is currently not allowed.
    ///
    /// The previous error and result are cleared before loading starts, so an
    /// error and a result are never visible at the same time.
    pub fn begin_send(&mut self) -> Option<RequestTicket> {
        if !self.can_send() {
            return None;
        }

        self.error_text.clear();
        self.tool_called.clear();
        self.response_text.clear();
        self.demo_mode = None;
        self.is_loading = true;
        self.generation += 1;

        Some(RequestTicket {
            generation: self.generation,
            message: self.message.clone(),
        })
    }

    /// Apply the outcome of the request identified by `ticket`.
    ///
    /// Returns `false` if a newer request was started in the meantime, in
    /// which case the state is left alone.
    pub fn complete(
        &mut self,
        ticket: &RequestTicket,
        result: Result<AskResponse, BackendError>,
    ) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                "Dropping stale response for request {} (current {})",
                ticket.generation,
                self.generation
            );
            return false;
        }

        match result {
            Ok(reply) => {
                self.tool_called = reply
                    .tool_called
                    .filter(|tool| !tool.is_empty())
                    .unwrap_or_else(|| NO_TOOL.to_string());
                self.response_text = reply.response.unwrap_or_default();
                self.demo_mode = reply.demo_mode;
            }
            Err(e) => self.error_text = error_description(e.to_string()),
        }

        self.is_loading = false;
        true
    }

    pub fn clear(&mut self) {
        self.message.clear();
        self.tool_called.clear();
        self.response_text.clear();
        self.error_text.clear();
        self.demo_mode = None;
    }
}

fn error_description(description: String) -> String {
    if description.is_empty() {
        FALLBACK_ERROR.to_string()
    } else {
        description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(tool: Option<&str>, response: Option<&str>) -> AskResponse {
        AskResponse {
            tool_called: tool.map(str::to_owned),
            response: response.map(str::to_owned),
            demo_mode: None,
        }
    }

    fn status_error() -> BackendError {
        BackendError::Status {
            status: 500,
            body: "internal error".to_string(),
        }
    }

    #[test]
    fn send_is_disabled_for_blank_message_or_while_loading() {
        let mut turn = ConversationTurn::new();
        assert!(!turn.can_send());

        turn.set_message("   \n\t");
        assert!(!turn.can_send());
        assert!(turn.begin_send().is_none());

        turn.set_message("hello");
        assert!(turn.can_send());
        assert_eq!(turn.send_label(), "Ask");

        let _ticket = turn.begin_send().unwrap();
        assert!(turn.is_loading());
        assert!(!turn.can_send());
        assert!(!turn.can_clear());
        assert_eq!(turn.send_label(), "Sending...");
        assert!(turn.begin_send().is_none());
    }

    #[test]
    fn begin_send_clears_previous_outcome_but_keeps_message() {
        let mut turn = ConversationTurn::new();
        turn.set_message("first");
        let ticket = turn.begin_send().unwrap();
        turn.complete(&ticket, Err(status_error()));
        assert!(turn.show_error());

        turn.set_message("second");
        let ticket = turn.begin_send().unwrap();
        assert_eq!(ticket.message(), "second");
        assert_eq!(turn.message(), "second");
        assert_eq!(turn.error_text(), "");
        assert_eq!(turn.tool_called(), "");
        assert_eq!(turn.response_text(), "");
        assert!(!turn.show_error());
        assert!(!turn.show_result());
    }

    #[test]
    fn success_populates_tool_and_response() {
        let mut turn = ConversationTurn::new();
        turn.set_message("hi");
        let ticket = turn.begin_send().unwrap();

        assert!(turn.complete(&ticket, Ok(reply(Some("X"), Some("Y")))));
        assert_eq!(turn.tool_called(), "X");
        assert_eq!(turn.response_text(), "Y");
        assert_eq!(turn.error_text(), "");
        assert!(!turn.is_loading());
        assert!(turn.show_result());
    }

    #[test]
    fn missing_or_empty_tool_becomes_none() {
        for tool in [None, Some("")] {
            let mut turn = ConversationTurn::new();
            turn.set_message("hi");
            let ticket = turn.begin_send().unwrap();
            turn.complete(&ticket, Ok(reply(tool, Some("text"))));
            assert_eq!(turn.tool_called(), "None");
            assert_eq!(turn.display_tool(), "None");
        }
    }

    #[test]
    fn missing_response_becomes_empty_text() {
        let mut turn = ConversationTurn::new();
        turn.set_message("hi");
        let ticket = turn.begin_send().unwrap();
        turn.complete(&ticket, Ok(reply(Some("find_nearby_therapists_by_location"), None)));

        assert_eq!(turn.response_text(), "");
        assert!(turn.show_result());
    }

    #[test]
    fn failure_sets_error_and_leaves_result_cleared() {
        let mut turn = ConversationTurn::new();
        turn.set_message("hi");
        let ticket = turn.begin_send().unwrap();
        turn.complete(&ticket, Err(status_error()));

        assert!(turn.error_text().contains("500"));
        assert!(turn.error_text().contains("internal error"));
        assert_eq!(turn.tool_called(), "");
        assert_eq!(turn.response_text(), "");
        assert!(!turn.is_loading());
        assert!(turn.show_error());
        assert!(!turn.show_result());
    }

    #[test]
    fn empty_error_description_uses_fallback() {
        assert_eq!(error_description(String::new()), "Something went wrong");
        assert_eq!(error_description("boom".to_string()), "boom");
    }

    #[test]
    fn stale_response_does_not_overwrite_newer_request() {
        let mut turn = ConversationTurn::new();
        turn.set_message("first");
        let first = turn.begin_send().unwrap();

        // Simulate an overlapping second request.
        turn.is_loading = false;
        turn.set_message("second");
        let second = turn.begin_send().unwrap();

        assert!(turn.complete(&second, Ok(reply(Some("new"), Some("newer")))));
        assert!(!turn.complete(&first, Ok(reply(Some("old"), Some("older")))));

        assert_eq!(turn.tool_called(), "new");
        assert_eq!(turn.response_text(), "newer");
        assert!(!turn.is_loading());
    }

    #[test]
    fn stale_failure_keeps_newer_request_loading() {
        let mut turn = ConversationTurn::new();
        turn.set_message("first");
        let first = turn.begin_send().unwrap();
        turn.is_loading = false;
        let _second = turn.begin_send().unwrap();

        assert!(!turn.complete(&first, Err(status_error())));
        assert!(turn.is_loading());
        assert_eq!(turn.error_text(), "");
    }

    #[test]
    fn clear_resets_everything_but_loading() {
        let mut turn = ConversationTurn::new();
        turn.set_message("hi");
        let ticket = turn.begin_send().unwrap();
        turn.complete(&ticket, Ok(reply(Some("X"), Some("Y"))));

        turn.clear();
        assert_eq!(turn.message(), "");
        assert_eq!(turn.tool_called(), "");
        assert_eq!(turn.response_text(), "");
        assert_eq!(turn.error_text(), "");
        assert!(!turn.show_result());

        let once = turn.clone();
        turn.clear();
        assert_eq!(turn, once);
    }

    #[test]
    fn clear_after_error() {
        let mut turn = ConversationTurn::new();
        turn.set_message("hi");
        let ticket = turn.begin_send().unwrap();
        turn.complete(&ticket, Err(status_error()));

        turn.clear();
        assert_eq!(turn.error_text(), "");
        assert!(!turn.show_error());
    }
}
