use log::warn;
use wello_shared::{ChatRequest, ChatResponse, Role, ThreadId};

use crate::client::ClientError;
use crate::transcript::Transcript;

/// Shown in place of an answer when a request fails for any reason.
pub const APOLOGY: &str = "Sorry, an error occurred. Please try again.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Pending,
}

/// Drives the submit cycle: Idle, then Pending while exactly one request
/// is in flight, then Idle again.
///
/// The thread id is handed over once at construction and every request
/// the controller emits carries it.
pub struct Controller {
    thread_id: ThreadId,
    phase: Phase,
    transcript: Transcript,
}

impl Controller {
    pub fn new(thread_id: ThreadId) -> Self {
        Self {
            thread_id,
            phase: Phase::Idle,
            transcript: Transcript::new(),
        }
    }

    /// Handle a submit action. Whitespace-only input is ignored, and
    /// submission is disabled while a request is outstanding; both cases
    /// change nothing and return None.
    ///
    /// Otherwise the user's entry goes into the transcript, the phase
    /// turns Pending, and the caller gets the request to send.
    pub fn submit(&mut self, input: &str) -> Option<ChatRequest> {
        let message = input.trim();
        if message.is_empty() || self.phase == Phase::Pending {
            return None;
        }

        self.transcript.push(Role::User, message);
        self.phase = Phase::Pending;

        Some(ChatRequest {
            message: message.to_string(),
            thread_id: self.thread_id.clone(),
        })
    }

    /// Fold the outcome of the outstanding request back in. Success
    /// renders the answer, failure renders the apology; either way the
    /// phase returns to Idle, so the thinking indicator never outlives
    /// its request.
    pub fn resolve(&mut self, outcome: Result<ChatResponse, ClientError>) {
        if self.phase != Phase::Pending {
            warn!("Dropping a response no submission is waiting for");
            return;
        }

        match outcome {
            Ok(reply) => self.transcript.push(Role::Assistant, reply.response),
            Err(e) => {
                warn!("Chat request failed: {}", e);
                self.transcript.push(Role::Assistant, APOLOGY);
            }
        }
        self.phase = Phase::Idle;
    }

    /// True exactly while a request is outstanding.
    pub fn thinking(&self) -> bool {
        self.phase == Phase::Pending
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(text: &str) -> ChatResponse {
        ChatResponse {
            response: text.to_string(),
            thread_id: None,
        }
    }

    fn decode_error() -> ClientError {
        ClientError::Malformed(serde_json::from_str::<ChatResponse>("nonsense").unwrap_err())
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let mut controller = Controller::new(ThreadId::new("thread_t"));

        assert!(controller.submit("").is_none());
        assert!(controller.submit("   \t  ").is_none());
        assert!(controller.transcript().is_empty());
        assert!(!controller.thinking());
    }

    #[test]
    fn test_submit_trims_renders_and_goes_pending() {
        let mut controller = Controller::new(ThreadId::new("thread_t"));

        let request = controller.submit("  Hello!  ").unwrap();
        assert_eq!(request.message, "Hello!");
        assert_eq!(request.thread_id, ThreadId::new("thread_t"));

        let entries = controller.transcript().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].sender, Role::User);
        assert_eq!(entries[0].text, "Hello!");
        assert!(controller.thinking());
    }

    #[test]
    fn test_submission_disabled_while_pending() {
        let mut controller = Controller::new(ThreadId::new("thread_t"));

        assert!(controller.submit("first").is_some());
        assert!(controller.submit("second").is_none());

        // The rejected attempt must leave no trace
        assert_eq!(controller.transcript().len(), 1);
        assert!(controller.thinking());
    }

    #[test]
    fn test_resolve_success_renders_answer() {
        let mut controller = Controller::new(ThreadId::new("thread_t"));
        controller.submit("question").unwrap();

        controller.resolve(Ok(reply("answer")));

        let entries = controller.transcript().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].sender, Role::Assistant);
        assert_eq!(entries[1].text, "answer");
        assert!(!controller.thinking());
    }

    #[test]
    fn test_resolve_failure_renders_apology() {
        let mut controller = Controller::new(ThreadId::new("thread_t"));
        controller.submit("question").unwrap();

        controller.resolve(Err(decode_error()));

        let entries = controller.transcript().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].text, APOLOGY);
        assert!(!controller.thinking());
    }

    #[test]
    fn test_submission_reopens_after_failure() {
        let mut controller = Controller::new(ThreadId::new("thread_t"));
        controller.submit("question").unwrap();
        controller.resolve(Err(decode_error()));

        assert!(controller.submit("again").is_some());
    }

    #[test]
    fn test_stray_resolve_is_dropped() {
        let mut controller = Controller::new(ThreadId::new("thread_t"));

        controller.resolve(Ok(reply("unexpected")));

        assert!(controller.transcript().is_empty());
        assert!(!controller.thinking());
    }

    #[test]
    fn test_every_request_reuses_the_thread_id() {
        let mut controller = Controller::new(ThreadId::new("thread_fixed"));

        let first = controller.submit("one").unwrap();
        controller.resolve(Ok(reply("ok")));
        let second = controller.submit("two").unwrap();

        assert_eq!(first.thread_id, second.thread_id);
        assert_eq!(first.thread_id.as_str(), "thread_fixed");
    }
}
