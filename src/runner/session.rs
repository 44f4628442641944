use crate::api::QuizQuestion;

/// State carried between dependent checks within one run.
///
/// Every field starts unset; checks fill them in as they succeed.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub token: Option<String>,
    pub user_id: Option<String>,
    pub conversation_id: Option<String>,
    pub goal_id: Option<String>,
    pub quiz_questions: Vec<QuizQuestion>,
    /// Contents of chat messages sent this run, in send order
    pub sent_messages: Vec<String>,
    /// Set once login succeeded and authenticated checks started
    pub authenticated: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn has_token(&self) -> bool {
        self.token.as_deref().map_or(false, |t| !t.is_empty())
    }

    /// Drop credentials after logout
    pub fn clear_token(&mut self) {
        self.token = None;
    }
}
