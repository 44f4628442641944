//! Test user fixture and request payloads sent during a run.

use serde::Serialize;
use serde_json::{json, Value};

use crate::api::QuizQuestion;

/// Answer categories cycled through when synthesizing quiz answers
pub const ANSWER_CATEGORIES: [&str; 4] = [
    "concordo_totalmente",
    "concordo_parcialmente",
    "neutro",
    "discordo_parcialmente",
];

/// Only the first questions get an answer
pub const MAX_QUIZ_ANSWERS: usize = 10;

/// Goal progress value posted by the progress check
pub const GOAL_PROGRESS: u32 = 25;

pub const CHAT_MESSAGE: &str = "Hi! I'd like some personalized tips for building a more \
     productive morning routine. Where should I start?";

pub const UPDATED_GOAL_DESCRIPTION: &str =
    "Meditate for 15 minutes every morning to improve focus, well-being and reduce anxiety";

const GOAL_TITLE: &str = "Build a meditation habit";
const GOAL_DESCRIPTION: &str = "Meditate for 10 minutes every morning to improve focus and well-being";
const GOAL_CATEGORY: &str = "saude_mental";
const GOAL_TARGET_DATE: &str = "2025-12-31";

/// Account registered and logged into by the run
#[derive(Debug, Clone, PartialEq)]
pub struct TestUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub age: u32,
    pub gender: String,
    pub location: String,
}

impl TestUser {
    /// Fixture whose email embeds the current time, so reruns never collide
    pub fn unique() -> Self {
        Self::with_stamp(chrono::Utc::now().timestamp_millis())
    }

    pub fn with_stamp(stamp: i64) -> Self {
        Self {
            name: "Maria Silva".to_string(),
            email: format!("maria.silva.{}@teste.com", stamp),
            password: "MinhaSenh@123".to_string(),
            age: 28,
            gender: "female".to_string(),
            location: "São Paulo, SP".to_string(),
        }
    }

    pub fn credentials(&self) -> Value {
        json!({ "email": self.email, "password": self.password })
    }

    pub fn registration(&self) -> Value {
        json!({
            "name": self.name,
            "email": self.email,
            "password": self.password,
            "age": self.age,
            "gender": self.gender,
            "location": self.location,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnswer {
    pub question_id: String,
    pub answer: String,
}

/// One answer per question, up to [`MAX_QUIZ_ANSWERS`], cycling through
/// [`ANSWER_CATEGORIES`]. Questions without an id get `q_<index>`.
pub fn quiz_answers(questions: &[QuizQuestion]) -> Vec<QuizAnswer> {
    questions
        .iter()
        .take(MAX_QUIZ_ANSWERS)
        .enumerate()
        .map(|(i, question)| QuizAnswer {
            question_id: question
                .id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_else(|| format!("q_{}", i)),
            answer: ANSWER_CATEGORIES[i % ANSWER_CATEGORIES.len()].to_string(),
        })
        .collect()
}

pub fn quiz_submission(questions: &[QuizQuestion]) -> Value {
    json!({
        "quizType": "personalidade",
        "answers": quiz_answers(questions),
        "completedAt": now_iso(),
    })
}

pub fn profile_update() -> Value {
    json!({
        "bio": "Focused on personal growth and continuous learning.",
        "interests": ["personal development", "meditation", "reading"],
        "goals": ["Know myself better", "Build healthy habits"]
    })
}

pub fn settings_update() -> Value {
    json!({
        "notifications": { "email": true, "push": true, "dailyReminders": true },
        "privacy": { "profileVisibility": "private", "dataSharing": false },
        "preferences": { "language": "pt-BR", "timezone": "America/Sao_Paulo", "theme": "light" }
    })
}

pub fn new_conversation() -> Value {
    json!({
        "title": "Personal development",
        "type": "personal_growth",
        "context": "Strategies to improve productivity and well-being"
    })
}

pub fn chat_message() -> Value {
    json!({ "content": CHAT_MESSAGE, "type": "user" })
}

pub fn new_goal() -> Value {
    json!({
        "title": GOAL_TITLE,
        "description": GOAL_DESCRIPTION,
        "category": GOAL_CATEGORY,
        "targetDate": GOAL_TARGET_DATE,
        "priority": "alta",
        "milestones": [
            { "title": "First full week", "targetDate": "2025-11-15" },
            { "title": "First full month", "targetDate": "2025-12-01" }
        ]
    })
}

/// Goal updates are validated as whole goals, so resend every required field
pub fn goal_update() -> Value {
    json!({
        "title": GOAL_TITLE,
        "description": UPDATED_GOAL_DESCRIPTION,
        "category": GOAL_CATEGORY,
        "targetDate": GOAL_TARGET_DATE,
        "priority": "media"
    })
}

pub fn goal_progress() -> Value {
    json!({
        "progress": GOAL_PROGRESS,
        "note": "Meditated three days in a row this week. Feeling calmer.",
        "date": now_iso()
    })
}

pub fn mood_entry() -> Value {
    json!({
        "mood": 8,
        "energy": 8,
        "stress": 3,
        "notes": "Productive day, finished everything on the list.",
        "date": now_iso()
    })
}

pub fn contact_message(user: &TestUser) -> Value {
    json!({
        "name": user.name,
        "email": user.email,
        "subject": "Feature suggestion",
        "message": "It would help to have customizable reminders for goals.",
        "category": "feedback",
        "priority": "medium"
    })
}

fn now_iso() -> String {
    chrono::Local::now().to_rfc3339()
}
