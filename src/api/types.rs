use serde::{Deserialize, Serialize};

/// Identifier that arrives either as a string or as a number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl std::fmt::Display for RawId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawId::Text(s) => f.write_str(s),
            RawId::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Document identity: stored documents carry `_id`, serialized views `id`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DocumentId {
    #[serde(rename = "_id", default)]
    mongo_id: Option<RawId>,
    #[serde(default)]
    id: Option<RawId>,
}

impl DocumentId {
    /// `_id` wins over `id`; empty strings count as absent
    pub fn get(&self) -> Option<String> {
        self.mongo_id
            .as_ref()
            .or(self.id.as_ref())
            .map(|id| id.to_string())
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    #[serde(flatten)]
    pub ids: DocumentId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Conversation {
    #[serde(flatten)]
    pub ids: DocumentId,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatMessage {
    #[serde(flatten)]
    pub ids: DocumentId,
    /// `user` or `ai`
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatMessage {
    /// Messages without a type are treated as user-authored
    pub fn is_from_user(&self) -> bool {
        self.kind.as_deref().map_or(true, |k| k == "user")
    }

    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    #[serde(flatten)]
    pub ids: DocumentId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub progress_history: Vec<ProgressEntry>,
}

impl Goal {
    /// Whether a progress update of `value` was recorded
    pub fn has_progress(&self, value: f64) -> bool {
        self.progress_history
            .iter()
            .any(|entry| entry.progress == Some(value))
            || (self.progress_history.is_empty() && self.progress == Some(value))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProgressEntry {
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuizQuestion {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Payload of the API root endpoint
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ApiInfo {
    #[serde(default)]
    pub message: Option<String>,
    /// Usually a string, but any scalar is accepted
    #[serde(default)]
    pub version: Option<RawId>,
}
