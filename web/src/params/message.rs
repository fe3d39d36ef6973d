use serde::Deserialize;

/// Query parameters of `POST /messages`.
#[derive(Debug, Default, Deserialize)]
pub struct MessageParams {
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

impl MessageParams {
    /// The session id, treating an empty value as absent.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref().filter(|id| !id.is_empty())
    }
}
