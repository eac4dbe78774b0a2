use serde::{Deserialize, Serialize};

use crate::errors::TransportError;

/// Default refinement cap for the proposal/verdict flow.
pub const DEFAULT_MAX_ITERATIONS: u32 = 3;

/// Starts a council run (`POST /council/run`).
///
/// With no `method` the backend runs the standard flow; a method name selects
/// the proposal/verdict flow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouncilRequest {
    pub prompt: String,
    pub council_members: Vec<String>,
    pub chairman_model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(default)]
    pub attachment_ids: Vec<String>,
}

fn default_max_iterations() -> u32 {
    DEFAULT_MAX_ITERATIONS
}

impl CouncilRequest {
    pub fn new(
        prompt: impl Into<String>,
        council_members: impl IntoIterator<Item = impl Into<String>>,
        chairman_model: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            council_members: council_members.into_iter().map(Into::into).collect(),
            chairman_model: chairman_model.into(),
            method: None,
            roles: Vec::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            attachment_ids: Vec::new(),
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn attachment(mut self, attachment_id: impl Into<String>) -> Self {
        self.attachment_ids.push(attachment_id.into());
        self
    }
}

/// Continues or starts a chat conversation (`POST /superchat/chat`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperChatRequest {
    pub prompt: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    pub council_members: Vec<String>,
    pub chairman_model: String,
    #[serde(default)]
    pub attachment_ids: Vec<String>,
}

impl SuperChatRequest {
    pub fn new(
        prompt: impl Into<String>,
        council_members: impl IntoIterator<Item = impl Into<String>>,
        chairman_model: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            conversation_id: None,
            council_members: council_members.into_iter().map(Into::into).collect(),
            chairman_model: chairman_model.into(),
            attachment_ids: Vec::new(),
        }
    }

    pub fn conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn attachment(mut self, attachment_id: impl Into<String>) -> Self {
        self.attachment_ids.push(attachment_id.into());
        self
    }
}

/// Any request that opens a session stream. Serializes as the bare body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StreamRequest {
    Council(CouncilRequest),
    SuperChat(SuperChatRequest),
}

impl StreamRequest {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Council(_) => "/council/run",
            Self::SuperChat(_) => "/superchat/chat",
        }
    }

    pub fn prompt(&self) -> &str {
        match self {
            Self::Council(req) => &req.prompt,
            Self::SuperChat(req) => &req.prompt,
        }
    }

    pub fn validate(&self) -> Result<(), TransportError> {
        let (members, chairman) = match self {
            Self::Council(req) => (&req.council_members, &req.chairman_model),
            Self::SuperChat(req) => (&req.council_members, &req.chairman_model),
        };
        if self.prompt().trim().is_empty() {
            return Err(TransportError::Validation("prompt must not be empty".into()));
        }
        if members.iter().all(|m| m.trim().is_empty()) {
            return Err(TransportError::Validation(
                "at least one council member is required".into(),
            ));
        }
        if chairman.trim().is_empty() {
            return Err(TransportError::Validation(
                "chairman model must not be empty".into(),
            ));
        }
        if let Self::Council(req) = self
            && req.max_iterations == 0
        {
            return Err(TransportError::Validation(
                "max_iterations must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

impl From<CouncilRequest> for StreamRequest {
    fn from(value: CouncilRequest) -> Self {
        Self::Council(value)
    }
}

impl From<SuperChatRequest> for StreamRequest {
    fn from(value: SuperChatRequest) -> Self {
        Self::SuperChat(value)
    }
}
