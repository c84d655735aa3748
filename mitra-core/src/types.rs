use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const TOKEN_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const TOKEN_LEN: usize = 9;

/// Short non-cryptographic token used for client-generated identifiers.
///
/// Collisions are possible and accepted: these ids only scope a conversation.
pub fn random_token() -> String {
    let mut rng = rand::thread_rng();
    (0..TOKEN_LEN)
        .map(|_| TOKEN_CHARSET[rng.gen_range(0..TOKEN_CHARSET.len())] as char)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FarmerId(pub String);

impl FarmerId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn generate() -> Self {
        Self(format!("farmer_{}", random_token()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn generate() -> Self {
        Self(format!("session_{}", random_token()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identity pair scoping one voice conversation with the backend agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Session {
    pub farmer_id: FarmerId,
    pub session_id: SessionId,
}

impl Session {
    pub fn new(farmer_id: FarmerId, session_id: SessionId) -> Self {
        Self {
            farmer_id,
            session_id,
        }
    }

    pub fn generate() -> Self {
        Self::new(FarmerId::generate(), SessionId::generate())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}
