use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Administrator {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Explicit per-request administrator identity.
///
/// Produced by the REST layer from a verified bearer token and handed to the
/// operations that need to know who is acting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub admin_id: String,
    pub username: String,
}
