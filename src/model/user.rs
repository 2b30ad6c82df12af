use serde::{Deserialize, Serialize};

/// User profile record. Created by mock login/register, cleared on logout.
/// Not a security boundary: there is no credential storage at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}
