//! Signed-in user identity
//!
//! The cached profile payload is loosely shaped on the backend; only the
//! fields the feed needs are modelled, everything else is ignored.

use serde::{Deserialize, Serialize};

use super::{Post, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
}

impl Identity {
    /// Identity known only by id, e.g. recovered from a token
    pub fn from_id(id: UserId) -> Self {
        Self {
            id,
            username: None,
            email: None,
            first_name: None,
            last_name: None,
            profile_image: None,
        }
    }

    pub fn is_author_of(&self, post: &Post) -> bool {
        self.id == post.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_profile_with_extra_fields() {
        let json = r#"{"id": 12, "username": "brian", "email": "b@example.com",
                       "bio": "fast", "cars": [{"make": "Toyota"}]}"#;
        let identity: Identity = serde_json::from_str(json).unwrap();
        assert_eq!(identity.id, UserId(12));
        assert_eq!(identity.username.as_deref(), Some("brian"));
        assert!(identity.first_name.is_none());
    }
}
