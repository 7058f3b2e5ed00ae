use async_trait::async_trait;
use dashmap::DashMap;
use matcher::PersonName;
use serde::{Deserialize, Serialize};

use super::{CollaboratorError, UserDirectory};

/// What the pipeline needs to know about an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub verified: bool,
}

impl UserProfile {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            verified: false,
        }
    }

    pub fn name(&self) -> PersonName {
        PersonName::new(self.first_name.clone(), self.last_name.clone())
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// Process-local user directory.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: DashMap<String, UserProfile>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user_id: impl Into<String>, profile: UserProfile) {
        self.users.insert(user_id.into(), profile);
    }

    pub fn get(&self, user_id: &str) -> Option<UserProfile> {
        self.users.get(user_id).map(|p| p.value().clone())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn profile(&self, user_id: &str) -> Result<Option<UserProfile>, CollaboratorError> {
        Ok(self.get(user_id))
    }

    async fn mark_verified(&self, user_id: &str) -> Result<(), CollaboratorError> {
        match self.users.get_mut(user_id) {
            Some(mut profile) => {
                profile.verified = true;
                Ok(())
            }
            None => Err(CollaboratorError::UserNotFound(user_id.to_string())),
        }
    }
}
