//! Signed-in user tracking.
//!
//! Authentication itself happens elsewhere; this only remembers which user
//! id the local front-end is acting for, in `session.json`.

use crate::gateway::IdentityProvider;
use crate::{Error, Result, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SESSION_FILE: &str = "session.json";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignedInUser {
    pub user_id: UserId,
    pub signed_in_at: DateTime<Utc>,
}

/// Identity backed by a session file in the data dir
#[derive(Clone, Debug)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(SESSION_FILE),
        }
    }

    /// Current session, `None` when signed out or the file is unreadable
    pub fn load(&self) -> Option<SignedInUser> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("Ignoring unreadable session file {:?}: {}", self.path, e);
                None
            }
        }
    }

    pub fn sign_in(&self, user_id: UserId) -> Result<SignedInUser> {
        if user_id.as_str().trim().is_empty() {
            return Err(Error::Parse("user id must not be empty".into()));
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let user = SignedInUser {
            user_id,
            signed_in_at: Utc::now(),
        };
        std::fs::write(&self.path, serde_json::to_string_pretty(&user)?)?;
        tracing::info!("Signed in as {}", user.user_id);
        Ok(user)
    }

    /// Returns whether a session existed
    pub fn sign_out(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&self.path)?;
        tracing::info!("Signed out");
        Ok(true)
    }
}

impl IdentityProvider for SessionFile {
    fn current_user_id(&self) -> Option<UserId> {
        self.load().map(|s| s.user_id)
    }
}
