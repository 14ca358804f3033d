//! One-shot notices ("flash messages").
//!
//! A handler stores a notice before redirecting; the next rendered page takes
//! it out of the session and shows it once.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::session_keys;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

impl NoticeLevel {
    /// CSS modifier class.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// Store for the next page, replacing any notice not yet shown.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn flash(self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.insert(session_keys::NOTICE, self).await
    }

    /// Take the pending notice, if any. A store failure reads as no notice.
    pub async fn take(session: &Session) -> Option<Self> {
        session
            .remove::<Self>(session_keys::NOTICE)
            .await
            .ok()
            .flatten()
    }
}
