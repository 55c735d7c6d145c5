// File: spinwheel-common/src/models/session.rs

use serde::{Deserialize, Serialize};

/// Current user as reported by the external session source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SessionIdentity {
    #[default]
    Anonymous,
    User(String),
}

impl SessionIdentity {
    /// Blank ids are treated as logged out.
    pub fn from_user_id(user_id: Option<&str>) -> Self {
        match user_id.map(str::trim) {
            Some(id) if !id.is_empty() => SessionIdentity::User(id.to_string()),
            _ => SessionIdentity::Anonymous,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            SessionIdentity::User(id) => Some(id.as_str()),
            SessionIdentity::Anonymous => None,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, SessionIdentity::Anonymous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_user_id_is_anonymous() {
        assert_eq!(SessionIdentity::from_user_id(Some("  ")), SessionIdentity::Anonymous);
        assert_eq!(SessionIdentity::from_user_id(None), SessionIdentity::Anonymous);
        assert_eq!(
            SessionIdentity::from_user_id(Some("u-1")).user_id(),
            Some("u-1")
        );
    }
}
