//! Change notices for connected clients.

use serde::{Deserialize, Serialize};

/// Capacity of the change broadcast channel.
pub const CHANNEL_CAPACITY: usize = 256;

/// Which record collection changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// Accounts and profiles.
    Accounts,
    /// Courses.
    Courses,
    /// Instructor assignments.
    Assignments,
    /// Self-enrollments.
    Enrollments,
    /// Module progress.
    Progress,
    /// Certificates.
    Certificates,
    /// Login history.
    LoginHistory,
}

/// A record changed; clients should refresh what they show of `collection`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeNotice {
    /// Collection that changed.
    pub collection: Collection,
    /// Record key within the collection (email, course id), if scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl ChangeNotice {
    /// A notice scoped to one key.
    pub fn keyed(collection: Collection, key: impl ToString) -> Self {
        Self {
            collection,
            key: Some(key.to_string()),
        }
    }

    /// A notice for the whole collection.
    #[must_use]
    pub const fn collection(collection: Collection) -> Self {
        Self {
            collection,
            key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_json_shape() {
        let keyed = ChangeNotice::keyed(Collection::Progress, "sam@example.com");
        assert_eq!(
            serde_json::to_value(&keyed).unwrap(),
            serde_json::json!({ "collection": "progress", "key": "sam@example.com" })
        );

        let whole = ChangeNotice::collection(Collection::LoginHistory);
        assert_eq!(
            serde_json::to_value(&whole).unwrap(),
            serde_json::json!({ "collection": "login_history" })
        );
    }
}
