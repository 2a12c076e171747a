//! Page, revision and hierarchy records.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::extract::search_text;
use crate::node::Node;

/// Version assigned to a freshly created page.
pub const INITIAL_VERSION: u64 = 1;

/// Microseconds since the Unix epoch.
pub fn now_micros() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros() as u64
}

/// A verified caller, as resolved by the identity provider.
///
/// The user id doubles as the tenant scope: every page belongs to exactly
/// one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
}

impl Identity {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Persisted state of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Page UUID
    pub id: Uuid,
    /// Owning tenant
    pub owner_id: Uuid,
    /// Parent section in the notebook hierarchy
    pub section_id: Uuid,
    pub title: String,
    pub content: Node,
    /// Fencing token; +1 per accepted save
    pub version: u64,
    /// Denormalized, lowercased title + body text
    pub search_text: String,
    pub last_edited_by: Uuid,
    /// Creation timestamp (µs since epoch)
    pub created_at: u64,
    /// Last accepted save (µs since epoch)
    pub updated_at: u64,
}

impl PageRecord {
    /// Build a new page at [`INITIAL_VERSION`] owned by `owner`.
    pub fn new(owner: &Identity, section_id: Uuid, title: impl Into<String>, content: Node) -> Self {
        let title = title.into();
        let now = now_micros();
        Self {
            id: Uuid::new_v4(),
            owner_id: owner.user_id,
            section_id,
            search_text: search_text(&title, &content),
            title,
            content,
            version: INITIAL_VERSION,
            last_edited_by: owner.user_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `caller` may read or write this page.
    pub fn is_accessible_to(&self, caller: &Identity) -> bool {
        self.owner_id == caller.user_id
    }
}

/// Immutable point-in-time copy of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub id: Uuid,
    /// Page this revision was taken from (non-owning)
    pub page_id: Uuid,
    pub title: String,
    pub snapshot: Node,
    /// Capture timestamp (µs since epoch), unique per page
    pub created_at: u64,
    pub author_id: Uuid,
}

impl Revision {
    pub fn summary(&self) -> RevisionSummary {
        RevisionSummary {
            id: self.id,
            page_id: self.page_id,
            title: self.title.clone(),
            created_at: self.created_at,
            author_id: self.author_id,
        }
    }
}

/// Revision without its snapshot, for history listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionSummary {
    pub id: Uuid,
    pub page_id: Uuid,
    pub title: String,
    pub created_at: u64,
    pub author_id: Uuid,
}

/// A notebook section, owned by the hierarchy service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: Uuid,
    pub notebook_id: Uuid,
    pub name: String,
}

/// A notebook, owned by the hierarchy service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notebook {
    pub id: Uuid,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_page_defaults() {
        let owner = Identity::new(Uuid::new_v4());
        let page = PageRecord::new(&owner, Uuid::new_v4(), "Groceries", Node::empty());
        assert_eq!(page.version, INITIAL_VERSION);
        assert_eq!(page.search_text, "groceries");
        assert_eq!(page.owner_id, owner.user_id);
        assert_eq!(page.last_edited_by, owner.user_id);
        assert_eq!(page.created_at, page.updated_at);
        assert!(page.created_at > 0);
    }

    #[test]
    fn test_access_is_owner_only() {
        let owner = Identity::new(Uuid::new_v4());
        let stranger = Identity::new(Uuid::new_v4());
        let page = PageRecord::new(&owner, Uuid::new_v4(), "Diary", Node::empty());
        assert!(page.is_accessible_to(&owner));
        assert!(!page.is_accessible_to(&stranger));
    }

    #[test]
    fn test_revision_summary_drops_snapshot() {
        let rev = Revision {
            id: Uuid::new_v4(),
            page_id: Uuid::new_v4(),
            title: "Draft".into(),
            snapshot: Node::paragraphs(["body"]),
            created_at: 10,
            author_id: Uuid::new_v4(),
        };
        let summary = rev.summary();
        assert_eq!(summary.id, rev.id);
        assert_eq!(summary.title, "Draft");
        assert_eq!(summary.created_at, 10);
    }
}
