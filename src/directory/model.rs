//! Identity and session records plus the projections handed to callers.

use serde::Serialize;
use std::cmp::Ordering;
use utoipa::ToSchema;

/// Profile fields collected at registration, before hashing and normalization.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    pub name: String,
    pub phone: String,
    pub batch: String,
    pub year_of_passout: String,
    pub email: String,
    pub address: String,
    pub profession: String,
}

/// One registered alumnus, as persisted by the credential store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    pub email: String,
    pub name: String,
    pub phone: String,
    pub batch: String,
    pub year_of_passout: String,
    pub address: String,
    pub profession: String,
    pub password_hash: String,
    pub active: bool,
}

/// The single live-login marker for an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub email: String,
    pub session_token: Option<String>,
    pub active: bool,
}

impl SessionRecord {
    #[must_use]
    pub fn active(email: &str, token: String) -> Self {
        Self {
            email: email.to_string(),
            session_token: Some(token),
            active: true,
        }
    }

    #[must_use]
    pub fn holds(&self, token: &str) -> bool {
        self.active && self.session_token.as_deref() == Some(token)
    }
}

/// Directory row visible to any signed-in alumnus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DirectoryEntry {
    pub name: String,
    pub batch: String,
    pub profession: String,
    pub email: String,
    pub year_of_passout: String,
}

impl From<&IdentityRecord> for DirectoryEntry {
    fn from(record: &IdentityRecord) -> Self {
        Self {
            name: record.name.clone(),
            batch: record.batch.clone(),
            profession: record.profession.clone(),
            email: record.email.clone(),
            year_of_passout: record.year_of_passout.clone(),
        }
    }
}

impl DirectoryEntry {
    /// Newest graduating year first, then batch and name ascending.
    #[must_use]
    pub fn directory_order(&self, other: &Self) -> Ordering {
        other
            .year_of_passout
            .cmp(&self.year_of_passout)
            .then_with(|| self.batch.cmp(&other.batch))
            .then_with(|| self.name.cmp(&other.name))
    }
}

/// Admin dashboard row; everything except the password digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MemberRecord {
    pub name: String,
    pub phone: String,
    pub batch: String,
    pub year_of_passout: String,
    pub email: String,
    pub address: String,
    pub profession: String,
    pub active: bool,
}

impl From<IdentityRecord> for MemberRecord {
    fn from(record: IdentityRecord) -> Self {
        Self {
            name: record.name,
            phone: record.phone,
            batch: record.batch,
            year_of_passout: record.year_of_passout,
            email: record.email,
            address: record.address,
            profession: record.profession,
            active: record.active,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminOverview {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub members: Vec<MemberRecord>,
}

impl From<Vec<IdentityRecord>> for AdminOverview {
    fn from(records: Vec<IdentityRecord>) -> Self {
        let members: Vec<MemberRecord> = records.into_iter().map(MemberRecord::from).collect();
        let active = members.iter().filter(|member| member.active).count();
        Self {
            total: members.len(),
            active,
            inactive: members.len() - active,
            members,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, batch: &str, year: &str, active: bool) -> IdentityRecord {
        IdentityRecord {
            email: format!("{name}@x.com"),
            name: name.to_string(),
            phone: "9876543210".to_string(),
            batch: batch.to_string(),
            year_of_passout: year.to_string(),
            address: "Somewhere".to_string(),
            profession: "Engineer".to_string(),
            password_hash: "digest".to_string(),
            active,
        }
    }

    #[test]
    fn session_record_holds_only_active_matching_token() {
        let live = SessionRecord::active("bob@x.com", "t1".to_string());
        assert!(live.holds("t1"));
        assert!(!live.holds("t2"));

        let ended = SessionRecord {
            email: "bob@x.com".to_string(),
            session_token: None,
            active: false,
        };
        assert!(!ended.holds("t1"));
    }

    #[test]
    fn directory_entry_serializes_restricted_fields() -> anyhow::Result<()> {
        let entry = DirectoryEntry::from(&record("alice", "12", "2010", true));
        let json = serde_json::to_value(&entry)?;
        let object = json.as_object().map(|o| o.len());
        assert_eq!(object, Some(5));
        assert!(json.get("password_hash").is_none());
        assert!(json.get("phone").is_none());
        assert!(json.get("address").is_none());
        Ok(())
    }

    #[test]
    fn directory_order_year_desc_batch_then_name() {
        let mut entries = vec![
            DirectoryEntry::from(&record("zed", "1", "2010", true)),
            DirectoryEntry::from(&record("amy", "2", "2012", true)),
            DirectoryEntry::from(&record("bob", "1", "2010", true)),
            DirectoryEntry::from(&record("cat", "0", "2010", true)),
        ];
        entries.sort_by(DirectoryEntry::directory_order);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["amy", "cat", "bob", "zed"]);
    }

    #[test]
    fn admin_overview_counts() {
        let overview = AdminOverview::from(vec![
            record("a", "1", "2010", true),
            record("b", "1", "2010", false),
            record("c", "1", "2010", true),
        ]);
        assert_eq!(overview.total, 3);
        assert_eq!(overview.active, 2);
        assert_eq!(overview.inactive, 1);
        assert_eq!(overview.members.len(), 3);
    }
}
