//! Business Member Entity
//!
//! Per-operator profile, created when an admin approves a business
//! application. Anonymization overwrites identifying fields in place
//! while keeping the numeric id and the user reference, so existing
//! posts stay attributable.

use chrono::{DateTime, Utc};
use kernel::ANONYMIZED_SENTINEL;
use kernel::id::{BusinessMemberId, PlaceId};

use crate::domain::value_object::external_id::ExternalId;

/// Business member entity
#[derive(Debug, Clone)]
pub struct BusinessMember {
    /// Numeric identifier (primary key)
    pub id: BusinessMemberId,
    /// Owning user
    pub user_external_id: ExternalId,
    /// Display name (1-50 characters)
    pub name: String,
    /// Kana reading
    pub kana_name: String,
    /// Postal address
    pub address: String,
    /// Phone number
    pub phone: String,
    /// Anchor place, if the operator has one
    pub place_id: Option<PlaceId>,
    /// Profile image bytes
    pub profile_image: Option<Vec<u8>>,
    /// Registration timestamp
    pub registered_at: DateTime<Utc>,
    /// Anonymization timestamp
    pub anonymized_at: Option<DateTime<Utc>>,
}

impl BusinessMember {
    pub fn is_anonymized(&self) -> bool {
        self.anonymized_at.is_some()
    }

    /// Overwrite identifying fields with the sentinel. Idempotent:
    /// a second call changes nothing, including the timestamp.
    pub fn anonymize(&mut self) {
        if self.is_anonymized() {
            return;
        }
        self.name = ANONYMIZED_SENTINEL.to_string();
        self.kana_name = ANONYMIZED_SENTINEL.to_string();
        self.address = ANONYMIZED_SENTINEL.to_string();
        self.phone = ANONYMIZED_SENTINEL.to_string();
        self.profile_image = None;
        self.anonymized_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member() -> BusinessMember {
        BusinessMember {
            id: BusinessMemberId::from_i64(1),
            user_external_id: ExternalId::new("sub-1").unwrap(),
            name: "かき氷屋コジャン".to_string(),
            kana_name: "カキゴオリヤコジャン".to_string(),
            address: "東京都港区1-2-3".to_string(),
            phone: "03-1234-5678".to_string(),
            place_id: None,
            profile_image: Some(vec![0xFF, 0xD8, 0xFF]),
            registered_at: Utc::now(),
            anonymized_at: None,
        }
    }

    #[test]
    fn test_anonymize_overwrites_identifying_fields() {
        let mut m = member();
        m.anonymize();
        assert_eq!(m.name, ANONYMIZED_SENTINEL);
        assert_eq!(m.kana_name, ANONYMIZED_SENTINEL);
        assert_eq!(m.address, ANONYMIZED_SENTINEL);
        assert_eq!(m.phone, ANONYMIZED_SENTINEL);
        assert!(m.profile_image.is_none());
        assert!(m.is_anonymized());
    }

    #[test]
    fn test_anonymize_preserves_keys() {
        let mut m = member();
        let id = m.id;
        let user = m.user_external_id.clone();
        m.anonymize();
        assert_eq!(m.id, id);
        assert_eq!(m.user_external_id, user);
    }

    #[test]
    fn test_anonymize_is_idempotent() {
        let mut m = member();
        m.anonymize();
        let stamp = m.anonymized_at;
        m.anonymize();
        assert_eq!(m.anonymized_at, stamp);
    }
}
