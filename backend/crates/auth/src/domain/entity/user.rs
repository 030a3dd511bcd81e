//! User Entity
//!
//! A user record created on first successful Google authentication.
//! Never physically deleted; withdrawal sets `deleted_at`.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{email::Email, external_id::ExternalId, user_role::UserRole};

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    /// Opaque OAuth subject (primary key)
    pub external_id: ExternalId,
    /// Email address (unique)
    pub email: Email,
    /// Role (general, business, admin)
    pub role: UserRole,
    /// Registration timestamp
    pub registered_at: DateTime<Utc>,
    /// Logical deletion timestamp
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a new user at first login
    pub fn new(external_id: ExternalId, email: Email, role: UserRole) -> Self {
        Self {
            external_id,
            email,
            role,
            registered_at: Utc::now(),
            deleted_at: None,
        }
    }

    /// Whether the user has withdrawn
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Mark the user as logically deleted. Idempotent.
    pub fn mark_deleted(&mut self) {
        if self.deleted_at.is_none() {
            self.deleted_at = Some(Utc::now());
        }
    }

    /// Whether the user can pass authentication flows
    pub fn can_authenticate(&self) -> bool {
        !self.is_deleted()
    }
}
