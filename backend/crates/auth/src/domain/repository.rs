//! Repository Traits
//!
//! Interfaces for identity persistence. Implementation is in the
//! infrastructure layer; tests use in-memory fakes.

use crate::domain::entity::{business_member::BusinessMember, user::User};
use crate::domain::value_object::{
    business_profile::{BusinessName, PhoneNumber},
    email::Email,
    external_id::ExternalId,
    user_role::UserRole,
};
use crate::error::AuthResult;
use kernel::id::BusinessMemberId;

/// User repository trait
///
/// Lookups used by authentication flows never return logically
/// deleted users.
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Return the user with the given external id, creating one with the
    /// supplied email and role if none exists.
    ///
    /// Fails with Duplicate if a user with the external id exists under a
    /// different email.
    async fn find_or_create(
        &self,
        external_id: &ExternalId,
        email: &Email,
        role: UserRole,
    ) -> AuthResult<User>;

    /// Find an active user by external id
    async fn find_by_external_id(&self, external_id: &ExternalId) -> AuthResult<Option<User>>;

    /// Find an active user by email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// Set the deletion timestamp. Fails with Forbidden when the target
    /// is an admin. Idempotent for already-deleted users.
    async fn mark_deleted(&self, external_id: &ExternalId) -> AuthResult<()>;
}

/// Business member repository trait
#[trait_variant::make(BusinessMemberRepository: Send)]
pub trait LocalBusinessMemberRepository {
    /// Find the business member profile owned by a user
    async fn find_by_user(&self, external_id: &ExternalId) -> AuthResult<Option<BusinessMember>>;

    /// Update display name and kana reading
    async fn update_name(
        &self,
        id: BusinessMemberId,
        name: &BusinessName,
        kana_name: &str,
    ) -> AuthResult<()>;

    /// Update postal address
    async fn update_address(&self, id: BusinessMemberId, address: &str) -> AuthResult<()>;

    /// Update phone number
    async fn update_phone(&self, id: BusinessMemberId, phone: &PhoneNumber) -> AuthResult<()>;

    /// Replace the profile image
    async fn update_icon(&self, id: BusinessMemberId, image: &[u8]) -> AuthResult<()>;

    /// Overwrite identifying fields with the sentinel and stamp
    /// `anonymized_at`. Idempotent.
    async fn anonymize(&self, id: BusinessMemberId) -> AuthResult<()>;
}
