//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::str::FromStr;

use crate::domain::entity::{business_member::BusinessMember, user::User};
use crate::domain::repository::{BusinessMemberRepository, UserRepository};
use crate::domain::value_object::{
    business_profile::{BusinessName, PhoneNumber},
    email::Email,
    external_id::ExternalId,
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};
use kernel::ANONYMIZED_SENTINEL;
use kernel::error::app_error::AppError;
use kernel::id::{BusinessMemberId, PlaceId};

/// PostgreSQL-backed identity repository
#[derive(Clone)]
pub struct PgIdentityRepository {
    pool: PgPool,
}

impl PgIdentityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    external_id: String,
    email: String,
    role: String,
    registered_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let role = UserRole::from_str(&self.role)
            .map_err(|_| AuthError::Internal(format!("Unknown role in database: {}", self.role)))?;
        Ok(User {
            external_id: ExternalId::from_db(self.external_id),
            email: Email::from_db(self.email),
            role,
            registered_at: self.registered_at,
            deleted_at: self.deleted_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BusinessMemberRow {
    id: i64,
    user_external_id: String,
    name: String,
    kana_name: String,
    address: String,
    phone: String,
    place_id: Option<i64>,
    profile_image: Option<Vec<u8>>,
    registered_at: DateTime<Utc>,
    anonymized_at: Option<DateTime<Utc>>,
}

impl BusinessMemberRow {
    fn into_member(self) -> BusinessMember {
        BusinessMember {
            id: BusinessMemberId::from_i64(self.id),
            user_external_id: ExternalId::from_db(self.user_external_id),
            name: self.name,
            kana_name: self.kana_name,
            address: self.address,
            phone: self.phone,
            place_id: self.place_id.map(PlaceId::from_i64),
            profile_image: self.profile_image,
            registered_at: self.registered_at,
            anonymized_at: self.anonymized_at,
        }
    }
}

const USER_COLUMNS: &str = "external_id, email, role, registered_at, deleted_at";
const MEMBER_COLUMNS: &str = "id, user_external_id, name, kana_name, address, phone, place_id, \
                              profile_image, registered_at, anonymized_at";

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgIdentityRepository {
    async fn find_or_create(
        &self,
        external_id: &ExternalId,
        email: &Email,
        role: UserRole,
    ) -> AuthResult<User> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE external_id = $1 FOR UPDATE"
        ))
        .bind(external_id.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(row) = existing {
            let user = row.into_user()?;
            if user.is_deleted() {
                // 退会済みユーザーは認証フローに復帰できない
                return Err(AuthError::AccountWithdrawn);
            }
            if user.email != *email {
                return Err(AuthError::EmailConflict);
            }
            tx.commit().await?;
            return Ok(user);
        }

        let user = User::new(external_id.clone(), email.clone(), role);
        sqlx::query(
            r#"
            INSERT INTO users (external_id, email, role, registered_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user.external_id.as_str())
        .bind(user.email.as_str())
        .bind(user.role.as_str())
        .bind(user.registered_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(external_id = %user.external_id, role = %user.role, "User created");
        Ok(user)
    }

    async fn find_by_external_id(&self, external_id: &ExternalId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE external_id = $1 AND deleted_at IS NULL"
        ))
        .bind(external_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND deleted_at IS NULL"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn mark_deleted(&self, external_id: &ExternalId) -> AuthResult<()> {
        let mut tx = self.pool.begin().await?;

        let role: Option<String> =
            sqlx::query_scalar("SELECT role FROM users WHERE external_id = $1 FOR UPDATE")
                .bind(external_id.as_str())
                .fetch_optional(&mut *tx)
                .await?;

        let role = role.ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;
        if UserRole::from_str(&role).is_ok_and(|r| r.is_admin()) {
            return Err(AuthError::AdminUndeletable);
        }

        sqlx::query(
            "UPDATE users SET deleted_at = NOW() WHERE external_id = $1 AND deleted_at IS NULL",
        )
        .bind(external_id.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

// ============================================================================
// Business Member Repository Implementation
// ============================================================================

impl BusinessMemberRepository for PgIdentityRepository {
    async fn find_by_user(&self, external_id: &ExternalId) -> AuthResult<Option<BusinessMember>> {
        let row = sqlx::query_as::<_, BusinessMemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM business_members WHERE user_external_id = $1"
        ))
        .bind(external_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_member()))
    }

    async fn update_name(
        &self,
        id: BusinessMemberId,
        name: &BusinessName,
        kana_name: &str,
    ) -> AuthResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE business_members
            SET name = $2, kana_name = $3
            WHERE id = $1 AND anonymized_at IS NULL
            "#,
        )
        .bind(id.as_i64())
        .bind(name.as_str())
        .bind(kana_name)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AuthError::NotFound("Business member not found".to_string()));
        }
        Ok(())
    }

    async fn update_address(&self, id: BusinessMemberId, address: &str) -> AuthResult<()> {
        if address.is_empty() {
            return Err(AuthError::Validation(AppError::validation_failed(
                "Address cannot be empty",
            )));
        }

        let updated = sqlx::query(
            "UPDATE business_members SET address = $2 WHERE id = $1 AND anonymized_at IS NULL",
        )
        .bind(id.as_i64())
        .bind(address)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AuthError::NotFound("Business member not found".to_string()));
        }
        Ok(())
    }

    async fn update_phone(&self, id: BusinessMemberId, phone: &PhoneNumber) -> AuthResult<()> {
        let updated = sqlx::query(
            "UPDATE business_members SET phone = $2 WHERE id = $1 AND anonymized_at IS NULL",
        )
        .bind(id.as_i64())
        .bind(phone.as_str())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AuthError::NotFound("Business member not found".to_string()));
        }
        Ok(())
    }

    async fn update_icon(&self, id: BusinessMemberId, image: &[u8]) -> AuthResult<()> {
        let updated = sqlx::query(
            "UPDATE business_members SET profile_image = $2 WHERE id = $1 AND anonymized_at IS NULL",
        )
        .bind(id.as_i64())
        .bind(image)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AuthError::NotFound("Business member not found".to_string()));
        }
        Ok(())
    }

    async fn anonymize(&self, id: BusinessMemberId) -> AuthResult<()> {
        // COALESCE keeps the first anonymization timestamp, making the
        // overwrite idempotent
        let updated = sqlx::query(
            r#"
            UPDATE business_members
            SET name = $2,
                kana_name = $2,
                address = $2,
                phone = $2,
                profile_image = NULL,
                anonymized_at = COALESCE(anonymized_at, NOW())
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .bind(ANONYMIZED_SENTINEL)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AuthError::NotFound("Business member not found".to_string()));
        }

        tracing::info!(business_id = %id, "Business member anonymized");
        Ok(())
    }
}
