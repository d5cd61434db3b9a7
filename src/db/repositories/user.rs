use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::{prelude::*, profiles, users};
use crate::models::Role;

/// User data returned from the repository (without the password hash).
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub role: Role,
    pub blocked_at: Option<String>,
    pub blocked_by: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        // Role labels in the database are written by this repository only,
        // so an unparseable label is treated as the least-privileged role.
        let role = model.role.parse().unwrap_or(Role::Mentor);
        Self {
            id: model.id,
            email: model.email,
            role,
            blocked_at: model.blocked_at,
            blocked_by: model.blocked_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Outcome of a credential check.
#[derive(Debug)]
pub enum AuthOutcome {
    Success(User),
    InvalidCredentials,
    Blocked { blocked_at: String },
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    pub async fn list_by_role(&self, role: Role) -> Result<Vec<(User, Option<profiles::Model>)>> {
        let rows = Users::find()
            .filter(users::Column::Role.eq(role.as_str()))
            .order_by_asc(users::Column::Email)
            .find_also_related(Profiles)
            .all(&self.conn)
            .await
            .context("Failed to list users by role")?;

        Ok(rows
            .into_iter()
            .map(|(u, p)| (User::from(u), p))
            .collect())
    }

    /// Email uniqueness probe across the whole users table regardless of role.
    /// `exclude_id` skips the record being updated so a user keeping their own
    /// email does not trip the check.
    pub async fn email_taken(&self, email: &str, exclude_id: Option<i32>) -> Result<bool> {
        let mut query = Users::find().filter(users::Column::Email.eq(email));
        if let Some(id) = exclude_id {
            query = query.filter(users::Column::Id.ne(id));
        }

        let existing = query
            .one(&self.conn)
            .await
            .context("Failed to check email uniqueness")?;

        Ok(existing.is_some())
    }

    pub async fn create(
        &self,
        email: &str,
        password: &str,
        role: Role,
        security: &SecurityConfig,
    ) -> Result<User> {
        let password = password.to_string();
        let config = security.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, Some(&config)))
            .await
            .context("Password hashing task panicked")??;

        let now = chrono::Utc::now().to_rfc3339();
        let model = users::ActiveModel {
            email: Set(email.to_string()),
            password_hash: Set(password_hash),
            role: Set(role.as_str().to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert user")?;

        Ok(User::from(model))
    }

    pub async fn update(
        &self,
        id: i32,
        email: &str,
        new_password: Option<&str>,
        security: &SecurityConfig,
    ) -> Result<Option<User>> {
        let Some(user) = Users::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        active.email = Set(email.to_string());

        if let Some(password) = new_password {
            let password = password.to_string();
            let config = security.clone();
            let hash = task::spawn_blocking(move || hash_password(&password, Some(&config)))
                .await
                .context("Password hashing task panicked")??;
            active.password_hash = Set(hash);
        }

        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        let model = active.update(&self.conn).await?;

        Ok(Some(User::from(model)))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Users::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    /// Marks an account as blocked. Existing tokens stop working because the
    /// auth middleware re-checks the flag on every request.
    pub async fn block(&self, id: i32, blocked_by: i32) -> Result<Option<User>> {
        let Some(user) = Users::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let now = chrono::Utc::now().to_rfc3339();
        let mut active: users::ActiveModel = user.into();
        active.blocked_at = Set(Some(now.clone()));
        active.blocked_by = Set(Some(blocked_by));
        active.updated_at = Set(now);
        let model = active.update(&self.conn).await?;

        Ok(Some(User::from(model)))
    }

    pub async fn unblock(&self, id: i32) -> Result<Option<User>> {
        let Some(user) = Users::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        active.blocked_at = Set(None);
        active.blocked_by = Set(None);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        let model = active.update(&self.conn).await?;

        Ok(Some(User::from(model)))
    }

    /// Verify credentials for login.
    /// Note: this uses `spawn_blocking` because Argon2 verification is
    /// CPU-intensive and would block the async runtime if run directly.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<AuthOutcome> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user for authentication")?;

        let Some(user) = user else {
            return Ok(AuthOutcome::InvalidCredentials);
        };

        let password_hash = user.password_hash.clone();
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            let argon2 = Argon2::default();
            Ok::<bool, anyhow::Error>(
                argon2
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        if !is_valid {
            return Ok(AuthOutcome::InvalidCredentials);
        }

        if let Some(blocked_at) = user.blocked_at.clone() {
            return Ok(AuthOutcome::Blocked { blocked_at });
        }

        Ok(AuthOutcome::Success(User::from(user)))
    }

    pub async fn get_profile(&self, user_id: i32) -> Result<Option<profiles::Model>> {
        let profile = Profiles::find()
            .filter(profiles::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query profile")?;

        Ok(profile)
    }

    /// Creates or updates the 1:1 profile for a user.
    pub async fn upsert_profile(&self, input: ProfileInput) -> Result<profiles::Model> {
        let existing = Profiles::find()
            .filter(profiles::Column::UserId.eq(input.user_id))
            .one(&self.conn)
            .await?;

        let model = if let Some(profile) = existing {
            let mut active: profiles::ActiveModel = profile.into();
            active.full_name = Set(input.full_name);
            active.gender = Set(input.gender);
            active.nickname = Set(input.nickname);
            active.birth_date = Set(input.birth_date);
            active.phone_number = Set(input.phone_number);
            active.address = Set(input.address);
            active.job = Set(input.job);
            active.status = Set(input.status);
            active.status_note = Set(input.status_note);
            active.update(&self.conn).await?
        } else {
            profiles::ActiveModel {
                user_id: Set(input.user_id),
                full_name: Set(input.full_name),
                gender: Set(input.gender),
                nickname: Set(input.nickname),
                birth_date: Set(input.birth_date),
                phone_number: Set(input.phone_number),
                address: Set(input.address),
                job: Set(input.job),
                status: Set(input.status),
                status_note: Set(input.status_note),
                ..Default::default()
            }
            .insert(&self.conn)
            .await?
        };

        Ok(model)
    }

    pub async fn set_profile_picture(&self, user_id: i32, path: &str) -> Result<bool> {
        let Some(profile) = Profiles::find()
            .filter(profiles::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await?
        else {
            return Ok(false);
        };

        let mut active: profiles::ActiveModel = profile.into();
        active.profile_picture = Set(Some(path.to_string()));
        active.update(&self.conn).await?;

        Ok(true)
    }
}

/// Input for creating or updating a profile. Labels are already canonical
/// by the time they reach the repository.
pub struct ProfileInput {
    pub user_id: i32,
    pub full_name: String,
    pub gender: String,
    pub nickname: Option<String>,
    pub birth_date: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub job: Option<String>,
    pub status: String,
    pub status_note: Option<String>,
}

/// Hash a password using Argon2id with optional custom params.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
