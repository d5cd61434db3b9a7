use anyhow::{Context, Result};
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, Set,
};

use crate::entities::{access_tokens, prelude::*, users};

pub struct TokenRepository {
    conn: DatabaseConnection,
}

impl TokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Issue a fresh bearer token for a user. Each login gets its own row so
    /// sessions on different devices can be revoked independently.
    pub async fn issue(&self, user_id: i32) -> Result<String> {
        let token = generate_token();

        access_tokens::ActiveModel {
            user_id: Set(user_id),
            token: Set(token.clone()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert access token")?;

        Ok(token)
    }

    /// Resolve a bearer token to its owning user and stamp `last_used_at`.
    pub async fn verify(&self, token: &str) -> Result<Option<users::Model>> {
        let row = AccessTokens::find()
            .filter(access_tokens::Column::Token.eq(token))
            .find_also_related(Users)
            .one(&self.conn)
            .await
            .context("Failed to look up access token")?;

        let Some((token_row, user)) = row else {
            return Ok(None);
        };

        let mut active: access_tokens::ActiveModel = token_row.into();
        active.last_used_at = Set(Some(chrono::Utc::now().to_rfc3339()));
        active.update(&self.conn).await?;

        Ok(user)
    }

    /// Revoke a single token (logout from the current device).
    pub async fn revoke(&self, token: &str) -> Result<bool> {
        let Some(row) = AccessTokens::find()
            .filter(access_tokens::Column::Token.eq(token))
            .one(&self.conn)
            .await?
        else {
            return Ok(false);
        };

        row.delete(&self.conn).await?;
        Ok(true)
    }

    /// Revoke every token belonging to a user (logout from all devices).
    pub async fn revoke_all(&self, user_id: i32) -> Result<u64> {
        let result = AccessTokens::delete_many()
            .filter(access_tokens::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }
}

/// Generate a random 64-character hex token.
fn generate_token() -> String {
    let mut rng = rand::rng();
    (0..32).fold(String::with_capacity(64), |mut acc, _| {
        let byte: u8 = rng.random();
        acc.push_str(&format!("{byte:02x}"));
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_64_hex_chars() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn generated_tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }
}
