//! Per-account settings, stored as one JSON object.

use chrono::Utc;

use rt_core::entities::AccountSettings;

use crate::error::DatabaseError;
use crate::helpers::{parse_datetime, parse_json};
use crate::service::ResearchService;

impl ResearchService {
    /// Settings for an account; `{}` if none were ever stored.
    pub async fn get_settings(&self, account_hash: &str) -> Result<AccountSettings, DatabaseError> {
        let mut rows = self
            .db()
            .query(
                "SELECT settings, updated_at FROM account_settings WHERE account_hash = ?1",
                [account_hash],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(AccountSettings {
                account_hash: account_hash.to_string(),
                settings: parse_json(&row.get::<String>(0)?)?,
                updated_at: parse_datetime(&row.get::<String>(1)?)?,
            }),
            None => Ok(AccountSettings {
                account_hash: account_hash.to_string(),
                settings: serde_json::Value::Object(serde_json::Map::new()),
                updated_at: Utc::now(),
            }),
        }
    }

    /// Replace an account's settings.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` unless `settings` is a JSON object.
    pub async fn put_settings(
        &self,
        account_hash: &str,
        settings: serde_json::Value,
    ) -> Result<AccountSettings, DatabaseError> {
        if !settings.is_object() {
            return Err(DatabaseError::Validation("settings must be a JSON object".into()));
        }
        let now = Utc::now();
        self.db()
            .execute(
                "INSERT INTO account_settings (account_hash, settings, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT (account_hash) DO UPDATE SET settings = excluded.settings, updated_at = excluded.updated_at",
                libsql::params![account_hash, settings.to_string(), now.to_rfc3339()],
            )
            .await?;
        Ok(AccountSettings {
            account_hash: account_hash.to_string(),
            settings,
            updated_at: now,
        })
    }
}
