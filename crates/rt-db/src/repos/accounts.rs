//! Account repository: registration, login, and activation.

use chrono::Utc;

use rt_auth::{generate_account_hash, mask_account_hash, validate_account_hash};
use rt_core::entities::Account;
use rt_core::enums::{AccountRole, ActivityAction, EntityType};

use crate::error::DatabaseError;
use crate::helpers::{get_bool, get_opt_string, parse_datetime, parse_enum, parse_optional_datetime};
use crate::repos::activity::ActivityRecord;
use crate::service::ResearchService;

const SELECT_COLS: &str = "account_hash, role, is_active, created_at, last_login_at";

/// Hash collisions are astronomically rare; give up after this many draws.
pub const MAX_REGISTRATION_ATTEMPTS: u32 = 100;

fn row_to_account(row: &libsql::Row) -> Result<Account, DatabaseError> {
    Ok(Account {
        account_hash: row.get(0)?,
        role: parse_enum(&row.get::<String>(1)?)?,
        is_active: get_bool(row, 2)?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
        last_login_at: parse_optional_datetime(get_opt_string(row, 4)?.as_deref())?,
    })
}

impl ResearchService {
    /// Draw a fresh account hash and store it.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Constraint` if every draw collided with an
    /// existing account.
    pub async fn register_account(&self, role: AccountRole) -> Result<Account, DatabaseError> {
        for attempt in 1..=MAX_REGISTRATION_ATTEMPTS {
            let hash = generate_account_hash().map_err(|e| DatabaseError::Other(e.into()))?;
            let now = Utc::now();
            let inserted = self
                .db()
                .execute(
                    "INSERT OR IGNORE INTO accounts (account_hash, role, is_active, created_at)
                     VALUES (?1, ?2, 1, ?3)",
                    libsql::params![hash.as_str(), role.as_str(), now.to_rfc3339()],
                )
                .await?;
            if inserted == 0 {
                tracing::debug!(attempt, "account hash collision, drawing again");
                continue;
            }

            self.append_activity(ActivityRecord {
                workspace_id: None,
                account_hash: Some(&hash),
                entity_type: EntityType::Account,
                entity_id: &hash,
                action: ActivityAction::Created,
                detail: Some(serde_json::json!({ "role": role.as_str() })),
            })
            .await?;
            tracing::info!(account = %mask_account_hash(&hash), %role, "account registered");

            return Ok(Account {
                account_hash: hash,
                role,
                is_active: true,
                created_at: now,
                last_login_at: None,
            });
        }
        Err(DatabaseError::Constraint(format!(
            "no unique account hash after {MAX_REGISTRATION_ATTEMPTS} attempts"
        )))
    }

    pub async fn get_account(&self, account_hash: &str) -> Result<Account, DatabaseError> {
        let mut rows = self
            .db()
            .query(
                &format!("SELECT {SELECT_COLS} FROM accounts WHERE account_hash = ?1"),
                [account_hash],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_account(&row)
    }

    pub async fn account_exists(&self, account_hash: &str) -> Result<bool, DatabaseError> {
        match self.get_account(account_hash).await {
            Ok(_) => Ok(true),
            Err(DatabaseError::NoResult) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Resolve a login. Unknown but well-formed hashes get a new analyst
    /// account; the flag reports whether that happened.
    ///
    /// Inactive accounts are returned untouched so the caller can refuse
    /// them.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for a malformed hash.
    pub async fn login_account(&self, account_hash: &str) -> Result<(Account, bool), DatabaseError> {
        validate_account_hash(account_hash)
            .map_err(|e| DatabaseError::Validation(e.to_string()))?;
        let now = Utc::now();

        match self.get_account(account_hash).await {
            Ok(account) if !account.is_active => Ok((account, false)),
            Ok(account) => {
                self.db()
                    .execute(
                        "UPDATE accounts SET last_login_at = ?1 WHERE account_hash = ?2",
                        libsql::params![now.to_rfc3339(), account_hash],
                    )
                    .await?;
                Ok((
                    Account {
                        last_login_at: Some(now),
                        ..account
                    },
                    false,
                ))
            }
            Err(DatabaseError::NoResult) => {
                let role = AccountRole::Analyst;
                self.db()
                    .execute(
                        "INSERT INTO accounts (account_hash, role, is_active, created_at, last_login_at)
                         VALUES (?1, ?2, 1, ?3, ?4)",
                        libsql::params![account_hash, role.as_str(), now.to_rfc3339(), now.to_rfc3339()],
                    )
                    .await?;
                self.append_activity(ActivityRecord {
                    workspace_id: None,
                    account_hash: Some(account_hash),
                    entity_type: EntityType::Account,
                    entity_id: account_hash,
                    action: ActivityAction::Created,
                    detail: Some(serde_json::json!({ "role": role.as_str(), "via": "login" })),
                })
                .await?;
                tracing::info!(account = %mask_account_hash(account_hash), "account created on login");
                Ok((
                    Account {
                        account_hash: account_hash.to_string(),
                        role,
                        is_active: true,
                        created_at: now,
                        last_login_at: Some(now),
                    },
                    true,
                ))
            }
            Err(err) => Err(err),
        }
    }

    pub async fn set_account_active(
        &self,
        by: &str,
        account_hash: &str,
        active: bool,
    ) -> Result<Account, DatabaseError> {
        let changed = self
            .db()
            .execute(
                "UPDATE accounts SET is_active = ?1 WHERE account_hash = ?2",
                libsql::params![i64::from(active), account_hash],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }

        self.append_activity(ActivityRecord {
            workspace_id: None,
            account_hash: Some(by),
            entity_type: EntityType::Account,
            entity_id: account_hash,
            action: ActivityAction::Updated,
            detail: Some(serde_json::json!({ "is_active": active })),
        })
        .await?;
        self.get_account(account_hash).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn register_stores_a_valid_hash() {
        let svc = test_service().await;
        let account = svc.register_account(AccountRole::Researcher).await.unwrap();
        assert!(validate_account_hash(&account.account_hash).is_ok());

        let stored = svc.get_account(&account.account_hash).await.unwrap();
        assert_eq!(stored.role, AccountRole::Researcher);
        assert!(stored.is_active);
        assert_eq!(stored.last_login_at, None);
    }

    #[tokio::test]
    async fn registrations_are_distinct() {
        let svc = test_service().await;
        let a = svc.register_account(AccountRole::Analyst).await.unwrap();
        let b = svc.register_account(AccountRole::Analyst).await.unwrap();
        assert_ne!(a.account_hash, b.account_hash);
    }

    #[tokio::test]
    async fn login_auto_creates_unknown_hash() {
        let svc = test_service().await;
        let hash = "4242424242424242";
        assert!(!svc.account_exists(hash).await.unwrap());

        let (account, created) = svc.login_account(hash).await.unwrap();
        assert!(created);
        assert_eq!(account.role, AccountRole::Analyst);
        assert!(svc.account_exists(hash).await.unwrap());

        let (again, created) = svc.login_account(hash).await.unwrap();
        assert!(!created);
        assert!(again.last_login_at.is_some());
    }

    #[tokio::test]
    async fn login_rejects_malformed_hash() {
        let svc = test_service().await;
        let err = svc.login_account("12ab").await.unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
    }

    #[tokio::test]
    async fn inactive_login_is_not_touched() {
        let svc = test_service().await;
        let admin = svc.register_account(AccountRole::Admin).await.unwrap();
        let user = svc.register_account(AccountRole::Analyst).await.unwrap();
        svc.set_account_active(&admin.account_hash, &user.account_hash, false)
            .await
            .unwrap();

        let (account, created) = svc.login_account(&user.account_hash).await.unwrap();
        assert!(!created);
        assert!(!account.is_active);
        assert_eq!(account.last_login_at, None);
    }

    #[tokio::test]
    async fn deactivating_unknown_account_is_no_result() {
        let svc = test_service().await;
        let err = svc
            .set_account_active("1111111111111111", "2222222222222222", false)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NoResult));
    }
}
