//! 브로커 계정/토큰 저장소.
//!
//! 토큰 발급(브라우저 로그인 자동화)은 외부 도구가 담당하며,
//! 이 모듈은 그 도구가 사용하는 저장소 인터페이스만 제공합니다.
//! 갱신 사이클은 이 저장소에 의존하지 않습니다.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::error::{DataError, Result};

/// 발급된 액세스 토큰.
#[derive(Debug, Clone)]
pub struct TokenPayload {
    pub access_token: SecretString,
    pub created_at: DateTime<Utc>,
}

impl TokenPayload {
    /// 새 토큰 페이로드 생성.
    pub fn new(access_token: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            created_at,
        }
    }
}

/// 브로커 API 계정.
#[derive(Debug, Clone)]
pub struct BrokerAccount {
    pub api_key: String,
    pub api_secret: SecretString,
    pub totp_secret: SecretString,
    pub redirect_uri: String,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub is_active: bool,
    /// 현재 저장된 토큰
    pub token: Option<TokenPayload>,
}

impl BrokerAccount {
    /// 토큰 발급에 필요한 자격증명이 모두 있는지 확인.
    pub fn has_required_credentials(&self) -> bool {
        !self.api_key.is_empty()
            && !self.api_secret.expose_secret().is_empty()
            && !self.totp_secret.expose_secret().is_empty()
            && !self.redirect_uri.is_empty()
    }

    /// 로그인 정보까지 있어 완전 자동 발급이 가능한지 확인.
    pub fn supports_full_automation(&self) -> bool {
        self.username.as_deref().is_some_and(|u| !u.is_empty())
            && self
                .password
                .as_ref()
                .is_some_and(|p| !p.expose_secret().is_empty())
    }

    /// 토큰 발급 후 경과 시간.
    pub fn token_age(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.token.as_ref().map(|t| now - t.created_at)
    }

    /// 로그 출력용 마스킹된 API 키.
    pub fn masked_api_key(&self) -> String {
        let visible: String = self.api_key.chars().take(4).collect();
        format!("{}****", visible)
    }
}

/// 계정/토큰 저장소 트레잇.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// 활성 계정 목록.
    async fn get_accounts(&self) -> Result<Vec<BrokerAccount>>;

    /// 계정의 토큰 갱신. 계정이 없으면 `NotFound`.
    async fn update_token(&self, api_key: &str, token: &TokenPayload) -> Result<()>;
}

/// 메모리 계정 저장소.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<BTreeMap<String, BrokerAccount>>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 계정 추가 (같은 API 키는 교체).
    pub async fn save_account(&self, account: BrokerAccount) {
        self.accounts
            .write()
            .await
            .insert(account.api_key.clone(), account);
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn get_accounts(&self) -> Result<Vec<BrokerAccount>> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .filter(|a| a.is_active)
            .cloned()
            .collect())
    }

    async fn update_token(&self, api_key: &str, token: &TokenPayload) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(api_key)
            .ok_or_else(|| DataError::NotFound(format!("account {}", api_key)))?;
        account.token = Some(token.clone());
        Ok(())
    }
}

/// 계정 테이블 레코드.
#[derive(Debug, Clone, FromRow)]
struct AccountRecord {
    api_key: String,
    api_secret: String,
    totp_secret: String,
    redirect_uri: String,
    username: Option<String>,
    password: Option<String>,
    is_active: bool,
    access_token: Option<String>,
    token_created_at: Option<DateTime<Utc>>,
}

impl From<AccountRecord> for BrokerAccount {
    fn from(r: AccountRecord) -> Self {
        let token = match (r.access_token, r.token_created_at) {
            (Some(access_token), Some(created_at)) => Some(TokenPayload::new(access_token, created_at)),
            _ => None,
        };

        Self {
            api_key: r.api_key,
            api_secret: SecretString::from(r.api_secret),
            totp_secret: SecretString::from(r.totp_secret),
            redirect_uri: r.redirect_uri,
            username: r.username,
            password: r.password.map(SecretString::from),
            is_active: r.is_active,
            token,
        }
    }
}

/// PostgreSQL 계정 저장소.
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    #[instrument(skip(self))]
    async fn get_accounts(&self) -> Result<Vec<BrokerAccount>> {
        let records: Vec<AccountRecord> = sqlx::query_as(
            r#"
            SELECT api_key, api_secret, totp_secret, redirect_uri, username, password,
                   is_active, access_token, token_created_at
            FROM broker_accounts
            WHERE is_active = TRUE
            ORDER BY api_key
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(BrokerAccount::from).collect())
    }

    #[instrument(skip(self, token))]
    async fn update_token(&self, api_key: &str, token: &TokenPayload) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE broker_accounts
            SET access_token = $2, token_created_at = $3
            WHERE api_key = $1
            "#,
        )
        .bind(api_key)
        .bind(token.access_token.expose_secret())
        .bind(token.created_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DataError::NotFound(format!("account {}", api_key)));
        }

        info!("토큰 갱신 완료");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(api_key: &str, active: bool) -> BrokerAccount {
        BrokerAccount {
            api_key: api_key.to_string(),
            api_secret: SecretString::from("secret".to_string()),
            totp_secret: SecretString::from("totp".to_string()),
            redirect_uri: "http://localhost:5000/callback".to_string(),
            username: None,
            password: None,
            is_active: active,
            token: None,
        }
    }

    #[tokio::test]
    async fn test_only_active_accounts_are_listed() {
        let store = InMemoryAccountStore::new();
        store.save_account(account("key-a", true)).await;
        store.save_account(account("key-b", false)).await;

        let accounts = store.get_accounts().await.unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].api_key, "key-a");
    }

    #[tokio::test]
    async fn test_update_token() {
        let store = InMemoryAccountStore::new();
        store.save_account(account("key-a", true)).await;

        let created = Utc::now();
        store
            .update_token("key-a", &TokenPayload::new("tok", created))
            .await
            .unwrap();

        let accounts = store.get_accounts().await.unwrap();
        let token = accounts[0].token.as_ref().unwrap();
        assert_eq!(token.access_token.expose_secret(), "tok");
        assert_eq!(accounts[0].token_age(created + Duration::hours(2)), Some(Duration::hours(2)));

        let missing = store.update_token("nope", &TokenPayload::new("tok", created)).await;
        assert!(matches!(missing, Err(DataError::NotFound(_))));
    }

    #[test]
    fn test_credential_checks() {
        let mut acc = account("abcdef", true);
        assert!(acc.has_required_credentials());
        assert!(!acc.supports_full_automation());
        assert_eq!(acc.masked_api_key(), "abcd****");

        acc.username = Some("trader".to_string());
        acc.password = Some(SecretString::from("pw".to_string()));
        assert!(acc.supports_full_automation());

        acc.redirect_uri.clear();
        assert!(!acc.has_required_credentials());
    }
}
