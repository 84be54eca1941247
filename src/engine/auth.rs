use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::account::{canonical_card_number, mask_card_number, CardKey};
use super::error::AuthError;
use super::store::{lock_account, AccountStore};

/// Hashes a session token for storage; the raw token only ever lives with the client.
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// The single statically configured administrator.
#[derive(Clone)]
pub struct AdminCredential {
    username: String,
    password_digest: [u8; 32],
}

impl AdminCredential {
    pub fn new(username: impl Into<String>, password: &str) -> Self {
        Self {
            username: username.into(),
            password_digest: Sha256::digest(password.as_bytes()).into(),
        }
    }

    fn verify(&self, username: &str, password: &str) -> bool {
        let digest: [u8; 32] = Sha256::digest(password.as_bytes()).into();
        self.username == username && self.password_digest == digest
    }
}

impl std::fmt::Debug for AdminCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredential")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Proof that the holder logged in as the customer owning one card.
#[derive(Debug, Clone)]
pub struct CustomerSession {
    card_key: CardKey,
    masked_card: String,
    expires_at: DateTime<Utc>,
}

impl CustomerSession {
    pub fn card_key(&self) -> CardKey {
        self.card_key
    }

    pub fn masked_card(&self) -> &str {
        &self.masked_card
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether this session may act on `card_number`.
    pub fn owns(&self, card_number: &str) -> bool {
        CardKey::from_card_number(card_number) == self.card_key
    }
}

/// Proof that the holder logged in as the administrator.
///
/// Only the `Authenticator` can create one; admin-only queries require a reference to it.
#[derive(Debug, Clone)]
pub struct AdminSession {
    username: String,
    expires_at: DateTime<Utc>,
}

impl AdminSession {
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

#[derive(Debug, Clone)]
enum Session {
    Customer(CustomerSession),
    Admin(AdminSession),
}

impl Session {
    fn expires_at(&self) -> DateTime<Utc> {
        match self {
            Session::Customer(session) => session.expires_at,
            Session::Admin(session) => session.expires_at,
        }
    }
}

/// Result of a successful customer login.
#[derive(Debug, Clone)]
pub struct CustomerLogin {
    /// Canonical card number, as the client should use it from now on
    pub card_number: String,
    pub token: String,
    pub session: CustomerSession,
}

/// Result of a successful administrator login.
#[derive(Debug, Clone)]
pub struct AdminLogin {
    pub token: String,
    pub session: AdminSession,
}

/// Validates customer and administrator credentials and tracks the resulting sessions.
///
/// Sessions are kept server-side, keyed by token digest, and expire after a fixed TTL.
/// Nothing here mutates accounts.
#[derive(Debug)]
pub struct Authenticator {
    accounts: Arc<AccountStore>,
    admin: AdminCredential,
    session_ttl: chrono::Duration,
    sessions: DashMap<String, Session>,
}

impl Authenticator {
    pub fn new(accounts: Arc<AccountStore>, admin: AdminCredential, session_ttl: Duration) -> Self {
        log::trace!("Authenticator initialized");
        Self {
            accounts,
            admin,
            session_ttl: chrono::Duration::from_std(session_ttl)
                .unwrap_or(chrono::Duration::MAX),
            sessions: DashMap::new(),
        }
    }

    /// Check a card number and PIN, and open a customer session.
    pub fn login_customer(&self, card_number: &str, pin: &str) -> Result<CustomerLogin, AuthError> {
        let card_key = CardKey::from_card_number(card_number);
        let masked = mask_card_number(card_number);

        let Some(handle) = self.accounts.get(&card_key) else {
            log::warn!("[login] card={masked} failed: unknown card");
            return Err(AuthError::AccountNotFound { card: masked });
        };
        {
            let account = lock_account(&handle)?;
            if !account.verify_pin(pin) {
                log::warn!("[login] card={masked} failed: wrong PIN");
                return Err(AuthError::InvalidCredential);
            }
        }

        let session = CustomerSession {
            card_key,
            masked_card: masked.clone(),
            expires_at: self.expiry(),
        };
        let token = self.issue(Session::Customer(session.clone()));
        log::info!("[login] card={masked} customer session opened");

        Ok(CustomerLogin {
            card_number: canonical_card_number(card_number),
            token,
            session,
        })
    }

    /// Check the administrator credential, and open an admin session.
    pub fn login_admin(&self, username: &str, password: &str) -> Result<AdminLogin, AuthError> {
        if !self.admin.verify(username, password) {
            log::warn!("[login] admin login failed for user {username:?}");
            return Err(AuthError::InvalidCredential);
        }

        let session = AdminSession {
            username: username.to_string(),
            expires_at: self.expiry(),
        };
        let token = self.issue(Session::Admin(session.clone()));
        log::info!("[login] admin session opened for {username}");

        Ok(AdminLogin { token, session })
    }

    /// Resolve a bearer token into a customer capability.
    pub fn customer_session(&self, token: &str) -> Result<CustomerSession, AuthError> {
        match self.resolve(token)? {
            Session::Customer(session) => Ok(session),
            Session::Admin(_) => Err(AuthError::Forbidden),
        }
    }

    /// Resolve a bearer token into the admin capability.
    pub fn admin_session(&self, token: &str) -> Result<AdminSession, AuthError> {
        match self.resolve(token)? {
            Session::Admin(session) => Ok(session),
            Session::Customer(_) => Err(AuthError::Forbidden),
        }
    }

    /// Revoke a session. Returns whether the token was live.
    pub fn logout(&self, token: &str) -> bool {
        self.sessions.remove(&hash_token(token)).is_some()
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    fn expiry(&self) -> DateTime<Utc> {
        Utc::now()
            .checked_add_signed(self.session_ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    fn issue(&self, session: Session) -> String {
        let now = Utc::now();
        self.sessions.retain(|_, existing| existing.expires_at() > now);

        let token = Uuid::new_v4().simple().to_string();
        self.sessions.insert(hash_token(&token), session);
        token
    }

    fn resolve(&self, token: &str) -> Result<Session, AuthError> {
        let digest = hash_token(token);
        let session = self
            .sessions
            .get(&digest)
            .map(|entry| entry.value().clone())
            .ok_or(AuthError::InvalidSession)?;

        if session.expires_at() <= Utc::now() {
            self.sessions.remove(&digest);
            return Err(AuthError::SessionExpired);
        }
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const CARD: &str = "4123456789012345";

    fn authenticator(ttl: Duration) -> Authenticator {
        let accounts = Arc::new(AccountStore::new());
        accounts.insert(CARD, "1234", dec!(500)).unwrap();
        Authenticator::new(accounts, AdminCredential::new("admin", "s3cret"), ttl)
    }

    #[test]
    fn test_customer_login_success() {
        let auth = authenticator(Duration::from_secs(60));
        let login = auth.login_customer("4123 4567 8901 2345", "1234").unwrap();

        assert_eq!(login.card_number, CARD);
        assert!(login.session.owns(CARD));
        assert!(!login.session.owns("4987654321098765"));
        assert_eq!(login.session.masked_card(), "4123********2345");

        let session = auth.customer_session(&login.token).unwrap();
        assert_eq!(session.card_key(), CardKey::from_card_number(CARD));
    }

    #[test]
    fn test_customer_login_wrong_pin() {
        let auth = authenticator(Duration::from_secs(60));
        assert!(matches!(
            auth.login_customer(CARD, "0000"),
            Err(AuthError::InvalidCredential)
        ));
        assert_eq!(auth.active_sessions(), 0);
    }

    #[test]
    fn test_customer_login_unknown_card() {
        let auth = authenticator(Duration::from_secs(60));
        match auth.login_customer("4000000000000000", "1234") {
            Err(AuthError::AccountNotFound { card }) => assert_eq!(card, "4000********0000"),
            other => panic!("expected AccountNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_admin_login() {
        let auth = authenticator(Duration::from_secs(60));
        let login = auth.login_admin("admin", "s3cret").unwrap();
        assert_eq!(auth.admin_session(&login.token).unwrap().username(), "admin");

        assert!(matches!(auth.login_admin("admin", "admin"), Err(AuthError::InvalidCredential)));
        assert!(matches!(auth.login_admin("root", "s3cret"), Err(AuthError::InvalidCredential)));
    }

    #[test]
    fn test_roles_are_not_interchangeable() {
        let auth = authenticator(Duration::from_secs(60));
        let customer = auth.login_customer(CARD, "1234").unwrap();
        let admin = auth.login_admin("admin", "s3cret").unwrap();

        assert!(matches!(auth.admin_session(&customer.token), Err(AuthError::Forbidden)));
        assert!(matches!(auth.customer_session(&admin.token), Err(AuthError::Forbidden)));
    }

    #[test]
    fn test_unknown_token() {
        let auth = authenticator(Duration::from_secs(60));
        assert!(matches!(auth.customer_session("nope"), Err(AuthError::InvalidSession)));
    }

    #[test]
    fn test_expired_session_is_rejected_and_dropped() {
        let auth = authenticator(Duration::ZERO);
        let login = auth.login_customer(CARD, "1234").unwrap();

        assert!(matches!(
            auth.customer_session(&login.token),
            Err(AuthError::SessionExpired)
        ));
        assert_eq!(auth.active_sessions(), 0);
    }

    #[test]
    fn test_logout_revokes() {
        let auth = authenticator(Duration::from_secs(60));
        let login = auth.login_admin("admin", "s3cret").unwrap();

        assert!(auth.logout(&login.token));
        assert!(!auth.logout(&login.token));
        assert!(matches!(auth.admin_session(&login.token), Err(AuthError::InvalidSession)));
    }

    #[test]
    fn test_admin_credential_debug_hides_password() {
        let credential = AdminCredential::new("admin", "s3cret");
        let debug = format!("{credential:?}");
        assert!(debug.contains("admin"));
        assert!(!debug.contains("s3cret"));
    }
}
