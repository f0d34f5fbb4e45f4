//! Signed session cookies.
//!
//! Cookie value: `{user_id}-{expires}-{signature}` where `user_id` is the
//! simple (hyphen-free) UUID form, `expires` is a unix timestamp in seconds and
//! `signature` is hex HMAC-SHA256 over `{user_id}-{stored_password}-{expires}`.
//! Binding the stored password into the signature invalidates every
//! outstanding cookie when the password changes.

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

use myblog_core::{User, UserId};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("session secret must not be empty")]
    EmptySecret,

    #[error("session max age must be positive and representable")]
    InvalidMaxAge,

    #[error("session expiry is out of range")]
    ExpiryOutOfRange,

    #[error("malformed session cookie")]
    Malformed,

    #[error("session has expired")]
    Expired,

    #[error("session signature mismatch")]
    BadSignature,
}

/// Fields carried by a session cookie, before verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub user_id: UserId,
    pub expires: i64,
    signature: Vec<u8>,
}

impl SessionClaims {
    /// Split a cookie value into its parts. Does not check expiry or signature.
    pub fn parse(cookie: &str) -> Result<Self, SessionError> {
        let mut parts = cookie.split('-');
        let (Some(uid), Some(expires), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(SessionError::Malformed);
        };

        let uuid = Uuid::try_parse(uid).map_err(|_| SessionError::Malformed)?;
        let expires = expires.parse::<i64>().map_err(|_| SessionError::Malformed)?;
        let signature = hex::decode(signature).map_err(|_| SessionError::Malformed)?;

        Ok(Self {
            user_id: UserId::from_uuid(uuid),
            expires,
            signature,
        })
    }
}

/// Issues and verifies session cookies with a process-wide secret.
#[derive(Clone)]
pub struct SessionSigner {
    mac: HmacSha256,
    max_age: Duration,
}

impl core::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionSigner")
            .field("max_age", &self.max_age)
            .finish_non_exhaustive()
    }
}

impl SessionSigner {
    pub fn new(secret: &[u8], max_age: Duration) -> Result<Self, SessionError> {
        if secret.is_empty() {
            return Err(SessionError::EmptySecret);
        }
        if max_age <= Duration::zero() {
            return Err(SessionError::InvalidMaxAge);
        }
        let mac = HmacSha256::new_from_slice(secret).map_err(|_| SessionError::EmptySecret)?;
        Ok(Self { mac, max_age })
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Signer whose lifetime is given in seconds, as read from configuration.
    pub fn with_max_age_secs(secret: &[u8], max_age_secs: i64) -> Result<Self, SessionError> {
        let max_age = Duration::try_seconds(max_age_secs).ok_or(SessionError::InvalidMaxAge)?;
        Self::new(secret, max_age)
    }

    /// Cookie value for `user`, valid for `max_age` from `now`.
    pub fn issue(&self, user: &User, now: DateTime<Utc>) -> Result<String, SessionError> {
        let uid = user.id.as_uuid().simple().to_string();
        let expires = now
            .checked_add_signed(self.max_age)
            .ok_or(SessionError::ExpiryOutOfRange)?
            .timestamp();
        let signature = self.sign(&uid, &user.passwd, expires);
        Ok(format!("{uid}-{expires}-{}", hex::encode(signature)))
    }

    /// Check expiry and signature of `claims` against the user's stored password.
    pub fn verify(
        &self,
        claims: &SessionClaims,
        stored_password: &str,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if claims.expires < now.timestamp() {
            return Err(SessionError::Expired);
        }

        let uid = claims.user_id.as_uuid().simple().to_string();
        let mut mac = self.mac.clone();
        mac.update(message(&uid, stored_password, claims.expires).as_bytes());
        mac.verify_slice(&claims.signature)
            .map_err(|_| SessionError::BadSignature)
    }

    fn sign(&self, uid: &str, stored_password: &str, expires: i64) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(message(uid, stored_password, expires).as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

fn message(uid: &str, stored_password: &str, expires: i64) -> String {
    format!("{uid}-{stored_password}-{expires}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(passwd: &str) -> User {
        User {
            id: UserId::new(),
            email: "test@example.com".into(),
            passwd: passwd.into(),
            admin: false,
            name: "Test".into(),
            image: "about:blank".into(),
            created_at: Utc::now(),
        }
    }

    fn signer() -> SessionSigner {
        SessionSigner::new(b"test-secret", Duration::seconds(86_400)).unwrap()
    }

    #[test]
    fn issued_cookie_verifies() {
        let signer = signer();
        let user = user("stored");
        let now = Utc::now();

        let cookie = signer.issue(&user, now).unwrap();
        let claims = SessionClaims::parse(&cookie).unwrap();

        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.expires, now.timestamp() + 86_400);
        assert_eq!(signer.verify(&claims, "stored", now), Ok(()));
    }

    #[test]
    fn expired_cookie_is_rejected() {
        let signer = signer();
        let user = user("stored");
        let now = Utc::now();
        let claims = SessionClaims::parse(&signer.issue(&user, now).unwrap()).unwrap();

        let later = now + Duration::seconds(86_401);
        assert_eq!(signer.verify(&claims, "stored", later), Err(SessionError::Expired));
    }

    #[test]
    fn password_change_invalidates_cookie() {
        let signer = signer();
        let user = user("old");
        let now = Utc::now();
        let claims = SessionClaims::parse(&signer.issue(&user, now).unwrap()).unwrap();

        assert_eq!(signer.verify(&claims, "new", now), Err(SessionError::BadSignature));
    }

    #[test]
    fn other_secret_is_rejected() {
        let user = user("stored");
        let now = Utc::now();
        let cookie = signer().issue(&user, now).unwrap();

        let other = SessionSigner::new(b"other-secret", Duration::seconds(60)).unwrap();
        let claims = SessionClaims::parse(&cookie).unwrap();
        assert_eq!(other.verify(&claims, "stored", now), Err(SessionError::BadSignature));
    }

    #[test]
    fn malformed_cookies() {
        for raw in ["", "-deleted-", "a-b", "a-b-c-d", "zz-123-abcd"] {
            assert_eq!(SessionClaims::parse(raw), Err(SessionError::Malformed), "{raw}");
        }
        let uid = UserId::new().as_uuid().simple().to_string();
        assert_eq!(
            SessionClaims::parse(&format!("{uid}-soon-abcd")),
            Err(SessionError::Malformed)
        );
        assert_eq!(
            SessionClaims::parse(&format!("{uid}-123-nothex")),
            Err(SessionError::Malformed)
        );
    }

    #[test]
    fn max_age_must_be_positive_and_representable() {
        for secs in [0, -5, i64::MAX] {
            assert_eq!(
                SessionSigner::with_max_age_secs(b"s", secs).unwrap_err(),
                SessionError::InvalidMaxAge,
                "{secs}"
            );
        }
        let signer = SessionSigner::with_max_age_secs(b"s", 60).unwrap();
        assert_eq!(signer.max_age(), Duration::seconds(60));
    }

    #[test]
    fn expiry_overflow_is_an_error() {
        let signer = SessionSigner::new(b"s", Duration::days(365)).unwrap();
        assert_eq!(
            signer.issue(&user("stored"), DateTime::<Utc>::MAX_UTC),
            Err(SessionError::ExpiryOutOfRange)
        );
    }

    #[test]
    fn empty_secret_is_refused() {
        assert_eq!(
            SessionSigner::new(b"", Duration::seconds(1)).unwrap_err(),
            SessionError::EmptySecret
        );
    }
}
