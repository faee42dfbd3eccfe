//! Confirmation numbers and opaque URL tokens.
//!
//! Nothing here checks for collisions; uniqueness is enforced by the
//! database and surfaces to the caller as a conflict.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// Literal prefix of every confirmation number.
pub const CONFIRMATION_PREFIX: &str = "BK";

/// Number of random characters after the date.
const CONFIRMATION_SUFFIX_LEN: usize = 4;

/// Random bytes in a URL token (43 characters once encoded).
pub const URL_TOKEN_BYTES: usize = 32;

/// Lifetime of an email verification token.
pub const VERIFICATION_TOKEN_TTL_HOURS: i64 = 24;

/// Lifetime of a password reset token.
pub const PASSWORD_RESET_TOKEN_TTL_HOURS: i64 = 2;

/// Generate a confirmation number such as `BK20240115A7QZ`: the prefix, the
/// UTC date of `now` as `YYYYMMDD`, and four characters from `A-Z0-9`.
pub fn generate_confirmation_number(now: DateTime<Utc>) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..CONFIRMATION_SUFFIX_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect();
    format!("{CONFIRMATION_PREFIX}{}{suffix}", now.format("%Y%m%d"))
}

/// Generate an opaque URL-safe token from 32 random bytes.
pub fn generate_url_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; URL_TOKEN_BYTES] = rng.gen();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// A freshly generated token paired with its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    fn with_ttl(now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            token: generate_url_token(),
            expires_at: now + ttl,
        }
    }

    /// Email verification token, valid for 24 hours from `now`.
    pub fn verification(now: DateTime<Utc>) -> Self {
        Self::with_ttl(now, Duration::hours(VERIFICATION_TOKEN_TTL_HOURS))
    }

    /// Password reset token, valid for 2 hours from `now`.
    pub fn password_reset(now: DateTime<Utc>) -> Self {
        Self::with_ttl(now, Duration::hours(PASSWORD_RESET_TOKEN_TTL_HOURS))
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
