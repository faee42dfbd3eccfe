//! User CRUD, guest accounts, and email verification / password reset tokens.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use staybook_core::tokens::IssuedToken;
use staybook_core::{format, Error, Result, UserId, UserRole};

use super::{constraint_err, execute_changed, query_all, query_opt};
use crate::models::User;

const COLS: &str = "id, email, password_hash, is_active, role, name, phone, email_verified,
    verification_token, verification_token_expires, password_reset_token,
    password_reset_expires, is_guest, created_at, last_login";

fn insert_user(
    conn: &Connection,
    email: &str,
    password_hash: Option<&str>,
    role: UserRole,
    name: Option<&str>,
    phone: Option<&str>,
    is_guest: bool,
) -> Result<User> {
    let email = email.trim();
    if email.is_empty() {
        return Err(Error::validation("email is required"));
    }

    let id = UserId::new();
    let created_at = Utc::now();

    conn.execute(
        "INSERT INTO users (id, email, password_hash, is_active, role, name, phone,
            email_verified, is_guest, created_at)
         VALUES (?1, ?2, ?3, 1, ?4, ?5, ?6, 0, ?7, ?8)",
        rusqlite::params![
            id.to_string(),
            email,
            password_hash,
            role.as_str(),
            name,
            phone,
            is_guest as i32,
            format::timestamp(created_at),
        ],
    )
    .map_err(|e| constraint_err(e, || format!("Email '{email}' already exists")))?;

    Ok(User {
        id,
        email: email.to_string(),
        password_hash: password_hash.map(String::from),
        is_active: true,
        role,
        name: name.map(String::from),
        phone: phone.map(String::from),
        email_verified: false,
        verification_token: None,
        verification_token_expires: None,
        password_reset_token: None,
        password_reset_expires: None,
        is_guest,
        created_at,
        last_login: None,
    })
}

/// Create a registered user with a password hash.
pub fn create_user(
    conn: &Connection,
    email: &str,
    password_hash: &str,
    role: UserRole,
    name: Option<&str>,
    phone: Option<&str>,
) -> Result<User> {
    insert_user(conn, email, Some(password_hash), role, name, phone, false)
}

/// Create a passwordless guest-checkout user.
pub fn create_guest_user(
    conn: &Connection,
    email: &str,
    name: Option<&str>,
    phone: Option<&str>,
) -> Result<User> {
    insert_user(conn, email, None, UserRole::User, name, phone, true)
}

/// Get a user by primary key.
pub fn get_user_by_id(conn: &Connection, id: UserId) -> Result<Option<User>> {
    let q = format!("SELECT {COLS} FROM users WHERE id = ?1");
    query_opt(conn, &q, [id.to_string()], User::from_row)
}

/// Get a user by email address.
pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
    let q = format!("SELECT {COLS} FROM users WHERE email = ?1");
    query_opt(conn, &q, [email.trim()], User::from_row)
}

/// List all users ordered by email.
pub fn list_users(conn: &Connection) -> Result<Vec<User>> {
    let q = format!("SELECT {COLS} FROM users ORDER BY email ASC");
    query_all(conn, &q, [], User::from_row)
}

/// Update a user's role.
pub fn update_role(conn: &Connection, id: UserId, role: UserRole) -> Result<bool> {
    execute_changed(
        conn,
        "UPDATE users SET role = ?1 WHERE id = ?2",
        rusqlite::params![role.as_str(), id.to_string()],
    )
}

/// Set a new password hash. A guest that sets a password becomes a
/// registered user.
pub fn update_password(conn: &Connection, id: UserId, password_hash: &str) -> Result<bool> {
    execute_changed(
        conn,
        "UPDATE users SET password_hash = ?1, is_guest = 0 WHERE id = ?2",
        rusqlite::params![password_hash, id.to_string()],
    )
}

/// Enable or disable an account.
pub fn set_active(conn: &Connection, id: UserId, active: bool) -> Result<bool> {
    execute_changed(
        conn,
        "UPDATE users SET is_active = ?1 WHERE id = ?2",
        rusqlite::params![active as i32, id.to_string()],
    )
}

/// Stamp `last_login`.
pub fn record_login(conn: &Connection, id: UserId, now: DateTime<Utc>) -> Result<bool> {
    execute_changed(
        conn,
        "UPDATE users SET last_login = ?1 WHERE id = ?2",
        rusqlite::params![format::timestamp(now), id.to_string()],
    )
}

// ---------------------------------------------------------------------------
// Email verification
// ---------------------------------------------------------------------------

/// Generate and store a verification token valid for 24 hours, replacing
/// any previous one.
pub fn issue_verification_token(
    conn: &Connection,
    id: UserId,
    now: DateTime<Utc>,
) -> Result<IssuedToken> {
    let issued = IssuedToken::verification(now);
    let changed = conn
        .execute(
            "UPDATE users SET verification_token = ?1, verification_token_expires = ?2
             WHERE id = ?3",
            rusqlite::params![
                &issued.token,
                format::timestamp(issued.expires_at),
                id.to_string()
            ],
        )
        .map_err(|e| constraint_err(e, || "Verification token collision".to_string()))?;
    if changed == 0 {
        return Err(Error::not_found("user", id));
    }

    tracing::debug!("Issued verification token for user {id}");
    Ok(issued)
}

pub fn get_user_by_verification_token(conn: &Connection, token: &str) -> Result<Option<User>> {
    let q = format!("SELECT {COLS} FROM users WHERE verification_token = ?1");
    query_opt(conn, &q, [token], User::from_row)
}

/// Consume a verification token: marks the email verified and clears the
/// token. Fails if the token is unknown or expired.
pub fn verify_email(conn: &Connection, token: &str, now: DateTime<Utc>) -> Result<User> {
    let user = get_user_by_verification_token(conn, token)?
        .ok_or_else(|| Error::not_found("verification token", "<redacted>"))?;

    if user.verification_token_expired(now) {
        return Err(Error::validation("Verification token has expired"));
    }

    execute_changed(
        conn,
        "UPDATE users SET email_verified = 1, verification_token = NULL,
            verification_token_expires = NULL
         WHERE id = ?1",
        [user.id.to_string()],
    )?;

    Ok(User {
        email_verified: true,
        verification_token: None,
        verification_token_expires: None,
        ..user
    })
}

// ---------------------------------------------------------------------------
// Password reset
// ---------------------------------------------------------------------------

/// Generate and store a password reset token valid for 2 hours, replacing
/// any previous one.
pub fn issue_password_reset_token(
    conn: &Connection,
    id: UserId,
    now: DateTime<Utc>,
) -> Result<IssuedToken> {
    let issued = IssuedToken::password_reset(now);
    let changed = conn
        .execute(
            "UPDATE users SET password_reset_token = ?1, password_reset_expires = ?2
             WHERE id = ?3",
            rusqlite::params![
                &issued.token,
                format::timestamp(issued.expires_at),
                id.to_string()
            ],
        )
        .map_err(|e| constraint_err(e, || "Password reset token collision".to_string()))?;
    if changed == 0 {
        return Err(Error::not_found("user", id));
    }

    tracing::debug!("Issued password reset token for user {id}");
    Ok(issued)
}

pub fn get_user_by_reset_token(conn: &Connection, token: &str) -> Result<Option<User>> {
    let q = format!("SELECT {COLS} FROM users WHERE password_reset_token = ?1");
    query_opt(conn, &q, [token], User::from_row)
}

/// Consume a reset token and store `password_hash`. Fails if the token is
/// unknown or expired.
pub fn reset_password(
    conn: &Connection,
    token: &str,
    password_hash: &str,
    now: DateTime<Utc>,
) -> Result<User> {
    let user = get_user_by_reset_token(conn, token)?
        .ok_or_else(|| Error::not_found("password reset token", "<redacted>"))?;

    if user.password_reset_expired(now) {
        return Err(Error::validation("Password reset token has expired"));
    }

    execute_changed(
        conn,
        "UPDATE users SET password_hash = ?1, is_guest = 0, password_reset_token = NULL,
            password_reset_expires = NULL
         WHERE id = ?2",
        rusqlite::params![password_hash, user.id.to_string()],
    )?;

    Ok(User {
        password_hash: Some(password_hash.to_string()),
        is_guest: false,
        password_reset_token: None,
        password_reset_expires: None,
        ..user
    })
}

/// Delete a user by ID. Fails with a conflict while bookings still
/// reference the user.
pub fn delete_user(conn: &Connection, id: UserId) -> Result<bool> {
    let n = conn
        .execute("DELETE FROM users WHERE id = ?1", [id.to_string()])
        .map_err(|e| constraint_err(e, || format!("User {id} still owns bookings")))?;
    Ok(n > 0)
}
