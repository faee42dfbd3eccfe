//! Outbound notification log for bookings.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use staybook_core::{format, BookingId, EmailLogId, EmailStatus, Error, Result};

use super::{bookings, db_err, execute_changed, query_all, query_opt};
use crate::models::EmailLog;

const COLS: &str = "id, booking_id, email_type, recipient_email, subject, status, error_message,
    sent_at, created_at";

/// Queue an email for a booking in `pending` state.
pub fn create_log(
    conn: &Connection,
    booking_id: BookingId,
    email_type: &str,
    recipient_email: &str,
    subject: &str,
) -> Result<EmailLog> {
    if bookings::get_booking(conn, booking_id)?.is_none() {
        return Err(Error::not_found("booking", booking_id));
    }

    let id = EmailLogId::new();
    let created_at = Utc::now();
    conn.execute(
        "INSERT INTO email_logs (id, booking_id, email_type, recipient_email, subject, status,
            created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            id.to_string(),
            booking_id.to_string(),
            email_type,
            recipient_email,
            subject,
            EmailStatus::Pending.as_str(),
            format::timestamp(created_at),
        ],
    )
    .map_err(db_err)?;

    Ok(EmailLog {
        id,
        booking_id,
        email_type: email_type.to_string(),
        recipient_email: recipient_email.to_string(),
        subject: subject.to_string(),
        status: EmailStatus::Pending,
        error_message: None,
        sent_at: None,
        created_at,
    })
}

pub fn get_log(conn: &Connection, id: EmailLogId) -> Result<Option<EmailLog>> {
    let q = format!("SELECT {COLS} FROM email_logs WHERE id = ?1");
    query_opt(conn, &q, [id.to_string()], EmailLog::from_row)
}

pub fn list_for_booking(conn: &Connection, booking_id: BookingId) -> Result<Vec<EmailLog>> {
    let q = format!("SELECT {COLS} FROM email_logs WHERE booking_id = ?1 ORDER BY rowid ASC");
    query_all(conn, &q, [booking_id.to_string()], EmailLog::from_row)
}

/// Emails still waiting to be sent, oldest first.
pub fn list_pending(conn: &Connection) -> Result<Vec<EmailLog>> {
    let q = format!("SELECT {COLS} FROM email_logs WHERE status = 'pending' ORDER BY rowid ASC");
    query_all(conn, &q, [], EmailLog::from_row)
}

pub fn mark_sent(conn: &Connection, id: EmailLogId, sent_at: DateTime<Utc>) -> Result<bool> {
    execute_changed(
        conn,
        "UPDATE email_logs SET status = ?1, sent_at = ?2, error_message = NULL WHERE id = ?3",
        rusqlite::params![
            EmailStatus::Sent.as_str(),
            format::timestamp(sent_at),
            id.to_string()
        ],
    )
}

pub fn mark_failed(conn: &Connection, id: EmailLogId, error_message: &str) -> Result<bool> {
    let changed = execute_changed(
        conn,
        "UPDATE email_logs SET status = ?1, error_message = ?2 WHERE id = ?3",
        rusqlite::params![EmailStatus::Failed.as_str(), error_message, id.to_string()],
    )?;
    if changed {
        tracing::warn!("Email {id} failed: {error_message}");
    }
    Ok(changed)
}
