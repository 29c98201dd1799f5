use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Map;
use time::OffsetDateTime;
use tracing::{error, info, warn};

use crate::auth::repo::{Profile, ProfileStore};
use crate::session::{SessionStore, SessionUser, UserMetadata};

/// Auth failures surfaced to the caller. Messages are the exact strings the
/// dashboard shows inline on the login form.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("User not found. Please register first.")]
    NotRegistered,
    #[error("Full name does not match. Please check your details.")]
    NameMismatch,
    #[error("User already registered with this CNIC.")]
    AlreadyRegistered,
    #[error("Database error. Please try again.")]
    BackendUnavailable,
}

pub(crate) fn is_valid_cnic(cnic: &str) -> bool {
    lazy_static! {
        static ref CNIC_RE: Regex = Regex::new(r"^\d{5}-\d{7}-\d$").unwrap();
    }
    CNIC_RE.is_match(cnic)
}

/// Reformat free-text input into the 5-7-1 digit grouping, dropping
/// non-digits and truncating beyond 13 digits.
pub fn format_cnic(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        0..=5 => digits,
        6..=12 => format!("{}-{}", &digits[..5], &digits[5..]),
        _ => format!("{}-{}-{}", &digits[..5], &digits[5..12], &digits[12..13]),
    }
}

fn session_from_profile(profile: &Profile) -> SessionUser {
    let now = OffsetDateTime::now_utc();
    SessionUser {
        id: profile.id,
        email: format!("{}@driving-test.local", profile.cnic_id),
        user_metadata: UserMetadata {
            cnic_id: profile.cnic_id.clone(),
            full_name: profile.full_name.clone(),
        },
        app_metadata: Map::new(),
        aud: "authenticated".into(),
        role: "authenticated".into(),
        created_at: now,
        updated_at: now,
    }
}

fn persist(sessions: &SessionStore, user: &SessionUser) -> Result<(), AuthError> {
    sessions.save(user).map_err(|e| {
        error!(error = %e, "failed to persist session");
        AuthError::BackendUnavailable
    })
}

/// Restore the session from local storage without revalidating against the
/// database. The fast path at startup; never blocks on the network.
pub fn restore(sessions: &SessionStore) -> Option<SessionUser> {
    sessions.load()
}

/// Sign in with a CNIC and an optional full name. Trust is placed entirely
/// in possession of the correctly formatted CNIC; there is no password.
pub async fn sign_in(
    profiles: &dyn ProfileStore,
    sessions: &SessionStore,
    cnic_id: &str,
    full_name: Option<&str>,
) -> Result<SessionUser, AuthError> {
    let profile = profiles.find_by_cnic(cnic_id).await.map_err(|e| {
        error!(error = %e, "profile lookup failed");
        AuthError::BackendUnavailable
    })?;

    let Some(profile) = profile else {
        warn!(cnic_id, "sign-in for unknown CNIC");
        return Err(AuthError::NotRegistered);
    };

    // Only verify the full name if one was actually supplied.
    if let Some(name) = full_name {
        let name = name.trim();
        if !name.is_empty() && !profile.full_name.eq_ignore_ascii_case(name) {
            warn!(cnic_id, "sign-in full name mismatch");
            return Err(AuthError::NameMismatch);
        }
    }

    let user = session_from_profile(&profile);
    persist(sessions, &user)?;
    info!(user_id = %user.id, cnic_id, "user signed in");
    Ok(user)
}

/// Register a new profile and sign it in. The read-check-then-insert pair is
/// not transactional; the UNIQUE constraint on `profiles.cnic_id` is what
/// actually guards against concurrent duplicates.
pub async fn register(
    profiles: &dyn ProfileStore,
    sessions: &SessionStore,
    cnic_id: &str,
    full_name: &str,
) -> Result<SessionUser, AuthError> {
    let existing = profiles.find_by_cnic(cnic_id).await.map_err(|e| {
        error!(error = %e, "profile lookup failed");
        AuthError::BackendUnavailable
    })?;
    if existing.is_some() {
        warn!(cnic_id, "registration for already registered CNIC");
        return Err(AuthError::AlreadyRegistered);
    }

    let profile = profiles.create(cnic_id, full_name).await.map_err(|e| {
        error!(error = %e, "profile insert failed");
        AuthError::BackendUnavailable
    })?;

    let user = session_from_profile(&profile);
    persist(sessions, &user)?;
    info!(user_id = %user.id, cnic_id, "user registered");
    Ok(user)
}

/// Clear the session slot and forget the signed-in user. Always succeeds.
pub fn sign_out(sessions: &SessionStore) {
    sessions.clear();
    info!("user signed out");
}

#[cfg(test)]
mod cnic_tests {
    use super::*;

    #[test]
    fn format_groups_digits_5_7_1() {
        assert_eq!(format_cnic("1234512345671"), "12345-1234567-1");
        assert_eq!(format_cnic("12345-1234567-1"), "12345-1234567-1");
    }

    #[test]
    fn format_keeps_partial_input() {
        assert_eq!(format_cnic("123"), "123");
        assert_eq!(format_cnic("12345"), "12345");
        assert_eq!(format_cnic("123456"), "12345-6");
        assert_eq!(format_cnic("123451234567"), "12345-1234567");
    }

    #[test]
    fn format_truncates_beyond_13_digits() {
        assert_eq!(format_cnic("12345123456789999"), "12345-1234567-8");
    }

    #[test]
    fn format_strips_non_digits() {
        assert_eq!(format_cnic("12a34b5-12345 67.1"), "12345-1234567-1");
    }

    #[test]
    fn validates_full_cnic_only() {
        assert!(is_valid_cnic("12345-1234567-1"));
        assert!(!is_valid_cnic("12345-1234567"));
        assert!(!is_valid_cnic("1234512345671"));
        assert!(!is_valid_cnic(""));
    }
}
