//! Fixed credential allow-list.
//!
//! This is a login gate for a demo playground, not an authentication
//! system: passwords are compared in plaintext.

use super::record::SessionRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credential {
    pub email: &'static str,
    pub password: &'static str,
    pub role: &'static str,
}

pub const ALLOWED_CREDENTIALS: [Credential; 2] = [
    Credential {
        email: "admin@admin",
        password: "1234",
        role: "admin",
    },
    Credential {
        email: "admin1@admin",
        password: "1234",
        role: "user",
    },
];

/// Returns the record to persist when `email`/`password` match an entry.
pub fn authenticate(email: &str, password: &str) -> Option<SessionRecord> {
    ALLOWED_CREDENTIALS
        .iter()
        .find(|c| c.email == email && c.password == password)
        .map(|c| SessionRecord {
            email: c.email.to_string(),
            role: c.role.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_accounts_get_their_roles() {
        assert_eq!(authenticate("admin@admin", "1234").unwrap().role, "admin");
        assert_eq!(authenticate("admin1@admin", "1234").unwrap().role, "user");
    }

    #[test]
    fn test_wrong_password_or_unknown_email_fails() {
        assert!(authenticate("admin@admin", "wrong").is_none());
        assert!(authenticate("x@x", "1234").is_none());
        assert!(authenticate(" admin@admin", "1234").is_none());
    }
}
