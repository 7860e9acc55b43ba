//! User accounts and registration-payload validation.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FieldError;

const MAX_NAME_CHARS: usize = 60;
const MIN_PASSWORD_CHARS: usize = 8;

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"))
}

/// A registered account. The password never leaves the store in clear;
/// only its hash is persisted.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw registration payload, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// A registration payload that passed validation. The email is lowercased
/// so uniqueness is case-insensitive.
#[derive(Debug, Clone)]
pub struct ValidUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    pub fn validated(self) -> Result<ValidUser, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = self.name.trim().to_string();
        if name.is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        } else if name.chars().count() > MAX_NAME_CHARS {
            errors.push(FieldError::new("name", "Name cannot exceed 60 characters"));
        }

        let email = self.email.trim().to_lowercase();
        if !email_re().is_match(&email) {
            errors.push(FieldError::new("email", "A valid email address is required"));
        }

        if self.password.chars().count() < MIN_PASSWORD_CHARS {
            errors.push(FieldError::new(
                "password",
                "Password must be at least 8 characters",
            ));
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidUser {
            name,
            email,
            password: self.password,
        })
    }
}
