//! Expiration checks against an injected clock

use chrono::{DateTime, Utc};

use super::error::GuardError;
use crate::token::TokenPayload;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Parse an RFC 3339 instant
    pub fn parse(value: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(value).map(|t| Self(t.with_timezone(&Utc)))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Rejects tokens whose `expirationDateTime` lies strictly before `now`
pub struct ExpirationGuard;

impl ExpirationGuard {
    /// Check a payload; a token expiring exactly at `now` is still valid.
    pub fn check(payload: &TokenPayload, now: DateTime<Utc>) -> Result<(), GuardError> {
        let Some(raw) = payload.expiration_date_time.as_deref() else {
            return Ok(());
        };

        let expires_at = Self::parse(raw)?;
        if expires_at < now {
            return Err(GuardError::Expired { expired_at: expires_at });
        }

        Ok(())
    }

    /// Parse the RFC 3339 expiration timestamp
    pub fn parse(raw: &str) -> Result<DateTime<Utc>, GuardError> {
        DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| GuardError::InvalidTimestamp { reason: e.to_string() })
    }
}
