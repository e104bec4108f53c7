//! Wall-clock capability used for justification expiry.
//!
//! Evaluation reads time only through [`Clock`], so tests and reproducible
//! runs can pin "now" with [`FixedClock`].

use chrono::{Local, NaiveDateTime};
use std::sync::Arc;

/// `strftime` layout of `_meta.expires_at`, e.g. `2024-01-01T10:00:00.000000`.
pub const EXPIRY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Source of the evaluation-time "now" (local wall clock, no timezone).
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// The process's local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(NaiveDateTime);

impl FixedClock {
    pub fn new(at: NaiveDateTime) -> Self {
        Self(at)
    }

    /// Parses an instant in [`EXPIRY_FORMAT`] or plain `%Y-%m-%dT%H:%M:%S`.
    pub fn parse(text: &str) -> Option<Self> {
        NaiveDateTime::parse_from_str(text, EXPIRY_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S"))
            .ok()
            .map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

/// Formats an instant for `_meta.expires_at`.
pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(EXPIRY_FORMAT).to_string()
}
