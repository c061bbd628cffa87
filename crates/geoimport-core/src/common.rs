// crates/geoimport-core/src/common.rs
//! Shared result and statistics types used by every import stage.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity counts of a store.
///
/// Returned by [`crate::traits::EntityStore::stats`]; callers inspect these
/// (or the store itself) to learn the outcome of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbStats {
    pub countries: usize,
    pub regions: usize,
    pub subregions: usize,
    pub cities: usize,
    pub districts: usize,
    pub alt_names: usize,
    pub postal_codes: usize,
}

/// Why a single record was not committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Routine filtering (feature code, locale, selected countries...).
    Filtered(String),
    /// A plugin hook asked to skip the record.
    Hook(Option<String>),
    /// GeoID or country code missing or unparseable.
    MissingIdentity(String),
    /// A non-identity field failed to parse.
    InvalidField(String),
    /// A mandatory reference could not be resolved.
    Unresolved(String),
}

impl SkipReason {
    pub fn is_filtered(&self) -> bool {
        matches!(self, SkipReason::Filtered(_))
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Filtered(msg) => write!(f, "filtered: {msg}"),
            SkipReason::Hook(Some(msg)) => write!(f, "skipped by hook: {msg}"),
            SkipReason::Hook(None) => f.write_str("skipped by hook"),
            SkipReason::MissingIdentity(msg) => write!(f, "missing identity: {msg}"),
            SkipReason::InvalidField(msg) => write!(f, "invalid field: {msg}"),
            SkipReason::Unresolved(msg) => write!(f, "unresolved: {msg}"),
        }
    }
}

/// Result of one step of the per-record state machine.
///
/// Fatal problems travel separately as `Err(ImportError)`, so step
/// functions return `Result<Outcome<T>>`.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Ok(T),
    Skip(SkipReason),
}

impl<T> Outcome<T> {
    pub fn filtered(msg: impl Into<String>) -> Self {
        Outcome::Skip(SkipReason::Filtered(msg.into()))
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Outcome::Skip(SkipReason::InvalidField(msg.into()))
    }

    pub fn missing(msg: impl Into<String>) -> Self {
        Outcome::Skip(SkipReason::MissingIdentity(msg.into()))
    }

    pub fn unresolved(msg: impl Into<String>) -> Self {
        Outcome::Skip(SkipReason::Unresolved(msg.into()))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Ok(v) => Outcome::Ok(f(v)),
            Outcome::Skip(r) => Outcome::Skip(r),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok(_))
    }
}

/// Unwraps an [`Outcome`], returning `Ok(Outcome::Skip(..))` from the
/// enclosing function on a skip.
#[macro_export]
macro_rules! ok_or_skip {
    ($e:expr) => {
        match $e {
            $crate::common::Outcome::Ok(v) => v,
            $crate::common::Outcome::Skip(reason) => {
                return Ok($crate::common::Outcome::Skip(reason))
            }
        }
    };
}

/// Like [`ok_or_skip!`], inside functions returning a bare [`Outcome`].
#[macro_export]
macro_rules! try_outcome {
    ($e:expr) => {
        match $e {
            $crate::common::Outcome::Ok(v) => v,
            $crate::common::Outcome::Skip(reason) => {
                return $crate::common::Outcome::Skip(reason)
            }
        }
    };
}

/// Row counters of a single stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: String,
    pub read: usize,
    pub committed: usize,
    pub skipped: usize,
    pub filtered: usize,
}

impl StageReport {
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            ..Default::default()
        }
    }

    pub fn record_skip(&mut self, reason: &SkipReason) {
        if reason.is_filtered() {
            self.filtered += 1;
        } else {
            self.skipped += 1;
        }
    }
}
