//! Identifier and validated scalar types for the job domain.

use super::JobDomainError;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;
use uuid::{NoContext, Timestamp, Uuid, Version};

const JOB_ID_PREFIX: &str = "job_";
const JOB_ID_HEX_LEN: usize = 32;

/// Unique, time-ordered identifier for a job record.
///
/// Rendered as `job_` followed by the hyphen-free form of a version 7 UUID.
/// The leading 48 bits of a version 7 UUID hold the creation time in
/// milliseconds, so rendered identifiers sort lexicographically by creation
/// time and [`JobId::created_at`] can recover that instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobId(Uuid);

impl JobId {
    /// Creates a new identifier stamped with the clock's current time.
    #[must_use]
    pub fn new(clock: &impl Clock) -> Self {
        Self::issued_at(clock.utc())
    }

    /// Creates a new identifier stamped with the given instant.
    ///
    /// Instants before the Unix epoch are clamped to the epoch.
    #[must_use]
    pub fn issued_at(instant: DateTime<Utc>) -> Self {
        let seconds = u64::try_from(instant.timestamp()).unwrap_or_default();
        let timestamp = Timestamp::from_unix(NoContext, seconds, instant.timestamp_subsec_nanos());
        Self(Uuid::new_v7(timestamp))
    }

    /// Parses an identifier previously rendered by [`fmt::Display`].
    ///
    /// # Errors
    ///
    /// Returns [`JobDomainError::InvalidJobId`] when the value lacks the
    /// `job_` prefix, is not 32 hex digits, or does not encode a version 7
    /// UUID.
    pub fn parse(value: &str) -> Result<Self, JobDomainError> {
        let invalid = || JobDomainError::InvalidJobId(value.to_owned());
        let hex = value.strip_prefix(JOB_ID_PREFIX).ok_or_else(invalid)?;
        if hex.len() != JOB_ID_HEX_LEN || !hex.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let uuid = Uuid::try_parse(hex).map_err(|_| invalid())?;
        if uuid.get_version() != Some(Version::SortRand) {
            return Err(invalid());
        }
        Ok(Self(uuid))
    }

    /// Returns the creation instant embedded in the identifier, truncated to
    /// millisecond precision.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let (seconds, nanos) = self.0.get_timestamp()?.to_unix();
        DateTime::from_timestamp(i64::try_from(seconds).ok()?, nanos)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{JOB_ID_PREFIX}{}", self.0.simple())
    }
}

impl From<JobId> for String {
    fn from(value: JobId) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for JobId {
    type Error = JobDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Prompt text submitted by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Prompt(String);

impl Prompt {
    /// Creates a validated prompt, keeping the caller's text as submitted.
    ///
    /// # Errors
    ///
    /// Returns [`JobDomainError::EmptyPrompt`] when the text is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, JobDomainError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(JobDomainError::EmptyPrompt);
        }
        Ok(Self(raw))
    }

    /// Returns the prompt as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Prompt {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Absolute `http(s)` URL that receives the completion notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CallbackTarget(Url);

impl CallbackTarget {
    /// Creates a validated callback target.
    ///
    /// # Errors
    ///
    /// Returns [`JobDomainError::InvalidCallbackTarget`] when the value does
    /// not parse as a URL, uses a scheme other than `http` or `https`, or has
    /// no host.
    pub fn new(value: impl Into<String>) -> Result<Self, JobDomainError> {
        let raw = value.into();
        match Url::parse(raw.trim()) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(Self(url)),
            _ => Err(JobDomainError::InvalidCallbackTarget(raw)),
        }
    }

    /// Returns the URL as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the parsed URL.
    #[must_use]
    pub const fn as_url(&self) -> &Url {
        &self.0
    }
}

impl TryFrom<String> for CallbackTarget {
    type Error = JobDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CallbackTarget> for String {
    fn from(value: CallbackTarget) -> Self {
        value.0.into()
    }
}

impl AsRef<str> for CallbackTarget {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CallbackTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Location of the generated result, typically an image URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultReference(String);

impl ResultReference {
    /// Creates a validated result reference.
    ///
    /// # Errors
    ///
    /// Returns [`JobDomainError::EmptyResultReference`] when the value is
    /// blank.
    pub fn new(value: impl Into<String>) -> Result<Self, JobDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(JobDomainError::EmptyResultReference);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the reference as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResultReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
