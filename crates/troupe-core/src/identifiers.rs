//! Validated, type-safe identifiers used throughout the Troupe crates.
//!
//! Every name that crosses a crate boundary is a distinct newtype so that a
//! tool name can never be passed where an agent name is expected. All types
//! follow the same parse-don't-validate shape:
//!
//! - `parse()` returns `Result` instead of panicking on bad input
//! - `as_str()` exposes the underlying string
//! - `new_unchecked()` bypasses validation for trusted literals and tests
//!
//! # Examples
//!
//! ```rust
//! use troupe_core::identifiers::{AgentName, StateKey, ToolName};
//!
//! let agent = AgentName::parse("weather_agent_v2").unwrap();
//! let tool = ToolName::parse("get_weather").unwrap();
//! let key = StateKey::parse("user_preference_temperature_unit").unwrap();
//!
//! assert_eq!(agent.as_str(), "weather_agent_v2");
//!
//! // Invalid identifiers
//! assert!(AgentName::parse("").is_err());            // Empty
//! assert!(AgentName::parse("  agent  ").is_err());   // Whitespace
//! assert!(ToolName::parse("tool/path").is_err());    // Invalid char
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::validation::{NameRules, ValidationError};

/// Identifier of the application a session belongs to.
///
/// Part of the session identity triple; opaque to the runtime beyond
/// validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AppId(String);

impl AppId {
    /// Parse and validate an application id from a string
    pub fn parse(id: impl AsRef<str>) -> Result<Self, ValidationError> {
        NameRules::IDENTITY.validate(id.as_ref()).map(Self)
    }

    /// Get the application id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create an application id without validation (for trusted input only)
    #[doc(hidden)]
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AppId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<AppId> for String {
    fn from(id: AppId) -> Self {
        id.0
    }
}

impl TryFrom<String> for AppId {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

/// Identifier of the user a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Parse and validate a user id from a string
    pub fn parse(id: impl AsRef<str>) -> Result<Self, ValidationError> {
        NameRules::IDENTITY.validate(id.as_ref()).map(Self)
    }

    /// Get the user id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create a user id without validation (for trusted input only)
    #[doc(hidden)]
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl TryFrom<String> for UserId {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

/// Identifier of one conversation within an application/user pair.
///
/// # Examples
///
/// ```rust
/// use troupe_core::identifiers::SessionId;
///
/// let fixed = SessionId::parse("session_001").unwrap();
/// let random = SessionId::generate();
/// assert_ne!(fixed, random);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Parse and validate a session id from a string
    pub fn parse(id: impl AsRef<str>) -> Result<Self, ValidationError> {
        NameRules::IDENTITY.validate(id.as_ref()).map(Self)
    }

    /// Get the session id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create a session id without validation (for trusted input only)
    #[doc(hidden)]
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random session id using UUID v4
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

impl TryFrom<String> for SessionId {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

/// Name of an agent node, unique within its tree.
///
/// Agent names show up as the `author` of turn events and as delegation
/// targets, so they are validated strictly: no separators, no whitespace,
/// at most 64 characters.
///
/// # Examples
///
/// ```rust
/// use troupe_core::identifiers::AgentName;
///
/// let root = AgentName::parse("weather_agent_v2").unwrap();
/// assert_eq!(root.to_string(), "weather_agent_v2");
/// assert!(AgentName::parse("weather agent").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AgentName(String);

impl AgentName {
    /// Parse and validate an agent name from a string
    pub fn parse(name: impl AsRef<str>) -> Result<Self, ValidationError> {
        NameRules::NAME.validate(name.as_ref()).map(Self)
    }

    /// Get the agent name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create an agent name without validation (for trusted input only)
    #[doc(hidden)]
    pub fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl fmt::Display for AgentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AgentName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<AgentName> for String {
    fn from(name: AgentName) -> Self {
        name.0
    }
}

impl TryFrom<String> for AgentName {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

/// Name of a tool, unique within the node it is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ToolName(String);

impl ToolName {
    /// Parse and validate a tool name from a string
    pub fn parse(name: impl AsRef<str>) -> Result<Self, ValidationError> {
        NameRules::NAME.validate(name.as_ref()).map(Self)
    }

    /// Get the tool name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create a tool name without validation (for trusted input only)
    #[doc(hidden)]
    pub fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ToolName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<ToolName> for String {
    fn from(name: ToolName) -> Self {
        name.0
    }
}

impl TryFrom<String> for ToolName {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

/// Key into a session's state mapping.
///
/// Keys admit `.` and `:` so that tools can namespace what they write,
/// e.g. `user_preference_temperature_unit` or `weather:last_city`.
///
/// # Examples
///
/// ```rust
/// use troupe_core::identifiers::StateKey;
///
/// let key = StateKey::parse("last_weather_report").unwrap();
/// assert_eq!(key.as_str(), "last_weather_report");
/// assert!(StateKey::parse("key with spaces").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StateKey(String);

impl StateKey {
    /// Parse and validate a state key from a string
    pub fn parse(key: impl AsRef<str>) -> Result<Self, ValidationError> {
        NameRules::STATE_KEY.validate(key.as_ref()).map(Self)
    }

    /// Get the state key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create a state key without validation (for trusted input only)
    #[doc(hidden)]
    pub fn new_unchecked(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StateKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<StateKey> for String {
    fn from(key: StateKey) -> Self {
        key.0
    }
}

impl TryFrom<String> for StateKey {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

/// Identifier stamped on every turn for correlation in logs and events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TurnId(String);

impl TurnId {
    /// Parse and validate a turn id from a string
    pub fn parse(id: impl AsRef<str>) -> Result<Self, ValidationError> {
        NameRules::IDENTITY.validate(id.as_ref()).map(Self)
    }

    /// Get the turn id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Generate a new random turn id using UUID v4
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TurnId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<TurnId> for String {
    fn from(id: TurnId) -> Self {
        id.0
    }
}

impl TryFrom<String> for TurnId {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}
