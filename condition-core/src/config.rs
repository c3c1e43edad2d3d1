//! Condition Configuration
//!
//! Per-condition settings. The only behavioral knob is how a continuation
//! registered with `asynchronous = true` on an already-set condition is
//! delivered; the rest is diagnostic.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How an asynchronous registration on an already-set condition is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeferralPolicy {
    /// Queue the continuation on the thread's micro-task queue. It runs after
    /// the registering call returns and before the current turn ends.
    #[default]
    Microtask,

    /// Invoke the continuation before the registering call returns, exactly
    /// like a synchronous registration.
    Inline,
}

/// Settings for a single [`Condition`](crate::condition::Condition).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConditionConfig {
    /// Delivery policy for asynchronous registrations once set.
    pub deferral: DeferralPolicy,

    /// Human-readable name attached to log events.
    pub label: Option<String>,
}

impl ConditionConfig {
    /// Parse a configuration from a JSON document.
    ///
    /// Missing fields take their defaults; unknown fields are rejected.
    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Set the deferral policy.
    pub fn deferral(mut self, deferral: DeferralPolicy) -> Self {
        self.deferral = deferral;
        self
    }

    /// Set the log label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
