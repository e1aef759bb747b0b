//! Inbound invocation payload and the notification variants it carries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::snapshot::RawConfigurationItem;
use crate::{AppError, Result};

/// Message type discriminator of an invoking event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageType {
    /// Standard change notification with the snapshot embedded.
    ChangeNotification,
    /// Snapshot too large to embed; only a summary is present.
    OversizedConfigurationItemChangeNotification,
    /// Periodic trigger with no resource attached.
    ScheduledNotification,
    /// Any other message type; handled like a change notification.
    Other(String),
}

impl MessageType {
    /// Wire representation of the message type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ChangeNotification => "ConfigurationItemChangeNotification",
            Self::OversizedConfigurationItemChangeNotification => {
                "OversizedConfigurationItemChangeNotification"
            }
            Self::ScheduledNotification => "ScheduledNotification",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for MessageType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "ConfigurationItemChangeNotification" | "ChangeNotification" => {
                Self::ChangeNotification
            }
            "OversizedConfigurationItemChangeNotification" => {
                Self::OversizedConfigurationItemChangeNotification
            }
            "ScheduledNotification" => Self::ScheduledNotification,
            _ => Self::Other(raw),
        }
    }
}

impl From<MessageType> for String {
    fn from(kind: MessageType) -> Self {
        match kind {
            MessageType::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

/// Identifying summary sent in place of an oversized configuration item.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationItemSummary {
    /// Resource type.
    pub resource_type: Option<String>,
    /// Resource identifier.
    pub resource_id: Option<String>,
    /// Capture timestamp; upper bound for the history lookup.
    pub configuration_item_capture_time: Option<DateTime<Utc>>,
}

/// Decoded `invokingEvent` document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokingEvent {
    /// Notification shape discriminator.
    pub message_type: Option<MessageType>,
    /// Embedded snapshot for change notifications.
    pub configuration_item: Option<RawConfigurationItem>,
    /// Summary for oversized notifications.
    pub configuration_item_summary: Option<ConfigurationItemSummary>,
    /// Whether the resource left rule scope since capture.
    pub event_left_scope: Option<bool>,
}

/// Shape of a notification, dispatched on by the snapshot resolver.
#[derive(Debug, Clone)]
pub enum NotificationKind {
    /// Snapshot embedded directly, if the sender included it.
    Change(Option<RawConfigurationItem>),
    /// Summary that requires a history lookup, if the sender included it.
    Oversized(Option<ConfigurationItemSummary>),
    /// Periodic trigger with nothing to resolve.
    Scheduled,
}

/// A notification reduced to its shape plus the scope flag.
#[derive(Debug, Clone)]
pub struct Notification {
    /// Original message type, kept for logging.
    pub message_type: MessageType,
    /// Which resolution path applies.
    pub kind: NotificationKind,
    /// `Some(false)` only when the sender stated the resource is in scope.
    pub event_left_scope: Option<bool>,
}

impl TryFrom<InvokingEvent> for Notification {
    type Error = AppError;

    fn try_from(event: InvokingEvent) -> Result<Self> {
        let message_type = event
            .message_type
            .ok_or_else(|| AppError::MissingField("invokingEvent.messageType".into()))?;

        let kind = match message_type {
            MessageType::OversizedConfigurationItemChangeNotification => {
                NotificationKind::Oversized(event.configuration_item_summary)
            }
            MessageType::ScheduledNotification => NotificationKind::Scheduled,
            MessageType::ChangeNotification | MessageType::Other(_) => {
                NotificationKind::Change(event.configuration_item)
            }
        };

        Ok(Self {
            message_type,
            kind,
            event_left_scope: event.event_left_scope,
        })
    }
}

/// Opaque rule parameters handed to the evaluator untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyParameters(BTreeMap<String, Value>);

impl PolicyParameters {
    /// Parse the serialized `ruleParameters` document.
    ///
    /// A missing or blank document yields an empty parameter set.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Parse` if the document is not a JSON object.
    pub fn from_json_str(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(text) => serde_json::from_str(text)
                .map_err(|err| AppError::Parse(format!("ruleParameters: {err}"))),
        }
    }

    /// Look up a parameter by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no parameters were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for PolicyParameters {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The raw invocation payload delivered by the host runtime.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationEvent {
    /// Serialized [`InvokingEvent`] document.
    pub invoking_event: Option<String>,
    /// Serialized [`PolicyParameters`] document.
    #[serde(default)]
    pub rule_parameters: Option<String>,
    /// Opaque token echoed back on submission.
    pub result_token: Option<String>,
    /// Scope flag copied to the top level by some senders.
    #[serde(default)]
    pub event_left_scope: Option<bool>,
    /// Name of the rule being evaluated.
    #[serde(default)]
    pub config_rule_name: Option<String>,
    /// Account the invocation belongs to.
    #[serde(default)]
    pub account_id: Option<String>,
}

impl InvocationEvent {
    /// Decode the embedded invoking event into a [`Notification`].
    ///
    /// The invoking event's own `eventLeftScope` wins; the top-level copy
    /// is used only when the inner one is absent.
    ///
    /// # Errors
    ///
    /// Returns `AppError::MissingField` if `invokingEvent` or its
    /// `messageType` is absent, or `AppError::Parse` if it is not valid JSON.
    pub fn notification(&self) -> Result<Notification> {
        let raw = self
            .invoking_event
            .as_deref()
            .ok_or_else(|| AppError::MissingField("invokingEvent".into()))?;
        let mut event: InvokingEvent = serde_json::from_str(raw)
            .map_err(|err| AppError::Parse(format!("invokingEvent: {err}")))?;
        if event.event_left_scope.is_none() {
            event.event_left_scope = self.event_left_scope;
        }
        Notification::try_from(event)
    }

    /// Decode the rule parameters.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Parse` if `ruleParameters` is not a JSON object.
    pub fn parameters(&self) -> Result<PolicyParameters> {
        PolicyParameters::from_json_str(self.rule_parameters.as_deref())
    }

    /// The result token to thread through to submission.
    ///
    /// # Errors
    ///
    /// Returns `AppError::MissingField` if the token is absent.
    pub fn result_token(&self) -> Result<&str> {
        self.result_token
            .as_deref()
            .ok_or_else(|| AppError::MissingField("resultToken".into()))
    }
}
