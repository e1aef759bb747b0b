//! Canonical resource snapshot and the raw shapes it is rebuilt from.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Recorder status of a configuration item.
///
/// Statuses this handler does not know about are preserved verbatim in
/// [`ResourceStatus::Other`] so they can still be logged and reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceStatus {
    /// Resource was recorded normally.
    Ok,
    /// Resource was discovered for the first time.
    ResourceDiscovered,
    /// Legacy deletion status.
    Deleted,
    /// Resource was deleted.
    ResourceDeleted,
    /// Resource is no longer discovered by the recorder.
    ResourceNotDiscovered,
    /// Any other status string.
    Other(String),
}

impl ResourceStatus {
    /// Wire representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ok => "OK",
            Self::ResourceDiscovered => "ResourceDiscovered",
            Self::Deleted => "Deleted",
            Self::ResourceDeleted => "ResourceDeleted",
            Self::ResourceNotDiscovered => "ResourceNotDiscovered",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for ResourceStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "OK" => Self::Ok,
            "ResourceDiscovered" => Self::ResourceDiscovered,
            "Deleted" => Self::Deleted,
            "ResourceDeleted" => Self::ResourceDeleted,
            "ResourceNotDiscovered" => Self::ResourceNotDiscovered,
            _ => Self::Other(raw),
        }
    }
}

impl From<ResourceStatus> for String {
    fn from(status: ResourceStatus) -> Self {
        match status {
            ResourceStatus::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl Display for ResourceStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named relationship from the snapshot's resource to another resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    /// Relationship label, e.g. `Is attached to Instance`.
    pub name: String,
    /// Type of the related resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    /// Identifier of the related resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    /// Display name of the related resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
}

/// Canonical resource state at a point in time.
///
/// Every notification shape resolves into this one struct, so downstream
/// stages never need to know where a snapshot came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSnapshot {
    /// Resource type, e.g. `AWS::EC2::Volume`.
    pub resource_type: String,
    /// Resource identifier.
    pub resource_id: String,
    /// Recorder status at capture time.
    #[serde(rename = "configurationItemStatus")]
    pub status: ResourceStatus,
    /// When the recorder captured this state.
    #[serde(rename = "configurationItemCaptureTime")]
    pub capture_time: DateTime<Utc>,
    /// Opaque resource configuration; `null` for deleted resources.
    pub configuration: Value,
    /// Relationships to other resources.
    pub relationships: Vec<Relationship>,
    /// Display name of the resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
    /// Fully qualified resource name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    /// Owning account.
    #[serde(
        rename = "awsAccountId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub account_id: Option<String>,
    /// Region the resource lives in.
    #[serde(rename = "awsRegion", default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Resource tags.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Configuration item exactly as embedded in a change notification.
///
/// All fields are optional here; the resolver checks presence and names
/// the first missing one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfigurationItem {
    /// Resource type.
    pub resource_type: Option<String>,
    /// Resource identifier.
    pub resource_id: Option<String>,
    /// Recorder status.
    pub configuration_item_status: Option<ResourceStatus>,
    /// Capture timestamp.
    pub configuration_item_capture_time: Option<DateTime<Utc>>,
    /// Structured configuration.
    pub configuration: Option<Value>,
    /// Relationships, each carrying a `name`.
    pub relationships: Option<Vec<RawRelationship>>,
    /// Display name.
    pub resource_name: Option<String>,
    /// Fully qualified resource name.
    #[serde(alias = "ARN")]
    pub arn: Option<String>,
    /// Owning account.
    pub aws_account_id: Option<String>,
    /// Region.
    pub aws_region: Option<String>,
    /// Tags.
    pub tags: Option<BTreeMap<String, String>>,
}

/// Relationship exactly as embedded in a change notification.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRelationship {
    /// Relationship label.
    pub name: Option<String>,
    /// Type of the related resource.
    pub resource_type: Option<String>,
    /// Identifier of the related resource.
    pub resource_id: Option<String>,
    /// Display name of the related resource.
    pub resource_name: Option<String>,
}

/// One record returned by the resource-history service.
///
/// Field names follow the history service: the account is `accountId`,
/// the configuration is a serialized JSON string, and relationships carry
/// `relationshipName` instead of `name`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalConfigurationItem {
    /// Resource type.
    pub resource_type: Option<String>,
    /// Resource identifier.
    pub resource_id: Option<String>,
    /// Recorder status.
    pub configuration_item_status: Option<ResourceStatus>,
    /// Capture timestamp.
    pub configuration_item_capture_time: Option<DateTime<Utc>>,
    /// Serialized configuration document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<String>,
    /// Relationships keyed by `relationshipName`.
    #[serde(default)]
    pub relationships: Vec<HistoricalRelationship>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
    /// Fully qualified resource name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    /// Owning account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// Region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_region: Option<String>,
    /// Tags.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Relationship as returned by the resource-history service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalRelationship {
    /// Relationship label.
    pub relationship_name: Option<String>,
    /// Type of the related resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    /// Identifier of the related resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    /// Display name of the related resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
}
