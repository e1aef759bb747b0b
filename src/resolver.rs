//! Resource snapshot resolution.
//!
//! Turns any of the three notification shapes into the one canonical
//! [`ResourceSnapshot`]. Change notifications carry the snapshot inline,
//! oversized notifications carry only a summary and need a point-in-time
//! history lookup, and scheduled notifications carry nothing at all.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::clients::{HistoryLookup, HistoryRequest};
use crate::models::notification::{ConfigurationItemSummary, Notification, NotificationKind};
use crate::models::snapshot::{
    HistoricalConfigurationItem, RawConfigurationItem, Relationship, ResourceSnapshot,
};
use crate::{AppError, Result};

/// Resolves notifications into canonical snapshots.
#[derive(Clone)]
pub struct SnapshotResolver {
    history: Arc<dyn HistoryLookup>,
}

impl SnapshotResolver {
    /// Create a resolver that uses `history` for oversized notifications.
    #[must_use]
    pub fn new(history: Arc<dyn HistoryLookup>) -> Self {
        Self { history }
    }

    /// Resolve `notification` into a snapshot.
    ///
    /// Returns `Ok(None)` for scheduled notifications, which have no
    /// resource attached.
    ///
    /// # Errors
    ///
    /// - `AppError::MissingField` if the embedded item or summary, or any
    ///   required field of either, is absent.
    /// - `AppError::Lookup` if the history call fails, returns no records,
    ///   or returns a record whose configuration is not valid JSON.
    pub async fn resolve(&self, notification: Notification) -> Result<Option<ResourceSnapshot>> {
        match notification.kind {
            NotificationKind::Change(item) => {
                let item = item.ok_or_else(|| {
                    AppError::MissingField("invokingEvent.configurationItem".into())
                })?;
                snapshot_from_item(item).map(Some)
            }
            NotificationKind::Oversized(summary) => {
                let summary = summary.ok_or_else(|| {
                    AppError::MissingField("invokingEvent.configurationItemSummary".into())
                })?;
                self.fetch_from_history(summary).await.map(Some)
            }
            NotificationKind::Scheduled => {
                info!("scheduled notification carries no resource");
                Ok(None)
            }
        }
    }

    async fn fetch_from_history(&self, summary: ConfigurationItemSummary) -> Result<ResourceSnapshot> {
        let request = HistoryRequest {
            resource_type: require(
                summary.resource_type,
                "configurationItemSummary.resourceType",
            )?,
            resource_id: require(summary.resource_id, "configurationItemSummary.resourceId")?,
            later_time: require(
                summary.configuration_item_capture_time,
                "configurationItemSummary.configurationItemCaptureTime",
            )?,
            limit: 1,
        };

        debug!(
            resource_type = %request.resource_type,
            resource_id = %request.resource_id,
            later_time = %request.later_time,
            "fetching oversized configuration item from history"
        );

        let (resource_type, resource_id) =
            (request.resource_type.clone(), request.resource_id.clone());
        let items = self.history.lookup(request).await.map_err(|err| match err {
            AppError::Lookup(_) => err,
            other => AppError::Lookup(other.to_string()),
        })?;

        let latest = items.into_iter().next().ok_or_else(|| {
            AppError::Lookup(format!(
                "no history found for {resource_type}/{resource_id}"
            ))
        })?;

        snapshot_from_history(latest)
    }
}

/// Build a snapshot from a configuration item embedded in a notification.
///
/// A `null` or absent configuration is kept as JSON `null`; deleted
/// resources are reported that way.
///
/// # Errors
///
/// Returns `AppError::MissingField` naming the first absent required field.
pub fn snapshot_from_item(item: RawConfigurationItem) -> Result<ResourceSnapshot> {
    let resource_type = require(item.resource_type, "configurationItem.resourceType")?;
    let resource_id = require(item.resource_id, "configurationItem.resourceId")?;
    let status = require(
        item.configuration_item_status,
        "configurationItem.configurationItemStatus",
    )?;
    let capture_time = require(
        item.configuration_item_capture_time,
        "configurationItem.configurationItemCaptureTime",
    )?;

    let relationships = item
        .relationships
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(idx, rel)| {
            Ok(Relationship {
                name: require(rel.name, &format!("configurationItem.relationships[{idx}].name"))?,
                resource_type: rel.resource_type,
                resource_id: rel.resource_id,
                resource_name: rel.resource_name,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ResourceSnapshot {
        resource_type,
        resource_id,
        status,
        capture_time,
        configuration: item.configuration.unwrap_or(Value::Null),
        relationships,
        resource_name: item.resource_name,
        arn: item.arn,
        account_id: item.aws_account_id,
        region: item.aws_region,
        tags: item.tags.unwrap_or_default(),
    })
}

/// Remap a history-service record into a canonical snapshot.
///
/// The serialized configuration is parsed into structured JSON and each
/// relationship's `relationshipName` becomes `name`.
///
/// # Errors
///
/// - `AppError::MissingField` naming the first absent required field.
/// - `AppError::Lookup` if the configuration string is not valid JSON.
pub fn snapshot_from_history(item: HistoricalConfigurationItem) -> Result<ResourceSnapshot> {
    let resource_type = require(item.resource_type, "history.resourceType")?;
    let resource_id = require(item.resource_id, "history.resourceId")?;
    let status = require(item.configuration_item_status, "history.configurationItemStatus")?;
    let capture_time = require(
        item.configuration_item_capture_time,
        "history.configurationItemCaptureTime",
    )?;

    let configuration = match item.configuration.as_deref().map(str::trim) {
        None | Some("") => Value::Null,
        Some(raw) => serde_json::from_str(raw).map_err(|err| {
            AppError::Lookup(format!(
                "history configuration for {resource_type}/{resource_id} is not valid JSON: {err}"
            ))
        })?,
    };

    let relationships = item
        .relationships
        .into_iter()
        .enumerate()
        .map(|(idx, rel)| {
            Ok(Relationship {
                name: require(
                    rel.relationship_name,
                    &format!("history.relationships[{idx}].relationshipName"),
                )?,
                resource_type: rel.resource_type,
                resource_id: rel.resource_id,
                resource_name: rel.resource_name,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ResourceSnapshot {
        resource_type,
        resource_id,
        status,
        capture_time,
        configuration,
        relationships,
        resource_name: item.resource_name,
        arn: item.arn,
        account_id: item.account_id,
        region: item.aws_region,
        tags: item.tags,
    })
}

fn require<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| AppError::MissingField(field.to_owned()))
}
