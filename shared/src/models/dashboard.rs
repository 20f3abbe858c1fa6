//! Dashboard session state shared with rendering collaborators

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{GeolocationFailure, Location, SnapshotKind};

/// Pipeline lifecycle of a dashboard session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    #[default]
    Idle,
    Resolving,
    Fetching,
    Recommending,
    Ready,
}

/// Display state of a single panel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PanelStatus {
    /// Nothing has been produced yet
    #[default]
    Empty,
    /// A request for this panel is in flight
    Loading,
    Fresh,
    /// Last-known-good value kept after a failure
    Stale,
}

/// A panel value plus the location it was produced for
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Panel<T> {
    pub value: Option<T>,
    pub status: PanelStatus,
    pub location: Option<Location>,
}

impl<T> Default for Panel<T> {
    fn default() -> Self {
        Self {
            value: None,
            status: PanelStatus::Empty,
            location: None,
        }
    }
}

impl<T> Panel<T> {
    /// Replace the value wholesale
    pub fn commit(&mut self, value: T, location: Location) {
        self.value = Some(value);
        self.status = PanelStatus::Fresh;
        self.location = Some(location);
    }

    pub fn mark_loading(&mut self) {
        self.status = PanelStatus::Loading;
    }

    /// Keep the current value but flag it; an empty panel stays empty
    pub fn mark_stale(&mut self) {
        self.status = if self.value.is_some() {
            PanelStatus::Stale
        } else {
            PanelStatus::Empty
        };
    }

    /// Whether the held value was produced for `location`
    pub fn is_for(&self, location: &Location) -> bool {
        self.value.is_some() && self.location.as_ref() == Some(location)
    }
}

/// Errors captured by the orchestrator and exposed as `last_error`
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineError {
    #[error("location unavailable ({reason}), using default location")]
    LocationUnavailable { reason: GeolocationFailure },

    #[error("{snapshot} fetch failed: {message}")]
    FetchFailed {
        snapshot: SnapshotKind,
        message: String,
    },

    #[error("recommendation failed: {message}")]
    RecommendationFailed { message: String },

    #[error("invalid {field}: {message}")]
    InvalidUserInput { field: String, message: String },
}

impl PipelineError {
    pub fn fetch_failed(snapshot: SnapshotKind, message: impl Into<String>) -> Self {
        Self::FetchFailed {
            snapshot,
            message: message.into(),
        }
    }

    pub fn recommendation_failed(message: impl Into<String>) -> Self {
        Self::RecommendationFailed {
            message: message.into(),
        }
    }

    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUserInput {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Category of a transient user notification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryKind {
    DefaultLocation,
    StaleData,
    DefaultCropSuggestions,
    RejectedInput,
}

/// A non-fatal notification that does not alter control flow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Advisory {
    pub kind: AdvisoryKind,
    pub message: String,
    pub issued_at: DateTime<Utc>,
}

impl Advisory {
    pub fn new(kind: AdvisoryKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            issued_at: Utc::now(),
        }
    }
}
