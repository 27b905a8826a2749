use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unread notifications scoring above this raise the "high priority" flag.
pub const HIGH_PRIORITY_THRESHOLD: f64 = 0.7;

/// Semantic category of a notification. Drives the icon and the type filter
/// on the history page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    JobMatch,
    ApplicationUpdate,
    Interview,
    Deadline,
    Digest,
    Payment,
    Message,
    System,
    /// Anything the client doesn't know yet. Rendered generically.
    #[serde(other)]
    Other,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JobMatch => "job_match",
            Self::ApplicationUpdate => "application_update",
            Self::Interview => "interview",
            Self::Deadline => "deadline",
            Self::Digest => "digest",
            Self::Payment => "payment",
            Self::Message => "message",
            Self::System => "system",
            Self::Other => "other",
        }
    }
}

/// Discretized urgency label shown as a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityBucket {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl PriorityBucket {
    /// Thresholds are exclusive on the lower bound: 0.8 is Medium, 0.3 gets no badge.
    pub fn from_score(score: f64) -> Self {
        if score > 0.8 {
            Self::High
        } else if score > 0.6 {
            Self::Medium
        } else if score > 0.3 {
            Self::Low
        } else {
            Self::None
        }
    }

    /// Badge text, `None` when no badge should be drawn.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Self::High => Some("High"),
            Self::Medium => Some("Medium"),
            Self::Low => Some("Low"),
            Self::None => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Low,
    Moderate,
    High,
}

/// Server-provided hint about the recipient, used only for explanatory text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementContext {
    #[serde(default)]
    pub activity_level: Option<ActivityLevel>,
    #[serde(default)]
    pub preferred_times: Vec<String>,
}

/// Call-to-action attached to a notification. The link and its label travel
/// together or not at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub url: String,
    pub text: String,
}

/// A notification as held by the client.
///
/// Everything except `is_read` is fixed by the remote store at creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
    pub priority_score: f64,
    pub action: Option<NotificationAction>,
    pub engagement_context: Option<EngagementContext>,
    pub optimal_timing: Option<bool>,
}

impl Notification {
    pub fn priority_bucket(&self) -> PriorityBucket {
        PriorityBucket::from_score(self.priority_score)
    }

    pub fn is_high_priority(&self) -> bool {
        self.priority_score > HIGH_PRIORITY_THRESHOLD
    }

    /// Take the server-owned fields from `fetched`. Read state only moves
    /// forward: once read locally, a stale copy can't mark it unread again.
    pub fn refresh_from(&mut self, fetched: Notification) {
        let is_read = self.is_read || fetched.is_read;
        *self = fetched;
        self.is_read = is_read;
    }
}

/// Clamp a wire score into [0, 1]. NaN becomes 0.
pub(crate) fn normalize_score(id: Uuid, score: f64) -> f64 {
    if score.is_nan() {
        tracing::warn!("Notification {} has NaN priority_score, using 0.0", id);
        return 0.0;
    }
    if !(0.0..=1.0).contains(&score) {
        tracing::warn!("Notification {} priority_score {} out of range, clamping", id, score);
    }
    score.clamp(0.0, 1.0)
}
