use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    EngagementContext, Notification, NotificationAction, NotificationKind, normalize_score,
};

// -- Notifications --

/// Notification as it travels over the wire. The action link and label are
/// flat optional fields here; `Notification` pairs them up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub priority_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engagement_context: Option<EngagementContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimal_timing: Option<bool>,
}

impl From<NotificationPayload> for Notification {
    fn from(p: NotificationPayload) -> Self {
        let action = match (p.action_url, p.action_text) {
            (Some(url), Some(text)) => Some(NotificationAction { url, text }),
            (None, None) => None,
            _ => {
                tracing::warn!("Notification {} has half an action pair, dropping it", p.id);
                None
            }
        };

        Notification {
            id: p.id,
            kind: p.kind,
            title: p.title,
            message: p.message,
            created_at: p.created_at,
            is_read: p.is_read,
            priority_score: normalize_score(p.id, p.priority_score),
            action,
            engagement_context: p.engagement_context,
            optimal_timing: p.optimal_timing,
        }
    }
}

impl From<Notification> for NotificationPayload {
    fn from(n: Notification) -> Self {
        let (action_url, action_text) = match n.action {
            Some(a) => (Some(a.url), Some(a.text)),
            None => (None, None),
        };

        NotificationPayload {
            id: n.id,
            kind: n.kind,
            title: n.title,
            message: n.message,
            created_at: n.created_at,
            is_read: n.is_read,
            priority_score: n.priority_score,
            action_url,
            action_text,
            engagement_context: n.engagement_context,
            optimal_timing: n.optimal_timing,
        }
    }
}

// -- Pagination --

/// Largest page size the client asks for and the store hands out.
pub const MAX_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse {
    pub items: Vec<NotificationPayload>,
    pub total: u64,
}

// -- Mark all read --

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarkAllReadRequest {
    /// Ids to mark. Empty means every notification of the user.
    #[serde(default)]
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarkAllReadResponse {
    pub updated: Vec<Uuid>,
    #[serde(default)]
    pub failed: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload_json(extra: &str) -> String {
        format!(
            r#"{{
                "id": "6f1c1a9e-2b7e-4c55-9a55-0d7f3e0b9a11",
                "type": "deadline",
                "title": "Application closes soon",
                "message": "Backend intern at Acme closes in 2 days",
                "created_at": "2026-03-01T09:30:00Z",
                "priority_score": 0.85{}
            }}"#,
            extra
        )
    }

    #[test]
    fn action_pair_is_kept_together() {
        let json = payload_json(r#", "action_url": "/jobs/42", "action_text": "Apply now""#);
        let payload: NotificationPayload = serde_json::from_str(&json).unwrap();
        let n = Notification::from(payload);

        assert_eq!(
            n.action,
            Some(NotificationAction { url: "/jobs/42".into(), text: "Apply now".into() })
        );
        assert!(!n.is_read);
        assert_eq!(n.kind, NotificationKind::Deadline);
    }

    #[test]
    fn half_action_pair_is_dropped() {
        let json = payload_json(r#", "action_url": "/jobs/42""#);
        let payload: NotificationPayload = serde_json::from_str(&json).unwrap();
        assert!(Notification::from(payload).action.is_none());
    }

    #[test]
    fn payload_flattens_action_again() {
        let json = payload_json(r#", "action_url": "/jobs/42", "action_text": "Apply now""#);
        let payload: NotificationPayload = serde_json::from_str(&json).unwrap();
        let back = NotificationPayload::from(Notification::from(payload));

        assert_eq!(back.action_url.as_deref(), Some("/jobs/42"));
        assert_eq!(back.action_text.as_deref(), Some("Apply now"));

        let value = serde_json::to_value(&back).unwrap();
        assert_eq!(value["type"], "deadline");
        assert!(value.get("optimal_timing").is_none());
    }

    #[test]
    fn mark_all_request_defaults_to_empty() {
        let req: MarkAllReadRequest = serde_json::from_str("{}").unwrap();
        assert!(req.ids.is_empty());
    }
}
