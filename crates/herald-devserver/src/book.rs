use std::collections::HashMap;

use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use herald_types::api::NotificationPayload;
use herald_types::models::{ActivityLevel, EngagementContext, NotificationKind};

/// In-memory notifications per user, newest first.
pub struct NotificationBook {
    users: RwLock<HashMap<Uuid, Vec<NotificationPayload>>>,
    /// Probability (0.0–1.0) that a mutation is refused with 503
    failure_rate: f64,
}

impl NotificationBook {
    pub fn new(failure_rate: f64) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            failure_rate: failure_rate.clamp(0.0, 1.0),
        }
    }

    pub fn should_fail(&self) -> bool {
        self.failure_rate > 0.0 && rand::random::<f64>() < self.failure_rate
    }

    /// Returns one page and the user's total.
    pub async fn page(&self, user_id: Uuid, page: u32, limit: u32) -> (Vec<NotificationPayload>, u64) {
        let users = self.users.read().await;
        let Some(items) = users.get(&user_id) else {
            return (Vec::new(), 0);
        };
        let start = (page.saturating_sub(1) as usize).saturating_mul(limit as usize);
        let page_items = items.iter().skip(start).take(limit as usize).cloned().collect();
        (page_items, items.len() as u64)
    }

    pub async fn insert(&self, user_id: Uuid, payload: NotificationPayload) {
        let mut users = self.users.write().await;
        let items = users.entry(user_id).or_default();
        let pos = items
            .iter()
            .position(|n| n.created_at <= payload.created_at)
            .unwrap_or(items.len());
        items.insert(pos, payload);
    }

    /// `false` if the user has no such notification.
    pub async fn mark_read(&self, user_id: Uuid, id: Uuid) -> bool {
        let mut users = self.users.write().await;
        match users.get_mut(&user_id).and_then(|items| items.iter_mut().find(|n| n.id == id)) {
            Some(n) => {
                n.is_read = true;
                true
            }
            None => false,
        }
    }

    /// Mark `ids` read (every notification when empty). Each id may fail
    /// independently under failure injection. Returns (updated, failed).
    pub async fn mark_all_read(&self, user_id: Uuid, ids: &[Uuid]) -> (Vec<Uuid>, Vec<Uuid>) {
        let mut users = self.users.write().await;
        let Some(items) = users.get_mut(&user_id) else {
            return (Vec::new(), ids.to_vec());
        };

        let targets: Vec<Uuid> = if ids.is_empty() {
            items.iter().filter(|n| !n.is_read).map(|n| n.id).collect()
        } else {
            ids.to_vec()
        };

        let mut updated = Vec::new();
        let mut failed = Vec::new();
        for id in targets {
            match items.iter_mut().find(|n| n.id == id) {
                Some(n) if !self.should_fail() => {
                    n.is_read = true;
                    updated.push(id);
                }
                _ => failed.push(id),
            }
        }
        (updated, failed)
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> bool {
        let mut users = self.users.write().await;
        let Some(items) = users.get_mut(&user_id) else {
            return false;
        };
        let before = items.len();
        items.retain(|n| n.id != id);
        items.len() != before
    }

    /// Fill a user's inbox with `count` plausible job-board notifications.
    pub async fn seed(&self, user_id: Uuid, count: usize) {
        let now = Utc::now();
        for i in 0..count {
            self.insert(user_id, demo_notification(i, now - Duration::minutes(47 * i as i64)))
                .await;
        }
    }
}

fn demo_notification(i: usize, created_at: chrono::DateTime<Utc>) -> NotificationPayload {
    const SAMPLES: &[(NotificationKind, &str, &str, Option<(&str, &str)>)] = &[
        (
            NotificationKind::JobMatch,
            "New job match",
            "Junior Rust developer at Northwind fits 4 of your skills",
            Some(("/jobs/northwind-rust", "View job")),
        ),
        (
            NotificationKind::ApplicationUpdate,
            "Application update",
            "Contoso moved your application to the interview stage",
            Some(("/applications", "Open application")),
        ),
        (
            NotificationKind::Interview,
            "Interview scheduled",
            "Video interview with Fabrikam on Thursday at 10:00",
            Some(("/interviews", "Add to calendar")),
        ),
        (
            NotificationKind::Deadline,
            "Deadline approaching",
            "The Tailspin internship closes in 2 days",
            None,
        ),
        (
            NotificationKind::Digest,
            "Your weekly digest",
            "18 new roles matched your saved searches this week",
            None,
        ),
        (
            NotificationKind::Payment,
            "Payment received",
            "Your featured listing payment was processed",
            None,
        ),
    ];

    let (kind, title, message, action) = SAMPLES[i % SAMPLES.len()];
    let priority_score = ((i * 37) % 100) as f64 / 100.0;
    let engagement_context = (i % 3 == 0).then(|| EngagementContext {
        activity_level: Some(match i % 9 {
            0 => ActivityLevel::High,
            3 => ActivityLevel::Moderate,
            _ => ActivityLevel::Low,
        }),
        preferred_times: vec!["morning".to_string()],
    });

    NotificationPayload {
        id: Uuid::new_v4(),
        kind,
        title: title.to_string(),
        message: message.to_string(),
        created_at,
        is_read: i % 4 == 3,
        priority_score,
        action_url: action.map(|(url, _)| url.to_string()),
        action_text: action.map(|(_, text)| text.to_string()),
        engagement_context,
        optimal_timing: Some(i % 2 == 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pages_are_newest_first() {
        let book = NotificationBook::new(0.0);
        let user = Uuid::new_v4();
        book.seed(user, 7).await;

        let (first, total) = book.page(user, 1, 5).await;
        assert_eq!(total, 7);
        assert_eq!(first.len(), 5);
        assert!(first.windows(2).all(|w| w[0].created_at >= w[1].created_at));

        let (second, _) = book.page(user, 2, 5).await;
        assert_eq!(second.len(), 2);

        let (third, _) = book.page(user, 3, 5).await;
        assert!(third.is_empty());
    }

    #[tokio::test]
    async fn mutations_report_missing_ids() {
        let book = NotificationBook::new(0.0);
        let user = Uuid::new_v4();
        book.seed(user, 2).await;
        let (items, _) = book.page(user, 1, 10).await;

        assert!(book.mark_read(user, items[0].id).await);
        assert!(!book.mark_read(user, Uuid::new_v4()).await);
        assert!(book.delete(user, items[1].id).await);
        assert!(!book.delete(user, items[1].id).await);
        assert_eq!(book.page(user, 1, 10).await.1, 1);
    }

    #[tokio::test]
    async fn mark_all_splits_updated_and_failed() {
        let book = NotificationBook::new(0.0);
        let user = Uuid::new_v4();
        book.seed(user, 3).await;
        let (items, _) = book.page(user, 1, 10).await;
        let stranger = Uuid::new_v4();

        let (updated, failed) = book.mark_all_read(user, &[items[0].id, stranger]).await;
        assert_eq!(updated, vec![items[0].id]);
        assert_eq!(failed, vec![stranger]);
    }

    #[tokio::test]
    async fn full_failure_rate_fails_every_mutation() {
        let book = NotificationBook::new(1.0);
        assert!(book.should_fail());
        let user = Uuid::new_v4();
        book.seed(user, 2).await;

        let (updated, failed) = book.mark_all_read(user, &[]).await;
        assert!(updated.is_empty());
        assert_eq!(failed.len(), 2);
    }
}
