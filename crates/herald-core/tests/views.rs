mod common;

use std::sync::Arc;

use common::{FakeRemote, base_time, id, inbox, note, store_with};
use herald_core::{Dropdown, Filter, HistoryPage, NotificationKind, Panel, SortOrder};

#[tokio::test]
async fn dropdown_shows_newest_five_and_capped_badge() {
    let remote = Arc::new(FakeRemote::with(inbox(12)));
    let store = store_with(remote.clone(), 20);
    let dropdown = Dropdown::new(store);

    dropdown.open().await.unwrap();
    let view = dropdown.snapshot_at(base_time()).await;

    assert_eq!(view.cards.len(), 5);
    assert_eq!(view.cards[0].id, id(1));
    assert_eq!(view.cards[0].time_ago, "10m ago");
    assert_eq!(view.unread_count, 12);
    assert_eq!(view.badge.as_deref(), Some("9+"));
    assert_eq!(view.history_link, "/notifications");
    assert!(!view.has_high_priority);
}

#[tokio::test]
async fn panel_filters_and_sorts_without_touching_unread_count() {
    let remote = Arc::new(FakeRemote::with(vec![
        note(1, 10, 0.2),
        note(2, 20, 0.9),
        note(3, 30, 0.5),
    ]));
    let store = store_with(remote.clone(), 20);
    let mut panel = Panel::new(store.clone());
    panel.refresh().await.unwrap();

    let view = panel.snapshot_at(base_time()).await;
    assert_eq!(view.sort, SortOrder::Priority);
    let order: Vec<_> = view.cards.iter().map(|c| c.id).collect();
    assert_eq!(order, vec![id(2), id(3), id(1)]);
    assert_eq!(view.cards[0].priority, Some("High"));
    assert_eq!(view.cards[2].priority, None);
    assert!(view.has_high_priority);

    panel.set_filter(Filter::HighPriority);
    let view = panel.snapshot_at(base_time()).await;
    assert_eq!(view.cards.len(), 1);
    assert_eq!(view.unread_count, 3);

    panel.mark_as_read(id(2)).await.unwrap();
    let view = panel.snapshot_at(base_time()).await;
    // Still listed: the filter is on score, not read state
    assert_eq!(view.cards.len(), 1);
    assert!(view.cards[0].is_read);
    assert!(!view.has_high_priority);

    panel.set_filter(Filter::Unread);
    panel.set_sort(SortOrder::Time);
    let view = panel.snapshot_at(base_time()).await;
    let order: Vec<_> = view.cards.iter().map(|c| c.id).collect();
    assert_eq!(order, vec![id(1), id(3)]);
    assert_eq!(view.unread_count, 2);
}

#[tokio::test]
async fn panel_mark_all_clears_badge_everywhere() {
    let remote = Arc::new(FakeRemote::with(inbox(4)));
    let store = store_with(remote.clone(), 20);
    let panel = Panel::new(store.clone());
    let dropdown = Dropdown::new(store.clone());
    panel.refresh().await.unwrap();

    let outcome = panel.mark_all_as_read().await.unwrap();
    assert_eq!(outcome.marked.len(), 4);

    assert_eq!(dropdown.snapshot().await.badge, None);
    assert_eq!(panel.snapshot().await.unread_count, 0);
}

#[tokio::test]
async fn history_search_only_covers_loaded_pages() {
    let remote = Arc::new(FakeRemote::with(inbox(30)));
    let store = store_with(remote.clone(), 20);
    let mut history = HistoryPage::new(store);

    let view = history.snapshot().await;
    assert!(view.can_load_more);
    assert_eq!(view.loaded, 0);

    history.load_first().await.unwrap();
    history.set_search("#25");
    let view = history.snapshot().await;
    assert!(view.cards.is_empty());
    assert_eq!(view.loaded, 20);
    assert!(view.can_load_more);
    assert_eq!(remote.fetches(), 1);

    history.load_more().await.unwrap();
    let view = history.snapshot().await;
    assert_eq!(view.cards.len(), 1);
    assert_eq!(view.cards[0].id, id(25));
    assert!(!view.can_load_more);
    assert_eq!(remote.fetches(), 2);
}

#[tokio::test]
async fn history_kind_filter_and_error() {
    let mut interview = note(7, 5, 0.6);
    interview.kind = NotificationKind::Interview;
    let remote = Arc::new(FakeRemote::with(vec![interview, note(8, 15, 0.1)]));
    let store = store_with(remote.clone(), 20);
    let mut history = HistoryPage::new(store);
    history.load_first().await.unwrap();

    history.set_kind(Some(NotificationKind::Interview));
    let view = history.snapshot().await;
    assert_eq!(view.cards.len(), 1);
    assert_eq!(view.cards[0].kind, NotificationKind::Interview);

    history.set_kind(None);
    remote.fail_fetch.store(true, std::sync::atomic::Ordering::SeqCst);
    assert!(history.load_first().await.is_err());
    let view = history.snapshot().await;
    assert_eq!(view.loaded, 2);
    assert!(view.error.unwrap().contains("502"));
}
