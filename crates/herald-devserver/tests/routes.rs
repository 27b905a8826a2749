use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;
use uuid::Uuid;

use herald_devserver::{NotificationBook, router};
use herald_types::api::{MAX_PAGE_LIMIT, MarkAllReadResponse, NotificationPayload, PageResponse};

async fn body_json<T: serde::de::DeserializeOwned>(resp: axum::response::Response) -> T {
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn lists_pages_with_total() {
    let book = Arc::new(NotificationBook::new(0.0));
    let user = Uuid::new_v4();
    book.seed(user, 12).await;

    let resp = router(book)
        .oneshot(
            Request::get(format!("/users/{}/notifications?page=2&limit=5", user))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let page: PageResponse = body_json(resp).await;
    assert_eq!(page.total, 12);
    assert_eq!(page.items.len(), 5);
}

#[tokio::test]
async fn oversized_limit_is_capped_at_the_shared_maximum() {
    let book = Arc::new(NotificationBook::new(0.0));
    let user = Uuid::new_v4();
    book.seed(user, 150).await;

    let resp = router(book)
        .oneshot(
            Request::get(format!("/users/{}/notifications?page=1&limit=500", user))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let page: PageResponse = body_json(resp).await;
    assert_eq!(page.total, 150);
    assert_eq!(page.items.len(), MAX_PAGE_LIMIT as usize);
}

#[tokio::test]
async fn rejects_page_zero() {
    let user = Uuid::new_v4();
    let resp = router(Arc::new(NotificationBook::new(0.0)))
        .oneshot(
            Request::get(format!("/users/{}/notifications?page=0&limit=5", user))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_then_mark_read_then_delete() {
    let book = Arc::new(NotificationBook::new(0.0));
    let user = Uuid::new_v4();
    let app = router(book.clone());

    let resp = app
        .clone()
        .oneshot(
            Request::post(format!("/users/{}/notifications", user))
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"type":"interview","title":"Interview booked","message":"Friday 14:00",
                        "priority_score":0.9,"action_url":"/interviews/7","action_text":"Details"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: NotificationPayload = body_json(resp).await;
    assert!(!created.is_read);

    let resp = app
        .clone()
        .oneshot(
            Request::post(format!("/users/{}/notifications/{}/read", user, created.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(book.page(user, 1, 10).await.0[0].is_read);

    let resp = app
        .clone()
        .oneshot(
            Request::delete(format!("/users/{}/notifications/{}", user, created.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app
        .oneshot(
            Request::delete(format!("/users/{}/notifications/{}", user, created.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_rejects_half_action_pair() {
    let app = router(Arc::new(NotificationBook::new(0.0)));
    let resp = app
        .oneshot(
            Request::post(format!("/users/{}/notifications", Uuid::new_v4()))
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"type":"deadline","title":"Closing","message":"Soon","action_url":"/jobs/1"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn mark_all_reports_unknown_ids_as_failed() {
    let book = Arc::new(NotificationBook::new(0.0));
    let user = Uuid::new_v4();
    book.seed(user, 3).await;
    let known = book.page(user, 1, 10).await.0[0].id;
    let unknown = Uuid::new_v4();

    let resp = router(book)
        .oneshot(
            Request::post(format!("/users/{}/notifications/read-all", user))
                .header("content-type", "application/json")
                .body(Body::from(format!(r#"{{"ids":["{}","{}"]}}"#, known, unknown)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let outcome: MarkAllReadResponse = body_json(resp).await;
    assert_eq!(outcome.updated, vec![known]);
    assert_eq!(outcome.failed, vec![unknown]);
}

#[tokio::test]
async fn injected_failures_return_503() {
    let book = Arc::new(NotificationBook::new(1.0));
    let user = Uuid::new_v4();
    book.seed(user, 1).await;
    let id = book.page(user, 1, 1).await.0[0].id;

    let resp = router(book)
        .oneshot(
            Request::post(format!("/users/{}/notifications/{}/read", user, id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}
