mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{FakeModelApi, ModelCall, teacher_row};
use examtrack::client::dto::ListParams;
use examtrack::models::Teacher;
use examtrack::services::{ListPage, LoadState};
use examtrack::table::{FixedAnswer, PageItem};
use serde_json::json;

const DEBOUNCE: Duration = Duration::from_millis(400);

fn staff() -> FakeModelApi {
    let mut rows = vec![
        teacher_row("T01", "Smith", "Ann"),
        teacher_row("T02", "Smithson", "Bob"),
    ];
    for i in 3..=25 {
        rows.push(teacher_row(&format!("T{:02}", i), "Doe", "Jo"));
    }
    FakeModelApi::with_rows("Enseignants", rows)
}

#[tokio::test(start_paused = true)]
async fn mount_loads_first_page_without_search() {
    let api = Arc::new(staff());
    let mut page: ListPage<Teacher> = ListPage::new(api.clone(), 10, DEBOUNCE);

    page.mount().await;

    assert_eq!(api.list_calls(), vec![ListParams::new(1, 10, "")]);
    assert_eq!(*page.state(), LoadState::Success);
    assert_eq!(page.rows().len(), 10);
    assert_eq!(page.total(), 25);
    assert_eq!(page.total_pages(), 3);
}

#[tokio::test(start_paused = true)]
async fn settled_search_goes_back_to_page_one() {
    let api = Arc::new(staff());
    let mut page: ListPage<Teacher> = ListPage::new(api.clone(), 10, DEBOUNCE);
    page.mount().await;
    page.set_page(2).await;
    assert_eq!(page.page(), 2);

    page.set_search("Smith");
    assert!(page.settle_search().await);

    let calls = api.list_calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[2], ListParams::new(1, 10, "Smith"));
    assert_eq!(page.page(), 1);
    assert_eq!(page.search(), "Smith");
    assert_eq!(page.total(), 2);
}

#[tokio::test(start_paused = true)]
async fn rapid_typing_fetches_only_the_last_term() {
    let api = Arc::new(staff());
    let mut page: ListPage<Teacher> = ListPage::new(api.clone(), 10, DEBOUNCE);
    page.mount().await;

    page.set_search("S");
    tokio::time::advance(Duration::from_millis(100)).await;
    page.set_search("Sm");
    tokio::time::advance(Duration::from_millis(100)).await;
    page.set_search("Smiths");
    tokio::time::advance(Duration::from_millis(200)).await;
    assert_eq!(api.list_calls().len(), 1);

    assert!(page.settle_search().await);
    assert!(!page.settle_search().await);

    let calls = api.list_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].search, "Smiths");
}

#[tokio::test(start_paused = true)]
async fn term_that_fired_before_a_newer_keystroke_is_skipped() {
    let api = Arc::new(staff());
    let mut page: ListPage<Teacher> = ListPage::new(api.clone(), 10, DEBOUNCE);
    page.mount().await;

    page.set_search("Doe");
    tokio::time::sleep(DEBOUNCE * 2).await;
    page.set_search("Smith");

    assert!(page.settle_search().await);
    assert!(!page.settle_search().await);

    let calls = api.list_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1], ListParams::new(1, 10, "Smith"));
}

#[tokio::test(start_paused = true)]
async fn refresh_keeps_page_and_search() {
    let api = Arc::new(staff());
    let mut page: ListPage<Teacher> = ListPage::new(api.clone(), 10, DEBOUNCE);
    page.mount().await;
    page.set_page(3).await;

    page.refresh().await;

    let calls = api.list_calls();
    assert_eq!(calls.last(), Some(&ListParams::new(3, 10, "")));
    assert_eq!(page.rows().len(), 5);
}

#[tokio::test]
async fn failed_load_clears_rows_and_retry_repeats_parameters() {
    let api = Arc::new(staff());
    let mut page: ListPage<Teacher> = ListPage::new(api.clone(), 10, DEBOUNCE);
    page.mount().await;
    assert_eq!(page.rows().len(), 10);

    api.fail_lists(Some("Server error. Please check the server logs."));
    page.set_page(2).await;
    assert_eq!(
        page.error(),
        Some("Server error. Please check the server logs.")
    );
    assert!(page.rows().is_empty());
    assert_eq!(page.total(), 0);

    api.fail_lists(None);
    page.retry().await;
    assert_eq!(*page.state(), LoadState::Success);
    assert_eq!(api.list_calls().last(), Some(&ListParams::new(2, 10, "")));
}

#[tokio::test]
async fn confirmed_delete_sends_key_then_refetches_current_page() {
    let api = Arc::new(staff());
    let mut page: ListPage<Teacher> = ListPage::new(api.clone(), 10, DEBOUNCE);
    page.mount().await;
    page.set_page(2).await;
    let victim = page.rows()[0].clone();

    let deleted = page
        .delete(&victim, &FixedAnswer(true))
        .await
        .expect("Failed to delete");
    assert!(deleted);

    let calls = api.calls();
    let delete_at = calls
        .iter()
        .position(|c| matches!(c, ModelCall::Delete { .. }))
        .expect("no delete call");
    assert_eq!(
        calls[delete_at],
        ModelCall::Delete {
            model: "Enseignants".to_string(),
            key_field: "Code_Enseignant".to_string(),
            key_value: json!(victim.code),
        }
    );
    assert_eq!(
        calls.get(delete_at + 1),
        Some(&ModelCall::List {
            model: "Enseignants".to_string(),
            params: ListParams::new(2, 10, ""),
        })
    );
}

#[tokio::test]
async fn declined_delete_sends_nothing() {
    let api = Arc::new(staff());
    let mut page: ListPage<Teacher> = ListPage::new(api.clone(), 10, DEBOUNCE);
    page.mount().await;
    let before = api.calls().len();
    let victim = page.rows()[0].clone();

    let deleted = page
        .delete(&victim, &FixedAnswer(false))
        .await
        .expect("declining is not an error");

    assert!(!deleted);
    assert_eq!(api.calls().len(), before);
}

#[tokio::test]
async fn pagination_window_follows_current_page() {
    let mut rows = Vec::new();
    for i in 1..=95 {
        rows.push(teacher_row(&format!("T{:03}", i), "Doe", "Jo"));
    }
    let api = Arc::new(FakeModelApi::with_rows("Enseignants", rows));
    let mut page: ListPage<Teacher> = ListPage::new(api, 10, DEBOUNCE);
    page.mount().await;
    page.set_page(5).await;

    assert_eq!(page.total_pages(), 10);
    assert_eq!(
        page.pagination(),
        vec![
            PageItem::Page(1),
            PageItem::Ellipsis,
            PageItem::Page(4),
            PageItem::Page(5),
            PageItem::Page(6),
            PageItem::Ellipsis,
            PageItem::Page(10),
        ]
    );
}
