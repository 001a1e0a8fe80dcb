//! Fetch phase against a wiremock server

use crate::common::{record, test_config};
use tempfile::TempDir;
use waymark::clock::VirtualClock;
use waymark::harvest;
use waymark::model::UNRESOLVED;
use waymark::output::{DETAIL_FILE, PROGRESS_FILE};
use waymark::storage::CHECKPOINT_FILE;
use waymark::{ErrorKind, UrlRecord, WaymarkError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn article(n: usize) -> String {
    format!(
        "<html><head><title>Article {n}</title></head><body>\
         <nav>menu</nav><div id=\"mainContent\"><h1>Article {n}</h1>\
         <p>Body of article {n}.</p></div></body></html>"
    )
}

/// Mounts `/item/1..=count`; item 4 is missing and item 7 has no content element
async fn mount_items(server: &MockServer, count: usize) {
    for n in 1..=count {
        let response = match n {
            4 => ResponseTemplate::new(404),
            7 => ResponseTemplate::new(200)
                .set_body_string("<html><body><p>Moved elsewhere</p></body></html>"),
            _ => ResponseTemplate::new(200).set_body_string(article(n)),
        };
        Mock::given(method("GET"))
            .and(path(format!("/item/{}", n)))
            .respond_with(response)
            .mount(server)
            .await;
    }
}

fn items(server: &MockServer, count: usize) -> Vec<UrlRecord> {
    (1..=count)
        .map(|n| {
            if n == 9 {
                let mut unresolved = record(n, UNRESOLVED);
                unresolved.resolved = false;
                unresolved
            } else {
                record(n, &format!("{}/item/{}", server.uri(), n))
            }
        })
        .collect()
}

#[tokio::test]
async fn test_http_batch_run_contains_failures() {
    let mock_server = MockServer::start().await;
    mount_items(&mock_server, 12).await;

    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path(), 5);
    let records = items(&mock_server, 12);

    let mut ctx = harvest::prepare_run(&config, Some("hash".to_string()), records.len(), false)
        .expect("Failed to prepare run");
    let mut processor = harvest::http_processor(&config).unwrap();

    harvest::fetch_content(&config, &mut ctx, &records, &mut processor, VirtualClock::new())
        .await
        .expect("Fetch should not fail on record errors");

    assert!(ctx.checkpoint.is_completed);
    assert_eq!(ctx.checkpoint.processed_count, 12);
    assert_eq!(ctx.checkpoint.success_count, 9);
    assert_eq!(ctx.checkpoint.fail_count, 3);
    assert_eq!(ctx.results.len(), 12);

    let kinds: Vec<(usize, Option<ErrorKind>)> = ctx
        .results
        .failures()
        .map(|r| (r.record_index, r.error_kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (3, Some(ErrorKind::Navigation)),
            (6, Some(ErrorKind::ExtractionMiss)),
            (8, Some(ErrorKind::EmptyUrl)),
        ]
    );

    let content = &ctx.results.as_slice()[0]
        .payload
        .as_ref()
        .expect("First record should have content")
        .content;
    assert!(content.contains("Body of article 1."));
    assert!(!content.contains("menu"));
}

#[tokio::test]
async fn test_run_directory_layout() {
    let mock_server = MockServer::start().await;
    mount_items(&mock_server, 12).await;

    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path(), 5);
    let records = items(&mock_server, 12);

    let mut ctx = harvest::prepare_run(&config, None, records.len(), false).unwrap();
    let mut processor = harvest::http_processor(&config).unwrap();
    harvest::fetch_content(&config, &mut ctx, &records, &mut processor, VirtualClock::new())
        .await
        .unwrap();

    let run_dir = &ctx.run_dir;
    assert!(run_dir.starts_with(temp.path().join("runs")));
    assert!(run_dir.join(CHECKPOINT_FILE).exists());
    assert!(run_dir.join(PROGRESS_FILE).exists());
    assert!(run_dir.join(DETAIL_FILE).exists());

    for batch in 1..=3 {
        let dir = run_dir.join(format!("batch_{:03}", batch));
        assert!(dir.join("results.json").exists(), "batch {} results", batch);
        assert!(dir
            .join(format!("batch_{:03}_summary.md", batch))
            .exists());
    }
    assert!(run_dir.join("batch_001").join("001_Item 1.md").exists());
    // Failed records get no content file
    assert!(!run_dir.join("batch_001").join("004_Item 4.md").exists());

    let progress = std::fs::read_to_string(run_dir.join(PROGRESS_FILE)).unwrap();
    assert!(progress.contains("12 / 12"));
    assert!(progress.contains("Item 4"));

    let stats = harvest::run_statistics(run_dir).unwrap();
    assert_eq!(stats.total, 12);
    assert_eq!(stats.succeeded, 9);
    assert_eq!(stats.failed, 3);
}

#[tokio::test]
async fn test_export_report_rebuilds_reports() {
    let mock_server = MockServer::start().await;
    mount_items(&mock_server, 3).await;

    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path(), 2);
    let records = items(&mock_server, 3);

    let mut ctx = harvest::prepare_run(&config, None, records.len(), false).unwrap();
    let mut processor = harvest::http_processor(&config).unwrap();
    harvest::fetch_content(&config, &mut ctx, &records, &mut processor, VirtualClock::new())
        .await
        .unwrap();

    let progress_path = ctx.run_dir.join(PROGRESS_FILE);
    std::fs::remove_file(&progress_path).unwrap();

    let latest = harvest::latest_run(temp.path().join("runs").as_path()).unwrap();
    assert_eq!(latest, ctx.run_dir);
    harvest::export_report(&latest).unwrap();

    let progress = std::fs::read_to_string(&progress_path).unwrap();
    assert!(progress.contains("3 / 3"));
}

#[test]
fn test_reading_an_empty_runs_root_fails() {
    let temp = TempDir::new().unwrap();
    assert!(harvest::latest_run(temp.path()).is_err());
}

#[test]
fn test_bad_content_selector_is_a_config_error() {
    let temp = TempDir::new().unwrap();
    let mut config = test_config(temp.path(), 2);
    assert!(harvest::http_processor(&config).is_ok());

    config.fetch.content_selector = "a[".to_string();
    assert!(matches!(
        harvest::http_processor(&config),
        Err(WaymarkError::Config(_))
    ));
}
