#[path = "common/mod.rs"]
mod common;

use common::{
    capture_logs, comment_json, csv_records, example_thread, list_files, more_json, morechildren_response, post_json, temp_out_dir,
    thread_response, FailWith, FixtureSource, EXAMPLE_URL,
};
use rthread::{ExportFormat, ScrapeError, ThreadScraper};

/// The two-comment example: reply follows its parent and references it; CSV has three data rows.
#[test]
fn example_thread_end_to_end() {
    let dir = temp_out_dir();
    let source = FixtureSource::new().with_thread("abc123", example_thread());
    let mut console = Vec::new();
    let report = ThreadScraper::new(&source)
        .output_dir(&dir)
        .format(ExportFormat::Both)
        .run_with_console([EXAMPLE_URL], &mut console)
        .unwrap();

    assert_eq!(report.attempted, 1);
    assert!(report.failures.is_empty());
    let result = &report.threads[0].result;
    assert_eq!(result.post.id, "t3_abc123");
    assert_eq!(result.post.score, 42);
    let ids: Vec<&str> = result.comments.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["t1_c1", "t1_c2"]);
    assert_eq!(result.comments[1].parent_id, result.comments[0].id);
    assert_eq!(result.comments[0].parent_id, result.post.id);

    // One thread: per-thread files only, no combined.
    assert_eq!(report.exports.len(), 2);
    let files = list_files(&dir);
    assert_eq!(files.len(), 2);
    assert!(files.iter().all(|f| f.starts_with("reddit_data_1_")));

    let csv_path = report.exports.iter().find(|p| p.extension().is_some_and(|e| e == "csv")).unwrap();
    assert_eq!(csv_records(&std::fs::read(csv_path).unwrap()).len(), 3);

    let text = String::from_utf8(console).unwrap();
    assert!(text.contains("Title: Example title"));
}

/// One malformed URL among several: the rest succeed, exactly one InvalidUrl failure.
#[test]
fn malformed_url_is_skipped() {
    let source = FixtureSource::new()
        .with_thread("abc123", example_thread())
        .with_thread("def456", thread_response(post_json("def456", "Second", "op2", 7), vec![]));
    let urls = [EXAMPLE_URL, "https://example.com/nope", "https://redd.it/def456"];

    let report = ThreadScraper::new(&source)
        .output_dir(temp_out_dir())
        .format(ExportFormat::Json)
        .run_with_console(urls, &mut std::io::sink())
        .unwrap();

    assert_eq!(report.threads.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 2);
    assert!(matches!(report.failures[0].error, ScrapeError::InvalidUrl { .. }));
    assert!(!report.all_failed());
    let indexes: Vec<usize> = report.threads.iter().map(|t| t.index).collect();
    assert_eq!(indexes, vec![1, 3]);
    assert_eq!(source.fetch_calls.get(), 2, "malformed URL never reaches the source");
}

/// NotFound and Network failures skip the URL and the batch carries on.
#[test]
fn missing_and_flaky_threads_are_skipped() {
    let source = FixtureSource::new()
        .with_thread("abc123", example_thread())
        .failing("gone1", FailWith::NotFound)
        .failing("down1", FailWith::Network);
    let urls = [
        "https://www.reddit.com/r/test/comments/gone1/x/",
        "https://www.reddit.com/r/test/comments/down1/x/",
        EXAMPLE_URL,
    ];
    let report = ThreadScraper::new(&source).format(ExportFormat::Console).run_with_console(urls, &mut std::io::sink()).unwrap();

    assert_eq!(report.threads.len(), 1);
    let kinds: Vec<&str> = report.failures.iter().map(|f| f.error.kind()).collect();
    assert_eq!(kinds, vec!["not_found", "network"]);
}

/// Every URL failing is reported, not raised.
#[test]
fn all_failed_is_reported() {
    let source = FixtureSource::new().failing("gone1", FailWith::NotFound);
    let report = ThreadScraper::new(&source)
        .run_with_console(["https://redd.it/gone1", "nonsense"], &mut std::io::sink())
        .unwrap();
    assert!(report.all_failed());
    assert_eq!(report.failures.len(), 2);
}

/// Authentication failure aborts the whole batch.
#[test]
fn authentication_failure_aborts() {
    let source = FixtureSource::new().failing("abc123", FailWith::Auth).with_thread("def456", example_thread());
    let err = ThreadScraper::new(&source)
        .run_with_console([EXAMPLE_URL, "https://redd.it/def456"], &mut std::io::sink())
        .unwrap_err();
    assert!(matches!(err, ScrapeError::Authentication(_)));
    assert!(err.is_fatal());
    assert_eq!(source.fetch_calls.get(), 1);
}

/// Combined files appear only when more than one thread succeeded.
#[test]
fn combined_only_for_several_threads() {
    let dir = temp_out_dir();
    let source = FixtureSource::new()
        .with_thread("abc123", example_thread())
        .with_thread("def456", thread_response(post_json("def456", "Second", "op2", 7), vec![]));

    let report = ThreadScraper::new(&source)
        .output_dir(&dir)
        .format(ExportFormat::Csv)
        .run_with_console([EXAMPLE_URL, "https://redd.it/def456"], &mut std::io::sink())
        .unwrap();
    let files = list_files(&dir);
    assert_eq!(files.len(), 3, "{files:?}");
    let combined = report.exports.iter().find(|p| p.to_string_lossy().contains("combined")).unwrap();
    let rows = csv_records(&std::fs::read(combined).unwrap());
    assert_eq!(rows.len(), 3 + 1);
    assert_eq!(&rows[3][0], "Thread 2");

    let single = temp_out_dir();
    ThreadScraper::new(&source)
        .output_dir(&single)
        .format(ExportFormat::Csv)
        .run_with_console([EXAMPLE_URL, "bad"], &mut std::io::sink())
        .unwrap();
    assert!(list_files(&single).iter().all(|f| !f.contains("combined")));

    let off = temp_out_dir();
    ThreadScraper::new(&source)
        .output_dir(&off)
        .format(ExportFormat::Csv)
        .combined(false)
        .run_with_console([EXAMPLE_URL, "https://redd.it/def456"], &mut std::io::sink())
        .unwrap();
    assert_eq!(list_files(&off).len(), 2);
}

/// An export failure is recorded; the scraped results are still returned.
#[test]
fn export_failure_keeps_results() {
    let dir = temp_out_dir();
    let blocker = dir.join("blocked");
    std::fs::write(&blocker, b"").unwrap();
    let source = FixtureSource::new().with_thread("abc123", example_thread());

    let report = ThreadScraper::new(&source)
        .output_dir(&blocker)
        .format(ExportFormat::Json)
        .run_with_console([EXAMPLE_URL], &mut std::io::sink())
        .unwrap();
    assert_eq!(report.threads.len(), 1);
    assert!(report.exports.is_empty());
    assert_eq!(report.export_failures.len(), 1);
    assert_eq!(report.export_failures[0].kind(), "export");
}

/// A thread with placeholders is expanded through the source's loader.
#[test]
fn placeholders_expand_during_scrape() {
    let thread = thread_response(
        post_json("abc123", "Big", "op", 1),
        vec![comment_json("c1", "t3_abc123", "alice", "root", 1, vec![more_json("t1_c1", &["c5"])])],
    );
    let source = FixtureSource::new().with_thread("abc123", thread).with_more(
        "t1_c1",
        morechildren_response(vec![comment_json("c5", "t1_c1", "[deleted]", "[removed]", 0, vec![])]),
    );

    let result = ThreadScraper::new(&source).scrape_thread(EXAMPLE_URL).unwrap();
    assert_eq!(result.comments.len(), 2);
    assert_eq!(result.comments[1].author, "[deleted]");
    assert_eq!(result.comments[1].body, "[removed]");
    assert_eq!(result.first_orphan(), None);
    assert_eq!(source.more_calls.get(), 1);
}

/// A failing expansion fails that thread only.
#[test]
fn expansion_failure_skips_thread() {
    let thread = thread_response(
        post_json("abc123", "Big", "op", 1),
        vec![comment_json("c1", "t3_abc123", "alice", "root", 1, vec![more_json("t1_c1", &["c5"])])],
    );
    let source = FixtureSource::new()
        .with_thread("abc123", thread)
        .with_thread("def456", thread_response(post_json("def456", "Fine", "op", 1), vec![]));

    let report = ThreadScraper::new(&source)
        .run_with_console([EXAMPLE_URL, "https://redd.it/def456"], &mut std::io::sink())
        .unwrap();
    assert_eq!(report.threads.len(), 1);
    assert_eq!(report.threads[0].index, 2);
    assert_eq!(report.failures[0].error.kind(), "network");
}

/// A malformed URL produces exactly one error record, tagged invalid_url.
#[test]
fn malformed_url_logs_one_error() {
    let source = FixtureSource::new().with_thread("abc123", example_thread());
    let (report, logs) = capture_logs(|| {
        ThreadScraper::new(&source)
            .run_with_console([EXAMPLE_URL, "https://example.com/nope"], &mut std::io::sink())
            .unwrap()
    });
    assert_eq!(report.failures.len(), 1);

    let errors: Vec<&str> = logs.lines().filter(|l| l.contains("ERROR")).collect();
    assert_eq!(errors.len(), 1, "{logs}");
    assert!(errors[0].contains("invalid_url"), "{logs}");
    assert_eq!(logs.lines().filter(|l| l.contains("invalid_url")).count(), 1, "{logs}");
}
