//! End-to-end session lifecycle tests

use crate::{ledger_keys, ledger_path, report_path, test_config, write_template};
use scrapekit::config::OutputDestination;
use scrapekit::session::{BrowserDriver, BrowserKind, BrowserLauncher, BrowserOptions};
use scrapekit::{
    load_report, run_session, KnownKeySet, NewItem, ReportFormat, ScrapeError, Session,
    SessionState,
};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn keys_of(items: &[scrapekit::Item]) -> Vec<&str> {
    items.iter().map(|item| item.key.as_str()).collect()
}

#[test]
fn test_first_run_writes_report_and_ledger() {
    let dir = TempDir::new().unwrap();
    let mut session = Session::open(test_config(dir.path()), "news").unwrap();

    session
        .add(NewItem::new("a").title("A").url("https://example.com/a"))
        .unwrap();
    session.add(NewItem::new("b").tags(["x", "y"])).unwrap();
    let summary = session.finish().unwrap();

    assert!(summary.committed);
    assert_eq!(summary.new_items, 2);

    let items = load_report(&report_path(dir.path())).unwrap();
    assert_eq!(keys_of(&items), vec!["a", "b"]);
    assert!(items.iter().all(|item| item.script == "news"));
    assert_eq!(ledger_keys(&ledger_path(dir.path(), "news")), vec!["a", "b"]);
}

#[test]
fn test_rerun_adds_nothing() {
    let dir = TempDir::new().unwrap();

    for _ in 0..2 {
        let mut session = Session::open(test_config(dir.path()), "news").unwrap();
        session.add(NewItem::new("a")).unwrap();
        session.add(NewItem::new("b")).unwrap();
        let summary = session.finish().unwrap();
        assert!(summary.committed);
    }

    let mut session = Session::open(test_config(dir.path()), "news").unwrap();
    assert!(session.add(NewItem::new("a")).unwrap().is_none());
    assert!(session.add(NewItem::new("b")).unwrap().is_none());
    let summary = session.finish().unwrap();

    assert_eq!(summary.new_items, 0);
    assert_eq!(ledger_keys(&ledger_path(dir.path(), "news")), vec!["a", "b"]);
    let items = load_report(&report_path(dir.path())).unwrap();
    assert_eq!(keys_of(&items), vec!["a", "b"]);
}

#[test]
fn test_duplicate_within_session() {
    let dir = TempDir::new().unwrap();
    let mut session = Session::open(test_config(dir.path()), "news").unwrap();

    assert!(session.add(NewItem::new("a").title("first")).unwrap().is_some());
    assert!(session.add(NewItem::new("b")).unwrap().is_some());
    assert!(session.add(NewItem::new("a").title("second")).unwrap().is_none());
    assert_eq!(session.count(), 2);
    session.finish().unwrap();

    let items = load_report(&report_path(dir.path())).unwrap();
    assert_eq!(keys_of(&items), vec!["a", "b"]);
    assert_eq!(items[0].title.as_deref(), Some("first"));
}

#[test]
fn test_new_keys_only_on_second_run() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path());
    config.output = OutputDestination::File(dir.path().join("first.json"));

    let mut session = Session::open(config.clone(), "news").unwrap();
    session.add(NewItem::new("a")).unwrap();
    session.finish().unwrap();

    // A fresh report file: only the new key is reported
    config.output = OutputDestination::File(dir.path().join("second.json"));
    let mut session = Session::open(config, "news").unwrap();
    session.add(NewItem::new("a")).unwrap();
    session.add(NewItem::new("c")).unwrap();
    session.finish().unwrap();

    let items = load_report(&dir.path().join("second.json")).unwrap();
    assert_eq!(keys_of(&items), vec!["c"]);
    assert_eq!(ledger_keys(&ledger_path(dir.path(), "news")), vec!["a", "c"]);
}

#[test]
fn test_resume_appends_to_existing_report() {
    let dir = TempDir::new().unwrap();

    let mut session = Session::open(test_config(dir.path()), "news").unwrap();
    session.add(NewItem::new("a")).unwrap();
    session.finish().unwrap();

    let mut session = Session::open(test_config(dir.path()), "news").unwrap();
    assert_eq!(session.count(), 1);
    session.add(NewItem::new("b")).unwrap();
    let summary = session.finish().unwrap();

    assert_eq!(summary.reported, 2);
    assert_eq!(summary.new_items, 1);
    let items = load_report(&report_path(dir.path())).unwrap();
    assert_eq!(keys_of(&items), vec!["a", "b"]);
}

#[test]
fn test_abort_discards_changes() {
    let dir = TempDir::new().unwrap();

    let mut session = Session::open(test_config(dir.path()), "news").unwrap();
    session.add(NewItem::new("a")).unwrap();
    session.finish().unwrap();
    let ledger_before = fs::read(ledger_path(dir.path(), "news")).unwrap();
    let report_before = fs::read(report_path(dir.path())).unwrap();

    let mut session = Session::open(test_config(dir.path()), "news").unwrap();
    session.add(NewItem::new("b")).unwrap();
    let summary = session.abort();

    assert!(!summary.committed);
    assert_eq!(summary.reported, 0);
    assert_eq!(fs::read(ledger_path(dir.path(), "news")).unwrap(), ledger_before);
    assert_eq!(fs::read(report_path(dir.path())).unwrap(), report_before);
}

#[test]
fn test_dropped_session_writes_nothing() {
    let dir = TempDir::new().unwrap();

    {
        let mut session = Session::open(test_config(dir.path()), "news").unwrap();
        session.add(NewItem::new("a")).unwrap();
    }

    assert!(!ledger_path(dir.path(), "news").exists());
    assert!(!report_path(dir.path()).exists());
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path());
    config.dry = true;

    let mut session = Session::open(config, "news").unwrap();
    assert!(session.is_dry());
    session.add(NewItem::new("a")).unwrap();
    let summary = session.finish().unwrap();

    assert!(!summary.committed);
    assert_eq!(summary.new_items, 1);
    assert!(!ledger_path(dir.path(), "news").exists());
    assert!(!report_path(dir.path()).exists());
}

#[test]
fn test_clear_forgets_known_keys() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path());
    config.output = OutputDestination::File(dir.path().join("first.json"));

    let mut session = Session::open(config.clone(), "news").unwrap();
    session.add(NewItem::new("a")).unwrap();
    session.finish().unwrap();

    config.output = OutputDestination::File(dir.path().join("second.json"));
    config.clear = true;
    let mut session = Session::open(config, "news").unwrap();
    assert!(!session.contains("a"));
    assert!(session.add(NewItem::new("a")).unwrap().is_some());
    session.finish().unwrap();

    assert_eq!(ledger_keys(&ledger_path(dir.path(), "news")), vec!["a"]);
}

#[test]
fn test_clear_with_dry_run_keeps_ledger() {
    let dir = TempDir::new().unwrap();
    let mut session = Session::open(test_config(dir.path()), "news").unwrap();
    session.add(NewItem::new("a")).unwrap();
    session.finish().unwrap();
    let ledger_before = fs::read(ledger_path(dir.path(), "news")).unwrap();

    let mut config = test_config(dir.path());
    config.clear = true;
    config.dry = true;
    let mut session = Session::open(config, "news").unwrap();
    session.add(NewItem::new("b")).unwrap();
    let summary = session.finish().unwrap();

    assert!(!summary.committed);
    assert_eq!(fs::read(ledger_path(dir.path(), "news")).unwrap(), ledger_before);
}

#[test]
fn test_clear_with_abort_keeps_ledger() {
    let dir = TempDir::new().unwrap();
    let mut session = Session::open(test_config(dir.path()), "news").unwrap();
    session.add(NewItem::new("a")).unwrap();
    session.finish().unwrap();
    let ledger_before = fs::read(ledger_path(dir.path(), "news")).unwrap();

    let mut config = test_config(dir.path());
    config.clear = true;
    let session = Session::open(config.clone(), "news").unwrap();
    session.abort();
    assert_eq!(fs::read(ledger_path(dir.path(), "news")).unwrap(), ledger_before);

    {
        let _session = Session::open(config, "news").unwrap();
    }
    assert_eq!(fs::read(ledger_path(dir.path(), "news")).unwrap(), ledger_before);
}

#[test]
fn test_rerun_csv_session() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path());
    config.format = ReportFormat::Tabular;
    config.output = OutputDestination::File(dir.path().join("report.csv"));

    let mut session = Session::open(config.clone(), "news").unwrap();
    session.add(NewItem::new("a")).unwrap();
    session.finish().unwrap();

    let mut session = Session::open(config, "news").unwrap();
    assert_eq!(session.count(), 0);
    assert!(session.add(NewItem::new("a")).unwrap().is_none());
    session.add(NewItem::new("b")).unwrap();
    let summary = session.finish().unwrap();

    assert_eq!(summary.reported, 1);
    let csv = fs::read_to_string(dir.path().join("report.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "key,date,script");
    assert!(lines[1].starts_with("b,"));
    assert!(lines[1].ends_with(",news"));
}

#[test]
fn test_rerun_html_session() {
    let dir = TempDir::new().unwrap();
    write_template(dir.path());
    let mut config = test_config(dir.path());
    config.format = ReportFormat::Html;
    config.output = OutputDestination::File(dir.path().join("report.html"));

    for key in ["a", "b"] {
        let mut session = Session::open(config.clone(), "news").unwrap();
        session.add(NewItem::new(key)).unwrap();
        assert_eq!(session.count(), 1);
        session.finish().unwrap();
    }

    let page = fs::read_to_string(dir.path().join("report.html")).unwrap();
    assert!(page.contains("\"key\":\"b\""));
    assert!(!page.contains("\"key\":\"a\""));
}

#[test]
fn test_scripts_have_separate_ledgers() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path());

    config.output = OutputDestination::File(dir.path().join("news.json"));
    let mut session = Session::open(config.clone(), "news").unwrap();
    session.add(NewItem::new("a")).unwrap();
    session.finish().unwrap();

    config.output = OutputDestination::File(dir.path().join("shop.json"));
    let mut session = Session::open(config, "shop").unwrap();
    assert!(session.add(NewItem::new("a")).unwrap().is_some());
    session.finish().unwrap();

    assert!(ledger_path(dir.path(), "news").exists());
    assert!(ledger_path(dir.path(), "shop").exists());
}

#[test]
fn test_corrupt_ledger_fails_open() {
    let dir = TempDir::new().unwrap();
    let path = ledger_path(dir.path(), "news");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "{ not a ledger").unwrap();

    let err = Session::open(test_config(dir.path()), "news").err().unwrap();

    assert!(matches!(err, ScrapeError::Storage(_)));
    assert_eq!(fs::read_to_string(&path).unwrap(), "{ not a ledger");
}

#[test]
fn test_invalid_config_fails_before_io() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path());
    config.output = OutputDestination::Stdout;
    config.verbose = true;

    let err = Session::open(config, "news").err().unwrap();

    assert!(matches!(err, ScrapeError::Config(_)));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_html_report() {
    let dir = TempDir::new().unwrap();
    write_template(dir.path());
    let mut config = test_config(dir.path());
    config.format = ReportFormat::Html;
    config.output = OutputDestination::File(dir.path().join("report.html"));

    let mut session = Session::open(config, "news").unwrap();
    session.add(NewItem::new("a").title("A")).unwrap();
    session.finish().unwrap();

    let page = fs::read_to_string(dir.path().join("report.html")).unwrap();
    assert!(page.starts_with("<html><script>const items = [{\"key\":\"a\""));
    assert!(!page.contains("__ITEMS__"));
}

#[test]
fn test_empty_html_report_still_saves_ledger() {
    let dir = TempDir::new().unwrap();
    write_template(dir.path());
    let mut config = test_config(dir.path());
    config.format = ReportFormat::Html;
    config.output = OutputDestination::File(dir.path().join("report.html"));

    let session = Session::open(config, "news").unwrap();
    let summary = session.finish().unwrap();

    assert!(summary.committed);
    assert!(!dir.path().join("report.html").exists());
    assert!(ledger_path(dir.path(), "news").exists());
}

#[test]
fn test_missing_template_keeps_ledger_untouched() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path());
    config.format = ReportFormat::Html;
    config.output = OutputDestination::File(dir.path().join("report.html"));

    let mut session = Session::open(config, "news").unwrap();
    session.add(NewItem::new("a")).unwrap();
    let err = session.finish().unwrap_err();

    assert!(matches!(err, ScrapeError::Report(_)));
    assert!(!ledger_path(dir.path(), "news").exists());
}

#[test]
fn test_run_session_commits_on_success() {
    let dir = TempDir::new().unwrap();
    let session = Session::open(test_config(dir.path()), "news").unwrap();

    let (added, summary) = run_session(session, |session| {
        session.add(NewItem::new("a"))?;
        Ok::<_, ScrapeError>(session.new_item_count())
    })
    .unwrap();

    assert_eq!(added, 1);
    assert!(summary.committed);
    let known = KnownKeySet::load(&ledger_path(dir.path(), "news")).unwrap();
    assert!(known.contains("a"));
}

#[derive(Debug)]
enum ScriptError {
    Parse(String),
    Scrape(ScrapeError),
}

impl From<ScrapeError> for ScriptError {
    fn from(e: ScrapeError) -> Self {
        Self::Scrape(e)
    }
}

#[test]
fn test_run_session_aborts_on_error() {
    let dir = TempDir::new().unwrap();
    let session = Session::open(test_config(dir.path()), "news").unwrap();

    let result: Result<((), _), ScriptError> = run_session(session, |session| {
        session.add(NewItem::new("a"))?;
        Err(ScriptError::Parse("unexpected page layout".to_string()))
    });

    match result {
        Err(ScriptError::Parse(message)) => assert_eq!(message, "unexpected page layout"),
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(!ledger_path(dir.path(), "news").exists());
    assert!(!report_path(dir.path()).exists());
}

struct FakeDriver {
    closed: Arc<AtomicUsize>,
    page: String,
}

impl BrowserDriver for FakeDriver {
    fn get(&mut self, url: &str) -> scrapekit::Result<()> {
        self.page = format!("<html><body><a href=\"{}\">link</a></body></html>", url);
        Ok(())
    }

    fn page_source(&mut self) -> scrapekit::Result<String> {
        Ok(self.page.clone())
    }

    fn close(&mut self) -> scrapekit::Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct FakeLauncher {
    launched: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
    kinds: Arc<Mutex<Vec<BrowserKind>>>,
}

impl BrowserLauncher for FakeLauncher {
    fn launch(&self, options: &BrowserOptions) -> scrapekit::Result<Box<dyn BrowserDriver>> {
        self.launched.fetch_add(1, Ordering::SeqCst);
        self.kinds.lock().unwrap().push(options.kind);
        Ok(Box::new(FakeDriver {
            closed: Arc::clone(&self.closed),
            page: String::new(),
        }))
    }
}

#[test]
fn test_browsers_closed_on_finish() {
    let dir = TempDir::new().unwrap();
    let launcher = FakeLauncher::default();
    let launched = Arc::clone(&launcher.launched);
    let closed = Arc::clone(&launcher.closed);

    let mut session =
        Session::open_with_launcher(test_config(dir.path()), "news", Box::new(launcher)).unwrap();

    let browser = session.browser(BrowserKind::Firefox).unwrap();
    browser.get("https://example.com/a").unwrap();
    let doc = browser.document().unwrap();
    let selector = scraper::Selector::parse("a").unwrap();
    let href = doc
        .select(&selector)
        .next()
        .and_then(|link| link.value().attr("href"))
        .unwrap()
        .to_string();
    session.add(NewItem::new(href.clone()).url(href)).unwrap();

    // Same kind is reused, a different kind gets its own driver
    session.browser(BrowserKind::Firefox).unwrap();
    session.browser(BrowserKind::Chrome).unwrap();
    assert_eq!(launched.load(Ordering::SeqCst), 2);

    session.finish().unwrap();
    assert_eq!(closed.load(Ordering::SeqCst), 2);
}

#[test]
fn test_default_browser_follows_config() {
    let dir = TempDir::new().unwrap();
    let launcher = FakeLauncher::default();
    let kinds = Arc::clone(&launcher.kinds);
    let mut config = test_config(dir.path());
    config.browser = BrowserKind::Chrome;

    let mut session = Session::open_with_launcher(config, "news", Box::new(launcher)).unwrap();
    session.default_browser().unwrap();
    session.default_browser().unwrap();
    session.abort();

    assert_eq!(*kinds.lock().unwrap(), vec![BrowserKind::Chrome]);
}

#[test]
fn test_browsers_closed_on_drop() {
    let dir = TempDir::new().unwrap();
    let launcher = FakeLauncher::default();
    let closed = Arc::clone(&launcher.closed);

    {
        let mut session =
            Session::open_with_launcher(test_config(dir.path()), "news", Box::new(launcher))
                .unwrap();
        session.browser(BrowserKind::Chrome).unwrap();
        assert_eq!(session.state(), SessionState::Active);
    }

    assert_eq!(closed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_no_browser_launcher_fails() {
    let dir = TempDir::new().unwrap();
    let mut session = Session::open(test_config(dir.path()), "news").unwrap();

    assert!(matches!(
        session.browser(BrowserKind::Firefox),
        Err(ScrapeError::Browser(_))
    ));
    assert_eq!(session.state(), SessionState::Active);
}
