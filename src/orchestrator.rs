//! End-to-end muscle/gender query
//!
//! One query opens one browser session, scrolls the catalog page until it
//! stops producing videos, then pairs the side and front views into
//! exercise records. Nothing is shared between queries.

use crate::aggregator::PairAggregator;
use crate::browser::{BrowserConfig, BrowserError, PageSession};
use crate::collector::{Collection, CollectorConfig, IncrementalCollector, LazyPage};
use crate::config::Config;
use crate::error::ScrapeError;
use crate::models::{ExerciseRecord, MuscleExercises};
use crate::observer::{NoopObserver, ScrapeObserver, SessionReport};
use crate::parser::parse_video_url;
use std::sync::Arc;
use std::time::Instant;

/// Opens a rendered, settled page for a URL
pub trait PageLauncher: Send + Sync + 'static {
    type Page: LazyPage;

    fn open(&self, url: &str) -> Result<Self::Page, BrowserError>;
}

/// Launches a fresh headless Chrome per page
#[derive(Debug, Clone, Default)]
pub struct ChromeLauncher {
    config: BrowserConfig,
}

impl ChromeLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

impl PageLauncher for ChromeLauncher {
    type Page = PageSession;

    fn open(&self, url: &str) -> Result<PageSession, BrowserError> {
        PageSession::open(self.config.clone(), url)
    }
}

/// `https://<host>/exercises/<gender>/<muscle>/`, both segments lowercased
pub fn catalog_url(base_url: &str, muscle: &str, gender: &str) -> String {
    format!(
        "{}/exercises/{}/{}/",
        base_url.trim_end_matches('/'),
        gender.to_lowercase(),
        muscle.to_lowercase()
    )
}

/// Parse every discovered URL and keep the exercises that have both views
pub fn shape_exercises<S: AsRef<str>>(urls: &[S]) -> Vec<ExerciseRecord> {
    urls.iter()
        .filter_map(|url| {
            let url = url.as_ref();
            let parsed = parse_video_url(url);
            if parsed.is_none() {
                log::debug!("Skipping non-exercise video: {}", url);
            }
            parsed
        })
        .collect::<PairAggregator>()
        .finish()
}

pub struct QueryOrchestrator<L: PageLauncher = ChromeLauncher> {
    launcher: Arc<L>,
    collector: Arc<IncrementalCollector>,
    base_url: String,
    observer: Arc<dyn ScrapeObserver>,
}

impl QueryOrchestrator<ChromeLauncher> {
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ChromeLauncher::new(config.browser.to_browser_config()),
            config.collector.to_collector_config(),
            &config.catalog.base_url,
        )
    }
}

impl<L: PageLauncher> QueryOrchestrator<L> {
    pub fn new(launcher: L, collector: CollectorConfig, base_url: &str) -> Self {
        Self {
            launcher: Arc::new(launcher),
            collector: Arc::new(IncrementalCollector::new(collector)),
            base_url: base_url.to_string(),
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ScrapeObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn catalog_url(&self, muscle: &str, gender: &str) -> String {
        catalog_url(&self.base_url, muscle, gender)
    }

    /// Scrape the catalog page for `muscle`/`gender` and return paired exercises.
    ///
    /// The browser session runs on a blocking worker thread; launch and
    /// navigation failures abort the query.
    pub async fn fetch_exercises(&self, muscle: &str, gender: &str) -> Result<MuscleExercises, ScrapeError> {
        let url = self.catalog_url(muscle, gender);
        let launcher = Arc::clone(&self.launcher);
        let collector = Arc::clone(&self.collector);
        let observer = Arc::clone(&self.observer);

        let exercises = tokio::task::spawn_blocking(move || {
            run_session(launcher.as_ref(), &collector, observer.as_ref(), &url)
        })
        .await??;

        Ok(MuscleExercises {
            muscle: muscle.to_string(),
            exercises,
        })
    }

    /// Same as [`Self::fetch_exercises`] on the calling thread
    pub fn fetch_exercises_blocking(&self, muscle: &str, gender: &str) -> Result<MuscleExercises, ScrapeError> {
        let url = self.catalog_url(muscle, gender);
        let exercises = run_session(self.launcher.as_ref(), &self.collector, self.observer.as_ref(), &url)?;

        Ok(MuscleExercises {
            muscle: muscle.to_string(),
            exercises,
        })
    }
}

fn run_session<L: PageLauncher>(
    launcher: &L,
    collector: &IncrementalCollector,
    observer: &dyn ScrapeObserver,
    url: &str,
) -> Result<Vec<ExerciseRecord>, ScrapeError> {
    let started = Instant::now();
    observer.on_session_start(url);

    let outcome = collect_page(launcher, collector, observer, url)
        .map(|collection| {
            let exercises = shape_exercises(collection.urls.as_slice());
            (collection, exercises)
        });

    let mut report = SessionReport {
        url: url.to_string(),
        rounds: 0,
        urls_found: 0,
        exercises: 0,
        elapsed: started.elapsed(),
        error: None,
    };

    match outcome {
        Ok((collection, exercises)) => {
            report.rounds = collection.rounds;
            report.urls_found = collection.urls.len();
            report.exercises = exercises.len();
            observer.on_session_end(&report);
            Ok(exercises)
        }
        Err(e) => {
            report.error = Some(e.to_string());
            observer.on_session_end(&report);
            Err(e.into())
        }
    }
}

/// The page handle is dropped, and the browser released, before returning
fn collect_page<L: PageLauncher>(
    launcher: &L,
    collector: &IncrementalCollector,
    observer: &dyn ScrapeObserver,
    url: &str,
) -> Result<Collection, BrowserError> {
    let page = launcher.open(url)?;
    let collection = collector.collect(&page, observer)?;
    drop(page);

    log::info!(
        "Collected {} videos from {} in {} rounds{}",
        collection.urls.len(),
        url,
        collection.rounds,
        if collection.converged { " (converged)" } else { "" }
    );
    Ok(collection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::RoundReport;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    struct StaticPage {
        sources: Vec<String>,
        fail_on_query: Option<usize>,
        queries: AtomicUsize,
        released: Arc<AtomicUsize>,
    }

    impl LazyPage for StaticPage {
        fn video_sources(&self) -> Result<Vec<String>, BrowserError> {
            let query = self.queries.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_on_query == Some(query) {
                return Err(BrowserError::JavaScriptError("gone".to_string()));
            }
            Ok(self.sources.clone())
        }

        fn scroll_by(&self, _pixels: u32) -> Result<(), BrowserError> {
            Ok(())
        }
    }

    impl Drop for StaticPage {
        fn drop(&mut self) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct FakeLauncher {
        pages: HashMap<String, Vec<String>>,
        fail_on_query: Option<usize>,
        opened: Mutex<Vec<String>>,
        released: Arc<AtomicUsize>,
    }

    impl FakeLauncher {
        fn with_page(mut self, url: &str, sources: &[&str]) -> Self {
            self.pages
                .insert(url.to_string(), sources.iter().map(|s| s.to_string()).collect());
            self
        }

        fn failing_on_query(mut self, query: usize) -> Self {
            self.fail_on_query = Some(query);
            self
        }
    }

    impl PageLauncher for FakeLauncher {
        type Page = StaticPage;

        fn open(&self, url: &str) -> Result<StaticPage, BrowserError> {
            self.opened.lock().unwrap().push(url.to_string());
            match self.pages.get(url) {
                Some(sources) => Ok(StaticPage {
                    sources: sources.clone(),
                    fail_on_query: self.fail_on_query,
                    queries: AtomicUsize::new(0),
                    released: Arc::clone(&self.released),
                }),
                None => Err(BrowserError::NavigationError(format!(
                    "Navigation timeout for {}: timed out",
                    url
                ))),
            }
        }
    }

    #[derive(Default)]
    struct EventLog {
        events: Mutex<Vec<String>>,
    }

    impl ScrapeObserver for EventLog {
        fn on_session_start(&self, _url: &str) {
            self.events.lock().unwrap().push("start".to_string());
        }
        fn on_round_complete(&self, report: &RoundReport) {
            self.events.lock().unwrap().push(format!("round{}", report.round));
        }
        fn on_session_end(&self, report: &SessionReport) {
            let tag = if report.is_success() { "end" } else { "failed" };
            self.events.lock().unwrap().push(tag.to_string());
        }
    }

    const BICEPS_URL: &str = "https://catalog.test/exercises/male/biceps/";

    fn fast() -> CollectorConfig {
        CollectorConfig {
            settle_delay: Duration::ZERO,
            ..CollectorConfig::default()
        }
    }

    fn biceps_launcher() -> FakeLauncher {
        FakeLauncher::default().with_page(
            BICEPS_URL,
            &[
                "https://cdn.test/male-barbell-curl-side.mp4#t=0.1",
                "https://cdn.test/male-barbell-curl-front.mp4#t=0.1",
                "https://cdn.test/male-cable-hammer-curl-side.mp4",
                "https://cdn.test/intro-video-front.mp4",
            ],
        )
    }

    #[test]
    fn test_catalog_url() {
        assert_eq!(
            catalog_url("https://catalog.test", "Biceps", "Male"),
            "https://catalog.test/exercises/male/biceps/"
        );
        assert_eq!(
            catalog_url("https://catalog.test/", "Quadriceps", "FEMALE"),
            "https://catalog.test/exercises/female/quadriceps/"
        );
    }

    #[test]
    fn test_shape_exercises() {
        let urls = [
            "https://cdn.test/ex-01-bench-press-side.mp4",
            "https://cdn.test/ex-01-bench-press-front_alt.mp4",
            "https://cdn.test/intro-video-front.mp4",
        ];
        let records = shape_exercises(&urls);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Bench Press");
        assert_eq!(records[0].side_url, urls[0]);
        assert_eq!(records[0].front_url, urls[1]);
    }

    #[tokio::test]
    async fn test_fetch_exercises_end_to_end() {
        let orchestrator = QueryOrchestrator::new(biceps_launcher(), fast(), "https://catalog.test");

        let result = orchestrator.fetch_exercises("Biceps", "Male").await.unwrap();

        assert_eq!(result.muscle, "Biceps");
        assert_eq!(
            result.exercises,
            vec![ExerciseRecord::new(
                "Curl".to_string(),
                "https://cdn.test/male-barbell-curl-side.mp4".to_string(),
                "https://cdn.test/male-barbell-curl-front.mp4".to_string(),
            )]
        );
        assert_eq!(orchestrator.launcher.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_navigation_failure_is_fatal_and_reported() {
        let log = Arc::new(EventLog::default());
        let orchestrator = QueryOrchestrator::new(FakeLauncher::default(), fast(), "https://catalog.test")
            .with_observer(log.clone());

        let err = orchestrator.fetch_exercises("Neck", "female").await.unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(
            orchestrator.launcher.opened.lock().unwrap().as_slice(),
            ["https://catalog.test/exercises/female/neck/".to_string()]
        );
        assert_eq!(*log.events.lock().unwrap(), vec!["start", "failed"]);
    }

    #[tokio::test]
    async fn test_page_released_when_collection_fails() {
        let log = Arc::new(EventLog::default());
        let orchestrator =
            QueryOrchestrator::new(biceps_launcher().failing_on_query(2), fast(), "https://catalog.test")
                .with_observer(log.clone());

        let err = orchestrator.fetch_exercises("Biceps", "Male").await.unwrap_err();

        assert!(matches!(err, ScrapeError::Browser(BrowserError::JavaScriptError(_))));
        assert_eq!(orchestrator.launcher.released.load(Ordering::SeqCst), 1);
        assert_eq!(*log.events.lock().unwrap(), vec!["start", "round1", "failed"]);
    }

    #[test]
    fn test_observer_sees_lifecycle() {
        let log = Arc::new(EventLog::default());
        let orchestrator = QueryOrchestrator::new(biceps_launcher(), fast(), "https://catalog.test")
            .with_observer(log.clone());

        orchestrator.fetch_exercises_blocking("biceps", "male").unwrap();

        // static page: one productive round, then two idle rounds
        assert_eq!(
            *log.events.lock().unwrap(),
            vec!["start", "round1", "round2", "round3", "end"]
        );
    }

    #[test]
    fn test_stable_page_gives_same_records() {
        let orchestrator = QueryOrchestrator::new(biceps_launcher(), fast(), "https://catalog.test");

        let first: HashSet<_> = orchestrator
            .fetch_exercises_blocking("Biceps", "Male")
            .unwrap()
            .exercises
            .into_iter()
            .collect();
        let second: HashSet<_> = orchestrator
            .fetch_exercises_blocking("Biceps", "Male")
            .unwrap()
            .exercises
            .into_iter()
            .collect();

        assert_eq!(first, second);
        assert_eq!(orchestrator.launcher.released.load(Ordering::SeqCst), 2);
    }
}
