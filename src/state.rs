use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;

use crate::config::SearchConfig;
use crate::data::loader::DatasetCache;
use crate::error::Result;
use crate::pipeline::{QueryOutcome, SearchContext};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Page configuration; `source` tracks the dataset currently shown.
    pub config: SearchConfig,

    /// Tables loaded so far, shared with the loader thread.
    pub cache: Arc<DatasetCache>,

    /// Loaded table plus configuration (None until the first load finishes).
    pub context: Option<SearchContext>,

    /// Contents of the search box.
    pub query: String,

    /// Result of the last submitted search.
    pub outcome: Option<QueryOutcome>,

    /// Error message shown in the UI.
    pub status_message: Option<String>,

    /// Channel from the loader thread while a load is in flight.
    pending: Option<Receiver<Result<SearchContext>>>,
}

impl AppState {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            cache: Arc::new(DatasetCache::new()),
            context: None,
            query: String::new(),
            outcome: None,
            status_message: None,
            pending: None,
        }
    }

    /// Whether a dataset load is in progress.
    pub fn loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Load `location` on a background thread through the shared cache.
    pub fn start_load(&mut self, location: String) {
        let (tx, rx) = mpsc::channel();
        let cache = Arc::clone(&self.cache);
        let mut config = self.config.clone();
        config.source = location.clone();

        log::info!("Loading dataset from {location}");
        std::thread::spawn(move || {
            let result = cache
                .load(&location)
                .and_then(|table| SearchContext::new(table, config));
            // Receiver gone means the window closed; nothing to report to.
            let _ = tx.send(result);
        });

        self.pending = Some(rx);
        self.status_message = None;
    }

    /// Pick up a finished load, if any. Call once per frame.
    pub fn poll_load(&mut self) {
        let Some(rx) = &self.pending else {
            return;
        };
        match rx.try_recv() {
            Ok(Ok(context)) => {
                self.pending = None;
                self.set_context(context);
            }
            Ok(Err(e)) => {
                self.pending = None;
                log::error!("Failed to load dataset: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.pending = None;
                log::error!("Loader thread exited without a result");
                self.status_message = Some(String::from("Error: dataset loader stopped"));
            }
        }
    }

    /// Install a loaded dataset; re-run the last search against it.
    pub fn set_context(&mut self, context: SearchContext) {
        self.config = context.config().clone();
        let rerun = self.outcome.as_ref().map(|o| o.query.clone());
        self.context = Some(context);
        self.outcome = None;
        self.status_message = None;
        if let Some(query) = rerun {
            self.run_query(&query);
        }
    }

    /// Run the search box contents.
    pub fn submit_search(&mut self) {
        let query = self.query.clone();
        self.run_query(&query);
    }

    fn run_query(&mut self, query: &str) {
        let Some(context) = &self.context else {
            self.status_message = Some(String::from("No dataset loaded yet."));
            return;
        };
        match context.run(query) {
            Ok(outcome) => {
                self.outcome = Some(outcome);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Search failed: {e}");
                self.outcome = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Summary line for the last search.
    pub fn summary(&self) -> Option<String> {
        let context = self.context.as_ref()?;
        self.outcome.as_ref().map(|o| context.summary(o))
    }
}
