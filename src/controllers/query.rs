use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::api::models::{Provider, QueryRequest};
use crate::api::QueryService;
use crate::ui::SharedScreen;
use crate::views::results::ResultView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPhase {
    Idle,
    Debouncing,
    InFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    EmptyQuery,
    InFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A debounce window was (re-)armed for this text.
    Armed,
    Ignored(IgnoreReason),
}

struct PendingSubmit {
    generation: u64,
    handle: JoinHandle<()>,
}

struct Shared {
    service: Arc<dyn QueryService>,
    results: ResultView,
    screen: SharedScreen,
    provider: Provider,
    debounce: Duration,
    in_flight: AtomicBool,
    pending: Mutex<Option<PendingSubmit>>,
    generation: AtomicU64,
    phase: watch::Sender<QueryPhase>,
}

/// Owns submit timing: trailing-edge debounce, then at most one request in flight.
#[derive(Clone)]
pub struct QueryController {
    shared: Arc<Shared>,
}

// Released on every exit path of a flight, including unwinding.
struct FlightGuard<'a> {
    shared: &'a Shared,
}

impl<'a> FlightGuard<'a> {
    fn acquire(shared: &'a Shared) -> Option<Self> {
        shared
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        shared.phase.send_replace(QueryPhase::InFlight);
        shared.screen.update(|s| s.lock_query_input());
        Some(Self { shared })
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.shared.in_flight.store(false, Ordering::SeqCst);
        self.shared.screen.update(|s| s.release_query_input());
        self.shared.phase.send_replace(QueryPhase::Idle);
    }
}

impl QueryController {
    pub fn new(
        service: Arc<dyn QueryService>,
        results: ResultView,
        screen: SharedScreen,
        provider: Provider,
        debounce: Duration,
    ) -> Self {
        let (phase, _) = watch::channel(QueryPhase::Idle);
        Self {
            shared: Arc::new(Shared {
                service,
                results,
                screen,
                provider,
                debounce,
                in_flight: AtomicBool::new(false),
                pending: Mutex::new(None),
                generation: AtomicU64::new(0),
                phase,
            }),
        }
    }

    pub fn phase(&self) -> QueryPhase {
        *self.shared.phase.borrow()
    }

    /// Resolves once no submission is pending or running.
    pub async fn settled(&self) {
        let mut phase = self.shared.phase.subscribe();
        // The sender lives in `shared`, so the channel cannot close while we wait
        let _ = phase.wait_for(|p| *p == QueryPhase::Idle).await;
    }

    /// Handles a submit trigger for `raw_text`. Re-triggering while the
    /// debounce window is open re-arms it with the newest text; triggers
    /// during a running request are dropped.
    pub fn submit(&self, raw_text: &str) -> SubmitOutcome {
        let shared = &self.shared;
        let query = raw_text.trim();
        if query.is_empty() {
            debug!("Ignoring empty query");
            return SubmitOutcome::Ignored(IgnoreReason::EmptyQuery);
        }
        if shared.in_flight.load(Ordering::SeqCst) {
            debug!("Ignoring submit while a query is in flight");
            return SubmitOutcome::Ignored(IgnoreReason::InFlight);
        }

        // Busy immediately, so repeated triggers are inert before the guard is taken
        shared.screen.update(|s| {
            s.input.text = raw_text.to_string();
            s.lock_query_input();
        });

        let generation = shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut pending = shared.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            debug!("Re-arming debounce (superseding #{})", previous.generation);
            previous.handle.abort();
        }

        let task_shared = Arc::clone(shared);
        let query = query.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(task_shared.debounce).await;
            task_shared.fire(generation, query).await;
        });
        *pending = Some(PendingSubmit { generation, handle });
        shared.phase.send_replace(QueryPhase::Debouncing);

        SubmitOutcome::Armed
    }
}

impl Shared {
    async fn fire(&self, generation: u64, query: String) {
        {
            // Only the most recently armed timer may proceed
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            if pending.as_ref().map(|p| p.generation) != Some(generation) {
                return;
            }
            pending.take();
        }

        let Some(_guard) = FlightGuard::acquire(self) else {
            debug!("Debounce fired while a query was in flight; dropping");
            return;
        };

        let request = QueryRequest {
            query: query.clone(),
            provider: self.provider,
        };
        info!("Submitting query: {}", query);

        match self.service.process_query(&request).await {
            Ok(response) => {
                self.results.render(response, &query);
                self.screen.update(|s| s.input.text.clear());
            }
            Err(e) => {
                self.screen.show_error(e.to_string());
            }
        }
    }
}
