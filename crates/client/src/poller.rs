//! Async driver for the polling state machine.
//!
//! The [`PollingMachine`] decides; the poller carries out its commands on
//! tokio: one spawned task per accepted request, `tokio::time::sleep` for the
//! refresh timer, and a `watch` channel for publishing state. Every result is
//! applied under the machine's lock together with its ticket check, so a
//! superseded cycle can never overwrite the state of the current one.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use shaper_core::generation::{ClientState, ErrorRecord, GenerationRecord, GenerationRequest};
use shaper_core::polling::{Command, PollingMachine, DEFAULT_POLLING_INTERVAL};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::transport::Transport;

type LoadHook = Box<dyn Fn(&GenerationRecord) + Send + Sync>;
type ErrorHook = Box<dyn Fn(&ErrorRecord) + Send + Sync>;

struct Inner {
    machine: PollingMachine,
    task: Option<JoinHandle<()>>,
}

struct Shared {
    inner: Mutex<Inner>,
    state_tx: watch::Sender<ClientState>,
    on_load: Option<LoadHook>,
    on_error: Option<ErrorHook>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one transition under the lock and publish the resulting state
    /// unless it was stale. With `notify`, hooks see the new state once the
    /// lock is released.
    fn apply(
        &self,
        notify: bool,
        transition: impl FnOnce(&mut PollingMachine) -> Command,
    ) -> Command {
        let (command, notice) = {
            let mut inner = self.lock();
            let command = transition(&mut inner.machine);

            if let Command::Discard = command {
                tracing::warn!("Discarding result of a superseded generation request");
                return command;
            }

            let state = inner.machine.state().clone();
            if let Command::Stop = command {
                tracing::info!(
                    ticket = %inner.machine.ticket(),
                    status = ?state.data.as_ref().map(|d| d.status.as_str()),
                    error = ?state.error.as_ref().map(|e| e.message.as_str()),
                    "Generation settled"
                );
            }
            self.publish(state.clone());
            (command, notify.then_some(state))
        };

        if let Some(state) = notice {
            self.notify(&state);
        }
        command
    }

    /// Replace the published state. Watchers are only woken by actual changes.
    fn publish(&self, state: ClientState) {
        self.state_tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });
    }

    /// Must be called without holding the lock: hooks may call back into the poller.
    fn notify(&self, state: &ClientState) {
        if let (Some(hook), Some(data)) = (&self.on_load, &state.data) {
            hook(data);
        }
        if let (Some(hook), Some(error)) = (&self.on_error, &state.error) {
            hook(error);
        }
    }
}

/// Builder for [`Poller`].
pub struct PollerBuilder<T> {
    transport: Arc<T>,
    interval: Duration,
    on_load: Option<LoadHook>,
    on_error: Option<ErrorHook>,
}

impl<T: Transport + 'static> PollerBuilder<T> {
    /// Set the delay between status refreshes (default: 3 seconds).
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Called with the record after every response that carries one.
    pub fn on_load(mut self, hook: impl Fn(&GenerationRecord) + Send + Sync + 'static) -> Self {
        self.on_load = Some(Box::new(hook));
        self
    }

    /// Called once for each failure that settles a request.
    pub fn on_error(mut self, hook: impl Fn(&ErrorRecord) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(hook));
        self
    }

    pub fn build(self) -> Poller<T> {
        let machine = PollingMachine::new(self.interval);
        let (state_tx, _) = watch::channel(machine.state().clone());

        Poller {
            transport: self.transport,
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    machine,
                    task: None,
                }),
                state_tx,
                on_load: self.on_load,
                on_error: self.on_error,
            }),
        }
    }
}

/// Polls one generation request at a time until it settles.
///
/// Submitting a changed request cancels the running cycle; submitting an
/// equal one is a no-op. Dropping the poller cancels whatever is running.
/// Must be used from within a tokio runtime.
pub struct Poller<T> {
    transport: Arc<T>,
    shared: Arc<Shared>,
}

impl<T: Transport + 'static> Poller<T> {
    /// Create a poller with the default interval and no hooks.
    pub fn new(transport: T) -> Self {
        Self::builder(transport).build()
    }

    pub fn builder(transport: T) -> PollerBuilder<T> {
        PollerBuilder {
            transport: Arc::new(transport),
            interval: DEFAULT_POLLING_INTERVAL,
            on_load: None,
            on_error: None,
        }
    }

    /// Offer a request. Returns true if it started a new cycle.
    pub fn submit(&self, request: GenerationRequest) -> bool {
        let notice = {
            let mut inner = self.shared.lock();
            let Some(command) = inner.machine.accept(request) else {
                tracing::debug!("Generation parameters unchanged, keeping current cycle");
                return false;
            };

            if let Some(task) = inner.task.take() {
                task.abort();
            }

            tracing::debug!(ticket = %inner.machine.ticket(), "Starting generation cycle");
            let state = inner.machine.state().clone();
            self.shared.publish(state.clone());

            match command {
                Command::Send { .. } => {
                    inner.task = Some(tokio::spawn(drive(
                        Arc::clone(&self.shared),
                        Arc::clone(&self.transport),
                        command,
                    )));
                    None
                }
                _ => Some(state),
            }
        };

        if let Some(state) = notice {
            self.shared.notify(&state);
        }
        true
    }

    /// Withdraw the current request and cancel its cycle.
    ///
    /// The published state becomes [`ClientState::idle`], which counts as settled.
    pub fn cancel(&self) {
        let mut inner = self.shared.lock();
        if let Some(task) = inner.task.take() {
            task.abort();
        }
        inner.machine.reset();
        self.shared.publish(ClientState::idle());
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ClientState {
        self.shared.state_tx.borrow().clone()
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<ClientState> {
        self.shared.state_tx.subscribe()
    }

    /// Wait until the current request settles and return the final state.
    ///
    /// Waits indefinitely if nothing was submitted.
    pub async fn settled(&self) -> ClientState {
        let mut rx = self.subscribe();
        let state = match rx.wait_for(ClientState::is_settled).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        state
    }

    /// The request the current cycle belongs to.
    pub fn current_request(&self) -> Option<GenerationRequest> {
        self.shared.lock().machine.current_request().cloned()
    }
}

impl<T> Drop for Poller<T> {
    fn drop(&mut self) {
        let mut inner = self.shared.lock();
        if let Some(task) = inner.task.take() {
            task.abort();
        }
        inner.machine.reset();
    }
}

async fn drive<T: Transport + ?Sized>(shared: Arc<Shared>, transport: Arc<T>, first: Command) {
    let mut command = first;
    loop {
        command = match command {
            Command::Send { ticket, request } => {
                tracing::debug!(%ticket, job_id = ?request.id, "Sending generation request");
                let result = transport.send(&request).await;
                shared.apply(true, |machine| machine.on_response(ticket, result))
            }
            Command::Schedule { ticket, delay } => {
                tracing::debug!(%ticket, delay_ms = delay.as_millis() as u64, "Generation in progress");
                tokio::time::sleep(delay).await;
                shared.apply(false, |machine| machine.on_timer(ticket))
            }
            Command::Stop | Command::Discard => break,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shaper_core::generation::{GenerationStatus, WireRequest};
    use std::collections::VecDeque;
    use tokio::sync::Notify;
    use tokio::time::Instant;

    type Reply = Result<GenerationRecord, ErrorRecord>;

    /// Replies from a fixed script and records every request.
    #[derive(Default)]
    struct ScriptedTransport {
        replies: Mutex<VecDeque<Reply>>,
        calls: Mutex<Vec<WireRequest>>,
    }

    impl ScriptedTransport {
        fn new(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into_iter().collect()),
                calls: Mutex::default(),
            })
        }

        fn calls(&self) -> Vec<WireRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: &WireRequest) -> Reply {
            self.calls.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ErrorRecord::new("script exhausted")))
        }
    }

    /// Holds replies for "slow" prompts until released.
    struct GatedTransport {
        gate: Notify,
    }

    #[async_trait]
    impl Transport for GatedTransport {
        async fn send(&self, request: &WireRequest) -> Reply {
            if request.prompt == "slow" {
                self.gate.notified().await;
            }
            Ok(record(GenerationStatus::Completed, &request.prompt))
        }
    }

    fn record(status: GenerationStatus, id: &str) -> GenerationRecord {
        GenerationRecord::new(status)
            .with_id(id)
            .with_url(format!("https://cdn/{}", id))
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_then_completed_after_interval() {
        let transport = ScriptedTransport::new([
            Ok(record(GenerationStatus::Pending, "x1")),
            Ok(record(GenerationStatus::Completed, "x1")),
        ]);
        let poller = Poller::new(Arc::clone(&transport));
        let started = Instant::now();

        assert!(poller.submit(GenerationRequest::new("Build a login form")));
        let state = poller.settled().await;

        assert_eq!(
            state,
            ClientState::completed(record(GenerationStatus::Completed, "x1"))
        );
        assert!(started.elapsed() >= Duration::from_millis(3000));

        let calls = transport.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].id, None);
        assert_eq!(calls[1].id.as_deref(), Some("x1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_settled_state_schedules_nothing_more() {
        let transport = ScriptedTransport::new([Ok(record(GenerationStatus::Completed, "x1"))]);
        let poller = Poller::new(Arc::clone(&transport));

        poller.submit(GenerationRequest::new("Form"));
        poller.settled().await;
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_prompt_makes_no_call() {
        let transport = ScriptedTransport::new([]);
        let poller = Poller::new(Arc::clone(&transport));

        assert!(poller.submit(GenerationRequest::new("")));
        let state = poller.settled().await;

        assert_eq!(
            state,
            ClientState::failed(None, ErrorRecord::new("Prompt is missing"))
        );
        assert!(transport.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_settles() {
        let transport =
            ScriptedTransport::new([Err(ErrorRecord::with_status("Not Found", 404))]);
        let poller = Poller::new(Arc::clone(&transport));

        poller.submit(GenerationRequest::new("Form"));
        let state = poller.settled().await;

        assert!(!state.loading);
        assert_eq!(state.data, None);
        assert_eq!(state.error.unwrap().message, "Not Found");
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_status_keeps_record() {
        let transport = ScriptedTransport::new([Ok(record(GenerationStatus::Error, "x1"))]);
        let poller = Poller::new(Arc::clone(&transport));

        poller.submit(GenerationRequest::new("Form"));
        let state = poller.settled().await;

        assert_eq!(state.data, Some(record(GenerationStatus::Error, "x1")));
        assert_eq!(state.error.unwrap().message, "Error processing prompt.");
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_request_keeps_cycle() {
        let transport = ScriptedTransport::new([
            Ok(record(GenerationStatus::Processing, "x1")),
            Ok(record(GenerationStatus::Completed, "x1")),
        ]);
        let poller = Poller::new(Arc::clone(&transport));
        let request = GenerationRequest::new("Form").with_schema(&serde_json::json!({
            "type": "object"
        }));

        assert!(poller.submit(request.clone()));
        tokio::task::yield_now().await;
        assert!(!poller.submit(GenerationRequest::new("Form").with_schema(
            &serde_json::json!({ "type": "object" })
        )));

        let state = poller.settled().await;
        assert_eq!(state.data.unwrap().status, GenerationStatus::Completed);
        assert_eq!(transport.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_late_result_of_superseded_request_is_dropped() {
        let transport = Arc::new(GatedTransport {
            gate: Notify::new(),
        });
        let poller = Poller::new(Arc::clone(&transport));

        poller.submit(GenerationRequest::new("slow"));
        tokio::task::yield_now().await;
        poller.submit(GenerationRequest::new("fast"));

        let state = poller.settled().await;
        assert_eq!(state.data.as_ref().unwrap().id.as_deref(), Some("fast"));

        transport.gate.notify_waiters();
        tokio::task::yield_now().await;
        assert_eq!(poller.state().data.unwrap().id.as_deref(), Some("fast"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hooks_receive_record_and_error() {
        let transport = ScriptedTransport::new([Ok(record(GenerationStatus::Error, "x1"))]);
        let loads = Arc::new(Mutex::new(Vec::new()));
        let errors = Arc::new(Mutex::new(Vec::new()));

        let poller = Poller::builder(Arc::clone(&transport))
            .on_load({
                let loads = Arc::clone(&loads);
                move |record| loads.lock().unwrap().push(record.status.clone())
            })
            .on_error({
                let errors = Arc::clone(&errors);
                move |error| errors.lock().unwrap().push(error.message.clone())
            })
            .build();

        poller.submit(GenerationRequest::new("Form"));
        poller.settled().await;

        assert_eq!(*loads.lock().unwrap(), vec![GenerationStatus::Error]);
        assert_eq!(
            *errors.lock().unwrap(),
            vec!["Error processing prompt.".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_interval() {
        let transport = ScriptedTransport::new([
            Ok(record(GenerationStatus::Pending, "x1")),
            Ok(record(GenerationStatus::Pending, "x1")),
            Ok(record(GenerationStatus::Completed, "x1")),
        ]);
        let poller = Poller::builder(Arc::clone(&transport))
            .interval(Duration::from_millis(100))
            .build();
        let started = Instant::now();

        poller.submit(GenerationRequest::new("Form"));
        poller.settled().await;

        assert_eq!(transport.calls().len(), 3);
        assert!(started.elapsed() >= Duration::from_millis(200));
        assert!(started.elapsed() < Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_polling() {
        let transport = ScriptedTransport::new([
            Ok(record(GenerationStatus::Pending, "x1")),
            Ok(record(GenerationStatus::Completed, "x1")),
        ]);
        let poller = Poller::new(Arc::clone(&transport));

        poller.submit(GenerationRequest::new("Form"));
        let mut rx = poller.subscribe();
        rx.wait_for(|state| state.data.is_some()).await.unwrap();
        poller.cancel();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(transport.calls().len(), 1);
        assert_eq!(poller.current_request(), None);
        assert_eq!(poller.state(), ClientState::idle());
        assert_eq!(poller.settled().await, ClientState::idle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_on_load_fires_once_per_response() {
        let transport = ScriptedTransport::new([
            Ok(record(GenerationStatus::Pending, "x1")),
            Ok(record(GenerationStatus::Pending, "x1")),
            Ok(record(GenerationStatus::Completed, "x1")),
        ]);
        let loads = Arc::new(Mutex::new(Vec::new()));
        let poller = Poller::builder(Arc::clone(&transport))
            .on_load({
                let loads = Arc::clone(&loads);
                move |record| loads.lock().unwrap().push(record.status.clone())
            })
            .build();

        poller.submit(GenerationRequest::new("Form"));
        poller.settled().await;

        assert_eq!(
            *loads.lock().unwrap(),
            vec![
                GenerationStatus::Pending,
                GenerationStatus::Pending,
                GenerationStatus::Completed,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_prompt_reports_error_once() {
        let errors = Arc::new(Mutex::new(0));
        let poller = Poller::builder(ScriptedTransport::new([]))
            .on_error({
                let errors = Arc::clone(&errors);
                move |_| *errors.lock().unwrap() += 1
            })
            .build();

        poller.submit(GenerationRequest::new("  "));
        poller.settled().await;

        assert_eq!(*errors.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_hook_can_resubmit() {
        use std::sync::{OnceLock, Weak};

        type ScriptedPoller = Poller<Arc<ScriptedTransport>>;

        let transport = ScriptedTransport::new([
            Err(ErrorRecord::request_failed()),
            Ok(record(GenerationStatus::Completed, "retry")),
        ]);
        let handle: Arc<OnceLock<Weak<ScriptedPoller>>> = Arc::new(OnceLock::new());

        let poller = Arc::new(
            Poller::builder(Arc::clone(&transport))
                .on_error({
                    let handle = Arc::clone(&handle);
                    move |_| {
                        if let Some(poller) = handle.get().and_then(Weak::upgrade) {
                            poller.submit(GenerationRequest::new("Form").with_id("retry"));
                        }
                    }
                })
                .build(),
        );
        handle.set(Arc::downgrade(&poller)).unwrap();

        poller.submit(GenerationRequest::new("Form"));
        let mut rx = poller.subscribe();
        let state = rx
            .wait_for(|state| state.data.is_some())
            .await
            .unwrap()
            .clone();

        assert_eq!(
            state,
            ClientState::completed(record(GenerationStatus::Completed, "retry"))
        );
        let calls = transport.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].id.as_deref(), Some("retry"));
    }

    #[tokio::test]
    async fn test_http_round_trip_until_completed() {
        use crate::config::ClientConfig;
        use crate::test_support::spawn_stub;
        use crate::transport::HttpTransport;
        use axum::{routing::post, Json, Router};
        use serde_json::{json, Value};
        use std::sync::atomic::{AtomicUsize, Ordering};

        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new().route(
            "/api/generate",
            post({
                let hits = Arc::clone(&hits);
                move |Json(body): Json<Value>| async move {
                    if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                        assert_eq!(body.get("id"), None);
                        Json(json!({ "id": "x1", "status": "building" }))
                    } else {
                        assert_eq!(body["id"], "x1");
                        Json(json!({ "id": "x1", "url": "https://cdn/x1", "status": "ready" }))
                    }
                }
            }),
        );
        let config = ClientConfig::default().with_base_url(spawn_stub(app).await);

        let poller = Poller::builder(HttpTransport::new(&config))
            .interval(Duration::from_millis(10))
            .build();
        poller.submit(GenerationRequest::new("Build a login form"));
        let state = poller.settled().await;

        assert_eq!(
            state,
            ClientState::completed(record(GenerationStatus::Completed, "x1"))
        );
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
