use std::time::Duration;

use crate::generation::{
    has_changed, ClientState, ErrorRecord, GenerationRecord, GenerationRequest, GenerationStatus,
    WireRequest, PROMPT_FAILED, UNKNOWN_STATE,
};

/// Delay between status refreshes while a job is pending or processing.
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_millis(3000);

/// Identifies one polling cycle. Results carrying an old ticket are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    /// The raw generation counter value.
    pub fn generation(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where the machine is within the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No request accepted yet, or the last one was withdrawn.
    Idle,
    /// A transport call is in flight.
    Requesting,
    /// Waiting for the refresh timer.
    Waiting,
    /// Polling stopped for good.
    Terminal,
}

/// What the driver must do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Issue one transport call and report the result with the same ticket.
    Send { ticket: Ticket, request: WireRequest },
    /// Wait `delay`, then call [`PollingMachine::on_timer`] with the ticket.
    Schedule { ticket: Ticket, delay: Duration },
    /// The cycle is over. State was updated.
    Stop,
    /// The input belonged to a superseded cycle. State was not touched.
    Discard,
}

/// Pure transition table for one client's polling lifecycle.
///
/// The machine owns the [`ClientState`]; drivers feed it transport results
/// and timer expirations and carry out the returned [`Command`]s. Every
/// accepted request bumps the generation counter, which is how results from
/// superseded cycles are recognized and dropped.
#[derive(Debug, Clone)]
pub struct PollingMachine {
    generation: u64,
    interval: Duration,
    phase: Phase,
    request: Option<GenerationRequest>,
    wire: Option<WireRequest>,
    job_id: Option<String>,
    state: ClientState,
}

impl PollingMachine {
    /// Create an idle machine with the given refresh interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            generation: 0,
            interval,
            phase: Phase::Idle,
            request: None,
            wire: None,
            job_id: None,
            state: ClientState::loading(),
        }
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The request the current cycle belongs to.
    pub fn current_request(&self) -> Option<&GenerationRequest> {
        self.request.as_ref()
    }

    /// Ticket of the current cycle.
    pub fn ticket(&self) -> Ticket {
        Ticket(self.generation)
    }

    /// Returns true if `ticket` belongs to the current cycle.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation
    }

    /// Offer a request.
    ///
    /// Returns `None` when it equals the current one, in which case the
    /// running cycle and its state are left alone. Otherwise a new cycle
    /// starts: any earlier ticket becomes stale and state resets to loading.
    /// An empty prompt settles immediately without a transport call.
    pub fn accept(&mut self, request: GenerationRequest) -> Option<Command> {
        if !has_changed(self.request.as_ref(), &request) {
            return None;
        }

        self.generation += 1;
        self.job_id = None;

        if request.is_prompt_missing() {
            self.request = Some(request);
            self.wire = None;
            self.phase = Phase::Terminal;
            self.state = ClientState::failed(None, ErrorRecord::prompt_missing());
            return Some(Command::Stop);
        }

        let wire = WireRequest::from_request(&request);
        self.request = Some(request);
        self.wire = Some(wire.clone());
        self.phase = Phase::Requesting;
        self.state = ClientState::loading();

        Some(Command::Send {
            ticket: self.ticket(),
            request: wire,
        })
    }

    /// Apply the result of a transport call.
    pub fn on_response(
        &mut self,
        ticket: Ticket,
        result: Result<GenerationRecord, ErrorRecord>,
    ) -> Command {
        if !self.is_current(ticket) || self.phase != Phase::Requesting {
            return Command::Discard;
        }

        let record = match result {
            Ok(record) => record,
            Err(error) => return self.settle(ClientState::failed(None, error)),
        };

        match &record.status {
            GenerationStatus::Pending | GenerationStatus::Processing => {
                if record.id.is_some() {
                    self.job_id = record.id.clone();
                }
                self.phase = Phase::Waiting;
                self.state = ClientState::in_progress(record);
                Command::Schedule {
                    ticket,
                    delay: self.interval,
                }
            }
            GenerationStatus::Completed => self.settle(ClientState::completed(record)),
            GenerationStatus::Error => {
                let message = record
                    .message
                    .clone()
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| PROMPT_FAILED.to_string());
                self.settle(ClientState::failed(Some(record), ErrorRecord::new(message)))
            }
            GenerationStatus::Unrecognized(_) => self.settle(ClientState::failed(
                Some(record),
                ErrorRecord::new(UNKNOWN_STATE),
            )),
        }
    }

    /// The refresh timer for `ticket` fired.
    pub fn on_timer(&mut self, ticket: Ticket) -> Command {
        if !self.is_current(ticket) || self.phase != Phase::Waiting {
            return Command::Discard;
        }

        let Some(wire) = self.wire.as_ref() else {
            return Command::Discard;
        };

        let request = match &self.job_id {
            Some(job_id) => wire.refresh(job_id.clone()),
            None => wire.clone(),
        };
        self.phase = Phase::Requesting;

        Command::Send { ticket, request }
    }

    /// Withdraw the current request, e.g. when its consumer goes away.
    ///
    /// Outstanding results are discarded and the next [`accept`](Self::accept)
    /// always starts a new cycle.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.phase = Phase::Idle;
        self.request = None;
        self.wire = None;
        self.job_id = None;
        self.state = ClientState::loading();
    }

    fn settle(&mut self, state: ClientState) -> Command {
        self.phase = Phase::Terminal;
        self.state = state;
        Command::Stop
    }
}

impl Default for PollingMachine {
    fn default() -> Self {
        Self::new(DEFAULT_POLLING_INTERVAL)
    }
}
