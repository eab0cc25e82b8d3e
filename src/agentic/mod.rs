//! Agentic-mode lifecycle for the mounted session.
//!
//! [`AgenticController`] mirrors the backend's enable/initialize lifecycle
//! into a local [`AgenticPhase`]. Every request captures the session
//! generation it was issued for; a response that arrives after the session
//! changed is dropped without touching state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{AgenticStatus, ApiError, AssistantApi, SessionId};
use crate::notify::Notifier;

// ── Phase ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgenticPhase {
    Unknown,
    Loading,
    Disabled,
    /// An enable request is in flight.
    Initializing,
    Enabled {
        initialized: bool,
    },
}

impl AgenticPhase {
    pub fn from_status(status: &AgenticStatus) -> Self {
        if status.enabled() {
            AgenticPhase::Enabled {
                initialized: status.initialized(),
            }
        } else {
            AgenticPhase::Disabled
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgenticPhase::Unknown => "unknown",
            AgenticPhase::Loading => "loading…",
            AgenticPhase::Disabled => "disabled",
            AgenticPhase::Initializing => "enabling…",
            AgenticPhase::Enabled { initialized: false } => "enabled, tools initializing",
            AgenticPhase::Enabled { initialized: true } => "enabled",
        }
    }

    pub fn is_enabled(self) -> bool {
        matches!(self, AgenticPhase::Enabled { .. })
    }
}

// ── Outcomes ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StatusError {
    #[error("no session selected")]
    NoSession,

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied(AgenticStatus),
    /// The session changed while the request was in flight.
    Stale,
    /// An enable completed while the request was in flight; its response
    /// is newer and was kept.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnableOutcome {
    Enabled(AgenticStatus),
    /// Another enable is still pending; no request was sent.
    InFlight,
    /// The session is already enabled; no request was sent.
    AlreadyEnabled,
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    Reset,
    InFlight,
    Stale,
}

/// Read-only view of the controller for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgenticSnapshot {
    pub session: Option<SessionId>,
    pub phase: AgenticPhase,
    pub status: Option<AgenticStatus>,
    pub resetting: bool,
}

// ── State ────────────────────────────────────────────────────────────

#[derive(Debug)]
struct ControllerState {
    session: Option<SessionId>,
    generation: u64,
    /// Bumped by every applied enable, so status reads issued before it
    /// cannot roll it back.
    revision: u64,
    phase: AgenticPhase,
    status: Option<AgenticStatus>,
    enable_in_flight: bool,
    resetting: bool,
}

impl Default for ControllerState {
    fn default() -> Self {
        ControllerState {
            session: None,
            generation: 0,
            revision: 0,
            phase: AgenticPhase::Unknown,
            status: None,
            enable_in_flight: false,
            resetting: false,
        }
    }
}

/// The identity a request was issued for.
#[derive(Debug, Clone)]
struct Ticket {
    session: SessionId,
    generation: u64,
    revision: u64,
}

impl ControllerState {
    fn ticket(&self) -> Result<Ticket, StatusError> {
        let session = self.session.clone().ok_or(StatusError::NoSession)?;
        Ok(Ticket {
            session,
            generation: self.generation,
            revision: self.revision,
        })
    }

    fn is_current(&self, ticket: &Ticket) -> bool {
        self.generation == ticket.generation
    }

    /// True when an enable landed after `ticket` was issued.
    fn is_superseded(&self, ticket: &Ticket) -> bool {
        self.revision != ticket.revision
    }

    /// Derive the phase from the known status, or use `fallback` when no
    /// status has been seen for this session.
    fn settle_phase(&mut self, fallback: AgenticPhase) {
        self.phase = self
            .status
            .as_ref()
            .map_or(fallback, AgenticPhase::from_status);
    }
}

// ── Controller ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AgenticController {
    api: Arc<dyn AssistantApi>,
    notifier: Notifier,
    state: Arc<Mutex<ControllerState>>,
}

impl AgenticController {
    pub fn new(api: Arc<dyn AssistantApi>, notifier: Notifier) -> Self {
        Self {
            api,
            notifier,
            state: Arc::new(Mutex::new(ControllerState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mount `session`. Anything still in flight for the previous session
    /// will be discarded when it returns.
    pub fn set_session(&self, session: SessionId) {
        let mut st = self.state();
        debug!(%session, "mounting agentic status");
        st.generation = st.generation.wrapping_add(1);
        st.session = Some(session);
        st.phase = AgenticPhase::Loading;
        st.status = None;
        st.enable_in_flight = false;
        st.resetting = false;
    }

    pub fn session(&self) -> Option<SessionId> {
        self.state().session.clone()
    }

    pub fn phase(&self) -> AgenticPhase {
        self.state().phase
    }

    pub fn snapshot(&self) -> AgenticSnapshot {
        let st = self.state();
        AgenticSnapshot {
            session: st.session.clone(),
            phase: st.phase,
            status: st.status.clone(),
            resetting: st.resetting,
        }
    }

    /// Re-read the status. A failure keeps whatever status was known and is
    /// only logged: status checks are advisory.
    pub async fn fetch_status(&self) -> Result<FetchOutcome, StatusError> {
        let ticket = {
            let mut st = self.state();
            let ticket = st.ticket()?;
            if st.phase == AgenticPhase::Unknown {
                st.phase = AgenticPhase::Loading;
            }
            ticket
        };

        debug!(session = %ticket.session, "fetching agentic status");
        let result = self.api.agentic_status(&ticket.session).await;

        let mut st = self.state();
        if !st.is_current(&ticket) {
            debug!(session = %ticket.session, "dropping agentic status for previous session");
            return Ok(FetchOutcome::Stale);
        }

        match result {
            Ok(_) if st.is_superseded(&ticket) => {
                debug!(session = %ticket.session, "dropping agentic status read before enable");
                Ok(FetchOutcome::Superseded)
            }
            Ok(status) => {
                st.status = Some(status.clone());
                if !st.enable_in_flight {
                    st.settle_phase(AgenticPhase::Unknown);
                }
                Ok(FetchOutcome::Applied(status))
            }
            Err(e) => {
                warn!(session = %ticket.session, error = %e, "agentic status check failed");
                if st.phase == AgenticPhase::Loading {
                    st.settle_phase(AgenticPhase::Unknown);
                }
                Err(e.into())
            }
        }
    }

    /// Enable agentic mode. At most one enable request is in flight per
    /// session; re-invocations while it is pending are no-ops.
    pub async fn enable(&self) -> Result<EnableOutcome, StatusError> {
        let (ticket, prior) = {
            let mut st = self.state();
            let ticket = st.ticket()?;
            if st.enable_in_flight {
                debug!(session = %ticket.session, "enable already in flight");
                return Ok(EnableOutcome::InFlight);
            }
            if st.phase.is_enabled() {
                return Ok(EnableOutcome::AlreadyEnabled);
            }
            st.enable_in_flight = true;
            let prior = st.phase;
            st.phase = AgenticPhase::Initializing;
            (ticket, prior)
        };

        info!(session = %ticket.session, "enabling agentic mode");
        let result = self.api.enable_agentic(&ticket.session).await;

        let mut st = self.state();
        if !st.is_current(&ticket) {
            warn!(session = %ticket.session, "discarding enable response for previous session");
            return Ok(EnableOutcome::Stale);
        }
        st.enable_in_flight = false;

        match result {
            Ok(status) => {
                st.revision = st.revision.wrapping_add(1);
                st.status = Some(status.clone());
                st.settle_phase(AgenticPhase::Unknown);
                drop(st);
                if status.initialized() {
                    self.notifier.success("Agentic mode enabled");
                } else {
                    self.notifier
                        .success("Agentic mode enabled, exploration tools are initializing");
                }
                Ok(EnableOutcome::Enabled(status))
            }
            Err(e) => {
                // Nothing is loading any more once the enable is over.
                st.settle_phase(match prior {
                    AgenticPhase::Loading | AgenticPhase::Initializing => AgenticPhase::Unknown,
                    other => other,
                });
                drop(st);
                self.notifier
                    .error(format!("Failed to enable agentic mode: {e}"));
                Err(e.into())
            }
        }
    }

    /// Clear the backend's conversational memory. Never alters the status.
    pub async fn reset_memory(&self) -> Result<ResetOutcome, StatusError> {
        let ticket = {
            let mut st = self.state();
            let ticket = st.ticket()?;
            if st.resetting {
                return Ok(ResetOutcome::InFlight);
            }
            st.resetting = true;
            ticket
        };

        info!(session = %ticket.session, "resetting agentic memory");
        let result = self.api.reset_agentic_memory(&ticket.session).await;

        {
            let mut st = self.state();
            if !st.is_current(&ticket) {
                return Ok(ResetOutcome::Stale);
            }
            st.resetting = false;
        }

        match result {
            Ok(()) => {
                self.notifier.success("Agentic memory reset");
                Ok(ResetOutcome::Reset)
            }
            Err(e) => {
                self.notifier
                    .error(format!("Failed to reset agentic memory: {e}"));
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{MockApi, Op, server_error, settle};
    use crate::notify::{Notice, NoticeLevel};
    use tokio::sync::mpsc::UnboundedReceiver;

    fn controller(api: &Arc<MockApi>) -> (AgenticController, UnboundedReceiver<Notice>) {
        let (notifier, rx) = Notifier::channel();
        (AgenticController::new(api.clone(), notifier), rx)
    }

    fn enabled(initialized: bool, tools: &[&str]) -> AgenticStatus {
        AgenticStatus::new(
            true,
            initialized,
            tools.iter().map(|t| (*t).to_string()).collect(),
        )
    }

    #[tokio::test]
    async fn starts_unknown_and_loads_on_mount() {
        let api = MockApi::new();
        let (ctrl, _rx) = controller(&api);
        assert_eq!(ctrl.phase(), AgenticPhase::Unknown);

        ctrl.set_session("s1".into());
        assert_eq!(ctrl.phase(), AgenticPhase::Loading);

        let outcome = ctrl.fetch_status().await.unwrap();
        assert_eq!(outcome, FetchOutcome::Applied(AgenticStatus::disabled()));
        assert_eq!(ctrl.phase(), AgenticPhase::Disabled);
        assert_eq!(api.call_args(Op::Status), ["s1"]);
    }

    #[tokio::test]
    async fn operations_without_session_fail() {
        let api = MockApi::new();
        let (ctrl, _rx) = controller(&api);
        assert!(matches!(
            ctrl.fetch_status().await,
            Err(StatusError::NoSession)
        ));
        assert!(matches!(ctrl.enable().await, Err(StatusError::NoSession)));
        assert!(matches!(
            ctrl.reset_memory().await,
            Err(StatusError::NoSession)
        ));
        assert_eq!(api.calls(Op::Status) + api.calls(Op::Enable), 0);
    }

    #[tokio::test]
    async fn enable_then_refetch_reaches_initialized() {
        let api = MockApi::new();
        let (ctrl, mut rx) = controller(&api);
        ctrl.set_session("S1".into());
        api.push_status(Ok(AgenticStatus::disabled()));
        ctrl.fetch_status().await.unwrap();
        assert_eq!(ctrl.phase(), AgenticPhase::Disabled);

        api.push_enable(Ok(enabled(false, &[])));
        let outcome = ctrl.enable().await.unwrap();
        assert_eq!(outcome, EnableOutcome::Enabled(enabled(false, &[])));
        assert_eq!(
            ctrl.phase(),
            AgenticPhase::Enabled { initialized: false }
        );
        assert_eq!(rx.try_recv().unwrap().level, NoticeLevel::Success);

        api.push_status(Ok(enabled(true, &["list_files"])));
        ctrl.fetch_status().await.unwrap();
        let snap = ctrl.snapshot();
        assert_eq!(snap.phase, AgenticPhase::Enabled { initialized: true });
        assert_eq!(
            snap.status.unwrap().available_tools(),
            ["list_files".to_string()]
        );
    }

    #[tokio::test]
    async fn concurrent_enables_send_one_request() {
        let api = MockApi::new();
        let (ctrl, _rx) = controller(&api);
        ctrl.set_session("s1".into());
        ctrl.fetch_status().await.unwrap();

        api.hold(Op::Enable);
        let first = tokio::spawn({
            let ctrl = ctrl.clone();
            async move { ctrl.enable().await }
        });
        settle(|| api.calls(Op::Enable) == 1).await;
        assert_eq!(ctrl.phase(), AgenticPhase::Initializing);

        for _ in 0..3 {
            assert_eq!(ctrl.enable().await.unwrap(), EnableOutcome::InFlight);
        }

        api.release(Op::Enable);
        let outcome = first.await.unwrap().unwrap();
        assert!(matches!(outcome, EnableOutcome::Enabled(_)));
        assert_eq!(api.calls(Op::Enable), 1);
    }

    #[tokio::test]
    async fn enable_failure_reverts_and_is_retryable() {
        let api = MockApi::new();
        let (ctrl, mut rx) = controller(&api);
        ctrl.set_session("s1".into());
        ctrl.fetch_status().await.unwrap();

        api.push_enable(Err(server_error("/enable-agentic")));
        assert!(matches!(ctrl.enable().await, Err(StatusError::Api(_))));
        assert_eq!(ctrl.phase(), AgenticPhase::Disabled);
        assert_eq!(ctrl.snapshot().status, Some(AgenticStatus::disabled()));

        let notice = rx.try_recv().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.message.contains("Failed to enable"));

        api.push_enable(Ok(enabled(true, &["list_files"])));
        assert!(matches!(
            ctrl.enable().await.unwrap(),
            EnableOutcome::Enabled(_)
        ));
        assert_eq!(ctrl.phase(), AgenticPhase::Enabled { initialized: true });
        assert_eq!(api.calls(Op::Enable), 2);
    }

    #[tokio::test]
    async fn enable_is_skipped_when_already_enabled() {
        let api = MockApi::new();
        let (ctrl, _rx) = controller(&api);
        ctrl.set_session("s1".into());
        api.push_status(Ok(enabled(true, &["list_files"])));
        ctrl.fetch_status().await.unwrap();

        assert_eq!(
            ctrl.enable().await.unwrap(),
            EnableOutcome::AlreadyEnabled
        );
        assert_eq!(api.calls(Op::Enable), 0);
    }

    #[tokio::test]
    async fn failed_refetch_keeps_known_state_silently() {
        let api = MockApi::new();
        let (ctrl, mut rx) = controller(&api);
        ctrl.set_session("s1".into());
        api.push_status(Ok(enabled(true, &["list_files"])));
        ctrl.fetch_status().await.unwrap();

        api.push_status(Err(server_error("/agentic-status")));
        assert!(ctrl.fetch_status().await.is_err());
        let snap = ctrl.snapshot();
        assert_eq!(snap.phase, AgenticPhase::Enabled { initialized: true });
        assert_eq!(snap.status, Some(enabled(true, &["list_files"])));
        assert!(rx.try_recv().is_err(), "status failures raise no notice");
    }

    #[tokio::test]
    async fn failed_first_fetch_falls_back_to_unknown() {
        let api = MockApi::new();
        let (ctrl, _rx) = controller(&api);
        ctrl.set_session("s1".into());
        api.push_status(Err(server_error("/agentic-status")));
        assert!(ctrl.fetch_status().await.is_err());
        assert_eq!(ctrl.phase(), AgenticPhase::Unknown);
        assert_eq!(ctrl.snapshot().status, None);
    }

    #[tokio::test]
    async fn late_status_for_previous_session_is_discarded() {
        let api = MockApi::new();
        let (ctrl, _rx) = controller(&api);
        ctrl.set_session("s1".into());

        api.hold(Op::Status);
        api.push_status(Ok(enabled(true, &["list_files"])));
        let pending = tokio::spawn({
            let ctrl = ctrl.clone();
            async move { ctrl.fetch_status().await }
        });
        settle(|| api.calls(Op::Status) == 1).await;

        ctrl.set_session("s2".into());
        api.release(Op::Status);
        assert_eq!(pending.await.unwrap().unwrap(), FetchOutcome::Stale);

        let snap = ctrl.snapshot();
        assert_eq!(snap.session, Some(SessionId::from("s2")));
        assert_eq!(snap.phase, AgenticPhase::Loading);
        assert_eq!(snap.status, None);
    }

    #[tokio::test]
    async fn late_enable_does_not_leak_into_new_session() {
        let api = MockApi::new();
        let (ctrl, mut rx) = controller(&api);
        ctrl.set_session("s1".into());

        api.hold(Op::Enable);
        let pending = tokio::spawn({
            let ctrl = ctrl.clone();
            async move { ctrl.enable().await }
        });
        settle(|| api.calls(Op::Enable) == 1).await;

        ctrl.set_session("s2".into());
        api.release(Op::Enable);
        assert_eq!(pending.await.unwrap().unwrap(), EnableOutcome::Stale);
        assert_eq!(ctrl.phase(), AgenticPhase::Loading);
        assert!(rx.try_recv().is_err());

        // The new session has its own, free in-flight guard.
        api.release(Op::Enable);
        assert!(matches!(
            ctrl.enable().await.unwrap(),
            EnableOutcome::Enabled(_)
        ));
        assert_eq!(api.call_args(Op::Enable), ["s1", "s2"]);
    }

    #[tokio::test]
    async fn late_reset_keeps_new_sessions_guard() {
        let api = MockApi::new();
        let (ctrl, mut rx) = controller(&api);
        ctrl.set_session("s1".into());

        api.hold(Op::Reset);
        let old = tokio::spawn({
            let ctrl = ctrl.clone();
            async move { ctrl.reset_memory().await }
        });
        settle(|| api.calls(Op::Reset) == 1).await;

        ctrl.set_session("s2".into());
        let current = tokio::spawn({
            let ctrl = ctrl.clone();
            async move { ctrl.reset_memory().await }
        });
        settle(|| api.calls(Op::Reset) == 2).await;

        api.release(Op::Reset);
        assert_eq!(old.await.unwrap().unwrap(), ResetOutcome::Stale);
        assert!(ctrl.snapshot().resetting, "s2's reset is still pending");
        assert_eq!(ctrl.reset_memory().await.unwrap(), ResetOutcome::InFlight);
        assert!(rx.try_recv().is_err());

        api.release(Op::Reset);
        assert_eq!(current.await.unwrap().unwrap(), ResetOutcome::Reset);
        assert!(!ctrl.snapshot().resetting);
        assert_eq!(api.call_args(Op::Reset), ["s1", "s2"]);
        assert_eq!(rx.try_recv().unwrap().level, NoticeLevel::Success);
    }

    #[tokio::test]
    async fn failed_enable_during_failed_first_fetch_ends_unknown() {
        let api = MockApi::new();
        let (ctrl, mut rx) = controller(&api);
        ctrl.set_session("s1".into());

        api.hold(Op::Status);
        api.push_status(Err(server_error("/agentic-status")));
        let fetch = tokio::spawn({
            let ctrl = ctrl.clone();
            async move { ctrl.fetch_status().await }
        });
        settle(|| api.calls(Op::Status) == 1).await;

        api.hold(Op::Enable);
        api.push_enable(Err(server_error("/enable-agentic")));
        let enable = tokio::spawn({
            let ctrl = ctrl.clone();
            async move { ctrl.enable().await }
        });
        settle(|| api.calls(Op::Enable) == 1).await;

        api.release(Op::Status);
        assert!(fetch.await.unwrap().is_err());
        assert_eq!(ctrl.phase(), AgenticPhase::Initializing);

        api.release(Op::Enable);
        assert!(enable.await.unwrap().is_err());
        assert_eq!(ctrl.phase(), AgenticPhase::Unknown);
        assert_eq!(ctrl.snapshot().status, None);
        assert_eq!(rx.try_recv().unwrap().level, NoticeLevel::Error);

        api.release(Op::Enable);
        assert!(matches!(
            ctrl.enable().await.unwrap(),
            EnableOutcome::Enabled(_)
        ));
    }

    #[tokio::test]
    async fn status_read_before_enable_does_not_undo_it() {
        let api = MockApi::new();
        let (ctrl, _rx) = controller(&api);
        ctrl.set_session("s1".into());
        ctrl.fetch_status().await.unwrap();
        assert_eq!(ctrl.phase(), AgenticPhase::Disabled);

        api.hold(Op::Status);
        api.push_status(Ok(AgenticStatus::disabled()));
        let pending = tokio::spawn({
            let ctrl = ctrl.clone();
            async move { ctrl.fetch_status().await }
        });
        settle(|| api.calls(Op::Status) == 2).await;

        api.push_enable(Ok(enabled(false, &[])));
        assert!(matches!(
            ctrl.enable().await.unwrap(),
            EnableOutcome::Enabled(_)
        ));

        api.release(Op::Status);
        assert_eq!(pending.await.unwrap().unwrap(), FetchOutcome::Superseded);
        let snap = ctrl.snapshot();
        assert_eq!(snap.phase, AgenticPhase::Enabled { initialized: false });
        assert_eq!(snap.status, Some(enabled(false, &[])));

        assert_eq!(
            ctrl.enable().await.unwrap(),
            EnableOutcome::AlreadyEnabled
        );
        assert_eq!(api.calls(Op::Enable), 1);

        // Reads issued after the enable apply as usual.
        api.push_status(Ok(enabled(true, &["list_files"])));
        assert!(matches!(
            ctrl.fetch_status().await.unwrap(),
            FetchOutcome::Applied(_)
        ));
        assert_eq!(ctrl.phase(), AgenticPhase::Enabled { initialized: true });
    }

    #[tokio::test]
    async fn refetch_during_enable_keeps_initializing() {
        let api = MockApi::new();
        let (ctrl, _rx) = controller(&api);
        ctrl.set_session("s1".into());
        ctrl.fetch_status().await.unwrap();

        api.hold(Op::Enable);
        let pending = tokio::spawn({
            let ctrl = ctrl.clone();
            async move { ctrl.enable().await }
        });
        settle(|| api.calls(Op::Enable) == 1).await;

        ctrl.fetch_status().await.unwrap();
        assert_eq!(ctrl.phase(), AgenticPhase::Initializing);

        api.release(Op::Enable);
        pending.await.unwrap().unwrap();
        assert_eq!(
            ctrl.phase(),
            AgenticPhase::Enabled { initialized: false }
        );
    }

    #[tokio::test]
    async fn reset_memory_leaves_status_alone() {
        let api = MockApi::new();
        let (ctrl, mut rx) = controller(&api);
        ctrl.set_session("s1".into());
        api.push_status(Ok(enabled(true, &["list_files"])));
        ctrl.fetch_status().await.unwrap();
        let before = ctrl.snapshot();

        api.hold(Op::Reset);
        let pending = tokio::spawn({
            let ctrl = ctrl.clone();
            async move { ctrl.reset_memory().await }
        });
        settle(|| api.calls(Op::Reset) == 1).await;
        assert!(ctrl.snapshot().resetting);
        assert_eq!(ctrl.reset_memory().await.unwrap(), ResetOutcome::InFlight);

        api.release(Op::Reset);
        assert_eq!(pending.await.unwrap().unwrap(), ResetOutcome::Reset);
        assert_eq!(ctrl.snapshot(), before);
        assert_eq!(rx.try_recv().unwrap().level, NoticeLevel::Success);
        assert_eq!(api.calls(Op::Reset), 1);
    }

    #[tokio::test]
    async fn reset_memory_failure_is_a_notice() {
        let api = MockApi::new();
        let (ctrl, mut rx) = controller(&api);
        ctrl.set_session("s1".into());
        api.push_status(Ok(enabled(true, &[])));
        ctrl.fetch_status().await.unwrap();

        api.push_reset(Err(server_error("/reset-agentic-memory")));
        assert!(ctrl.reset_memory().await.is_err());
        assert!(!ctrl.snapshot().resetting);
        assert_eq!(
            ctrl.phase(),
            AgenticPhase::Enabled { initialized: false }
        );
        assert_eq!(rx.try_recv().unwrap().level, NoticeLevel::Error);
    }

    #[test]
    fn phase_follows_status() {
        assert_eq!(
            AgenticPhase::from_status(&AgenticStatus::disabled()),
            AgenticPhase::Disabled
        );
        assert_eq!(
            AgenticPhase::from_status(&enabled(true, &[])),
            AgenticPhase::Enabled { initialized: true }
        );
    }
}
