//! Scripted [`AssistantApi`] for component tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use super::{AgenticStatus, ApiError, AssistantApi, CachedAnalysisList, SessionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Op {
    Status,
    Enable,
    Reset,
    List,
    Delete,
}

/// Responses are queued per operation; an empty queue answers with a
/// default success. A held operation blocks until [`MockApi::release`].
#[derive(Default)]
pub(crate) struct MockApi {
    statuses: Mutex<VecDeque<Result<AgenticStatus, ApiError>>>,
    enables: Mutex<VecDeque<Result<AgenticStatus, ApiError>>>,
    resets: Mutex<VecDeque<Result<(), ApiError>>>,
    lists: Mutex<VecDeque<Result<CachedAnalysisList, ApiError>>>,
    deletes: Mutex<VecDeque<Result<(), ApiError>>>,
    gates: Mutex<HashMap<Op, Arc<Semaphore>>>,
    calls: Mutex<Vec<(Op, String)>>,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_status(&self, result: Result<AgenticStatus, ApiError>) {
        self.statuses.lock().unwrap().push_back(result);
    }

    pub fn push_enable(&self, result: Result<AgenticStatus, ApiError>) {
        self.enables.lock().unwrap().push_back(result);
    }

    pub fn push_reset(&self, result: Result<(), ApiError>) {
        self.resets.lock().unwrap().push_back(result);
    }

    pub fn push_list(&self, result: Result<CachedAnalysisList, ApiError>) {
        self.lists.lock().unwrap().push_back(result);
    }

    pub fn push_delete(&self, result: Result<(), ApiError>) {
        self.deletes.lock().unwrap().push_back(result);
    }

    /// Make every call of `op` wait for a released permit.
    pub fn hold(&self, op: Op) {
        self.gates
            .lock()
            .unwrap()
            .insert(op, Arc::new(Semaphore::new(0)));
    }

    /// Let one held call of `op` proceed.
    pub fn release(&self, op: Op) {
        if let Some(gate) = self.gates.lock().unwrap().get(&op) {
            gate.add_permits(1);
        }
    }

    pub fn calls(&self, op: Op) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(o, _)| *o == op)
            .count()
    }

    pub fn call_args(&self, op: Op) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(o, _)| *o == op)
            .map(|(_, arg)| arg.clone())
            .collect()
    }

    async fn enter(&self, op: Op, arg: String) {
        self.calls.lock().unwrap().push((op, arg));
        let gate = self.gates.lock().unwrap().get(&op).cloned();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }
    }
}

#[async_trait]
impl AssistantApi for MockApi {
    async fn agentic_status(&self, session: &SessionId) -> Result<AgenticStatus, ApiError> {
        self.enter(Op::Status, session.to_string()).await;
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(AgenticStatus::disabled()))
    }

    async fn enable_agentic(&self, session: &SessionId) -> Result<AgenticStatus, ApiError> {
        self.enter(Op::Enable, session.to_string()).await;
        self.enables
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(AgenticStatus::new(true, false, Vec::new())))
    }

    async fn reset_agentic_memory(&self, session: &SessionId) -> Result<(), ApiError> {
        self.enter(Op::Reset, session.to_string()).await;
        self.resets.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    async fn cached_analyses(&self, session: &SessionId) -> Result<CachedAnalysisList, ApiError> {
        self.enter(Op::List, session.to_string()).await;
        self.lists
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(CachedAnalysisList::default()))
    }

    async fn delete_cached_analysis(
        &self,
        _session: &SessionId,
        issue_url: &str,
    ) -> Result<(), ApiError> {
        self.enter(Op::Delete, issue_url.to_string()).await;
        self.deletes.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

pub(crate) fn server_error(path: &str) -> ApiError {
    ApiError::Status {
        path: path.to_string(),
        status: 500,
    }
}

/// Yield to spawned tasks until `cond` holds.
pub(crate) async fn settle(mut cond: impl FnMut() -> bool) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached after yielding");
}
