//! Identity newtypes and the injected monotonic id source.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Identifies one playground instance. Zero is a valid instance id.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct InstanceId(pub u64);

/// Identifies one chat message. Ids start at 1; id 0 is reserved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

/// Identifies one tool attached to an instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolId(pub u64);

/// Identifies one execution of an instance against a backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub u64);

const INSTANCE_START: u64 = 0;
const MESSAGE_START: u64 = 1;
const TOOL_START: u64 = 1;
const RUN_START: u64 = 1;

#[derive(Debug)]
struct Counters {
    instance: AtomicU64,
    message: AtomicU64,
    tool: AtomicU64,
    run: AtomicU64,
}

impl Counters {
    fn new() -> Self {
        Self {
            instance: AtomicU64::new(INSTANCE_START),
            message: AtomicU64::new(MESSAGE_START),
            tool: AtomicU64::new(TOOL_START),
            run: AtomicU64::new(RUN_START),
        }
    }
}

/// Monotonic id source shared by the store and its callers.
///
/// Four independent counters with process-lifetime scope. Ids are never reused
/// or decremented; `reset` exists for test isolation only. Cloning shares the
/// underlying counters.
#[derive(Clone, Debug)]
pub struct IdSource {
    counters: Arc<Counters>,
}

impl IdSource {
    pub fn new() -> Self {
        Self {
            counters: Arc::new(Counters::new()),
        }
    }

    pub fn next_instance_id(&self) -> InstanceId {
        InstanceId(self.counters.instance.fetch_add(1, Ordering::SeqCst))
    }

    pub fn next_message_id(&self) -> MessageId {
        MessageId(self.counters.message.fetch_add(1, Ordering::SeqCst))
    }

    pub fn next_tool_id(&self) -> ToolId {
        ToolId(self.counters.tool.fetch_add(1, Ordering::SeqCst))
    }

    pub fn next_run_id(&self) -> RunId {
        RunId(self.counters.run.fetch_add(1, Ordering::SeqCst))
    }

    /// Rewind all counters to their starting values.
    pub fn reset(&self) {
        self.counters.instance.store(INSTANCE_START, Ordering::SeqCst);
        self.counters.message.store(MESSAGE_START, Ordering::SeqCst);
        self.counters.tool.store(TOOL_START, Ordering::SeqCst);
        self.counters.run.store(RUN_START, Ordering::SeqCst);
    }
}

impl Default for IdSource {
    fn default() -> Self {
        Self::new()
    }
}
