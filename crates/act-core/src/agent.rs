use core::fmt::Debug;
use core::hash::Hash;

/// Stable identifier for an agent.
///
/// Schedulers step agents in `Ord` order and key logs/events by `stable_id`, so both must be
/// stable across runs.
pub trait AgentId: Copy + Ord + Eq + Hash + Debug + 'static {
    fn stable_id(self) -> u64;
}

impl AgentId for u64 {
    fn stable_id(self) -> u64 {
        self
    }
}

impl AgentId for u32 {
    fn stable_id(self) -> u64 {
        self as u64
    }
}
