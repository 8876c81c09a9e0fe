use crate::AgentId;

/// Read-only world access.
///
/// The core crate does not prescribe which queries a world exposes; domain crates define
/// extension traits (positions, designations, stockpiles) on top of this one.
pub trait WorldView {
    type Agent: AgentId;
}

/// Write access / effect sink.
pub trait WorldMut: WorldView {}
