//! Staging buffer for tasks spawned by running acts.
//!
//! Acts only see the world and their agent's blackboard, never the broker. A running act that
//! wants to queue follow-up work (a repeating craft order, for instance) stages it here; the
//! execution loop drains the buffer into the broker right after the step.

use act_core::{BbKey, Blackboard, WorldMut};

use crate::Task;

const OUTBOX_ID: u64 = 0x7A5C_0B0C_0000_0001;

struct TaskOutbox<W>
where
    W: WorldMut + 'static,
{
    tasks: Vec<Box<dyn Task<W>>>,
}

fn outbox_key<W>() -> BbKey<TaskOutbox<W>>
where
    W: WorldMut + 'static,
{
    BbKey::new(OUTBOX_ID)
}

pub fn spawn_task<W>(blackboard: &mut Blackboard, task: Box<dyn Task<W>>)
where
    W: WorldMut + 'static,
{
    blackboard
        .get_or_insert_with(outbox_key::<W>(), || TaskOutbox { tasks: Vec::new() })
        .tasks
        .push(task);
}

pub fn drain_spawned<W>(blackboard: &mut Blackboard) -> Vec<Box<dyn Task<W>>>
where
    W: WorldMut + 'static,
{
    blackboard
        .remove(outbox_key::<W>())
        .map(|outbox| outbox.tasks)
        .unwrap_or_default()
}
