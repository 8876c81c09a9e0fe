use act_core::{Act, ActStatus, Blackboard, Sequence, TickContext, WorldMut, WorldView};

#[derive(Default)]
struct LogWorld {
    log: Vec<(u64, &'static str)>,
    canceled: Vec<&'static str>,
}

impl WorldView for LogWorld {
    type Agent = u64;
}

impl WorldMut for LogWorld {}

/// Runs for `running` ticks, then answers `end`.
struct Scripted {
    name: &'static str,
    running: u32,
    end: ActStatus,
}

impl Scripted {
    fn new(name: &'static str, running: u32, end: ActStatus) -> Self {
        Self { name, running, end }
    }
}

impl Act<LogWorld> for Scripted {
    fn tick(
        &mut self,
        ctx: &TickContext,
        _agent: u64,
        world: &mut LogWorld,
        _blackboard: &mut Blackboard,
    ) -> ActStatus {
        world.log.push((ctx.tick, self.name));
        if self.running == 0 {
            return self.end;
        }
        self.running -= 1;
        ActStatus::Running
    }

    fn cancel(
        &mut self,
        _ctx: &TickContext,
        _agent: u64,
        world: &mut LogWorld,
        _blackboard: &mut Blackboard,
    ) {
        world.canceled.push(self.name);
    }
}

fn run(seq: &mut Sequence<LogWorld>, world: &mut LogWorld, ticks: u64) -> Vec<ActStatus> {
    let mut bb = Blackboard::new();
    (0..ticks)
        .map(|tick| seq.tick(&TickContext::new(tick, 0.1), 1, world, &mut bb))
        .collect()
}

#[test]
fn sequence_advances_one_child_per_tick() {
    let mut seq = Sequence::new(vec![
        Box::new(Scripted::new("a", 0, ActStatus::Success)) as Box<dyn Act<LogWorld>>,
        Box::new(Scripted::new("b", 0, ActStatus::Success)),
    ]);
    let mut world = LogWorld::default();

    let statuses = run(&mut seq, &mut world, 2);

    assert_eq!(statuses, vec![ActStatus::Running, ActStatus::Success]);
    // "a" and "b" never advance within the same tick.
    assert_eq!(world.log, vec![(0, "a"), (1, "b")]);
}

#[test]
fn sequence_succeeds_only_after_every_child_in_order() {
    let mut seq = Sequence::new(vec![
        Box::new(Scripted::new("a", 2, ActStatus::Success)) as Box<dyn Act<LogWorld>>,
        Box::new(Scripted::new("b", 1, ActStatus::Success)),
    ]);
    let mut world = LogWorld::default();

    let statuses = run(&mut seq, &mut world, 5);

    assert_eq!(
        statuses,
        vec![
            ActStatus::Running,
            ActStatus::Running,
            ActStatus::Running,
            ActStatus::Running,
            ActStatus::Success,
        ]
    );
    assert_eq!(
        world.log,
        vec![(0, "a"), (1, "a"), (2, "a"), (3, "b"), (4, "b")]
    );
}

#[test]
fn sequence_fails_immediately_and_stays_failed() {
    let mut seq = Sequence::new(vec![
        Box::new(Scripted::new("a", 0, ActStatus::Success)) as Box<dyn Act<LogWorld>>,
        Box::new(Scripted::new("b", 1, ActStatus::Failure)),
        Box::new(Scripted::new("c", 0, ActStatus::Success)),
    ]);
    let mut world = LogWorld::default();

    let statuses = run(&mut seq, &mut world, 5);

    assert_eq!(
        statuses,
        vec![
            ActStatus::Running,
            ActStatus::Running,
            ActStatus::Failure,
            ActStatus::Failure,
            ActStatus::Failure,
        ]
    );
    assert_eq!(world.log, vec![(0, "a"), (1, "b"), (2, "b")]);
    assert!(!world.log.iter().any(|(_, name)| *name == "c"));
}

#[test]
fn empty_sequence_succeeds() {
    let mut seq: Sequence<LogWorld> = Sequence::new(Vec::new());
    let mut world = LogWorld::default();

    assert_eq!(run(&mut seq, &mut world, 1), vec![ActStatus::Success]);
}

#[test]
fn cancel_reaches_only_the_running_child() {
    let mut seq = Sequence::new(vec![
        Box::new(Scripted::new("a", 0, ActStatus::Success)) as Box<dyn Act<LogWorld>>,
        Box::new(Scripted::new("b", 10, ActStatus::Success)),
        Box::new(Scripted::new("c", 0, ActStatus::Success)),
    ]);
    let mut world = LogWorld::default();
    let mut bb = Blackboard::new();

    let _ = run(&mut seq, &mut world, 3);
    assert_eq!(seq.current_index(), 1);

    seq.cancel(&TickContext::new(3, 0.1), 1, &mut world, &mut bb);
    assert_eq!(world.canceled, vec!["b"]);
}
