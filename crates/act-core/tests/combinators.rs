use act_core::{Act, ActStatus, BbKey, Blackboard, Condition, TickContext, WorldMut, WorldView, Wrap};

const COUNTER: BbKey<u32> = BbKey::new(7);

#[derive(Default)]
struct World {
    built: u32,
}

impl WorldView for World {
    type Agent = u64;
}

impl WorldMut for World {}

fn step<A: Act<World>>(act: &mut A, world: &mut World, bb: &mut Blackboard, ticks: u64) -> Vec<ActStatus> {
    (0..ticks)
        .map(|tick| act.tick(&TickContext::new(tick, 0.1), 1, world, bb))
        .collect()
}

#[test]
fn wrap_runs_closure_until_terminal_and_latches() {
    let mut act = Wrap::new(
        "count_to_three",
        |_ctx: &TickContext, _agent: u64, world: &mut World, bb: &mut Blackboard| {
            let n = bb.get_or_insert_with(COUNTER, || 0);
            *n += 1;
            world.built += 1;
            if *n >= 3 {
                ActStatus::Success
            } else {
                ActStatus::Running
            }
        },
    );
    let mut world = World::default();
    let mut bb = Blackboard::new();

    let statuses = step(&mut act, &mut world, &mut bb, 5);

    assert_eq!(
        statuses,
        vec![
            ActStatus::Running,
            ActStatus::Running,
            ActStatus::Success,
            ActStatus::Success,
            ActStatus::Success,
        ]
    );
    // The side effect ran exactly once per non-terminal step plus the terminal one.
    assert_eq!(world.built, 3);
    assert_eq!(bb.get(COUNTER).copied(), Some(3));
}

#[test]
fn condition_answers_in_a_single_step() {
    let mut holds = Condition::new(
        "built_something",
        |_ctx: &TickContext, _agent: u64, world: &World, _bb: &Blackboard| world.built > 0,
    );
    let mut world = World::default();
    let mut bb = Blackboard::new();

    assert_eq!(step(&mut holds, &mut world, &mut bb, 1), vec![ActStatus::Failure]);
    world.built = 1;
    assert_eq!(step(&mut holds, &mut world, &mut bb, 1), vec![ActStatus::Success]);
}
