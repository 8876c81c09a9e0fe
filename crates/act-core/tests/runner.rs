use act_core::{Act, ActRunner, ActStatus, Blackboard, TickContext, WorldMut, WorldView};

#[derive(Default)]
struct CountingWorld {
    ticks_after_terminal: u32,
    canceled: u32,
}

impl WorldView for CountingWorld {
    type Agent = u64;
}

impl WorldMut for CountingWorld {}

/// Succeeds on its second step and records any step it receives after that.
#[derive(Default)]
struct TwoStep {
    steps: u32,
}

impl Act<CountingWorld> for TwoStep {
    fn tick(
        &mut self,
        _ctx: &TickContext,
        _agent: u64,
        world: &mut CountingWorld,
        _blackboard: &mut Blackboard,
    ) -> ActStatus {
        self.steps += 1;
        match self.steps {
            1 => ActStatus::Running,
            2 => ActStatus::Success,
            _ => {
                world.ticks_after_terminal += 1;
                ActStatus::Success
            }
        }
    }

    fn cancel(
        &mut self,
        _ctx: &TickContext,
        _agent: u64,
        world: &mut CountingWorld,
        _blackboard: &mut Blackboard,
    ) {
        world.canceled += 1;
    }
}

#[test]
fn runner_drops_act_on_terminal_status() {
    let mut runner: ActRunner<CountingWorld> = ActRunner::default();
    let mut world = CountingWorld::default();
    let mut bb = Blackboard::new();
    let ctx = TickContext::new(0, 0.1);

    runner.replace_current(Box::new(TwoStep::default()), &ctx, 1, &mut world, &mut bb);

    let mut statuses = Vec::new();
    for tick in 0..6u64 {
        statuses.push(runner.tick(&TickContext::new(tick, 0.1), 1, &mut world, &mut bb));
    }

    assert_eq!(
        statuses,
        vec![
            Some(ActStatus::Running),
            Some(ActStatus::Success),
            None,
            None,
            None,
            None,
        ]
    );
    assert_eq!(world.ticks_after_terminal, 0);
    assert!(!runner.is_running());
}

#[test]
fn replacing_a_running_act_cancels_it() {
    let mut runner: ActRunner<CountingWorld> = ActRunner::default();
    let mut world = CountingWorld::default();
    let mut bb = Blackboard::new();
    let ctx = TickContext::new(0, 0.1);

    runner.replace_current(Box::new(TwoStep::default()), &ctx, 1, &mut world, &mut bb);
    assert_eq!(
        runner.tick(&ctx, 1, &mut world, &mut bb),
        Some(ActStatus::Running)
    );

    runner.replace_current(Box::new(TwoStep::default()), &ctx, 1, &mut world, &mut bb);
    assert_eq!(world.canceled, 1);

    // The fresh act starts from its first step.
    assert_eq!(
        runner.tick(&ctx.next(), 1, &mut world, &mut bb),
        Some(ActStatus::Running)
    );
}

#[test]
fn finished_acts_are_not_canceled() {
    let mut runner: ActRunner<CountingWorld> = ActRunner::default();
    let mut world = CountingWorld::default();
    let mut bb = Blackboard::new();
    let ctx = TickContext::new(0, 0.1);

    runner.replace_current(Box::new(TwoStep::default()), &ctx, 1, &mut world, &mut bb);
    let _ = runner.tick(&ctx, 1, &mut world, &mut bb);
    let _ = runner.tick(&ctx.next(), 1, &mut world, &mut bb);

    runner.cancel_current(&ctx, 1, &mut world, &mut bb);
    assert_eq!(world.canceled, 0);
}
