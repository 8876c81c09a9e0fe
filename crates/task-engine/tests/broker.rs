use act_core::{Act, ActStatus, Blackboard, TickContext, WorldMut, WorldView, Wrap};
use task_engine::{
    BindingState, BrokerError, CancelOutcome, DeleteReason, ScriptError, Task, TaskBroker,
    TaskPriority, INFEASIBLE_COST,
};

#[derive(Default)]
struct Board {
    blocked: Vec<&'static str>,
}

impl WorldView for Board {
    type Agent = u64;
}

impl WorldMut for Board {}

#[derive(Clone)]
struct Flat {
    name: &'static str,
    priority: TaskPriority,
    cost: f32,
    crew: usize,
}

impl Flat {
    fn new(name: &'static str, priority: TaskPriority, cost: f32) -> Self {
        Self {
            name,
            priority,
            cost,
            crew: 1,
        }
    }
}

impl Task<Board> for Flat {
    fn name(&self) -> &str {
        self.name
    }

    fn priority(&self) -> TaskPriority {
        self.priority
    }

    fn max_assignees(&self) -> usize {
        self.crew
    }

    fn is_feasible(&self, _agent: u64, world: &Board) -> bool {
        !world.blocked.contains(&self.name)
    }

    fn compute_cost(&self, agent: u64, world: &Board, already_checked_feasible: bool) -> f32 {
        if !already_checked_feasible && !self.is_feasible(agent, world) {
            return INFEASIBLE_COST;
        }
        self.cost
    }

    fn create_script(
        &self,
        _ctx: &TickContext,
        _agent: u64,
        _world: &Board,
    ) -> Result<Box<dyn Act<Board>>, ScriptError> {
        Ok(Box::new(Wrap::new(
            "chore",
            |_ctx: &TickContext, _agent: u64, _world: &mut Board, _bb: &mut Blackboard| {
                ActStatus::Success
            },
        )))
    }

    fn should_retry(&self, _agent: u64, _world: &Board) -> bool {
        false
    }

    fn should_delete(&self, _agent: u64, _world: &Board) -> Option<DeleteReason> {
        None
    }

    fn clone_task(&self) -> Box<dyn Task<Board>> {
        Box::new(self.clone())
    }
}

#[test]
fn assign_best_prefers_cheapest_within_a_tier() {
    let mut broker: TaskBroker<Board> = TaskBroker::new();
    let expensive = broker.enqueue(Box::new(Flat::new("far", TaskPriority::Medium, 50.0)));
    let cheap = broker.enqueue(Box::new(Flat::new("near", TaskPriority::Medium, 10.0)));
    let world = Board::default();

    let assignment = broker
        .assign_best(1, &world, TaskPriority::Eventually)
        .expect("a feasible task");

    assert_eq!(assignment.task, cheap);
    assert_eq!(assignment.cost, 10.0);
    assert!(!broker.is_pooled(cheap));
    assert!(broker.is_pooled(expensive));
    assert_eq!(broker.assignees(cheap), &[1]);
}

#[test]
fn higher_tier_beats_lower_cost() {
    let mut broker: TaskBroker<Board> = TaskBroker::new();
    broker.enqueue(Box::new(Flat::new("chore", TaskPriority::Low, 1.0)));
    let urgent = broker.enqueue(Box::new(Flat::new("fight", TaskPriority::Urgent, 900.0)));

    let assignment = broker.assign_best(1, &Board::default(), TaskPriority::Eventually);

    assert_eq!(assignment.map(|a| a.task), Some(urgent));
}

#[test]
fn equal_cost_goes_to_oldest_task() {
    let mut broker: TaskBroker<Board> = TaskBroker::new();
    let first = broker.enqueue(Box::new(Flat::new("a", TaskPriority::Medium, 5.0)));
    broker.enqueue(Box::new(Flat::new("b", TaskPriority::Medium, 5.0)));

    let assignment = broker.assign_best(1, &Board::default(), TaskPriority::Eventually);

    assert_eq!(assignment.map(|a| a.task), Some(first));
}

#[test]
fn infeasible_and_below_floor_tasks_are_skipped() {
    let mut broker: TaskBroker<Board> = TaskBroker::new();
    broker.enqueue(Box::new(Flat::new("blocked", TaskPriority::Urgent, 1.0)));
    broker.enqueue(Box::new(Flat::new("trivial", TaskPriority::Low, 1.0)));
    let world = Board {
        blocked: vec!["blocked"],
    };

    assert_eq!(broker.assign_best(1, &world, TaskPriority::Medium), None);
    assert_eq!(broker.len(), 2);
}

#[test]
fn a_single_agent_task_is_never_handed_out_twice() {
    let mut broker: TaskBroker<Board> = TaskBroker::new();
    let id = broker.enqueue(Box::new(Flat::new("solo", TaskPriority::Medium, 1.0)));
    let world = Board::default();

    assert_eq!(
        broker.assign_best(1, &world, TaskPriority::Eventually).map(|a| a.task),
        Some(id)
    );
    assert_eq!(broker.assign_best(2, &world, TaskPriority::Eventually), None);
}

#[test]
fn crew_tasks_accept_several_agents_up_to_capacity() {
    let mut broker: TaskBroker<Board> = TaskBroker::new();
    let mut crew = Flat::new("build", TaskPriority::Medium, 1.0);
    crew.crew = 2;
    let id = broker.enqueue(Box::new(crew));
    let world = Board::default();

    assert!(broker.assign_best(1, &world, TaskPriority::Eventually).is_some());
    // The same agent does not join twice.
    assert_eq!(broker.assign_best(1, &world, TaskPriority::Eventually), None);
    assert!(broker.assign_best(2, &world, TaskPriority::Eventually).is_some());
    assert_eq!(broker.assign_best(3, &world, TaskPriority::Eventually), None);
    assert_eq!(broker.assignees(id), &[1, 2]);

    broker.release(id, 1).unwrap();
    assert!(broker.is_pooled(id));
    assert_eq!(
        broker.assign_best(3, &world, TaskPriority::Eventually).map(|a| a.task),
        Some(id)
    );
}

#[test]
fn cancelling_a_pooled_task_removes_it() {
    let mut broker: TaskBroker<Board> = TaskBroker::new();
    let id = broker.enqueue(Box::new(Flat::new("x", TaskPriority::Medium, 1.0)));

    assert_eq!(broker.cancel(id), Ok(CancelOutcome::Removed));
    assert!(!broker.contains(id));
    assert_eq!(broker.cancel(id), Err(BrokerError::UnknownTask(id)));
}

#[test]
fn cancelling_an_assigned_task_flags_it_until_released() {
    let mut broker: TaskBroker<Board> = TaskBroker::new();
    let id = broker.enqueue(Box::new(Flat::new("x", TaskPriority::Medium, 1.0)));
    broker.assign_best(7, &Board::default(), TaskPriority::Eventually);

    assert_eq!(broker.cancel(id), Ok(CancelOutcome::Flagged));
    assert_eq!(broker.binding_state(id, 7), BindingState::Cancelled);
    assert!(!broker.is_pooled(id));

    broker.release(id, 7).unwrap();
    assert!(!broker.contains(id));
    assert_eq!(broker.binding_state(id, 7), BindingState::Missing);
}

#[test]
fn complete_requires_the_holding_agent() {
    let mut broker: TaskBroker<Board> = TaskBroker::new();
    let id = broker.enqueue(Box::new(Flat::new("x", TaskPriority::Medium, 1.0)));
    broker.assign_best(1, &Board::default(), TaskPriority::Eventually);

    assert!(matches!(
        broker.complete(id, 2),
        Err(BrokerError::NotAssigned { agent: 2, .. })
    ));
    let task = broker.complete(id, 1).unwrap();
    assert_eq!(task.name(), "x");
    assert!(broker.is_empty());
}

#[test]
fn infeasible_cost_is_the_sentinel() {
    let task = Flat::new("blocked", TaskPriority::Medium, 3.0);
    let world = Board {
        blocked: vec!["blocked"],
    };

    assert!(!task.is_feasible(1, &world));
    assert_eq!(task.compute_cost(1, &world, false), INFEASIBLE_COST);
    assert_eq!(task.compute_cost(1, &Board::default(), false), 3.0);
}

#[test]
fn failed_releases_are_counted_per_task() {
    let mut broker: TaskBroker<Board> = TaskBroker::new();
    let mut crew = Flat::new("build", TaskPriority::Medium, 1.0);
    crew.crew = 2;
    let id = broker.enqueue(Box::new(crew));
    let world = Board::default();

    broker.assign_best(1, &world, TaskPriority::Eventually);
    assert_eq!(broker.release_failed(id, 1), Ok(1));
    broker.assign_best(2, &world, TaskPriority::Eventually);
    assert_eq!(broker.release_failed(id, 2), Ok(2));
    assert!(broker.is_pooled(id));

    // A plain release hands the task back without counting a failure.
    broker.assign_best(1, &world, TaskPriority::Eventually);
    broker.release(id, 1).unwrap();
    assert_eq!(broker.failures(id), 2);
    assert!(matches!(
        broker.release_failed(id, 3),
        Err(BrokerError::NotAssigned { agent: 3, .. })
    ));
}
