use warden_core::episode::plan_route;
use warden_core::{
    AgentState, Command, Enemy, EnemyKind, FailureReason, Loadout, Outcome, Pos, Scenario,
    SessionConfig, SimWorld, Step, Strategy, run_episode,
};

fn open(size: usize, guide: Pos, destination: Pos) -> Scenario {
    Scenario {
        size,
        variant: 1,
        guide,
        destination,
        armor: None,
        enemies: Vec::new(),
        hazards: Vec::new(),
    }
}

fn play(scenario: Scenario, strategy: Strategy) -> (Outcome, SimWorld) {
    let config = SessionConfig { grid_size: scenario.size, strategy, ..SessionConfig::default() };
    let mut world = SimWorld::new(scenario);
    let outcome = run_episode(&mut world, &config).expect("simulated world never fails");
    (outcome, world)
}

fn end_commands(world: &SimWorld) -> usize {
    world.commands().iter().filter(|c| matches!(c, Command::End(_))).count()
}

#[test]
fn trivial_reachable_goal_ends_after_one_move() {
    for strategy in [Strategy::Forward, Strategy::BranchAndBound] {
        let (outcome, world) = play(open(5, Pos::ORIGIN, Pos::new(0, 1)), strategy);
        assert_eq!(outcome, Outcome::Arrived { moves: 1 }, "{strategy:?}");
        assert_eq!(world.ended(), Some(Some(1)), "{strategy:?}");
        assert_eq!(end_commands(&world), 1);
    }
}

#[test]
fn blocked_start_reports_no_solution_without_moving() {
    for strategy in [Strategy::Forward, Strategy::BranchAndBound] {
        let scenario =
            Scenario { hazards: vec![Pos::ORIGIN], ..open(5, Pos::new(3, 3), Pos::new(4, 4)) };
        let (outcome, world) = play(scenario, strategy);
        assert_eq!(outcome, Outcome::Failed(FailureReason::Killed), "{strategy:?}");
        assert_eq!(world.commands(), &[Command::End(None)]);
        assert_eq!(world.moves(), 0);
    }
}

#[test]
fn capability_required_route_switches_cloak_on_before_the_gate() {
    // The only way from the start to the destination at (2,1) is the gate cell (1,1),
    // which sits next to a scout.
    let scenario = Scenario {
        enemies: vec![Enemy { pos: Pos::new(1, 2), kind: EnemyKind::Scout }],
        hazards: vec![Pos::new(1, 0)],
        ..open(3, Pos::ORIGIN, Pos::new(2, 1))
    };
    let knowledge = scenario.full_knowledge();
    let plan = plan_route(&knowledge, AgentState::start(), scenario.destination).expect("route");

    let cloak_on = plan.steps.iter().position(|s| *s == Step::CloakOn).expect("cloak on");
    let gate = plan.steps.iter().position(|s| *s == Step::Move(Pos::new(1, 1))).expect("gate");
    assert!(cloak_on < gate, "{plan:?}");
    assert_eq!(plan.moves, 3);

    let bare_only = {
        let mut k = knowledge.clone();
        k.set_no_go(Pos::new(0, 1));
        k
    };
    assert!(plan_route(&bare_only, AgentState::start(), scenario.destination).is_none());
}

#[test]
fn unreachable_target_is_reported_by_both_strategies() {
    let destination = Pos::new(4, 4);
    let scenario = Scenario {
        hazards: vec![Pos::new(3, 4), Pos::new(4, 3), Pos::new(3, 3)],
        ..open(5, Pos::ORIGIN, destination)
    };

    let knowledge = scenario.full_knowledge();
    for loadout in Loadout::all() {
        let start = AgentState { pos: Pos::ORIGIN, loadout };
        assert!(plan_route(&knowledge, start, destination).is_none(), "{loadout:?}");
    }

    let (forward, world) = play(scenario.clone(), Strategy::Forward);
    assert!(matches!(
        forward,
        Outcome::Failed(FailureReason::NoNewInformation | FailureReason::NoSafeMove)
    ));
    assert_eq!(world.ended(), Some(None));
    assert!(!world.agent_was_exposed());

    let (bnb, world) = play(scenario, Strategy::BranchAndBound);
    assert_eq!(bnb, Outcome::Failed(FailureReason::Unreachable));
    assert_eq!(world.ended(), Some(None));
    assert_eq!(end_commands(&world), 1);
}

#[test]
fn guide_then_destination_walk_counts_every_move() {
    let scenario = Scenario {
        armor: Some(Pos::new(2, 0)),
        hazards: vec![Pos::new(1, 1), Pos::new(2, 1), Pos::new(3, 1)],
        ..open(6, Pos::new(4, 0), Pos::new(4, 4))
    };
    let (outcome, world) = play(scenario, Strategy::Forward);
    let Outcome::Arrived { moves } = outcome else {
        panic!("expected arrival, got {outcome:?}");
    };
    assert_eq!(moves, world.moves());
    assert_eq!(world.agent_pos(), Pos::new(4, 4));
    assert!(world.agent_armored(), "armor on the way to the guide is picked up");
    assert!(world.destination_revealed());
    assert_eq!(world.illegal_moves(), 0);
}

#[test]
fn branch_and_bound_reports_the_optimum_after_visiting_the_guide() {
    let scenario = Scenario {
        hazards: vec![Pos::new(1, 1), Pos::new(1, 2), Pos::new(3, 3)],
        ..open(5, Pos::new(2, 0), Pos::new(2, 4))
    };
    let optimum = plan_route(&scenario.full_knowledge(), AgentState::start(), scenario.destination)
        .expect("reachable")
        .moves;
    let (outcome, world) = play(scenario, Strategy::BranchAndBound);
    assert_eq!(outcome, Outcome::Arrived { moves: optimum });
    assert_eq!(optimum, 6);
    assert!(world.destination_revealed());
    assert!(!world.agent_was_exposed());
}

#[test]
fn action_budget_ends_the_episode_with_no_solution() {
    let config = SessionConfig { grid_size: 8, max_actions: 3, ..SessionConfig::default() };
    let mut world = SimWorld::new(open(8, Pos::ORIGIN, Pos::new(7, 7)));
    let outcome = run_episode(&mut world, &config).expect("run");
    assert_eq!(outcome, Outcome::Failed(FailureReason::ActionBudgetExhausted));
    assert_eq!(world.moves(), 3);
    assert_eq!(world.commands().last(), Some(&Command::End(None)));
}

#[test]
fn hunter_in_range_of_the_start_is_fatal_immediately() {
    let scenario = Scenario {
        enemies: vec![Enemy { pos: Pos::new(1, 1), kind: EnemyKind::Hunter }],
        ..open(5, Pos::new(4, 4), Pos::new(4, 0))
    };
    let (outcome, world) = play(scenario, Strategy::Forward);
    assert_eq!(outcome, Outcome::Failed(FailureReason::Killed));
    assert_eq!(world.commands(), &[Command::End(None)]);
}
