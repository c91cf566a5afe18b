//! End-to-end simulation runs: timing, scoring and invariants

use traffic_schedule::generator::{generate, GeneratorConfig};
use traffic_schedule::problem::Problem;
use traffic_schedule::simulation::{
    CarId, CarRecord, InverseDuration, NodeId, Parameters, PopularityWeighted, ScheduleStrategy, SimId,
    SimWorld, StreetRecord, Uniform,
};
use traffic_schedule::submission::Submission;

fn street(start: usize, end: usize, name: &str, length: u32) -> StreetRecord {
    StreetRecord {
        start: NodeId(start),
        end: NodeId(end),
        name: name.to_string(),
        length,
    }
}

fn car(route: &[&str]) -> CarRecord {
    CarRecord {
        route: route.iter().map(|s| s.to_string()).collect(),
    }
}

fn problem(duration: u32, bonus: u64, streets: Vec<StreetRecord>, cars: Vec<CarRecord>) -> Problem {
    Problem {
        parameters: Parameters {
            duration,
            intersection_count: 0,
            street_count: streets.len(),
            car_count: cars.len(),
            bonus,
        },
        streets,
        cars,
    }
}

fn run(problem: &Problem, strategy: &dyn ScheduleStrategy) -> SimWorld {
    let mut world = SimWorld::from_problem(problem).expect("world should build");
    world.assign_schedules(strategy).expect("schedule should build");
    world.run().expect("run should succeed");
    world
}

const EXAMPLE: &str = "\
6 4 5 2 1000
2 0 rue-de-londres 1
0 1 rue-d-amsterdam 1
3 1 rue-d-athenes 1
2 3 rue-de-rome 2
1 2 rue-de-moscou 3
4 rue-de-londres rue-d-amsterdam rue-de-moscou rue-de-rome
3 rue-d-athenes rue-de-moscou rue-de-londres
";

const EXAMPLE_SUBMISSION: &str = "\
3
1
2
rue-d-athenes 2
rue-d-amsterdam 1
0
1
rue-de-londres 2
2
1
rue-de-moscou 1
";

#[test]
fn test_single_street_car_finishes_on_first_tick() {
    let p = problem(5, 10, vec![street(0, 1, "ab", 3)], vec![car(&["ab"])]);
    let world = run(&p, &Uniform::default());

    assert_eq!(world.score(), 15);
    assert_eq!(world.duration(), 5);
    assert_eq!(world.bonus(), 10);
    let only = world.car(CarId(SimId(0))).unwrap();
    assert_eq!(only.finished_at(), Some(0));
    assert_eq!(only.current_street(), None);
}

#[test]
fn test_two_street_route_timing() {
    let p = problem(
        10,
        100,
        vec![street(0, 1, "a", 1), street(1, 2, "b", 2)],
        vec![car(&["a", "b"])],
    );
    let world = run(&p, &Uniform::default());

    // Crosses at tick 0, enters b at its local tick 1, arrives at 1 + 2
    assert_eq!(world.cars()[0].finished_at(), Some(3));
    assert_eq!(world.score(), 100 + 7);
}

#[test]
fn test_cars_past_deadline_score_nothing() {
    let p = problem(
        3,
        100,
        vec![street(0, 1, "a", 1), street(1, 2, "b", 2)],
        vec![car(&["a", "b"])],
    );
    let world = run(&p, &Uniform::default());

    assert_eq!(world.score(), 0);
    let stats = world.stats();
    assert_eq!(stats.cars_finished, 0);
    assert_eq!(stats.cars_in_transit, 1);
    assert_eq!(stats.success_rate(), 0.0);
}

#[test]
fn test_light_releases_one_car_per_tick() {
    let p = problem(
        10,
        100,
        vec![street(0, 1, "a", 1), street(1, 2, "b", 2)],
        vec![car(&["a", "b"]), car(&["a", "b"])],
    );
    let world = run(&p, &Uniform::default());

    assert_eq!(world.cars()[0].finished_at(), Some(3));
    assert_eq!(world.cars()[1].finished_at(), Some(4));
    assert_eq!(world.score(), 107 + 106);
}

#[test]
fn test_red_light_delays_second_approach() {
    let p = problem(
        10,
        100,
        vec![
            street(0, 1, "a", 1),
            street(3, 1, "c", 1),
            street(1, 2, "b", 2),
        ],
        vec![car(&["a", "b"]), car(&["c", "b"])],
    );
    let world = run(&p, &Uniform { duration: 2 });

    // a is green for ticks 0-1, c for ticks 2-3
    assert_eq!(world.cars()[0].finished_at(), Some(3));
    assert_eq!(world.cars()[1].finished_at(), Some(5));
    assert_eq!(world.score(), 107 + 105);
}

#[test]
fn test_example_submission_score() {
    let p = Problem::parse(EXAMPLE).unwrap();
    let submission = Submission::parse(EXAMPLE_SUBMISSION).unwrap();

    let mut world = SimWorld::from_problem(&p).unwrap();
    world.apply_submission(&submission).unwrap();
    assert_eq!(world.run().unwrap(), 0);

    let mut longer = p.clone();
    longer.parameters.duration = 8;
    let mut world = SimWorld::from_problem(&longer).unwrap();
    world.apply_submission(&submission).unwrap();
    assert_eq!(world.run().unwrap(), 1002);
    assert_eq!(world.cars()[1].finished_at(), Some(6));
    assert!(!world.cars()[0].is_finished());
}

#[test]
fn test_missing_schedule_keeps_cars_at_red_light() {
    let p = problem(
        10,
        100,
        vec![street(0, 1, "a", 1), street(1, 2, "b", 2)],
        vec![car(&["a", "b"]), car(&["b"])],
    );
    let mut world = SimWorld::from_problem(&p).unwrap();
    world.apply_submission(&Submission::default()).unwrap();
    world.run().unwrap();

    assert!(!world.cars()[0].is_finished());
    assert_eq!(world.cars()[1].finished_at(), Some(0));
    assert_eq!(world.stats().cars_waiting, 1);
}

#[test]
fn test_tick_past_duration_is_an_error() {
    let p = problem(2, 1, vec![street(0, 1, "a", 1)], vec![car(&["a"])]);
    let mut world = SimWorld::from_problem(&p).unwrap();
    world.assign_schedules(&Uniform::default()).unwrap();
    world.tick().unwrap();
    world.tick().unwrap();
    assert!(world.is_done());
    assert!(world.tick().is_err());
}

#[test]
fn test_zero_duration_scores_nothing() {
    let p = problem(0, 50, vec![street(0, 1, "a", 1)], vec![car(&["a"])]);
    let world = run(&p, &Uniform::default());
    assert_eq!(world.score(), 0);
    assert_eq!(world.time(), 0);
}

#[test]
fn test_unknown_street_in_route_is_rejected() {
    let p = problem(5, 1, vec![street(0, 1, "a", 1)], vec![car(&["a", "zz"])]);
    let err = SimWorld::from_problem(&p).err().expect("should fail");
    assert!(
        format!("{:#}", err).contains("unknown street 'zz'"),
        "unexpected error: {:#}",
        err
    );
}

#[test]
fn test_disconnected_route_is_rejected() {
    let p = problem(
        5,
        1,
        vec![street(0, 1, "a", 1), street(2, 3, "b", 1)],
        vec![car(&["a", "b"])],
    );
    assert!(SimWorld::from_problem(&p).is_err());
}

#[test]
fn test_duplicate_street_name_is_rejected() {
    let p = problem(
        5,
        1,
        vec![street(0, 1, "a", 1), street(1, 0, "a", 1)],
        vec![],
    );
    let err = SimWorld::from_problem(&p).err().expect("should fail");
    assert!(err.to_string().contains("Duplicate street name"), "unexpected error: {}", err);
}

#[test]
fn test_zero_length_street_is_rejected() {
    let p = problem(5, 1, vec![street(0, 1, "a", 0)], vec![]);
    assert!(SimWorld::from_problem(&p).is_err());
}

#[test]
fn test_submission_round_trip_reproduces_score() {
    let p = generate(&GeneratorConfig {
        seed: 7,
        ..GeneratorConfig::default()
    })
    .unwrap();
    let world = run(&p, &PopularityWeighted);

    let text = world.network().submission().to_string();
    let parsed = Submission::parse(&text).unwrap();
    assert_eq!(parsed, world.network().submission());

    let mut replay = SimWorld::from_problem(&p).unwrap();
    replay.apply_submission(&parsed).unwrap();
    assert_eq!(replay.run().unwrap(), world.score());
}

#[test]
fn test_generated_runs_hold_invariants() {
    let strategies: Vec<Box<dyn ScheduleStrategy>> = vec![
        Box::new(Uniform::default()),
        Box::new(Uniform { duration: 3 }),
        Box::new(InverseDuration),
        Box::new(PopularityWeighted),
    ];

    for seed in 0..8 {
        let p = generate(&GeneratorConfig {
            seed,
            cars: 40,
            ..GeneratorConfig::default()
        })
        .unwrap();
        let duration = u64::from(p.parameters.duration);
        let bonus = p.parameters.bonus;

        for strategy in &strategies {
            let mut world = SimWorld::from_problem(&p).unwrap();
            world.assign_schedules(strategy.as_ref()).unwrap();
            world.place_cars().unwrap();

            let mut remaining: Vec<usize> =
                world.cars().iter().map(|c| c.remaining_route().len()).collect();

            while !world.is_done() {
                world.tick().unwrap();

                for intersection in world.network().intersections() {
                    let green = intersection
                        .incoming()
                        .iter()
                        .filter(|id| world.network().street(**id).unwrap().is_green())
                        .count();
                    assert_eq!(green, 1, "intersection {:?} has {} green", intersection.node, green);
                }

                for (car, before) in world.cars().iter().zip(remaining.iter_mut()) {
                    let now = car.remaining_route().len();
                    assert!(now <= *before && *before - now <= 1, "route grew or skipped");
                    *before = now;
                }

                let stats = world.stats();
                assert_eq!(
                    stats.cars_finished + stats.cars_in_transit + stats.cars_waiting,
                    stats.total_cars,
                    "every car is finished, driving or waiting"
                );
            }

            let expected: u64 = world
                .cars()
                .iter()
                .filter_map(|c| c.finished_at())
                .map(|t| {
                    let term = bonus + duration - u64::from(t);
                    assert!(term > bonus && term <= bonus + duration);
                    term
                })
                .sum();
            assert_eq!(world.score(), expected, "seed {} strategy {}", seed, strategy.name());
        }
    }
}

#[test]
fn test_runs_are_deterministic() {
    let p = generate(&GeneratorConfig {
        seed: 3,
        ..GeneratorConfig::default()
    })
    .unwrap();
    let first = run(&p, &InverseDuration).score();
    let second = run(&p, &InverseDuration).score();
    assert_eq!(first, second);
}

#[test]
fn test_skipping_unused_streets_drops_their_phases() {
    let p = problem(
        10,
        100,
        vec![
            street(0, 1, "a", 1),
            street(3, 1, "c", 1),
            street(1, 2, "b", 2),
        ],
        vec![car(&["a", "b"])],
    );
    let world = run(&p.without_unused_streets(), &Uniform::default());

    let submission = world.network().submission();
    assert_eq!(submission.intersections.len(), 2);
    assert!(submission
        .intersections
        .iter()
        .all(|i| i.phases.iter().all(|(name, _)| name != "c")));
    assert_eq!(world.score(), 107);
}
