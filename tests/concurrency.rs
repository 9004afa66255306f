use std::{
    fmt::Write as _,
    sync::atomic::{AtomicUsize, Ordering},
    thread,
    time::Duration,
};

use cucumber_engine::{
    event::{self, SuiteResult},
    step::Collection,
    writer::{Coloring, Progress, Writer},
    Cucumber, Feature, Outcome, Status,
};
use lazy_regex::regex;
use rand::Rng as _;

#[derive(Debug, Default)]
struct World {
    eaten: u32,
}

fn nap() {
    let ms = rand::thread_rng().gen_range(0..5);
    thread::sleep(Duration::from_millis(ms));
}

fn steps() -> Collection<World> {
    let mut steps = Collection::new();
    steps
        .step(r"^I eat (\d+)$", |w: &mut World, n: u32| {
            nap();
            w.eaten += n;
        })
        .unwrap()
        .step(r"^I have eaten (\d+)$", |w: &mut World, n: u32| {
            nap();
            if w.eaten == n {
                Ok(())
            } else {
                Err(format!("eaten {} instead of {n}", w.eaten))
            }
        })
        .unwrap()
        .step("^later$", |_: &mut World| Outcome::Pending)
        .unwrap();
    steps
}

fn features() -> Vec<Feature> {
    (0..4)
        .map(|f| {
            let mut source = format!("Feature: batch {f}\n");
            for i in 0..5 {
                let n = f * 5 + i;
                let check = if n % 7 == 0 { n + 1 } else { n };
                write!(
                    source,
                    "\n  Scenario: eating {n}\n    \
                       Given I eat {n}\n    \
                       Then I have eaten {check}\n",
                )
                .unwrap();
                match n % 5 {
                    3 => source.push_str("    And later\n"),
                    4 => source.push_str("    And something unknown\n"),
                    _ => {}
                }
            }
            Feature::parse(format!("batch{f}.feature"), source).unwrap()
        })
        .collect()
}

fn run(concurrency: usize) -> (SuiteResult, String) {
    let mut cucumber = Cucumber::new(steps())
        .max_concurrent_scenarios(concurrency)
        .with_writer(Progress::new(Vec::new()).with_coloring(Coloring::Never));
    let suite = cucumber.run(&features()).unwrap();
    let output =
        String::from_utf8(cucumber.into_writer().into_inner()).unwrap();
    (suite, output)
}

/// Drops the live symbols and the elapsed time, which depend on timing.
fn summary(output: &str) -> String {
    let (_, summary) = output.split_once("\n\n\n").unwrap();
    regex!(r"(?m)^\d+[a-zµ]+( \d+[a-zµ]+)*$")
        .replace_all(summary, "<elapsed>")
        .into_owned()
}

#[test]
fn results_do_not_depend_on_concurrency() {
    let (sequential, seq_output) = run(1);
    let (concurrent, con_output) = run(4);

    let statuses = |suite: &SuiteResult| {
        suite
            .scenarios
            .iter()
            .map(|sc| {
                let steps =
                    sc.steps.iter().map(|st| st.status).collect::<Vec<_>>();
                (sc.index, sc.pickle.name.clone(), steps)
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(statuses(&sequential), statuses(&concurrent));
    assert_eq!(sequential.scenario_stats, concurrent.scenario_stats);
    assert_eq!(sequential.step_stats, concurrent.step_stats);
    assert_eq!(sequential.undefined, concurrent.undefined);
    assert_eq!(summary(&seq_output), summary(&con_output));

    assert!(sequential.is_failed());
    assert_eq!(sequential.scenarios.len(), 20);
    assert_eq!(sequential.scenario_stats.failed, 3);
    assert!(
        seq_output.contains("Error: eaten 7 instead of 8"),
        "{seq_output}",
    );
}

#[test]
fn limits_concurrent_scenarios() {
    static ACTIVE: AtomicUsize = AtomicUsize::new(0);
    static PEAK: AtomicUsize = AtomicUsize::new(0);

    let mut steps = Collection::new();
    steps
        .step("^busy$", |_: &mut World| {
            let now = ACTIVE.fetch_add(1, Ordering::SeqCst) + 1;
            _ = PEAK.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(10));
            _ = ACTIVE.fetch_sub(1, Ordering::SeqCst);
        })
        .unwrap();
    let mut source = "Feature: busy\n".to_owned();
    for i in 0..12 {
        write!(source, "\n  Scenario: busy {i}\n    Given busy\n").unwrap();
    }
    let feature = Feature::parse("busy.feature", source).unwrap();

    let suite = Cucumber::new(steps)
        .max_concurrent_scenarios(3)
        .with_writer(cucumber_engine::writer::Discard)
        .run(&[feature])
        .unwrap();

    assert!(!suite.is_failed());
    assert_eq!(suite.step_stats.passed, 12);
    let peak = PEAK.load(Ordering::SeqCst);
    assert!((1..=3).contains(&peak), "peak concurrency: {peak}");
}

#[derive(Default)]
struct Recorder(Vec<event::Cucumber>);

impl Writer for Recorder {
    fn handle_event(&mut self, event: &event::Cucumber) {
        self.0.push(event.clone());
    }
}

#[test]
fn emits_events_of_each_scenario_in_order() {
    let mut cucumber = Cucumber::new(steps())
        .max_concurrent_scenarios(4)
        .with_writer(Recorder::default());
    let suite = cucumber.run(&features()).unwrap();
    let events = cucumber.into_writer().0;

    assert!(matches!(
        events.first(),
        Some(event::Cucumber::Started { scenarios: 20 }),
    ));
    assert!(matches!(events.last(), Some(event::Cucumber::Finished(_))));

    let mut next_step = vec![0; 20];
    let mut finished = vec![false; 20];
    for ev in &events {
        match ev {
            event::Cucumber::Step { scenario, index, .. } => {
                assert!(!finished[*scenario]);
                assert_eq!(next_step[*scenario], *index);
                next_step[*scenario] += 1;
            }
            event::Cucumber::Scenario(result) => {
                assert_eq!(next_step[result.index], result.steps.len());
                finished[result.index] = true;
            }
            event::Cucumber::Started { .. } | event::Cucumber::Finished(_) => {}
        }
    }
    assert!(finished.iter().all(|f| *f));

    let statuses = suite.scenarios.iter().map(|sc| sc.status());
    assert_eq!(Status::aggregate(statuses), Status::Failed);
}

#[derive(Debug, Default)]
struct Fragile;

impl Drop for Fragile {
    fn drop(&mut self) {
        panic!("cannot tear down");
    }
}

#[test]
fn survives_panics_of_world_teardown() {
    let mut steps = Collection::new();
    steps.step("^fine$", |_: &mut Fragile| {}).unwrap();
    let feature = Feature::parse(
        "teardown.feature",
        "Feature: teardown\n\
         \n  \
           Scenario: first\n    \
             Given fine\n\
         \n  \
           Scenario: second\n    \
             Given fine\n    \
             And fine\n",
    )
    .unwrap();

    let suite = Cucumber::new(steps)
        .max_concurrent_scenarios(2)
        .with_writer(cucumber_engine::writer::Discard)
        .run(&[feature])
        .unwrap();

    assert!(suite.is_failed());
    assert_eq!(suite.scenario_stats.failed, 2);
    assert_eq!(suite.step_stats.passed, 1);
    assert_eq!(suite.step_stats.failed, 2);
}
