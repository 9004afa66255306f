// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Execution of a single scenario.

use std::sync::Arc;

use tracing::{debug, info_span, warn};

use crate::{
    event::{self, ScenarioResult, Status, StepError, StepResult},
    feature::Pickle,
    panic_trap,
};

use super::executor::Executor;

/// Scenario to be executed along with its position in a suite.
#[derive(Clone, Debug)]
pub struct Scheduled {
    /// Document index of the scenario inside the whole suite.
    pub index: usize,

    /// Index of the feature the scenario belongs to.
    pub feature: usize,

    /// Scenario itself.
    pub pickle: Arc<Pickle>,
}

/// Runs all the steps of the `scenario` in order on a fresh `World`.
///
/// Once a step fails or turns out pending, the rest of the steps are skipped
/// without invoking their handlers. Every finished step is reported via
/// `emit` as an [`event::Cucumber::Step`].
///
/// A panic while constructing the `World` fails the first step, while a panic
/// while dropping it fails the last one.
pub fn run<World: Default>(
    executor: Executor<'_, World>,
    scenario: &Scheduled,
    mut emit: impl FnMut(event::Cucumber),
) -> ScenarioResult {
    let span = info_span!(
        "scenario",
        index = scenario.index,
        name = %scenario.pickle.name,
    );
    let _guard = span.enter();

    let mut world = match panic_trap::trap(World::default) {
        Ok(world) => world,
        Err(panic) => {
            warn!(
                location = %panic.location,
                "world construction panicked: {}",
                panic.payload,
            );
            // Reported as the failure of the first step.
            let mut failure = Some(StepResult::failed(StepError::new(panic)));
            let steps = scenario
                .pickle
                .steps
                .iter()
                .map(|_| failure.take().unwrap_or_else(StepResult::skipped))
                .collect::<Vec<_>>();
            for (index, result) in steps.iter().enumerate() {
                emit(event::Cucumber::Step {
                    scenario: scenario.index,
                    index,
                    result: result.clone(),
                });
            }
            return finished(scenario, steps);
        }
    };

    // The last step is reported only once the world is dropped, as a panic
    // there fails it.
    let last = scenario.pickle.steps.len().checked_sub(1);
    let mut halted = false;
    let mut steps = Vec::with_capacity(scenario.pickle.steps.len());
    for (index, step) in scenario.pickle.steps.iter().enumerate() {
        let result = if halted {
            StepResult::skipped()
        } else {
            executor.execute(&mut world, step)
        };
        debug!(step = %step.text, status = %result.status, "step finished");
        halted |= result.status.halts();

        if Some(index) != last {
            emit(event::Cucumber::Step {
                scenario: scenario.index,
                index,
                result: result.clone(),
            });
        }
        steps.push(result);
    }

    if let Err(panic) = panic_trap::trap(move || drop(world)) {
        warn!(
            location = %panic.location,
            "world teardown panicked: {}",
            panic.payload,
        );
        if let Some(result) = steps.last_mut() {
            if result.status != Status::Failed {
                result.status = Status::Failed;
                result.error = Some(StepError::new(panic));
            }
        }
    }
    if let (Some(index), Some(result)) = (last, steps.last()) {
        emit(event::Cucumber::Step {
            scenario: scenario.index,
            index,
            result: result.clone(),
        });
    }

    finished(scenario, steps)
}

fn finished(scenario: &Scheduled, steps: Vec<StepResult>) -> ScenarioResult {
    ScenarioResult {
        index: scenario.index,
        feature: scenario.feature,
        pickle: Arc::clone(&scenario.pickle),
        steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        feature::PickleStep,
        step::{Collection, Outcome},
    };

    #[derive(Default)]
    struct World(Vec<String>);

    struct Exploding;

    impl Default for Exploding {
        fn default() -> Self {
            panic!("no world for you")
        }
    }

    #[derive(Default)]
    struct Fragile;

    impl Drop for Fragile {
        fn drop(&mut self) {
            panic!("teardown went wrong");
        }
    }

    fn scenario(texts: &[&str]) -> Scheduled {
        Scheduled {
            index: 3,
            feature: 0,
            pickle: Arc::new(Pickle {
                keyword: "Scenario".into(),
                name: "test".into(),
                line: 1,
                path: None,
                tags: vec![],
                steps: texts
                    .iter()
                    .enumerate()
                    .map(|(i, t)| PickleStep::new("Given", *t, i + 2))
                    .collect(),
            }),
        }
    }

    fn collection() -> Collection<World> {
        let mut steps = Collection::new();
        steps
            .step("pass", |w: &mut World| w.0.push("pass".into()))
            .unwrap()
            .step("fail", |w: &mut World| {
                w.0.push("fail".into());
                Outcome::Failed("failed".into())
            })
            .unwrap()
            .step("pending", |w: &mut World| {
                w.0.push("pending".into());
                Outcome::Pending
            })
            .unwrap()
            .step("check", |w: &mut World| {
                assert_eq!(w.0, ["pass"], "world leaked between scenarios");
            })
            .unwrap();
        steps
    }

    fn statuses(result: &ScenarioResult) -> Vec<Status> {
        result.steps.iter().map(|s| s.status).collect()
    }

    #[test]
    fn skips_steps_after_failure() {
        let steps = collection();
        let sc = scenario(&["pass", "fail", "pass", "undefined"]);

        let res = run(Executor::new(&steps, 32), &sc, |_| {});

        assert_eq!(
            statuses(&res),
            [Status::Passed, Status::Failed, Status::Skipped, Status::Skipped],
        );
        assert_eq!(res.status(), Status::Failed);
        assert_eq!(res.index, 3);
    }

    #[test]
    fn skips_steps_after_pending() {
        let steps = collection();
        let sc = scenario(&["pending", "pass"]);

        let res = run(Executor::new(&steps, 32), &sc, |_| {});

        assert_eq!(statuses(&res), [Status::Pending, Status::Skipped]);
        assert_eq!(res.status(), Status::Pending);
    }

    #[test]
    fn continues_after_undefined() {
        let steps = collection();
        let sc = scenario(&["nope", "pass", "check"]);

        let res = run(Executor::new(&steps, 32), &sc, |_| {});

        assert_eq!(
            statuses(&res),
            [Status::Undefined, Status::Passed, Status::Passed],
        );
        assert_eq!(res.status(), Status::Undefined);
    }

    #[test]
    fn emits_event_per_step() {
        let steps = collection();
        let sc = scenario(&["pass", "fail", "pass"]);
        let mut events = Vec::new();

        _ = run(Executor::new(&steps, 32), &sc, |ev| events.push(ev));

        let indices = events
            .iter()
            .map(|ev| match ev {
                event::Cucumber::Step { scenario, index, .. } => {
                    (*scenario, *index)
                }
                _ => unreachable!("only step events are emitted"),
            })
            .collect::<Vec<_>>();
        assert_eq!(indices, [(3, 0), (3, 1), (3, 2)]);
    }

    #[test]
    fn fails_first_step_on_world_panic() {
        let steps = Collection::<Exploding>::new();
        let sc = scenario(&["pass", "pass"]);

        let res = run(Executor::new(&steps, 32), &sc, |_| {});

        assert_eq!(statuses(&res), [Status::Failed, Status::Skipped]);
        assert!(res.steps[0]
            .error
            .as_ref()
            .unwrap()
            .to_string()
            .contains("no world for you"));
    }

    #[test]
    fn fails_last_step_on_world_drop_panic() {
        let mut steps = Collection::new();
        _ = steps.step("pass", |_: &mut Fragile| {}).unwrap();
        let sc = scenario(&["pass", "pass"]);
        let mut events = Vec::new();

        let res = run(Executor::new(&steps, 32), &sc, |ev| events.push(ev));

        assert_eq!(statuses(&res), [Status::Passed, Status::Failed]);
        assert!(res.steps[1]
            .error
            .as_ref()
            .unwrap()
            .to_string()
            .contains("teardown went wrong"));
        let reported = events
            .iter()
            .map(|ev| match ev {
                event::Cucumber::Step { index, result, .. } => {
                    (*index, result.status)
                }
                _ => unreachable!("only step events are emitted"),
            })
            .collect::<Vec<_>>();
        assert_eq!(reported, [(0, Status::Passed), (1, Status::Failed)]);
    }

    #[test]
    fn keeps_failure_of_last_step_on_world_drop_panic() {
        let mut steps = Collection::new();
        _ = steps
            .step("fail", |_: &mut Fragile| Outcome::Failed("first".into()))
            .unwrap();
        let sc = scenario(&["fail"]);

        let res = run(Executor::new(&steps, 32), &sc, |_| {});

        assert_eq!(statuses(&res), [Status::Failed]);
        assert_eq!(res.steps[0].error.as_ref().unwrap().to_string(), "first");
    }
}
