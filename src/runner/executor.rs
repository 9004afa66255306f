// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Execution of a single step, including the nested steps it expands into.

use std::{fmt, time::Instant, vec};

use tracing::{debug, warn};

use crate::{
    event::{Status, StepError, StepErrorKind, StepResult, Undefined},
    feature::{Body, PickleStep},
    panic_trap,
    step::{self, param, Outcome, ParamKind},
};

/// Default limit of nested steps expansion depth.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 32;

/// Resolves steps against a [`step::Collection`] and invokes their handlers.
pub struct Executor<'c, World> {
    collection: &'c step::Collection<World>,
    max_depth: usize,
}

// Manual implementations are required to omit the redundant `World: Clone`
// trait bound imposed by `#[derive(Clone)]`.
impl<World> Clone for Executor<'_, World> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<World> Copy for Executor<'_, World> {}

impl<World> fmt::Debug for Executor<'_, World> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("steps", &self.collection.len())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

/// Result of resolving and invoking a single step text.
enum Resolved {
    Passed,
    Failed(StepError),
    Pending,
    Undefined,
    Nested(Vec<String>),
}

/// Nested steps of an expanded step, yet to be executed.
struct Frame {
    text: String,
    children: vec::IntoIter<String>,
}

impl<'c, World> Executor<'c, World> {
    /// Creates a new [`Executor`] over the given [`step::Collection`],
    /// allowing nested steps to expand `max_depth` levels deep.
    #[must_use]
    pub const fn new(
        collection: &'c step::Collection<World>,
        max_depth: usize,
    ) -> Self {
        Self { collection, max_depth }
    }

    /// Executes the given top-level `step` on the `world`.
    ///
    /// Nested steps are executed on an explicit work stack: the first nested
    /// failed or pending step stops the execution, while undefined ones are
    /// collected and their siblings keep running.
    #[must_use]
    pub fn execute(&self, world: &mut World, step: &PickleStep) -> StepResult {
        let started = Instant::now();
        let mut result = self.execute_inner(world, step);
        result.duration = started.elapsed();
        result
    }

    fn execute_inner(&self, world: &mut World, step: &PickleStep) -> StepResult {
        let mut result = StepResult::new(Status::Passed);
        let (definition, resolved) =
            self.resolve(world, &step.text, &step.body);
        result.definition = definition;

        let children = match resolved {
            Resolved::Passed => return result,
            Resolved::Pending => {
                result.status = Status::Pending;
                return result;
            }
            Resolved::Undefined => {
                result.status = Status::Undefined;
                result.undefined.push(Undefined {
                    text: step.text.clone(),
                    body: body_kind(&step.body),
                });
                return result;
            }
            Resolved::Failed(e) => {
                result.status = Status::Failed;
                result.error = Some(e);
                return result;
            }
            Resolved::Nested(children) => children,
        };
        if self.max_depth == 0 {
            result.status = Status::Failed;
            result.error =
                Some(StepError::new(StepErrorKind::DepthExceeded(0)));
            return result;
        }

        let mut stack = vec![Frame {
            text: step.text.clone(),
            children: children.into_iter(),
        }];
        while let Some(frame) = stack.last_mut() {
            let Some(text) = frame.children.next() else {
                _ = stack.pop();
                continue;
            };
            if text.contains('\n') {
                result.status = Status::Failed;
                result.error = Some(chained(
                    &stack,
                    &text,
                    StepError::new(StepErrorKind::MultilineNested),
                ));
                break;
            }

            match self.resolve(world, &text, &Body::None).1 {
                Resolved::Passed => {}
                Resolved::Undefined => {
                    result.status = Status::Undefined;
                    result.undefined.push(Undefined::new(text));
                }
                Resolved::Pending => {
                    result.status = Status::Pending;
                    break;
                }
                Resolved::Failed(e) => {
                    result.status = Status::Failed;
                    result.error = Some(chained(&stack, &text, e));
                    break;
                }
                Resolved::Nested(children) => {
                    if stack.len() >= self.max_depth {
                        result.status = Status::Failed;
                        result.error = Some(chained(
                            &stack,
                            &text,
                            StepError::new(StepErrorKind::DepthExceeded(
                                self.max_depth,
                            )),
                        ));
                        break;
                    }
                    debug!(
                        step = %text,
                        count = children.len(),
                        depth = stack.len(),
                        "expanding nested steps",
                    );
                    stack.push(Frame { text, children: children.into_iter() });
                }
            }
        }
        result
    }

    /// Matches the `text`, binds its arguments and invokes the handler.
    ///
    /// Returns the [`step::Location`] of the matched definition along with
    /// the result.
    fn resolve(
        &self,
        world: &mut World,
        text: &str,
        body: &Body,
    ) -> (Option<step::Location>, Resolved) {
        let found = match self.collection.find(text) {
            Ok(Some(found)) => found,
            Ok(None) => {
                debug!(step = %text, "no step definition matched");
                return (None, Resolved::Undefined);
            }
            Err(e) => {
                warn!(step = %text, "ambiguous step match");
                return (None, Resolved::Failed(StepError::new(e)));
            }
        };
        let definition = found.definition;
        debug!(
            step = %text,
            definition = %definition.location,
            "step definition matched",
        );

        let args = match param::bind(&definition.params, found.captures, body) {
            Ok(args) => args,
            Err(e) => {
                return (
                    Some(definition.location),
                    Resolved::Failed(StepError::new(e)),
                )
            }
        };
        let resolved = match panic_trap::trap(|| definition.call(world, args)) {
            Ok(Ok(Outcome::Passed)) => Resolved::Passed,
            Ok(Ok(Outcome::Pending)) => Resolved::Pending,
            Ok(Ok(Outcome::Failed(msg))) => {
                Resolved::Failed(StepError::new(StepErrorKind::Failed(msg)))
            }
            Ok(Ok(Outcome::Nested(steps))) => Resolved::Nested(steps.0),
            Ok(Err(e)) => Resolved::Failed(StepError::new(e)),
            Err(panic) => {
                warn!(
                    step = %text,
                    location = %panic.location,
                    "step handler panicked: {}",
                    panic.payload,
                );
                Resolved::Failed(StepError::new(panic))
            }
        };
        (Some(definition.location), resolved)
    }
}

/// Wraps the `error` of the nested step `text` into the texts of the
/// enclosing `stack` of steps.
fn chained(stack: &[Frame], text: &str, error: StepError) -> StepError {
    stack
        .iter()
        .rev()
        .fold(error.within(text), |e, frame| e.within(frame.text.as_str()))
}

/// Returns the [`ParamKind`] of a step `body`, if any.
pub(crate) const fn body_kind(body: &Body) -> Option<ParamKind> {
    match body {
        Body::None => None,
        Body::DocString(_) => Some(ParamKind::DocString),
        Body::Table(_) => Some(ParamKind::Table),
    }
}
