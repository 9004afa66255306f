// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`Collection`] of [`Definition`]s and matching of step texts against them.

use derive_more::with_trait::Debug;
use smart_default::SmartDefault;

use super::{
    error::{AmbiguousMatchError, RegistrationError},
    location::Location,
    outcome::{IntoOutcome, Outcome},
    param::{Argument, BindError, Param, ParamKind},
    regex::AnchoredRegex,
};

/// Type-erased step handler stored inside a [`Definition`].
type ErasedHandler<World> = Box<
    dyn Fn(&mut World, Vec<Argument>) -> Result<Outcome, BindError>
        + Send
        + Sync,
>;

/// Function usable as a step handler.
///
/// Implemented for every `Fn(&mut World, A1, …, An) -> R` (up to 8
/// parameters), where every `Ai` is a [`Param`] and `R` is an
/// [`IntoOutcome`]. The `Args` type parameter is the tuple of parameter types
/// and is inferred at the registration site.
pub trait Handler<World, Args>: Send + Sync + 'static {
    /// Returns the [`ParamKind`]s of this handler's parameters, in order.
    #[must_use]
    fn params() -> Vec<ParamKind>;

    /// Invokes this handler with the bound arguments.
    ///
    /// # Errors
    ///
    /// If the arguments don't fit the handler's parameter types.
    fn call(
        &self,
        world: &mut World,
        args: Vec<Argument>,
    ) -> Result<Outcome, BindError>;
}

macro_rules! impl_handler {
    ($($ty:ident $var:ident),*) => {
        impl<World, F, R, $($ty),*> Handler<World, ($($ty,)*)> for F
        where
            F: Fn(&mut World, $($ty),*) -> R + Send + Sync + 'static,
            R: IntoOutcome,
            $($ty: Param,)*
        {
            fn params() -> Vec<ParamKind> {
                vec![$($ty::KIND),*]
            }

            #[allow(unused_mut, unused_variables, unused_assignments)]
            fn call(
                &self,
                world: &mut World,
                args: Vec<Argument>,
            ) -> Result<Outcome, BindError> {
                let expected =
                    <Self as Handler<World, ($($ty,)*)>>::params().len();
                let actual = args.len();
                let mut args = args.into_iter();
                let mut index = 0;
                $(
                    let $var = args
                        .next()
                        .ok_or(BindError::Count { expected, actual })
                        .and_then(|arg| $ty::from_argument(index, arg))?;
                    index += 1;
                )*
                Ok((self)(world, $($var),*).into_outcome())
            }
        }
    };
}

impl_handler!();
impl_handler!(A1 a1);
impl_handler!(A1 a1, A2 a2);
impl_handler!(A1 a1, A2 a2, A3 a3);
impl_handler!(A1 a1, A2 a2, A3 a3, A4 a4);
impl_handler!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_handler!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
impl_handler!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7);
impl_handler!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8);

/// Registered binding of an [`AnchoredRegex`] to a step handler.
#[derive(Debug)]
pub struct Definition<World> {
    /// Pattern step texts are matched against.
    pub regex: AnchoredRegex,

    /// [`ParamKind`]s of the handler's parameters.
    pub params: Vec<ParamKind>,

    /// Where this [`Definition`] was registered.
    pub location: Location,

    /// Type-erased handler.
    #[debug(skip)]
    handler: ErasedHandler<World>,
}

impl<World> Definition<World> {
    /// Invokes the handler of this [`Definition`].
    ///
    /// # Errors
    ///
    /// If the `args` don't fit the handler's parameter types.
    pub fn call(
        &self,
        world: &mut World,
        args: Vec<Argument>,
    ) -> Result<Outcome, BindError> {
        (self.handler)(world, args)
    }
}

/// Strategy of resolving a step text matching several [`Definition`]s.
#[derive(Clone, Copy, Debug, Eq, PartialEq, SmartDefault)]
pub enum Ambiguity {
    /// Fail the step with an [`AmbiguousMatchError`].
    #[default]
    Fail,

    /// Pick the [`Definition`] registered first.
    FirstRegistered,
}

/// [`Definition`] matched to a step text.
#[derive(Debug)]
pub struct Match<'me, World> {
    /// Matched [`Definition`].
    pub definition: &'me Definition<World>,

    /// Texts of the pattern's capturing groups.
    pub captures: Vec<String>,
}

/// Collection of step [`Definition`]s.
///
/// Filled once during initialization and read-only afterwards, so may be
/// shared across threads running scenarios.
#[derive(Debug)]
pub struct Collection<World> {
    /// [`Definition`]s in registration order.
    definitions: Vec<Definition<World>>,

    /// How ambiguous matches are resolved.
    ambiguity: Ambiguity,
}

// Implemented manually to omit redundant `World: Default` trait bound, imposed
// by `#[derive(Default)]`.
impl<World> Default for Collection<World> {
    fn default() -> Self {
        Self { definitions: Vec::new(), ambiguity: Ambiguity::default() }
    }
}

impl<World: 'static> Collection<World> {
    /// Creates a new empty [`Collection`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the [`Ambiguity`] resolution strategy.
    #[must_use]
    pub fn with_ambiguity(mut self, ambiguity: Ambiguity) -> Self {
        self.ambiguity = ambiguity;
        self
    }

    /// Registers the `handler` for step texts matching the `pattern`.
    ///
    /// The `pattern` is anchored at both ends, and its capturing groups are
    /// bound to the handler's parameters in order. A doc-string or table
    /// parameter, if any, must be the last one.
    ///
    /// # Errors
    ///
    /// See [`RegistrationError`] for details.
    #[track_caller]
    pub fn step<Args, H: Handler<World, Args>>(
        &mut self,
        pattern: impl Into<String>,
        handler: H,
    ) -> Result<&mut Self, RegistrationError> {
        let location = Location::caller();
        let pattern = pattern.into();

        if let Some(first) = self
            .definitions
            .iter()
            .find(|def| def.regex.as_str() == pattern)
        {
            return Err(RegistrationError::Duplicate {
                pattern,
                first: first.location,
                second: location,
            });
        }

        let regex = AnchoredRegex::new(pattern.as_str()).map_err(|source| {
            RegistrationError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            }
        })?;

        let params = H::params();
        if let Some((_, &kind)) = params
            .iter()
            .enumerate()
            .find(|(i, kind)| !kind.is_capture() && *i + 1 != params.len())
        {
            return Err(RegistrationError::MisplacedBody {
                pattern,
                kind,
                location,
            });
        }

        let expected = params.iter().filter(|k| k.is_capture()).count();
        if regex.captures_count() != expected {
            return Err(RegistrationError::ArityMismatch {
                pattern,
                captures: regex.captures_count(),
                expected,
                location,
            });
        }

        tracing::debug!(%pattern, %location, ?params, "registered step");

        self.definitions.push(Definition {
            regex,
            params,
            location,
            handler: Box::new(move |world, args| handler.call(world, args)),
        });
        Ok(self)
    }
}

impl<World> Collection<World> {
    /// Returns the number of registered [`Definition`]s.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Indicates whether no [`Definition`]s are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Iterates over the registered [`Definition`]s in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Definition<World>> {
        self.definitions.iter()
    }

    /// Returns the [`Definition`] matching the given step `text`, if any.
    ///
    /// # Errors
    ///
    /// If the `text` matches multiple [`Definition`]s and the [`Ambiguity`]
    /// strategy is [`Ambiguity::Fail`].
    pub fn find(
        &self,
        text: &str,
    ) -> Result<Option<Match<'_, World>>, AmbiguousMatchError> {
        let mut matches = self
            .definitions
            .iter()
            .filter_map(|definition| {
                definition
                    .regex
                    .capture_texts(text)
                    .map(|captures| Match { definition, captures })
            })
            .collect::<Vec<_>>();

        match (matches.len(), self.ambiguity) {
            (0, _) => Ok(None),
            (1, _) | (_, Ambiguity::FirstRegistered) => {
                Ok(Some(matches.swap_remove(0)))
            }
            (_, Ambiguity::Fail) => Err(AmbiguousMatchError {
                possible_matches: matches
                    .into_iter()
                    .map(|m| (m.definition.regex.clone(), m.definition.location))
                    .collect(),
            }),
        }
    }
}
