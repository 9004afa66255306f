// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Typed parameters of step handlers and binding of captured texts to them.
//!
//! Every handler parameter type implements [`Param`], which declares its
//! [`ParamKind`]. The list of kinds is computed once, when a handler is
//! registered, and then drives [`bind()`]ing of every matched step.

use derive_more::with_trait::{Deref, Display, Error, From};

use crate::feature::Body;

/// Kind of a step handler parameter.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum ParamKind {
    /// Captured text passed as is.
    #[display("string")]
    String,

    /// Captured text parsed as an integer.
    #[display("integer")]
    Int,

    /// Captured text parsed as a floating point number.
    #[display("float")]
    Float,

    /// Doc-string body of a step.
    #[display("doc string")]
    DocString,

    /// Data table body of a step.
    #[display("table")]
    Table,
}

impl ParamKind {
    /// Indicates whether this [`ParamKind`] is filled from a capturing group
    /// (rather than from a step body).
    #[must_use]
    pub const fn is_capture(self) -> bool {
        matches!(self, Self::String | Self::Int | Self::Float)
    }
}

/// Doc-string body of a step.
#[derive(Clone, Debug, Deref, Display, Eq, From, PartialEq)]
pub struct DocString(pub String);

/// Data table body of a step.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Table {
    /// Rows of this [`Table`], the first one usually being a header.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Returns the header row of this [`Table`], if any.
    #[must_use]
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Returns all the rows after the header.
    #[must_use]
    pub fn body(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or_default()
    }
}

impl From<&gherkin::Table> for Table {
    fn from(table: &gherkin::Table) -> Self {
        Self { rows: table.rows.clone() }
    }
}

/// Value bound to a single handler parameter, already converted according to
/// its [`ParamKind`].
#[derive(Clone, Debug, PartialEq)]
pub enum Argument {
    /// [`ParamKind::String`] value.
    String(String),

    /// [`ParamKind::Int`] value.
    Int(i64),

    /// [`ParamKind::Float`] value.
    Float(f64),

    /// [`ParamKind::DocString`] value.
    DocString(DocString),

    /// [`ParamKind::Table`] value.
    Table(Table),
}

impl Argument {
    /// Returns the [`ParamKind`] this [`Argument`] satisfies.
    #[must_use]
    pub const fn kind(&self) -> ParamKind {
        match self {
            Self::String(_) => ParamKind::String,
            Self::Int(_) => ParamKind::Int,
            Self::Float(_) => ParamKind::Float,
            Self::DocString(_) => ParamKind::DocString,
            Self::Table(_) => ParamKind::Table,
        }
    }
}

/// Error of binding a matched step to the parameters of its handler.
#[derive(Clone, Debug, Display, Error, PartialEq)]
pub enum BindError {
    /// Captured text cannot be converted into the declared parameter type.
    #[display("cannot convert argument {index} `{value}` into {expected}")]
    Conversion {
        /// Zero-based position of the parameter.
        index: usize,

        /// Captured text.
        value: String,

        /// Name of the expected type.
        expected: &'static str,
    },

    /// Handler declares a body parameter, but the step has no such body.
    #[display("step has no {_0} argument")]
    MissingBody(#[error(not(source))] ParamKind),

    /// Number of provided arguments doesn't match the handler signature.
    #[display("handler expects {expected} arguments, but {actual} were bound")]
    Count {
        /// Number of parameters declared by the handler.
        expected: usize,

        /// Number of bound arguments.
        actual: usize,
    },
}

/// Type usable as a step handler parameter.
pub trait Param: Sized {
    /// [`ParamKind`] of this type, recorded at registration.
    const KIND: ParamKind;

    /// Extracts the value of this type from the bound [`Argument`].
    ///
    /// # Errors
    ///
    /// If the [`Argument`] doesn't fit into this type.
    fn from_argument(index: usize, arg: Argument) -> Result<Self, BindError>;
}

/// Binds captured `texts` and the step `body` to the given parameter `kinds`.
///
/// A `body` not requested by any of the `kinds` is ignored.
///
/// # Errors
///
/// If a captured text cannot be converted, or a requested body is missing.
pub fn bind(
    kinds: &[ParamKind],
    texts: Vec<String>,
    body: &Body,
) -> Result<Vec<Argument>, BindError> {
    let mut texts = texts.into_iter();
    kinds
        .iter()
        .enumerate()
        .map(|(index, kind)| match kind {
            ParamKind::String | ParamKind::Int | ParamKind::Float => {
                let value = texts.next().ok_or(BindError::Count {
                    expected: kinds.len(),
                    actual: index,
                })?;
                convert(index, *kind, value)
            }
            ParamKind::DocString => match body {
                Body::DocString(doc) => {
                    Ok(Argument::DocString(DocString(doc.clone())))
                }
                Body::None | Body::Table(_) => {
                    Err(BindError::MissingBody(ParamKind::DocString))
                }
            },
            ParamKind::Table => match body {
                Body::Table(table) => Ok(Argument::Table(table.clone())),
                Body::None | Body::DocString(_) => {
                    Err(BindError::MissingBody(ParamKind::Table))
                }
            },
        })
        .collect()
}

fn convert(
    index: usize,
    kind: ParamKind,
    value: String,
) -> Result<Argument, BindError> {
    let err = |expected| BindError::Conversion {
        index,
        value: value.clone(),
        expected,
    };
    match kind {
        ParamKind::Int => {
            value.parse().map(Argument::Int).map_err(|_| err("integer"))
        }
        ParamKind::Float => {
            value.parse().map(Argument::Float).map_err(|_| err("float"))
        }
        ParamKind::String | ParamKind::DocString | ParamKind::Table => {
            Ok(Argument::String(value))
        }
    }
}

fn mismatch(index: usize, arg: &Argument, expected: &'static str) -> BindError {
    let value = match arg {
        Argument::String(s) => s.clone(),
        Argument::Int(i) => i.to_string(),
        Argument::Float(f) => f.to_string(),
        Argument::DocString(_) | Argument::Table(_) => arg.kind().to_string(),
    };
    BindError::Conversion { index, value, expected }
}

impl Param for String {
    const KIND: ParamKind = ParamKind::String;

    fn from_argument(index: usize, arg: Argument) -> Result<Self, BindError> {
        match arg {
            Argument::String(s) => Ok(s),
            other => Err(mismatch(index, &other, "string")),
        }
    }
}

macro_rules! impl_int_param {
    ($($ty:ty),* $(,)?) => {$(
        impl Param for $ty {
            const KIND: ParamKind = ParamKind::Int;

            fn from_argument(
                index: usize,
                arg: Argument,
            ) -> Result<Self, BindError> {
                match arg {
                    Argument::Int(i) => Self::try_from(i)
                        .map_err(|_| mismatch(index, &arg, stringify!($ty))),
                    other => Err(mismatch(index, &other, stringify!($ty))),
                }
            }
        }
    )*};
}

impl_int_param!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Param for f64 {
    const KIND: ParamKind = ParamKind::Float;

    fn from_argument(index: usize, arg: Argument) -> Result<Self, BindError> {
        match arg {
            Argument::Float(f) => Ok(f),
            other => Err(mismatch(index, &other, "f64")),
        }
    }
}

impl Param for f32 {
    const KIND: ParamKind = ParamKind::Float;

    #[allow(clippy::as_conversions, clippy::cast_possible_truncation)]
    fn from_argument(index: usize, arg: Argument) -> Result<Self, BindError> {
        match arg {
            Argument::Float(f) => Ok(f as Self),
            other => Err(mismatch(index, &other, "f32")),
        }
    }
}

impl Param for DocString {
    const KIND: ParamKind = ParamKind::DocString;

    fn from_argument(index: usize, arg: Argument) -> Result<Self, BindError> {
        match arg {
            Argument::DocString(doc) => Ok(doc),
            other => Err(mismatch(index, &other, "doc string")),
        }
    }
}

impl Param for Table {
    const KIND: ParamKind = ParamKind::Table;

    fn from_argument(index: usize, arg: Argument) -> Result<Self, BindError> {
        match arg {
            Argument::Table(table) => Ok(table),
            other => Err(mismatch(index, &other, "table")),
        }
    }
}
