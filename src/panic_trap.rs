// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Converting panics of user code into values.
//!
//! A process-wide panic hook is installed once. While a [`trap()`] is active
//! on the current thread, the hook records the panic payload and location
//! instead of printing them; otherwise it delegates to the previously
//! installed hook.

use std::{
    any::Any,
    cell::{Cell, RefCell},
    panic::{self, AssertUnwindSafe},
};

use derive_more::with_trait::Display;
use once_cell::sync::Lazy;

/// Details of a trapped panic.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[display("panicked at {location}: {payload}")]
pub struct PanicDetails {
    /// Message of the panic.
    pub payload: String,

    /// `file:line:column` the panic originated from.
    pub location: String,
}

thread_local! {
    static ACTIVE: Cell<usize> = const { Cell::new(0) };
    static LAST: RefCell<Option<PanicDetails>> = const { RefCell::new(None) };
}

static HOOK: Lazy<()> = Lazy::new(|| {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if ACTIVE.with(Cell::get) == 0 {
            return previous(info);
        }
        let details = PanicDetails {
            payload: payload_message(info.payload()),
            location: info.location().map_or_else(
                || "unknown location".to_owned(),
                |l| format!("{}:{}:{}", l.file(), l.line(), l.column()),
            ),
        };
        LAST.with(|last| *last.borrow_mut() = Some(details));
    }));
});

/// Runs the `f`unction, converting its panic (if any) into [`PanicDetails`].
///
/// # Errors
///
/// If the `f`unction panics.
pub fn trap<T>(f: impl FnOnce() -> T) -> Result<T, PanicDetails> {
    _ = Lazy::force(&HOOK);

    ACTIVE.with(|a| a.set(a.get() + 1));
    let res = panic::catch_unwind(AssertUnwindSafe(f));
    ACTIVE.with(|a| a.set(a.get() - 1));

    res.map_err(|payload| {
        LAST.with(|last| last.borrow_mut().take()).unwrap_or_else(|| {
            PanicDetails {
                payload: payload_message(&*payload),
                location: "unknown location".to_owned(),
            }
        })
    })
}

/// Extracts a human-readable message out of a panic `payload`.
fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else {
        "opaque panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::{trap, PanicDetails};

    #[test]
    fn passes_value_through() {
        assert_eq!(trap(|| 42), Ok(42));
    }

    #[test]
    fn captures_payload_and_location() {
        let line = line!() + 1;
        let err = trap::<()>(|| panic!("boom {}", 1)).unwrap_err();

        assert_eq!(err.payload, "boom 1");
        assert!(
            err.location.starts_with(&format!("{}:{line}:", file!())),
            "unexpected location: {}",
            err.location,
        );
    }

    #[test]
    fn captures_static_str_payload() {
        let err = trap::<()>(|| panic!("static")).unwrap_err();

        assert_eq!(err.payload, "static");
    }

    #[test]
    fn captures_opaque_payload() {
        let err = trap::<()>(|| std::panic::panic_any(7_u8)).unwrap_err();

        assert_eq!(err.payload, "opaque panic payload");
    }

    #[test]
    fn nested_traps_capture_innermost() {
        let outer = trap(|| {
            let inner = trap::<()>(|| panic!("inner"));
            assert!(inner.is_err());
            panic!("outer")
        });

        assert_eq!(outer.map_err(|e| e.payload), Err::<(), _>("outer".into()));
    }

    #[test]
    fn displays_location() {
        let details = PanicDetails {
            payload: "oops".into(),
            location: "steps.rs:3:5".into(),
        };

        assert_eq!(details.to_string(), "panicked at steps.rs:3:5: oops");
    }
}
