//! Shared helpers for session tests.

#![allow(dead_code)]

pub use activator_session::testing::{Action, FakeWebSession};

/// ASCII "12345678901234567890"; the 6-digit code at t=59 is 287082.
pub const SECRET_B32: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";
pub const CODE_AT_59: &str = "287082";

pub fn clock_at_59() -> u64 {
    59
}
