//! Reporting for programming errors.
//!
//! Caller-contract violations and broken internal invariants are bugs in the
//! calling code, not runtime conditions, so they are not part of any `Result`.
//! Both are logged at error level. Debug builds additionally assert so the bug
//! is caught where it happens; release builds carry on with a safe default.

/// Reports a caller-contract violation.
macro_rules! coding_error {
    ($($arg:tt)+) => {{
        log::error!("Coding error: {}", format_args!($($arg)+));
        debug_assert!(false, $($arg)+);
    }};
}

/// Checks an internal invariant, reporting it when violated.
///
/// Evaluates to the value of the condition so callers can bail out of the
/// current step.
macro_rules! verify {
    ($cond:expr) => {
        verify!($cond, "{}", stringify!($cond))
    };
    ($cond:expr, $($arg:tt)+) => {{
        let holds: bool = $cond;
        if !holds {
            log::error!("Failed verification: {}", format_args!($($arg)+));
            debug_assert!(holds, $($arg)+);
        }
        holds
    }};
}
