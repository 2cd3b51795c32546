//! Abort behaviour of no-unwind `MoveFunction`s.
//!
//! A panic escaping a `NoUnwind` target terminates the process, so the panic
//! is raised in a child process running this same test binary, and the parent
//! inspects how the child exited.

use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    process::Command,
};

use polyfn::prelude::*;

/// Set in the child process, which then triggers the panic.
const CHILD_ENV: &str = "POLYFN_NO_UNWIND_CHILD";

fn explode() {
    panic!("raised inside a no-unwind callable");
}

fn fail() {
    panic!("ordinary panic");
}

#[test]
fn test_no_unwind_panic_aborts() {
    if std::env::var_os(CHILD_ENV).is_some() {
        let mut function: MoveFunction<fn(), NoUnwind<Mut>> = MoveFunction::new(explode);
        // The abort happens before the unwind reaches this frame
        let _ = catch_unwind(AssertUnwindSafe(|| function.call()));
        std::process::exit(0);
    }

    let output = Command::new(std::env::current_exe().unwrap())
        .args(["test_no_unwind_panic_aborts", "--exact", "--nocapture"])
        .env(CHILD_ENV, "1")
        .output()
        .unwrap();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success(), "child exited normally: {stderr}");
    assert!(
        stderr.contains("raised inside a no-unwind callable"),
        "unexpected child output: {stderr}"
    );

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;

        assert_eq!(output.status.signal(), Some(6), "child stderr: {stderr}");
    }
}

#[test]
fn test_unwinding_qualifier_can_be_caught() {
    let mut function: MoveFunction<fn()> = MoveFunction::new(fail);
    let result = catch_unwind(AssertUnwindSafe(|| function.call()));
    assert!(result.is_err());
    assert!(!function.is_null());
}
