#![cfg(feature = "tracing")]

use std::{
    io,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{Arc, Mutex},
};

use polyfn::{Function, MoveFunction};
use tracing_subscriber::{filter::LevelFilter, util::SubscriberInitExt};

/// A writer collecting everything the subscriber formats.
#[derive(Clone, Default)]
struct Sink(Arc<Mutex<Vec<u8>>>);

impl Sink {
    fn contents(&self) -> String {
        let buffer = self.0.lock().unwrap();
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl io::Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture(f: impl FnOnce()) -> String {
    let sink = Sink::default();
    let writer = sink.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .without_time()
        .with_writer(move || writer.clone())
        .finish();
    let _guard = subscriber.set_default();
    f();
    sink.contents()
}

#[test]
fn test_spill_is_traced() {
    let output = capture(|| {
        let table = [7u64; 16];
        let mut function: Function<fn() -> u64> = Function::new(move || table[0]);
        assert_eq!(function.call(), 7);
    });
    assert!(output.contains("polyfn"));
    assert!(output.contains("callable does not fit inline"));
}

#[test]
fn test_inline_target_is_not_traced() {
    let output = capture(|| {
        let mut function: Function<fn(u8) -> u8> = Function::new(|x: u8| x + 1);
        assert_eq!(function.call(1), 2);
    });
    assert!(output.is_empty());
}

#[test]
fn test_null_pointer_is_traced() {
    let output = capture(|| {
        let missing: Option<fn()> = None;
        let function: MoveFunction<fn()> = MoveFunction::from(missing);
        assert!(function.is_null());
    });
    assert!(output.contains("null function pointer"));
}

#[test]
fn test_bad_call_is_traced() {
    let output = capture(|| {
        let result = catch_unwind(AssertUnwindSafe(|| {
            let mut function: Function<fn(i32) -> i32> = Function::null();
            function.call(1)
        }));
        assert!(result.is_err());
    });
    assert!(output.contains("ERROR"));
    assert!(output.contains("called an empty callable"));
}
