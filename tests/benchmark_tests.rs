//! Performance benchmarks for the command path

use scoreboard_server::dispatcher::Dispatcher;
use scoreboard_server::undo_log::UndoLog;
use scoreboard_shared::{Command, MatchState, RuleConfig};
use std::time::Instant;

/// Benchmarks full matches played through the dispatcher
#[test]
fn benchmark_point_dispatch() {
    let matches = 200;
    let mut commands = 0u32;
    let start = Instant::now();

    for _ in 0..matches {
        let mut dispatcher = Dispatcher::default();
        while !dispatcher.state().finished {
            let _ = dispatcher.dispatch(Command::PointA, 0);
            commands += 1;
        }
    }

    let duration = start.elapsed();
    println!(
        "Point dispatch: {} commands in {:?} ({:.2} μs/command)",
        commands,
        duration,
        duration.as_micros() as f64 / commands as f64
    );

    // Each command clones the state once for the undo log
    assert!(duration.as_millis() < 2000);
}

/// Benchmarks parsing raw payloads the way the server receives them
#[test]
fn benchmark_message_handling() {
    let iterations = 20_000;
    let payloads = [
        r#"{"type":"POINT_A"}"#,
        r#"{"type":"POINT_B"}"#,
        r#"{"type":"UNDO"}"#,
        r#"{"type":"UPDATE_SETTINGS","A1":"Ma Long","B1":"Fan Zhendong"}"#,
        "not json",
    ];

    let mut dispatcher = Dispatcher::default();
    let start = Instant::now();

    for payload in payloads.iter().cycle().take(iterations) {
        let _ = dispatcher.handle_message(payload, 0);
    }

    let duration = start.elapsed();
    println!(
        "Message handling: {} payloads in {:?} ({:.2} μs/payload)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 2000);
}

/// Benchmarks the bounded undo log once it is full
#[test]
fn benchmark_undo_log_at_capacity() {
    let iterations = 50_000;
    let snapshot = MatchState::new(&RuleConfig::default());
    let mut log = UndoLog::new();

    let start = Instant::now();

    for _ in 0..iterations {
        log.push(snapshot.clone());
    }

    let duration = start.elapsed();
    println!(
        "Undo log: {} pushes in {:?} ({:.2} ns/push)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    assert_eq!(log.len(), log.capacity());
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks serializing a late-match state with a long history
#[test]
fn benchmark_state_serialization() {
    let mut dispatcher = Dispatcher::default();
    for _ in 0..40 {
        let _ = dispatcher.dispatch(Command::PointA, 0);
        let _ = dispatcher.dispatch(Command::PointB, 0);
    }

    let iterations = 5_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let json = dispatcher.state_json().unwrap();
        assert!(!json.is_empty());
    }

    let duration = start.elapsed();
    println!(
        "State serialization: {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 2000);
}
