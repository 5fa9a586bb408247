//! Library integration tests.

use std::cell::RefCell;
use std::rc::Rc;

use liftlog::runtime::{ManualClock, Runtime};
use liftlog::store::{FileStore, KeyValueStore, MemoryStore};
use liftlog::timer::{RestTimer, SilentAlarm, TimerState};
use liftlog::workout::{SetField, WorkoutLog};
use liftlog::LiftlogError;
use tempfile::TempDir;

const T0: i64 = 1_700_000_000_000;

fn context(store: Rc<dyn KeyValueStore>, clock: &ManualClock) -> Runtime {
    Runtime::new(store, Rc::new(clock.clone()))
}

#[test]
fn error_types_are_public() {
    let err = LiftlogError::UnknownExercise { id: 7 };
    assert!(err.to_string().contains('7'));
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> liftlog::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn cli_types_are_public() {
    use clap::Parser;
    use liftlog::cli::{Cli, Commands};

    let cli = Cli::parse_from(["liftlog", "show", "--json"]);
    if let Some(Commands::Show(args)) = cli.command {
        assert!(args.json);
    } else {
        panic!("Expected Show command");
    }
}

#[test]
fn two_file_stores_share_values() {
    let temp = TempDir::new().unwrap();
    let clock = ManualClock::new(T0);
    let first = context(Rc::new(FileStore::new(temp.path())), &clock);
    let second = context(Rc::new(FileStore::new(temp.path())), &clock);

    let log = WorkoutLog::bind(&first).unwrap();
    log.update_set(1, 2, SetField::Reps("6".into())).unwrap();

    let other = WorkoutLog::bind(&second).unwrap();
    assert_eq!(other.exercise(1).unwrap().sets[2].reps, "6");
}

#[test]
fn foreign_edit_reaches_watcher_after_poll() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(T0);
    let tab_a = context(Rc::new(store.clone()), &clock);
    let tab_b = context(Rc::new(store), &clock);

    let log_a = WorkoutLog::bind(&tab_a).unwrap();
    let log_b = WorkoutLog::bind(&tab_b).unwrap();
    let renders = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&renders);
    let _watch = log_b.watch(move |exercises| {
        seen.borrow_mut().push(exercises[0].note.clone());
    });

    log_a.update_note(1, "belt on top set").unwrap();
    tab_a.run_until_idle();
    tab_b.run_until_idle();
    assert!(renders.borrow().is_empty());

    tab_b.poll_now().unwrap();
    tab_b.run_until_idle();

    assert_eq!(*renders.borrow(), vec!["belt on top set".to_string()]);
    assert_eq!(log_b.exercise(1).unwrap().note, "belt on top set");
}

#[test]
fn rest_started_in_one_context_runs_in_another() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(T0);
    let phone = context(Rc::new(store.clone()), &clock);
    let laptop = context(Rc::new(store), &clock);

    let rings = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&rings);
    let watcher = RestTimer::bind(&laptop, move || *counter.borrow_mut() += 1).unwrap();
    let starter = RestTimer::bind(&phone, SilentAlarm).unwrap();

    starter.start(3).unwrap();
    laptop.poll_now().unwrap();
    laptop.run_until_idle();
    assert_eq!(watcher.state(), TimerState::Running { remaining_secs: 3 });

    // Adopting never rings; finishing the period does.
    assert_eq!(*rings.borrow(), 0);
    drop(starter);
    for _ in 0..3 {
        clock.advance(1_000);
        laptop.run_until_idle();
    }

    assert_eq!(watcher.state(), TimerState::Idle);
    assert_eq!(*rings.borrow(), 1);
}

#[test]
fn reload_resumes_remaining_time() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(T0);

    {
        let runtime = context(Rc::new(store.clone()), &clock);
        RestTimer::bind(&runtime, SilentAlarm).unwrap().start(60).unwrap();
    }

    clock.advance(25_000);
    let runtime = context(Rc::new(store), &clock);
    let timer = RestTimer::bind(&runtime, SilentAlarm).unwrap();

    assert_eq!(timer.remaining_secs(), 35);
}
