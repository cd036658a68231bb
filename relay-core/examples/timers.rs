//! Timers
//!
//! Each `StartTimer` event publishes a new timer in state. A responder sees
//! the new timer, sleeps for its delay, and dispatches `EndTimer`. Timers
//! overlap freely and end in delay order, not start order.
//!
//! Run with `RUST_LOG=relay_core=debug cargo run --example timers` to see the
//! responder's change detection.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use relay_core::reactive::{Effect, Responder};
use relay_core::store::Store;
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Timer {
    id: u64,
    delay: u64,
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    new_timer: Option<Arc<Timer>>,
    ended_timers: Vec<Timer>,
    error: Option<String>,
}

#[derive(Debug)]
enum Event {
    StartTimer { delay: u64 },
    EndTimer(Timer),
    HandleError(String),
}

fn reduce(state: &State, event: &Event) -> State {
    match event {
        Event::StartTimer { delay } => State {
            next_id: state.next_id + 1,
            new_timer: Some(Arc::new(Timer {
                id: state.next_id,
                delay: *delay,
            })),
            ended_timers: state.ended_timers.clone(),
            error: state.error.clone(),
        },
        Event::EndTimer(timer) => {
            let mut ended_timers = state.ended_timers.clone();
            ended_timers.insert(0, *timer);
            State {
                next_id: state.next_id,
                new_timer: state.new_timer.clone(),
                ended_timers,
                error: None,
            }
        }
        Event::HandleError(message) => State {
            next_id: state.next_id,
            new_timer: state.new_timer.clone(),
            ended_timers: state.ended_timers.clone(),
            error: Some(message.clone()),
        },
    }
}

async fn run_timer(timer: Timer) -> Result<Timer, String> {
    if timer.delay > 60_000 {
        return Err(format!("timer {} is too long", timer.id));
    }
    tokio::time::sleep(Duration::from_millis(timer.delay)).await;
    Ok(timer)
}

#[tokio::main]
async fn main() -> relay_core::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let store = Arc::new(Store::new(State::default(), reduce));

    let timer_responder = Responder::new(
        (|s: &State| s.new_timer.clone(),),
        |timer: Option<Arc<Timer>>| match timer {
            Some(timer) => Effect::pending(run_timer(*timer)),
            None => Effect::none(),
        },
        Event::EndTimer,
        Event::HandleError,
    )
    .named("timer")
    .shared();

    let _handles = relay_core::connect(&[timer_responder], &store)?;

    let done = Arc::new(Notify::new());
    let _watch = {
        let done = done.clone();
        let weak = Arc::downgrade(&store);
        let reported = AtomicUsize::new(0);
        store.subscribe(move || {
            let Some(store) = weak.upgrade() else {
                return;
            };
            let state = store.state();
            let ended = state.ended_timers.len();
            if reported.swap(ended, Ordering::SeqCst) != ended {
                if let Some(timer) = state.ended_timers.first() {
                    println!("timer {} ended after {}ms", timer.id, timer.delay);
                }
            }
            if ended == 3 {
                done.notify_one();
            }
        })
    };

    for delay in [300, 100, 200] {
        store.dispatch(Event::StartTimer { delay });
    }

    done.notified().await;
    if let Some(error) = &store.state().error {
        eprintln!("error: {error}");
    }
    Ok(())
}
