//! Cost of calling a responder when nothing changed, which is what every
//! store notification pays for every connected responder.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use relay_core::reactive::{Dispatcher, Effect, Responder};

struct State {
    user: u64,
    filter: Arc<Vec<String>>,
}

fn unchanged_call(c: &mut Criterion) {
    let responder = Responder::new(
        (|s: &State| s.user, |s: &State| s.filter.clone()),
        |_: u64, _: Arc<Vec<String>>| Effect::<(), ()>::ok(()),
        |_: ()| (),
        |_: ()| (),
    );
    let dispatch = Dispatcher::new(|_: ()| {});
    let state = State {
        user: 7,
        filter: Arc::new(vec!["open".to_string()]),
    };

    // Prime the selector so every measured call is a no-op
    let _ = responder.call(&state, &dispatch);

    c.bench_function("responder_call_unchanged", |b| {
        b.iter(|| black_box(responder.call(black_box(&state), &dispatch).is_noop()))
    });
}

criterion_group!(benches, unchanged_call);
criterion_main!(benches);
