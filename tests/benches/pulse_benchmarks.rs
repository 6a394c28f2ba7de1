//! # Pulse Benchmarks
//!
//! | Area | Operation | Target |
//! |------|-----------|--------|
//! | shared-bus | publish to N listeners | < 1µs per listener |
//! | shared-bus | typed publish (serialise + decode) | < 5µs |
//! | pf-02 | longest-prefix route match | < 1µs |
//! | pf-01 | cached resolve | < 1µs |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pf_01_remote_registry::{BundledFetcher, RemoteModuleRegistry, RemoteRegistryApi};
use pf_02_composition_host::RouteTable;
use shared_bus::{EventBus, EventPublisher, Topic};
use shared_types::{FragmentName, RemoteDescriptor, WorkoutLogged};
use shell_runtime::fragments;

// ============================================================================
// Event Bus
// ============================================================================

fn bench_bus_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("shared-bus");
    group.measurement_time(Duration::from_secs(5));

    let payload = json!({ "exercise": "Squats", "sets": 3, "reps": 10 });

    for listeners in [1usize, 8, 64, 256] {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicU64::new(0));
        let _subs: Vec<_> = (0..listeners)
            .map(|_| {
                let hits = hits.clone();
                bus.subscribe(Topic::WorkoutLogged, move |_| {
                    hits.fetch_add(1, Ordering::Relaxed);
                    Ok(())
                })
            })
            .collect();

        group.throughput(Throughput::Elements(listeners as u64));
        group.bench_with_input(
            BenchmarkId::new("publish_fan_out", listeners),
            &listeners,
            |b, _| b.iter(|| bus.publish(Topic::WorkoutLogged, black_box(&payload))),
        );
    }

    let bus = EventBus::new();
    let _sub = bus.subscribe_typed(Topic::WorkoutLogged, |w: WorkoutLogged| {
        black_box(w.sets);
        Ok(())
    });
    let workout = WorkoutLogged::new("Squats", 3, 10);
    group.bench_function("publish_typed_round_trip", |b| {
        b.iter(|| bus.publish_typed(Topic::WorkoutLogged, black_box(&workout)))
    });

    group.finish();
}

// ============================================================================
// Route matching
// ============================================================================

fn bench_route_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("pf-02-composition-host");

    let routes: Vec<(String, String)> = (0..32)
        .map(|i| (format!("/section-{i}"), format!("remote-{i}")))
        .chain([
            ("/workout".to_string(), "workout".to_string()),
            ("/workout/history".to_string(), "history".to_string()),
        ])
        .collect();
    let table = match RouteTable::new(routes) {
        Ok(table) => table,
        Err(e) => panic!("route table: {e}"),
    };

    group.bench_function("resolve_nested_prefix", |b| {
        b.iter(|| table.resolve(black_box("/workout/history/2026?page=2")))
    });
    group.bench_function("resolve_miss", |b| {
        b.iter(|| table.resolve(black_box("/nowhere/at/all")))
    });

    group.finish();
}

// ============================================================================
// Registry
// ============================================================================

fn bench_cached_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("pf-01-remote-registry");

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => panic!("tokio runtime: {e}"),
    };
    let registry = RemoteModuleRegistry::new(
        [RemoteDescriptor::new(
            "workout",
            "http://localhost:4001/remoteEntry.json",
            fragments::WORKOUT_EXPORT,
        )],
        Arc::new(BundledFetcher::new(fragments::catalog())),
    );
    let workout = FragmentName::from("workout");
    if let Err(e) = runtime.block_on(registry.preload(&workout)) {
        panic!("preload: {e}");
    }

    group.bench_function("resolve_cached", |b| {
        b.iter(|| runtime.block_on(registry.resolve(black_box(&workout))))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_bus_fan_out,
    bench_route_matching,
    bench_cached_resolve
);
criterion_main!(benches);
