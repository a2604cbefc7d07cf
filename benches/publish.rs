//! Performance benchmarks for a3s-dispatch
//!
//! Run with: cargo bench

use a3s_dispatch::{
    BusConfig, CancelFlag, Cancellable, Event, EventBus, KeyDecl, KeyResolver, Subscriber,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

#[derive(Default)]
struct CountingEvent {
    count: u64,
    cancelled: bool,
}

impl Event for CountingEvent {
    const KEY: Option<KeyDecl> = Some(KeyDecl::new("bench", "counting"));
    type Cancellation = CancelFlag;
}

impl Cancellable for CountingEvent {
    fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }
}

fn counting_bus(subscribers: usize) -> EventBus {
    let bus = EventBus::with_resolver(BusConfig::default(), Arc::new(KeyResolver::new()));
    for i in 0..subscribers {
        bus.subscribe_with_priority(
            Subscriber::infallible(|e: &mut CountingEvent| e.count += 1),
            (i % 5) as i32,
        )
        .unwrap();
    }
    bus
}

fn bench_key_resolution(c: &mut Criterion) {
    let resolver = KeyResolver::new();

    c.bench_function("KeyResolver::resolve (cached)", |b| {
        resolver.resolve::<CountingEvent>().unwrap();
        b.iter(|| black_box(resolver.resolve::<CountingEvent>().unwrap()));
    });

    c.bench_function("KeyResolver::resolve (cold)", |b| {
        b.iter(|| {
            resolver.clear();
            black_box(resolver.resolve::<CountingEvent>().unwrap())
        });
    });
}

fn bench_publish_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("publish_throughput");
    for count in [1, 10, 100] {
        let bus = counting_bus(count);
        group.bench_function(format!("{} subscribers", count), |b| {
            b.iter(|| {
                let mut event = CountingEvent::default();
                bus.publish(&mut event).unwrap();
                black_box(event.count)
            });
        });
    }
    group.finish();
}

fn bench_publish_cancelled(c: &mut Criterion) {
    let bus = counting_bus(100);

    c.bench_function("publish_cancellable (pre-cancelled, 100 subscribers)", |b| {
        b.iter(|| {
            let mut event = CountingEvent {
                cancelled: true,
                ..Default::default()
            };
            black_box(bus.publish_cancellable(&mut event).unwrap())
        });
    });
}

fn bench_subscribe_unsubscribe(c: &mut Criterion) {
    let bus = counting_bus(100);

    c.bench_function("subscribe + unsubscribe (100 subscribers)", |b| {
        b.iter(|| {
            let handler = Subscriber::infallible(|e: &mut CountingEvent| e.count += 1);
            bus.subscribe(handler.clone()).unwrap();
            bus.unsubscribe(&handler).unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_key_resolution,
    bench_publish_throughput,
    bench_publish_cancelled,
    bench_subscribe_unsubscribe,
);
criterion_main!(benches);
