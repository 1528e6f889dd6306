use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use orderflow::{
  ContextData, Event, EventAggregator, FlowError, Idiom, OrderService, Pipeline, StageControl, StubBehavior,
  StubOrderService,
};
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Clone, Debug, Default)]
struct BenchContext {
  counter: u64,
}

#[derive(Clone, Debug)]
struct Tick(u64);

impl Event for Tick {
  const TOPIC: &'static str = "bench.tick";
}

fn create_increment_handler() -> orderflow::Handler<BenchContext, FlowError> {
  Box::new(move |ctx: ContextData<BenchContext>| {
    Box::pin(async move {
      ctx.write().counter += 1;
      Ok(StageControl::Continue)
    })
  })
}

// One full order run per iteration, stub latency zero.
fn bench_idioms(c: &mut Criterion) {
  let mut group = c.benchmark_group("OrderIdioms");
  let rt = Runtime::new().unwrap();
  let service: Arc<dyn OrderService> = Arc::new(StubOrderService::new(StubBehavior::instant()));

  for idiom in Idiom::ALL {
    let pipeline = idiom.build(service.clone()).unwrap();
    group.throughput(Throughput::Elements(1));
    group.bench_function(BenchmarkId::from_parameter(idiom), |b| {
      b.to_async(&rt).iter(|| {
        let pipeline = pipeline.clone();
        async move { criterion::black_box(pipeline.process(123).await) }
      });
    });
  }
  group.finish();
}

fn bench_stage_engine(c: &mut Criterion) {
  let mut group = c.benchmark_group("StageEngine");
  let rt = Runtime::new().unwrap();

  for num_stages in [1usize, 5, 10] {
    let names: Vec<String> = (0..num_stages).map(|i| format!("stage_{}", i)).collect();
    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut pipeline = Pipeline::<BenchContext, FlowError>::new(&name_refs);
    for name in &name_refs {
      pipeline.on(name, create_increment_handler()).unwrap();
    }
    let pipeline = Arc::new(pipeline);

    group.throughput(Throughput::Elements(num_stages as u64));
    group.bench_with_input(BenchmarkId::new("stages", num_stages), &num_stages, |b, _| {
      b.to_async(&rt).iter_batched(
        || ContextData::new(BenchContext::default()),
        |ctx| {
          let pipeline = pipeline.clone();
          async move { pipeline.run(ctx).await.unwrap() }
        },
        criterion::BatchSize::SmallInput,
      );
    });
  }
  group.finish();
}

fn bench_event_publish(c: &mut Criterion) {
  let mut group = c.benchmark_group("EventPublish");
  let rt = Runtime::new().unwrap();

  for listeners in [1usize, 10, 100] {
    let aggregator = Arc::new(EventAggregator::new());
    for _ in 0..listeners {
      aggregator.subscribe(|tick: Tick| {
        criterion::black_box(tick.0);
        futures::future::ready(())
      });
    }

    group.throughput(Throughput::Elements(listeners as u64));
    group.bench_with_input(BenchmarkId::new("listeners", listeners), &listeners, |b, _| {
      b.to_async(&rt).iter(|| {
        let aggregator = aggregator.clone();
        async move { aggregator.publish(Tick(1)).await }
      });
    });
  }
  group.finish();
}

criterion_group!(benches, bench_idioms, bench_stage_engine, bench_event_publish);
criterion_main!(benches);
