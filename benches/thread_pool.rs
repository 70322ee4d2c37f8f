use criterion::{criterion_main, BenchmarkId, Criterion, Throughput};
use env_logger::Env;
use rand::Rng;
use std::sync::Arc;
use workpool::ThreadPool;

const ARR_LEN: usize = 1_000_000;

fn random_array(len: usize) -> Arc<Vec<u64>> {
    let mut rng = rand::thread_rng();
    Arc::new((0..len).map(|_| rng.gen_range(0..1_000)).collect())
}

fn pool_sum(arr: &Arc<Vec<u64>>, pool: &ThreadPool) -> u64 {
    let threads = pool.size();
    let chunk = arr.len() / threads;

    let mut handles = Vec::with_capacity(threads);
    let mut next = 0;
    for i in 0..threads {
        let hi = if i == threads - 1 {
            arr.len()
        } else {
            next + chunk
        };
        let lo = next;
        let arr = Arc::clone(arr);
        handles.push(pool.submit(move || arr[lo..hi].iter().sum::<u64>()).unwrap());
        next = hi;
    }

    handles.into_iter().map(|h| h.wait().unwrap()).sum()
}

fn sequential_sum(c: &mut Criterion) {
    env_logger::init_from_env(Env::default().default_filter_or("error"));
    let arr = random_array(ARR_LEN);

    let mut group = c.benchmark_group("array_sum");
    group.throughput(Throughput::Elements(ARR_LEN as u64));
    group.bench_function("sequential", |b| b.iter(|| arr.iter().sum::<u64>()));
    group.finish();
}

fn pooled_sum(c: &mut Criterion) {
    let arr = random_array(ARR_LEN);

    let mut group = c.benchmark_group("array_sum");
    group.sample_size(20);
    group.throughput(Throughput::Elements(ARR_LEN as u64));
    for threads in [1, 2, 4, 8] {
        let pool = ThreadPool::new(threads).unwrap();
        group.bench_with_input(BenchmarkId::new("pool", threads), &threads, |b, _| {
            b.iter(|| pool_sum(&arr, &pool))
        });
    }
    group.finish();
}

criterion::criterion_group!(benches, sequential_sum, pooled_sum);
criterion_main!(benches);
