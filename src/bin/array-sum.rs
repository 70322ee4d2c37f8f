use clap::{Arg, Command};
use log::info;
use std::process::exit;
use std::sync::Arc;
use workpool::{ThreadPool, Timer};

fn main() {
    env_logger::init();

    let matches = cli().get_matches();
    let size = *matches.get_one::<usize>("size").unwrap();
    info!("workpool - {}", env!("CARGO_PKG_VERSION"));
    info!("SIZE {}", size);

    let pool = match matches.get_one::<usize>("threads") {
        Some(&threads) => ThreadPool::new(threads),
        None => ThreadPool::with_default_parallelism(),
    }
    .unwrap_or_else(|e| {
        eprintln!("failed to start the pool: {}", e);
        exit(1);
    });
    info!("THREADS {}", pool.size());

    let arr: Arc<Vec<u64>> = Arc::new((0..size as u64).collect());

    let mut timer_st = Timer::new();
    timer_st.start();
    let single = arr.iter().sum::<u64>();
    timer_st.stop();

    let mut timer_mt = Timer::new();
    timer_mt.start();
    let multi = pool_sum(&arr, &pool);
    timer_mt.stop();

    if single != multi {
        eprintln!("the results differ: {} vs {}", single, multi);
        exit(1);
    }
    println!("sum: {}", multi);
    println!("single-threaded: {:?}", timer_st.elapsed());
    println!(
        "thread pool ({} workers): {:?}",
        pool.size(),
        timer_mt.elapsed()
    );
}

/// Partition the array into one chunk per worker, submit a chunk sum each
/// and add up the retrieved results.
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
        let handle = pool
            .submit(move || arr[lo..hi].iter().sum::<u64>())
            .expect("the pool rejected a chunk");
        handles.push(handle);
        next = hi;
    }

    handles
        .into_iter()
        .map(|h| h.wait().expect("a chunk sum failed"))
        .sum()
}

fn cli() -> Command {
    Command::new("array-sum")
        .about("Sum a large array sequentially and through the thread pool")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("size")
                .short('s')
                .long("size")
                .value_name("SIZE")
                .value_parser(clap::value_parser!(usize))
                .default_value("10000000")
                .help("number of integers to sum"),
        )
        .arg(
            Arg::new("threads")
                .short('t')
                .long("threads")
                .value_name("THREADS")
                .value_parser(clap::value_parser!(usize))
                .help("worker threads, defaults to hardware parallelism"),
        )
}
