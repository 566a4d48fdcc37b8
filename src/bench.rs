//! The benchmark driver.
//!
//! A benchmark is a group of **stages** that run one after another. Each stage parses one
//! generator pattern (see [`crate::pattern`]) and lets a number of worker threads draw from the
//! same generator concurrently, measuring how fast values are produced and what they look like.
//!
//! ## Configuration Format
//!
//! A benchmark configuration file is formatted in TOML. Each stage is defined in a dictionary
//! named `benchmark`, so the configuration of each stage starts with `[[benchmark]]`. An optional
//! `[global]` section fills in any option a stage leaves out:
//!
//! ```toml
//! [global]
//! threads = 4
//! ops = 1000000
//!
//! [[benchmark]]
//! name = "objects"
//! pattern = "z(100000,0.99)"
//!
//! [[benchmark]]
//! name = "sizes"
//! pattern = "b(4096,512,1048576,65536,0.9)"
//! latency = true
//! ```
//!
//! Available options and their usage can be found in [`BenchmarkOpt`] and [`GlobalOpt`].
//! Options can also be overridden via environment variables without changing the content in the
//! TOML file.
//!
//! Every pattern is parsed, and every stage checked, in [`init`]. A malformed pattern fails the
//! whole benchmark before any value is generated.
//!
//! ## Output Format
//!
//! All outputs are in plain text format, one line per repeat and one per stage:
//!
//! ```txt
//! stage objects repeat 0 duration 1.00 elapsed 1.00 total 4000000 mops 4.00
//! stage objects finish . duration 1.00 elapsed 1.00 total 4000000 mops 4.00 mean 812.31 stddev 2931.52 min 1 max 100000
//! ```
//!
//! Where `duration` and `elapsed` are seconds (for the stage, and since the start of the
//! benchmark), `total` is the number of values drawn by all workers and `mops` is the throughput
//! in million draws per second. The `finish` line also has the mean, standard deviation, minimum
//! and maximum of every drawn value.
//!
//! When `latency` is enabled, the `finish` line is followed on the same line by the latency of a
//! single draw:
//!
//! ```txt
//! min_us <i> max_us <a> avg_us <v> p50_us <m> p95_us <n> p99_us <p> p999_us <t>
//! ```
//!
//! When `cdf` is also enabled, the latency CDF is printed at the very end as `cdf_us percentile`
//! followed by `<us> <percentile>` tuples, up to the maximum recorded latency.

use crate::error::{Error, Result};
use crate::generator::IntGenerator;
use crate::pattern;
use crate::random::{worker_rng, Entropy};
use crate::status::{StageState, Status};
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use hdrhistogram::Histogram;
use log::{debug, info};
use parking_lot::Mutex;
use quanta::Instant;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Barrier};
use std::time::Duration;

// {{{ benchmark

/// Length determines when a stage should stop.
#[derive(Clone, Debug, PartialEq)]
enum Length {
    /// Each worker thread syncs after a timeout (e.g., 0.1s).
    Timeout(Duration),
    /// Each worker thread syncs after a number of draws (e.g., 1M draws ea.).
    Count(u64),
}

/// How the results are printed out.
/// "hidden": no results
/// "repeat": only each repeat's own metrics
/// "finish": only the finish metrics
/// "all": equals to repeat + finish
#[derive(Debug, PartialEq)]
enum ReportMode {
    Hidden,
    Repeat,
    Finish,
    All,
}

/// The configuration of a single stage deserialized from a TOML string.
///
/// The fields are optional to ease parsing from TOML, as there can be global parameters that are
/// set for them.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct BenchmarkOpt {
    /// Label used in reports and in the status snapshot.
    ///
    /// Default: `stage<N>`, `N` being the 0-based position of the stage.
    pub name: Option<String>,

    /// The generator pattern, e.g. `"z(1000,0.99)"`. Required, here or in `[global]`.
    pub pattern: Option<String>,

    /// Number of threads drawing from the shared generator.
    ///
    /// Default: 1.
    pub threads: Option<usize>,

    /// How many times this stage will be repeated.
    ///
    /// Default: 1.
    pub repeat: Option<usize>,

    /// How long each repeat runs, in seconds. Exactly one of `timeout` and `ops` must be given.
    pub timeout: Option<f32>,

    /// How many values each worker draws per repeat.
    pub ops: Option<u64>,

    /// Report mode:
    ///
    /// - "hidden": not reported.
    /// - "repeat": after each repeat, the metrics for that repeat is printed.
    /// - "finish": after all repeats are finished, the metrics of the whole stage is printed.
    /// - "all": equals to "repeat" + "finish".
    pub report: Option<String>,

    /// Whether or not to record the latency of every draw. Since measuring time is of extra cost,
    /// enabling latency measurement usually affects the throughput metrics.
    ///
    /// Default: false.
    pub latency: Option<bool>,

    /// Whether or not to print out latency CDF at the end of each stage. If this is set to
    /// `true`, `latency` must also be set to `true`.
    ///
    /// Default: false.
    pub cdf: Option<bool>,

    /// Whether worker `i` of `n` draws as position `(i + 1, n)` of a batch. With a uniform
    /// pattern this splits the range between the workers.
    ///
    /// Default: false.
    pub batch: Option<bool>,

    /// Zipfian patterns only: each worker grows its item count by this much after every draw,
    /// starting from the pattern's size.
    pub grow: Option<u64>,

    /// Zipfian patterns only: recompute the normalization when a worker asks for fewer items than
    /// the last computed count.
    ///
    /// Default: false.
    pub allow_decrease: Option<bool>,

    /// Base seed for the per-worker RNGs. Worker `i` is seeded with `seed + i`.
    ///
    /// Default: seeded from the operating system.
    pub seed: Option<u64>,
}

impl BenchmarkOpt {
    /// Internal function called after all global options are applied. This will test if the opt
    /// can be a valid stage. It does not check the pattern, as it will be checked when the
    /// generator is created.
    fn sanity(&self) -> Result<()> {
        if self.pattern.is_none() {
            return Err(Error::Benchmark("pattern should be given".to_string()));
        }
        if self.threads.unwrap_or(1) == 0 {
            return Err(Error::Benchmark(
                "threads should be positive if given".to_string(),
            ));
        }
        if self.repeat.unwrap_or(1) == 0 {
            return Err(Error::Benchmark(
                "repeat should be positive if given".to_string(),
            ));
        }
        match self.report.as_deref().unwrap_or("all") {
            "hidden" | "repeat" | "finish" | "all" => {}
            _ => {
                return Err(Error::Benchmark(
                    "report mode should be one of: hidden, repeat, finish, all".to_string(),
                ))
            }
        }
        if self.cdf == Some(true) && self.latency != Some(true) {
            return Err(Error::Benchmark(
                "when cdf is true, latency must also be true".to_string(),
            ));
        }
        match (self.timeout, self.ops) {
            (Some(_), Some(_)) => {
                return Err(Error::Benchmark(
                    "timeout and ops cannot be provided at the same time".to_string(),
                ))
            }
            (None, None) => {
                return Err(Error::Benchmark(
                    "either timeout or ops should be given".to_string(),
                ))
            }
            (Some(t), None) if !(t > 0.0) || !t.is_finite() => {
                return Err(Error::Benchmark("timeout should be positive".to_string()))
            }
            (Some(t), None) if Duration::try_from_secs_f32(t).is_err() => {
                return Err(Error::Benchmark(format!("timeout {} is too long", t)))
            }
            (None, Some(0)) => {
                return Err(Error::Benchmark("ops should be positive if given".to_string()))
            }
            _ => {}
        }
        Ok(())
    }
}

/// A ready-to-run stage, with its generator already built.
#[derive(Debug)]
pub struct Benchmark {
    name: String,
    pattern: String,
    threads: usize,
    repeat: usize,
    len: Length,
    report: ReportMode,
    latency: bool,
    cdf: bool,
    batch: bool,
    grow: Option<u64>,
    seed: Option<u64>,
    generator: IntGenerator,
}

const TIME_CHECK_INTERVAL: u64 = 32;

impl Benchmark {
    /// Build a stage from an opt whose global options are already applied.
    fn new(index: usize, opt: &BenchmarkOpt) -> Result<Self> {
        opt.sanity()?;
        let name = opt.name.clone().unwrap_or_else(|| format!("stage{}", index));
        // checked in sanity
        let pattern = opt.pattern.clone().unwrap_or_default();
        let threads = opt.threads.unwrap_or(1);
        let len = match (opt.timeout, opt.ops) {
            (Some(t), _) => Length::Timeout(
                Duration::try_from_secs_f32(t).map_err(|e| Error::Benchmark(e.to_string()))?,
            ),
            (None, Some(c)) => Length::Count(c),
            (None, None) => unreachable!("checked in sanity"),
        };
        let report = match opt.report.as_deref().unwrap_or("all") {
            "hidden" => ReportMode::Hidden,
            "repeat" => ReportMode::Repeat,
            "finish" => ReportMode::Finish,
            _ => ReportMode::All,
        };
        let batch = opt.batch.unwrap_or(false);

        let mut generator = pattern::parse(&pattern)?;
        if opt.grow.is_some() || opt.allow_decrease.is_some() {
            generator = match generator {
                IntGenerator::Zipfian(z) => IntGenerator::Zipfian(
                    z.allow_item_count_decrease(opt.allow_decrease.unwrap_or(false)),
                ),
                _ => {
                    return Err(Error::Benchmark(format!(
                        "grow and allow_decrease need a zipfian pattern, got {}",
                        pattern
                    )))
                }
            };
        }
        if batch {
            generator.check_batch(threads)?;
        }

        Ok(Self {
            name,
            pattern,
            threads,
            repeat: opt.repeat.unwrap_or(1),
            len,
            report,
            latency: opt.latency.unwrap_or(false),
            cdf: opt.cdf.unwrap_or(false),
            batch,
            grow: opt.grow,
            seed: opt.seed,
            generator,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn generator(&self) -> &IntGenerator {
        &self.generator
    }

    /// Draw one value as worker `id` that has already drawn `drawn` values.
    #[inline]
    fn draw(&self, rng: &mut (impl Entropy + ?Sized), id: usize, drawn: u64) -> i64 {
        match (&self.generator, self.grow) {
            (IntGenerator::Zipfian(z), Some(step)) => {
                let count = z.items().saturating_add(drawn.saturating_mul(step));
                z.next_with_item_count(rng, count)
            }
            (g, _) if self.batch => g.next_at(rng, id + 1, self.threads),
            (g, _) => g.next(rng),
        }
    }
}

// }}} benchmark

// {{{ benchmarkgroup

/// The global options that go to the `[global]` section.
///
/// They will override missing fields in each `[[benchmark]]` section, if the corresponding option
/// is missing. For the usage of each option, please refer to [`BenchmarkOpt`].
#[derive(Deserialize, Clone, Debug, Default)]
pub struct GlobalOpt {
    pub pattern: Option<String>,
    pub threads: Option<usize>,
    pub repeat: Option<usize>,
    pub timeout: Option<f32>,
    pub ops: Option<u64>,
    pub report: Option<String>,
    pub latency: Option<bool>,
    pub cdf: Option<bool>,
    pub batch: Option<bool>,
    pub grow: Option<u64>,
    pub allow_decrease: Option<bool>,
    pub seed: Option<u64>,
}

impl GlobalOpt {
    fn apply(&self, opt: &mut BenchmarkOpt) {
        opt.pattern = opt.pattern.clone().or_else(|| self.pattern.clone());
        opt.threads = opt.threads.or(self.threads);
        opt.repeat = opt.repeat.or(self.repeat);
        // the stop rule is taken as a whole, so that a stage's ops is not mixed with a global
        // timeout
        if opt.timeout.is_none() && opt.ops.is_none() {
            opt.timeout = self.timeout;
            opt.ops = self.ops;
        }
        opt.report = opt.report.clone().or_else(|| self.report.clone());
        opt.latency = opt.latency.or(self.latency);
        opt.cdf = opt.cdf.or(self.cdf);
        opt.batch = opt.batch.or(self.batch);
        opt.grow = opt.grow.or(self.grow);
        opt.allow_decrease = opt.allow_decrease.or(self.allow_decrease);
        opt.seed = opt.seed.or(self.seed);
    }
}

/// The configuration of a group of stage(s). It has a global option that could possibly
/// override stage-local options.
#[derive(Deserialize, Clone, Debug)]
struct BenchmarkGroupOpt {
    /// Global parameters (optional)
    global: Option<GlobalOpt>,

    /// Array of the parameters of consisting stage(s)
    benchmark: Vec<BenchmarkOpt>,
}

// }}} benchmarkgroup

// {{{ bencher

/// Parse a benchmark configuration into ready-to-run stages.
pub fn init(text: &str) -> Result<Vec<Arc<Benchmark>>> {
    let opt: BenchmarkGroupOpt = Figment::new()
        .merge(Toml::string(text))
        .merge(Env::raw())
        .extract()?;
    debug!(
        "Creating benchmark group with the following configurations: {:?}",
        opt
    );
    let global = opt.global.clone().unwrap_or_default();
    let mut bopts: Vec<BenchmarkOpt> = opt.benchmark.clone();
    for bopt in bopts.iter_mut() {
        global.apply(bopt);
    }
    debug!("Global options applied to stages: {:?}", bopts);
    bopts
        .iter()
        .enumerate()
        .map(|(i, o)| Benchmark::new(i, o).map(Arc::new))
        .collect()
}

/// Read a benchmark configuration file and parse it with [`init`].
pub fn init_file(path: &str) -> Result<Vec<Arc<Benchmark>>> {
    let text = std::fs::read_to_string(path)?;
    init(&text)
}

fn bench_stage_should_break(len: &Length, count: u64, start: &Instant) -> bool {
    match len {
        Length::Count(c) => count >= *c,
        // only checks after a certain interval
        Length::Timeout(duration) => {
            count % TIME_CHECK_INTERVAL == 0 && Instant::now().duration_since(*start) >= *duration
        }
    }
}

/// A per-worker counter for each repeat in the same stage. Using [`AtomicU64`] here makes the
/// measurement `Sync` + `Send` so it can be freely read by the thread that aggregates the overall
/// measurement while the worker keeps updating it.
struct Counter(AtomicU64);

impl Counter {
    fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    fn read(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    fn write(&self, value: u64) {
        self.0.store(value, Ordering::Relaxed)
    }
}

/// A per-worker latency collector. This is only accessed and collected at the end of each stage.
struct Latency {
    /// Latency histogram in ns
    hdr: Histogram<u64>,
}

impl Latency {
    fn new() -> Self {
        // 3 significant digits is always a valid precision
        let hdr = Histogram::new(3).unwrap_or_else(|e| panic!("invalid histogram: {}", e));
        Self { hdr }
    }

    fn record(&mut self, duration: Duration) {
        let ns = duration.as_nanos() as u64;
        self.hdr.saturating_record(ns);
    }

    fn merge(&mut self, other: &Latency) {
        assert!(self.hdr.add(&other.hdr).is_ok());
    }
}

/// Running statistics of the drawn values.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Summary {
    count: u64,
    sum: f64,
    sq: f64,
    min: i64,
    max: i64,
}

impl Summary {
    fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            sq: 0.0,
            min: i64::MAX,
            max: i64::MIN,
        }
    }

    #[inline]
    fn record(&mut self, value: i64) {
        let v = value as f64;
        self.count += 1;
        self.sum += v;
        self.sq += v * v;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    fn merge(&mut self, other: &Summary) {
        self.count += other.count;
        self.sum += other.sum;
        self.sq += other.sq;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f64
    }

    fn stddev(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let mean = self.mean();
        (self.sq / self.count as f64 - mean * mean).max(0.0).sqrt()
    }
}

/// The main metrics for each worker thread in the same stage.
struct Measurement {
    /// Per-repeat counters. This value is actively updated by the worker and loosely evaluated by
    /// the main thread.
    counters: Vec<Counter>,

    /// Per-worker latency metrics, shared among all repeats and merged at the end of a stage.
    latency: Mutex<Latency>,

    /// Per-worker value statistics, shared among all repeats and merged at the end of a stage.
    summary: Mutex<Summary>,

    /// The duration of each repeat that is measured by the corresponding worker thread. It is only
    /// updated once after a repeat is really done. In a time-limited run, the master thread will
    /// try to access the duration. If an entry exists, it means the thread has finished execution,
    /// so the master will directly use the time duration observed by the worker. If an entry is
    /// not here, the time will be observed by the master.
    durations: Vec<Mutex<Option<Duration>>>,
}

impl Measurement {
    fn new(repeat: usize) -> Self {
        let counters = (0..repeat).map(|_| Counter::new()).collect();
        let latency = Mutex::new(Latency::new());
        let summary = Mutex::new(Summary::new());
        let durations = (0..repeat).map(|_| Mutex::new(None)).collect();
        Self {
            counters,
            latency,
            summary,
            durations,
        }
    }
}

struct WorkerContext {
    /// The stage that the current work is referring to
    benchmark: Arc<Benchmark>,

    /// The very beginning of all stages in a group, for calculating elapsed timestamp
    since: Instant,

    /// The measurement of all worker threads. One worker typically only needs to refer to one of
    /// them, and the master thread (thread.id == 0) will aggregate the metrics and make an output
    measurements: Arc<Vec<Measurement>>,

    /// Barrier that syncs all workers
    barrier: Arc<Barrier>,

    /// `(worker_id, nr_threads)` pair, used to determine the identity of a worker
    thread_info: (usize, usize),
}

fn pin(core: usize) {
    if let Some(cores) = core_affinity::get_core_ids() {
        if !cores.is_empty() {
            core_affinity::set_for_current(cores[core % cores.len()]);
        }
    }
}

fn bench_stat_repeat(
    benchmark: &Benchmark,
    repeat: usize,
    since: Instant,
    start: Instant,
    end: Instant,
    measurements: &[Measurement],
) {
    let mut throughput = 0.0f64;
    let mut total = 0u64;
    for m in measurements.iter() {
        let d = match *m.durations[repeat].lock() {
            Some(d) => d,
            None => {
                // only applies to time-limited stages
                assert!(matches!(benchmark.len, Length::Timeout(_)));
                start.elapsed()
            }
        };
        let ops = m.counters[repeat].read();
        let tput = ops as f64 / d.as_secs_f64() / 1_000_000.0;
        total += ops;
        throughput += tput;
    }

    let duration = (end - start).as_secs_f64();
    let elapsed = (end - since).as_secs_f64();

    if benchmark.report == ReportMode::Repeat || benchmark.report == ReportMode::All {
        println!(
            "stage {} repeat {} duration {:.2} elapsed {:.2} total {} mops {:.2}",
            benchmark.name, repeat, duration, elapsed, total, throughput,
        );
    }
}

fn bench_stat_final(
    benchmark: &Benchmark,
    since: Instant,
    start: Instant,
    end: Instant,
    measurements: &[Measurement],
) -> Summary {
    let mut total = 0u64;
    let mut latency = Latency::new();
    let mut summary = Summary::new();
    for m in measurements.iter() {
        for c in m.counters.iter() {
            total += c.read();
        }
        latency.merge(&m.latency.lock());
        summary.merge(&m.summary.lock());
    }

    let duration = (end - start).as_secs_f64();
    let elapsed = (end - since).as_secs_f64();

    let throughput = total as f64 / duration / 1_000_000.0;

    if benchmark.report == ReportMode::Finish || benchmark.report == ReportMode::All {
        print!(
            "stage {} finish . duration {:.2} elapsed {:.2} total {} mops {:.2} \
             mean {:.2} stddev {:.2} min {} max {}",
            benchmark.name,
            duration,
            elapsed,
            total,
            throughput,
            summary.mean(),
            summary.stddev(),
            summary.min,
            summary.max,
        );
        if benchmark.latency {
            print!(" ");
            assert_eq!(total, latency.hdr.len());
            let hdr = &latency.hdr;
            print!(
                "min_us {:.2} max_us {:.2} avg_us {:.2} \
                 p50_us {:.2} p95_us {:.2} p99_us {:.2} p999_us {:.2}",
                hdr.min() as f64 / 1000.0,
                hdr.max() as f64 / 1000.0,
                hdr.mean() / 1000.0,
                hdr.value_at_quantile(0.50) as f64 / 1000.0,
                hdr.value_at_quantile(0.95) as f64 / 1000.0,
                hdr.value_at_quantile(0.99) as f64 / 1000.0,
                hdr.value_at_quantile(0.999) as f64 / 1000.0,
            );
            if benchmark.cdf {
                print!(" cdf_us percentile ");
                let mut cdf = 0;
                for v in latency.hdr.iter_linear(1000) {
                    let ns = v.value_iterated_to();
                    let us = (ns + 1) / 1000;
                    cdf += v.count_since_last_iteration();
                    print!("{} {:.2}", us, cdf as f64 * 100.0 / total as f64);
                    if ns >= hdr.max() {
                        break;
                    }
                    print!(" ");
                }
            }
        }

        println!();
    }

    summary
}

fn bench_worker(context: WorkerContext) -> Option<Summary> {
    let WorkerContext {
        benchmark,
        since,
        measurements,
        barrier,
        thread_info,
    } = context;

    let id = thread_info.0;
    pin(id);

    // if record latency, take the lock guard of the latency counter until all repeats are done
    let mut latency = match benchmark.latency {
        true => Some(measurements[id].latency.lock()),
        false => None,
    };
    let mut summary = measurements[id].summary.lock();

    let mut rng = worker_rng(benchmark.seed, id);
    // draws across all repeats, which drives the item count when the universe grows
    let mut drawn = 0u64;
    let start = Instant::now(); // for thread 0
    for i in 0..benchmark.repeat {
        let counter = &measurements[id].counters[i];
        let mut count = 0u64;
        // start the repeat at roughly the same time
        barrier.wait();
        let start = Instant::now();
        loop {
            let value = match latency {
                Some(ref mut l) => {
                    let t = Instant::now();
                    let value = benchmark.draw(&mut rng, id, drawn);
                    l.record(Instant::now() - t);
                    value
                }
                None => benchmark.draw(&mut rng, id, drawn),
            };
            summary.record(value);
            drawn += 1;
            count += 1;
            counter.write(count);
            if bench_stage_should_break(&benchmark.len, count, &start) {
                break;
            }
        }

        // after the execution, counter is up-to-date, so it's time to update duration
        let end = Instant::now();
        *measurements[id].durations[i].lock() = Some(end.duration_since(start));

        // for count-limited stages, sync first to make sure that all threads have finished
        // if a stage is time limited, loosely evaluate the metrics
        if !matches!(benchmark.len, Length::Timeout(_)) {
            barrier.wait();
        }

        // master is 0, it will aggregate data and print info inside this call
        if id == 0 {
            bench_stat_repeat(&benchmark, i, since, start, end, &measurements);
        }
    }

    drop(latency);
    drop(summary);

    // every thread will sync on this
    barrier.wait();

    if id == 0 {
        let end = Instant::now();
        return Some(bench_stat_final(&benchmark, since, start, end, &measurements));
    }
    None
}

fn bench_stage(benchmark: Arc<Benchmark>, since: Instant) -> Result<Summary> {
    let barrier = Arc::new(Barrier::new(benchmark.threads));
    let measurements: Arc<Vec<Measurement>> = Arc::new(
        (0..benchmark.threads)
            .map(|_| Measurement::new(benchmark.repeat))
            .collect(),
    );
    let mut handles = Vec::new();
    for t in 0..benchmark.threads {
        let context = WorkerContext {
            benchmark: benchmark.clone(),
            since,
            measurements: measurements.clone(),
            barrier: barrier.clone(),
            thread_info: (t, benchmark.threads),
        };
        handles.push(std::thread::spawn(move || bench_worker(context)));
    }

    let mut summary = None;
    for handle in handles {
        match handle.join() {
            Ok(Some(s)) => summary = Some(s),
            Ok(None) => {}
            Err(_) => {
                return Err(Error::Benchmark(format!(
                    "a worker of stage {} panicked",
                    benchmark.name
                )))
            }
        }
    }
    summary.ok_or_else(|| Error::Benchmark(format!("stage {} reported nothing", benchmark.name)))
}

/// Run all stages in order, keeping `status` up to date. Stops at the first failed stage.
pub fn run(phases: &[Arc<Benchmark>], status: &Status) -> Result<()> {
    debug!("Running {} stage(s)", phases.len());
    let since = Instant::now();
    for (i, p) in phases.iter().enumerate() {
        info!(
            "Stage {} ({}) starts with {} thread(s), pattern {}",
            i,
            p.name,
            p.threads,
            p.pattern
        );
        status.set(i, StageState::Running);
        match bench_stage(p.clone(), since) {
            Ok(summary) => {
                debug!("Stage {} finished: {:?}", p.name, summary);
                status.set(i, StageState::Completed);
            }
            Err(e) => {
                status.set(i, StageState::Failed);
                return Err(e);
            }
        }
    }
    Ok(())
}

/// The status tracker matching `phases`, all stages waiting.
pub fn status(phases: &[Arc<Benchmark>]) -> Status {
    let names: Vec<&str> = phases.iter().map(|p| p.name()).collect();
    Status::new("w1", &names)
}

// }}} bencher

// {{{ tests


// }}} tests
