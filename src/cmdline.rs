use crate::error::Result;
use crate::pattern::{self, Family};
use crate::random::worker_rng;
use clap::ValueHint::FilePath;
use clap::{Args, Parser, Subcommand};
use log::{debug, error};

#[derive(Args, Debug)]
struct BenchArgs {
    #[arg(short = 'b')]
    #[arg(value_hint = FilePath)]
    #[arg(help = "Path to the benchmark's TOML config file")]
    benchmark_config: String,

    #[arg(long = "status")]
    #[arg(help = "Print the final status snapshot as JSON")]
    status: bool,
}

#[derive(Args, Debug)]
struct SampleArgs {
    #[arg(short = 'p')]
    #[arg(help = "Generator pattern, e.g. z(1000,0.99)")]
    pattern: String,

    #[arg(short = 'n', default_value_t = 10)]
    #[arg(help = "Number of values to draw")]
    count: usize,

    #[arg(long = "seed")]
    #[arg(help = "Seed of the random number generator")]
    seed: Option<u64>,

    #[arg(long = "all")]
    #[arg(help = "Draw as positions 1..=ALL of a batch, in turn")]
    all: Option<usize>,
}

#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Run a benchmark")]
    Bench(BenchArgs),
    #[command(about = "Print values drawn from a pattern")]
    Sample(SampleArgs),
    #[command(about = "List all supported generator patterns")]
    List,
}

fn bench_cli(args: &BenchArgs) -> Result<()> {
    let phases = crate::bench::init_file(&args.benchmark_config)?;
    let status = crate::bench::status(&phases);
    let result = crate::bench::run(&phases, &status);
    if args.status {
        println!("{}", status.snapshot().to_json());
    }
    result
}

/// Draw `count` values from `pattern`. With `all`, the i-th draw is position `i % all + 1`.
fn sample(pattern: &str, count: usize, seed: Option<u64>, all: Option<usize>) -> Result<Vec<i64>> {
    let generator = pattern::parse(pattern)?;
    if let Some(all) = all {
        generator.check_batch(all)?;
    }
    let mut rng = worker_rng(seed, 0);
    let values = (0..count)
        .map(|i| match all {
            Some(all) => generator.next_at(&mut rng, i % all + 1, all),
            None => generator.next(&mut rng),
        })
        .collect();
    Ok(values)
}

fn sample_cli(args: &SampleArgs) -> Result<()> {
    for v in sample(&args.pattern, args.count, args.seed, args.all)? {
        println!("{}", v);
    }
    Ok(())
}

fn list_cli() {
    for f in Family::ALL {
        println!("{} {}", f.name(), f.grammar());
    }
}

/// The default command line interface.
///
/// ## Usage
///
/// To get the usage of the command line interface, users can run:
///
/// ```bash
/// distbench -h
/// ```
///
/// The interface supports three modes, `bench`, `sample` and `list`.
///
/// ### Benchmark Mode
///
/// Usage:
///
/// ```bash
/// distbench bench -b <BENCH_CONFIG> [--status]
/// ```
///
/// Where `BENCH_CONFIG` is the path to the benchmark configuration file. For its format, you can
/// refer to the documentation of [`crate::bench`]. With `--status`, the status snapshot of all
/// stages is printed as JSON after the run.
///
/// ### Sample Mode
///
/// Usage:
///
/// ```bash
/// distbench sample -p <PATTERN> [-n <COUNT>] [--seed <SEED>] [--all <ALL>]
/// ```
///
/// Prints `COUNT` (default 10) values drawn from `PATTERN`, one per line. Given a seed, the
/// output is reproducible. With `--all`, the draws cycle through batch positions `1..=ALL`.
///
/// ### List mode
///
/// Usage:
/// ``` bash
/// distbench list
/// ```
///
/// This command lists all supported families and their pattern grammar.
pub fn cmdline() {
    env_logger::init();
    let cli = Cli::parse();
    debug!("Starting distbench with args: {:?}", cli);
    let result = match cli.command {
        Commands::Bench(args) => bench_cli(&args),
        Commands::Sample(args) => sample_cli(&args),
        Commands::List => {
            list_cli();
            Ok(())
        }
    };
    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn sample_is_reproducible() {
        let a = sample("z(1000,0.8)", 1000, Some(7), None).unwrap();
        let b = sample("z(1000,0.8)", 1000, Some(7), None).unwrap();
        assert_eq!(a.len(), 1000);
        assert_eq!(a, b);
        assert!(a.iter().all(|v| (1..=1000).contains(v)));
    }

    #[test]
    fn sample_cycles_batch_positions() {
        let values = sample("u(1,9)", 300, Some(1), Some(3)).unwrap();
        for (i, v) in values.iter().enumerate() {
            let lower = (i % 3) as i64 * 3 + 1;
            assert!((lower..lower + 3).contains(v), "draw {} got {}", i, v);
        }
    }

    #[test]
    fn sample_rejects_bad_input() {
        assert!(matches!(
            sample("q(1,2)", 1, None, None),
            Err(Error::Configuration { .. })
        ));
        assert!(matches!(
            sample("u(1,2)", 1, None, Some(3)),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn bench_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.toml");
        let opt = r#"
            [[benchmark]]
            name = "tiny"
            ops = 10
            report = "hidden"
            pattern = "n(10,1)"
        "#;
        std::fs::write(&path, opt).unwrap();
        let args = BenchArgs {
            benchmark_config: path.to_str().unwrap().to_string(),
            status: true,
        };
        bench_cli(&args).unwrap();

        let args = BenchArgs {
            benchmark_config: dir.path().join("missing.toml").to_str().unwrap().to_string(),
            status: false,
        };
        assert!(matches!(bench_cli(&args), Err(Error::Io(_))));
    }

    #[test]
    fn cli_parses() {
        let cli = Cli::parse_from(["distbench", "sample", "-p", "u(1,2)", "-n", "5", "--all", "2"]);
        match cli.command {
            Commands::Sample(args) => {
                assert_eq!(args.pattern, "u(1,2)");
                assert_eq!(args.count, 5);
                assert_eq!(args.all, Some(2));
                assert_eq!(args.seed, None);
            }
            c => panic!("unexpected command {:?}", c),
        }
    }
}
