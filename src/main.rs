use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use kcluster::cli::{run, Command, RunOptions};
use kcluster::Spread;

/// k-means clustering: generate blobs, train (fixed k or elbow search), predict.
#[derive(Parser)]
#[command(name = "kmeans")]
#[command(version)]
#[command(
    override_usage = "kmeans [OPTIONS] generate <FILE> <NUM_POINTS> <NUM_DIMS> <NUM_CLUSTERS> <RADIUS>\n       \
                      kmeans [OPTIONS] <INPUT> <NUM_CLUSTERS> <MAX_ITERS> <THRESHOLD> <MODEL_OUT>\n       \
                      kmeans [OPTIONS] <INPUT> <MIN_K> <MAX_K> <MAX_ITERS> <THRESHOLD> <MODEL_OUT>\n       \
                      kmeans [OPTIONS] <INPUT> <MODEL> <OUTPUT>"
)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Seed for all random draws (a random seed is logged when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Scatter generated blobs with a normal distribution instead of a uniform one
    #[arg(long)]
    gaussian: bool,

    /// Positional arguments, dispatched by count
    #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
    args: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let options = RunOptions {
        seed: cli.seed,
        spread: if cli.gaussian {
            Spread::Gaussian
        } else {
            Spread::Uniform
        },
    };

    let result = Command::parse(&cli.args).and_then(|command| run(&command, options));
    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
