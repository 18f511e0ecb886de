//! Positional command dispatch for the `kmeans` binary.
//!
//! ```text
//! kmeans generate <file> <num_points> <num_dims> <num_clusters> <radius>
//! kmeans <input> <num_clusters> <max_iters> <threshold> <model_out>
//! kmeans <input> <min_k> <max_k> <max_iters> <threshold> <model_out>
//! kmeans <input> <model> <output>
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::blob::{generate_blobs, BlobConfig, Spread};
use crate::elbow::ElbowSelector;
use crate::error::{Error, Result};
use crate::io;
use crate::kmeans::ClusterEngine;
use crate::point::PointSet;

/// One invocation, decided by argument count.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Generate {
        output: PathBuf,
        num_points: usize,
        num_dims: usize,
        num_clusters: usize,
        radius: f64,
    },
    Train {
        input: PathBuf,
        num_clusters: usize,
        max_iterations: usize,
        threshold: f64,
        model_output: PathBuf,
    },
    TrainElbow {
        input: PathBuf,
        min_k: usize,
        max_k: usize,
        max_iterations: usize,
        threshold: f64,
        model_output: PathBuf,
    },
    Predict {
        input: PathBuf,
        model: PathBuf,
        output: PathBuf,
    },
}

/// Flags shared by every command.
#[derive(Clone, Copy, Debug, Default)]
pub struct RunOptions {
    /// Seed for every random draw; `None` draws one and logs it.
    pub seed: Option<u64>,
    pub spread: Spread,
}

impl Command {
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let args: Vec<&str> = args.iter().map(|a| a.as_ref()).collect();
        match args.as_slice() {
            ["generate", output, num_points, num_dims, num_clusters, radius] => {
                Ok(Command::Generate {
                    output: PathBuf::from(output),
                    num_points: number("num_points", num_points)?,
                    num_dims: positive("num_dims", num_dims)?,
                    num_clusters: positive("num_clusters", num_clusters)?,
                    radius: number("radius", radius)?,
                })
            }
            [input, num_clusters, max_iters, threshold, model_output] => Ok(Command::Train {
                input: PathBuf::from(input),
                num_clusters: positive("num_clusters", num_clusters)?,
                max_iterations: positive("max_iters", max_iters)?,
                threshold: number("threshold", threshold)?,
                model_output: PathBuf::from(model_output),
            }),
            [input, min_k, max_k, max_iters, threshold, model_output] => {
                Ok(Command::TrainElbow {
                    input: PathBuf::from(input),
                    min_k: positive("min_k", min_k)?,
                    max_k: positive("max_k", max_k)?,
                    max_iterations: positive("max_iters", max_iters)?,
                    threshold: number("threshold", threshold)?,
                    model_output: PathBuf::from(model_output),
                })
            }
            [input, model, output] => Ok(Command::Predict {
                input: PathBuf::from(input),
                model: PathBuf::from(model),
                output: PathBuf::from(output),
            }),
            _ => Err(Error::invalid(
                "arguments",
                format!("expected 3, 5 or 6 arguments, got {}", args.len()),
            )),
        }
    }
}

fn number<T>(name: &'static str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| Error::invalid(name, format!("{raw:?}: {e}")))
}

fn positive(name: &'static str, raw: &str) -> Result<usize> {
    let value: usize = number(name, raw)?;
    if value == 0 {
        return Err(Error::invalid(name, "must be at least 1"));
    }
    Ok(value)
}

pub fn run(command: &Command, options: RunOptions) -> Result<()> {
    let seed = options.seed.unwrap_or_else(rand::random);
    info!(seed, "random source seeded");
    let mut rng = StdRng::seed_from_u64(seed);

    match command {
        Command::Generate {
            output,
            num_points,
            num_dims,
            num_clusters,
            radius,
        } => {
            let config = BlobConfig {
                num_points: *num_points,
                num_dims: *num_dims,
                num_clusters: *num_clusters,
                radius: *radius,
                spread: options.spread,
            };
            let blobs = generate_blobs(&config, &mut rng)?;
            io::save_points(output, &blobs.points)?;
            info!(path = %output.display(), points = num_points, "blob dataset written");
        }
        Command::Train {
            input,
            num_clusters,
            max_iterations,
            threshold,
            model_output,
        } => {
            let points = io::load_points(input)?;
            train(&points, *num_clusters, *max_iterations, *threshold, model_output, &mut rng)?;
        }
        Command::TrainElbow {
            input,
            min_k,
            max_k,
            max_iterations,
            threshold,
            model_output,
        } => {
            let selector = ElbowSelector::new(*min_k, *max_k)?.with_seed(seed);
            let points = io::load_points(input)?;
            let report = selector.search(&points)?;
            info!(k = report.best_k, "elbow method selected cluster count");
            train(&points, report.best_k, *max_iterations, *threshold, model_output, &mut rng)?;
        }
        Command::Predict {
            input,
            model,
            output,
        } => {
            let points = io::load_points(input)?;
            let model = io::load_model(model)?;
            let mut engine = ClusterEngine::from_model(&model, &points)?;
            engine.save_predictions(output)?;
            for (cluster, count) in engine.cluster_sizes().iter().enumerate() {
                info!(cluster, count, "cluster assignment count");
            }
        }
    }
    Ok(())
}

fn train(
    points: &PointSet,
    num_clusters: usize,
    max_iterations: usize,
    threshold: f64,
    model_output: &Path,
    rng: &mut StdRng,
) -> Result<()> {
    let mut engine = ClusterEngine::new(num_clusters, points)?;
    let report = engine.fit(max_iterations, threshold, rng)?;
    let inertia = engine.inertia();
    info!(
        k = num_clusters,
        iterations = report.iterations,
        reason = ?report.reason,
        inertia,
        "training finished"
    );
    engine.save_model(model_output)
}
