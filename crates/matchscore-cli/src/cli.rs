use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "matchscore")]
#[command(author, version, about = "Train the match outcome classifier and probe a running server")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fit a random forest on a CSV and write the model and feature list
    Train {
        /// YAML training configuration; flags below override it
        #[arg(short, long, default_value = "train.yaml")]
        config: PathBuf,

        /// Input CSV
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Output path for the classifier
        #[arg(long)]
        model_out: Option<PathBuf>,

        /// Output path for the feature list
        #[arg(long)]
        features_out: Option<PathBuf>,

        /// Target column
        #[arg(long)]
        target: Option<String>,

        /// Share of each class held out for evaluation
        #[arg(long)]
        test_size: Option<f64>,

        /// Random seed for the split and the forest
        #[arg(long)]
        seed: Option<u64>,

        /// Number of trees
        #[arg(long)]
        trees: Option<usize>,

        /// Maximum tree depth
        #[arg(long)]
        max_depth: Option<usize>,

        /// Columns sampled per tree
        #[arg(long)]
        max_features: Option<usize>,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Call /health, /features and /score on a running server
    Probe {
        /// Server base URL
        #[arg(short, long, default_value = "http://127.0.0.1:8000")]
        target: String,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_defaults_to_local_server() {
        let cli = Cli::parse_from(["matchscore", "probe"]);
        match cli.command {
            Commands::Probe { target, verbose } => {
                assert_eq!(target, "http://127.0.0.1:8000");
                assert!(!verbose);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_train_overrides_are_optional() {
        let cli = Cli::parse_from(["matchscore", "train", "--trees", "50", "--seed", "7"]);
        match cli.command {
            Commands::Train {
                trees, seed, data, ..
            } => {
                assert_eq!(trees, Some(50));
                assert_eq!(seed, Some(7));
                assert!(data.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
