use clap::Parser;
use matchscore_cli::cli::{Cli, Commands};
use matchscore_cli::train::TrainOverrides;
use matchscore_cli::{probe, train};
use matchscore_model::TrainingConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut stdout = std::io::stdout();

    match cli.command {
        Commands::Train {
            config,
            data,
            model_out,
            features_out,
            target,
            test_size,
            seed,
            trees,
            max_depth,
            max_features,
            verbose,
        } => {
            init_logging(verbose);

            let overrides = TrainOverrides {
                data,
                model_out,
                features_out,
                target,
                test_size,
                seed,
                trees,
                max_depth,
                max_features,
            };
            let config = overrides.apply(TrainingConfig::load(&config)?);
            train::run(config, &mut stdout)?;
        }

        Commands::Probe { target, verbose } => {
            init_logging(verbose);
            probe::run(&target, &mut stdout).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "matchscore=debug,matchscore_model=debug,matchscore_cli=debug"
    } else {
        "matchscore=info,matchscore_model=info,matchscore_cli=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
