use std::env;
use std::process::ExitCode;

use log::{debug, error, info};

use rust_ffnn::{LineFile, Network, RunConfig};

fn run() -> rust_ffnn::Result<()> {
    // A positional argument takes precedence over DATA_PATH.
    let data_arg = env::args().nth(1);
    let cfg = RunConfig::from_lookup(|key| match (key, &data_arg) {
        ("DATA_PATH", Some(path)) => Some(path.clone()),
        _ => env::var(key).ok(),
    })?;

    let mut net = Network::new_with_seed(&cfg.topology, cfg.seed)?;
    let mut source = LineFile::new(&cfg.data_path, cfg.sample_width())?;
    info!(
        "training on {} with topology {:?}",
        cfg.data_path.display(),
        cfg.topology
    );

    net.train_with(&mut source, cfg.train, |report| {
        if report.is_empty() {
            println!("epoch {}: no samples", report.epoch);
        } else {
            println!("epoch {}: mean error {:.6}", report.epoch, report.mean_error);
        }
    })?;

    if let Some(input) = &cfg.predict {
        let output = net.predict(input)?;
        for (i, y) in output.iter().enumerate() {
            println!("prediction {i}: {y:.6}");
        }
        debug!("network after prediction:\n{net}");
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
