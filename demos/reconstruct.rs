use rand::SeedableRng;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;

use rust_ffnn::{Activation, Init, NetworkBuilder, Samples, TrainConfig};

fn main() -> rust_ffnn::Result<()> {
    env_logger::init();

    // Task: reconstruct 4-value windows of a noisy ramp through an 8-wide bottleneck.
    let mut rng = StdRng::seed_from_u64(1);
    let noise = Uniform::new(-0.05_f32, 0.05_f32);

    let mut samples = Samples::new(4)?;
    for i in 0..64 {
        let base = (i % 16) as f32 / 16.0;
        let window: Vec<f32> = (0..4)
            .map(|k| base + 0.1 * k as f32 + noise.sample(&mut rng))
            .collect();
        samples.push(&window)?;
    }

    // 4 -> 8 -> 4 with small random biases.
    let mut net = NetworkBuilder::new(4)?
        .add_layer(8, Activation::LeakyReLU)?
        .add_layer(4, Activation::Identity)?
        .bias_init(Init::Uniform {
            low: -0.1,
            high: 0.1,
        })?
        .build_with_seed(0)?;

    let report = net.train_with(
        &mut samples,
        TrainConfig {
            epochs: 200,
            learning_rate: 0.01,
        },
        |r| {
            if r.epoch % 20 == 0 {
                println!("epoch {:>3}: mean error {:.6}", r.epoch, r.mean_error);
            }
        },
    )?;
    println!("final mean error {:.6}", report.final_error().unwrap_or(0.0));

    let probe = samples.sample(5).to_vec();
    let y = net.predict(&probe)?;
    println!("x={probe:?}\ny={y:?}");
    print!("{net}");

    Ok(())
}
