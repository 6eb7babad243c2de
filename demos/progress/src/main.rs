use std::{sync::Arc, time::Duration};

use argh::FromArgs;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rasterfir::{
    filter::{
        filter::{GaussianFilterSeparable, VectorMedianFilter},
        ExecutionStrategy, FilterEngine, FilterParams, FilterProgress, OutOfBoundsStrategy,
        ProgressMonitor,
    },
    image::{Image, ImageSize},
};

/// Blurs and denoises a random RGB image while reporting the progress
#[derive(Debug, FromArgs)]
struct Args {
    /// image width in pixels
    #[argh(option, default = "1920")]
    width: usize,

    /// image height in pixels
    #[argh(option, default = "1080")]
    height: usize,

    /// sigma of the gaussian blur
    #[argh(option, short = 's', default = "3.0")]
    sigma: f64,

    /// radius of the vector median filter, 0 to skip it
    #[argh(option, short = 'r', default = "2.0")]
    radius: f64,

    /// progress report period in milliseconds
    #[argh(option, short = 'p', default = "250")]
    period_ms: u64,

    /// process rows on the current thread only
    #[argh(switch)]
    serial: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let size = ImageSize {
        width: args.width,
        height: args.height,
    };
    let mut rng = StdRng::seed_from_u64(42);
    let data = (0..size.num_pixels() * 3).map(|_| rng.random::<u8>()).collect();
    let mut image = Image::<u8, 3>::new(size, data)?;

    let params = FilterParams {
        out_of_bounds: OutOfBoundsStrategy::NearestBorder,
        execution: if args.serial {
            ExecutionStrategy::Serial
        } else {
            ExecutionStrategy::Auto
        },
    };

    let progress = Arc::new(FilterProgress::new());
    let engine = FilterEngine::with_progress(params, progress.clone());
    let monitor = ProgressMonitor::with_period(
        progress,
        Duration::from_millis(args.period_ms),
        |fraction| log::info!("progress: {:.1}%", fraction * 100.0),
    )?;

    let start = std::time::Instant::now();
    engine.apply(&mut GaussianFilterSeparable::new(args.sigma)?, &mut image)?;
    log::info!("gaussian blur done in {:?}", start.elapsed());

    if args.radius > 0.0 {
        let start = std::time::Instant::now();
        engine.apply(&mut VectorMedianFilter::new(args.radius)?, &mut image)?;
        log::info!("vector median done in {:?}", start.elapsed());
    }

    monitor.terminate();

    let samples = image.as_slice();
    let mean = samples.iter().map(|&v| v as f64).sum::<f64>() / samples.len() as f64;
    let (cx, cy) = (size.width / 2, size.height / 2);
    let center = [
        *image.get_pixel(cx, cy, 0)?,
        *image.get_pixel(cx, cy, 1)?,
        *image.get_pixel(cx, cy, 2)?,
    ];
    println!(
        "filtered {} image, mean value {:.2}, center pixel {:?}",
        image.size(),
        mean,
        center
    );

    Ok(())
}
