use rand::{rngs::StdRng, Rng, SeedableRng};

use rasterfir_filter::{
    filter::{
        kernels::{Kernel1D, Kernel2D},
        GaussianFilterSeparable, LinearFilter, LinearFilterSeparable, VectorMedianFilter,
    },
    ExecutionStrategy, Filter, FilterEngine, FilterError, FilterParams, FilterProgress,
    NativeImage, OutOfBoundsStrategy, PixelPack, ProgressMonitor,
};
use rasterfir_image::{Image, ImageSize, IndexedImage, PackedRgbImage};

fn random_u8<const C: usize>(
    rng: &mut StdRng,
    size: ImageSize,
) -> Result<Image<u8, C>, FilterError> {
    let data = (0..size.num_pixels() * C).map(|_| rng.random::<u8>()).collect();
    Ok(Image::new(size, data)?)
}

fn random_f32<const C: usize>(
    rng: &mut StdRng,
    size: ImageSize,
) -> Result<Image<f32, C>, FilterError> {
    let data = (0..size.num_pixels() * C).map(|_| rng.random::<f32>()).collect();
    Ok(Image::new(size, data)?)
}

fn round_trip<I: NativeImage + PartialEq + std::fmt::Debug>(image: &I) -> Result<(), FilterError> {
    for strategy in [
        OutOfBoundsStrategy::Zero,
        OutOfBoundsStrategy::NearestBorder,
        OutOfBoundsStrategy::MirrorImage,
        OutOfBoundsStrategy::ThrowException,
    ] {
        let pack = PixelPack::from_image(image, strategy)?;
        let back: I = pack.to_image()?;
        assert_eq!(&back, image);
    }
    Ok(())
}

#[test]
fn test_round_trip_is_exact() -> Result<(), FilterError> {
    let mut rng = StdRng::seed_from_u64(7);
    let size = ImageSize {
        width: 13,
        height: 7,
    };

    round_trip(&random_u8::<1>(&mut rng, size)?)?;
    round_trip(&random_u8::<3>(&mut rng, size)?)?;
    round_trip(&random_f32::<4>(&mut rng, size)?)?;

    let data = (0..size.num_pixels() * 2)
        .map(|_| rng.random::<u16>())
        .collect();
    round_trip(&Image::<u16, 2>::new(size, data)?)?;

    let words = (0..size.num_pixels())
        .map(|_| 0xff00_0000 | (rng.random::<u32>() & 0x00ff_ffff))
        .collect();
    round_trip(&PackedRgbImage::new(size, words)?)?;

    let mut indexed = IndexedImage::with_gray_palette(size)?;
    indexed
        .indices_mut()
        .iter_mut()
        .for_each(|i| *i = rng.random::<u8>());
    round_trip(&indexed)?;

    Ok(())
}

#[test]
fn test_identity_kernel_leaves_image_unchanged() -> Result<(), FilterError> {
    let mut rng = StdRng::seed_from_u64(11);
    let size = ImageSize {
        width: 17,
        height: 9,
    };

    #[rustfmt::skip]
    let identity = Kernel2D::new(&[
        [0.0, 0.0, 0.0, 0.0, 0.0],
        [0.0, 0.0, 0.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0, 0.0],
    ])?;
    assert_eq!((identity.xc(), identity.yc()), (2, 1));

    let image = random_u8::<3>(&mut rng, size)?;
    let mut out = image.clone();
    // the only non-zero weight sits one row below the hot spot
    LinearFilter::new(identity).apply_to(&mut out)?;
    assert_eq!(&out.as_slice()[..size.width * 3 * 8], &image.as_slice()[size.width * 3..]);

    let centered = Kernel2D::new(&[[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]])?;

    let image = random_u8::<3>(&mut rng, size)?;
    let mut out = image.clone();
    LinearFilter::new(centered.clone()).apply_to(&mut out)?;
    assert_eq!(out, image);

    let image = random_f32::<1>(&mut rng, size)?;
    let mut out = image.clone();
    LinearFilter::new(centered).apply_to(&mut out)?;
    for (&a, &b) in out.as_slice().iter().zip(image.as_slice()) {
        approx::assert_relative_eq!(a, b, epsilon = 1e-6);
    }
    Ok(())
}

#[test]
fn test_separable_matches_full_kernel() -> Result<(), FilterError> {
    let mut rng = StdRng::seed_from_u64(42);
    let size = ImageSize {
        width: 31,
        height: 23,
    };

    let kernel_x = Kernel1D::gaussian(1.3)?;
    let kernel_y = Kernel1D::new(&[1.0, 2.0, 5.0, 2.0, 1.0, 0.5, 0.25])?;
    let kernel = Kernel2D::from_separable(&kernel_x, &kernel_y, true)?;

    for strategy in [
        OutOfBoundsStrategy::Zero,
        OutOfBoundsStrategy::NearestBorder,
        OutOfBoundsStrategy::MirrorImage,
    ] {
        let params = FilterParams {
            out_of_bounds: strategy,
            ..Default::default()
        };

        let image = random_u8::<3>(&mut rng, size)?;
        let mut separable = image.clone();
        LinearFilterSeparable::new(kernel_x.clone(), kernel_y.clone())
            .apply_to_with(&mut separable, &params)?;
        let mut full = image.clone();
        LinearFilter::new(kernel.clone()).apply_to_with(&mut full, &params)?;

        for (&a, &b) in separable.as_slice().iter().zip(full.as_slice()) {
            assert!((a as i32 - b as i32).abs() <= 1, "{a} vs {b}");
        }

        let image = random_f32::<1>(&mut rng, size)?;
        let mut separable = image.clone();
        LinearFilterSeparable::new(kernel_x.clone(), kernel_y.clone())
            .apply_to_with(&mut separable, &params)?;
        let mut full = image.clone();
        LinearFilter::new(kernel.clone()).apply_to_with(&mut full, &params)?;

        for (&a, &b) in separable.as_slice().iter().zip(full.as_slice()) {
            approx::assert_relative_eq!(a, b, epsilon = 1e-5);
        }
    }
    Ok(())
}

#[test]
fn test_rgb_equals_per_channel() -> Result<(), FilterError> {
    let mut rng = StdRng::seed_from_u64(3);
    let size = ImageSize {
        width: 20,
        height: 11,
    };
    let image = random_u8::<3>(&mut rng, size)?;

    let mut filter = GaussianFilterSeparable::with_sigmas(1.5, 0.7)?;
    let mut rgb = image.clone();
    filter.apply_to(&mut rgb)?;

    for (k, mut channel) in image.split_channels()?.into_iter().enumerate() {
        filter.apply_to(&mut channel)?;
        assert_eq!(channel, rgb.channel(k)?);
    }
    Ok(())
}

#[test]
fn test_packed_rgb_equals_interleaved_rgb() -> Result<(), FilterError> {
    let mut rng = StdRng::seed_from_u64(5);
    let size = ImageSize {
        width: 9,
        height: 8,
    };
    let image = random_u8::<3>(&mut rng, size)?;
    let words = image
        .as_slice()
        .chunks_exact(3)
        .map(|p| rasterfir_image::packed::pack_rgb(p[0], p[1], p[2]))
        .collect();
    let mut packed = PackedRgbImage::new(size, words)?;

    let mut filter = VectorMedianFilter::new(1.0)?;
    let mut rgb = image.clone();
    filter.apply_to(&mut rgb)?;
    filter.apply_to(&mut packed)?;

    for (y, row) in rgb.as_slice().chunks_exact(size.width * 3).enumerate() {
        for (x, p) in row.chunks_exact(3).enumerate() {
            assert_eq!(packed.get_rgb(x, y)?, [p[0], p[1], p[2]]);
        }
    }
    Ok(())
}

#[test]
fn test_throwing_strategy_leaves_image_untouched() -> Result<(), FilterError> {
    let mut rng = StdRng::seed_from_u64(9);
    let image = random_u8::<3>(&mut rng, [8, 6].into())?;
    let mut out = image.clone();

    let params = FilterParams {
        out_of_bounds: OutOfBoundsStrategy::ThrowException,
        ..Default::default()
    };
    let res = GaussianFilterSeparable::new(1.0)?.apply_to_with(&mut out, &params);

    assert!(matches!(res, Err(FilterError::OutOfImage(..))));
    assert_eq!(out, image);
    Ok(())
}

#[test]
fn test_serial_and_parallel_agree() -> Result<(), FilterError> {
    let mut rng = StdRng::seed_from_u64(1234);
    let image = random_f32::<3>(&mut rng, [97, 61].into())?;

    let run = |execution| -> Result<Image<f32, 3>, FilterError> {
        let mut out = image.clone();
        let params = FilterParams {
            out_of_bounds: OutOfBoundsStrategy::MirrorImage,
            execution,
        };
        GaussianFilterSeparable::new(2.0)?.apply_to_with(&mut out, &params)?;
        VectorMedianFilter::new(1.5)?.apply_to_with(&mut out, &params)?;
        Ok(out)
    };

    assert_eq!(run(ExecutionStrategy::Serial)?, run(ExecutionStrategy::Parallel)?);
    Ok(())
}

#[test]
fn test_regression_fixture() -> Result<(), FilterError> {
    let size = ImageSize {
        width: 6,
        height: 5,
    };

    #[rustfmt::skip]
    let mut image = Image::<u8, 1>::new(size, vec![
        10, 20, 30, 40, 50, 60,
        15, 25, 200, 210, 55, 65,
        12, 22, 180, 220, 52, 62,
        11, 21, 31, 41, 51, 61,
        0, 255, 128, 64, 32, 16,
    ])?;

    let kernel = Kernel2D::new(&[[1.0, 2.0, 1.0], [2.0, 4.0, 2.0], [1.0, 2.0, 1.0]])?;
    let params = FilterParams {
        out_of_bounds: OutOfBoundsStrategy::NearestBorder,
        ..Default::default()
    };
    LinearFilter::new(kernel).apply_to_with(&mut image, &params)?;

    #[rustfmt::skip]
    assert_eq!(image.as_slice(), &[
        14, 32, 62, 72, 62, 59,
        16, 53, 125, 136, 85, 61,
        15, 51, 123, 136, 85, 60,
        26, 65, 89, 81, 59, 49,
        51, 125, 116, 64, 40, 30,
    ]);
    Ok(())
}

#[test]
fn test_engine_with_progress_monitor() -> Result<(), FilterError> {
    let mut rng = StdRng::seed_from_u64(77);
    let image = random_u8::<3>(&mut rng, [64, 48].into())?;

    let progress = std::sync::Arc::new(FilterProgress::new());
    let engine = FilterEngine::with_progress(FilterParams::default(), progress.clone());
    let (tx, rx) = std::sync::mpsc::channel();
    let monitor = ProgressMonitor::with_period(
        progress.clone(),
        std::time::Duration::from_millis(1),
        move |fraction| {
            let _ = tx.send(fraction);
        },
    )?;

    let mut out = image.clone();
    engine.apply(&mut GaussianFilterSeparable::new(1.0)?, &mut out)?;
    monitor.terminate();

    // reports are only sent while filtering, never for the finished state
    assert!(rx.try_iter().all(|f| (0.0..1.0).contains(&f)));
    assert!(progress.is_finished());
    assert_eq!(progress.fraction(), 1.0);
    Ok(())
}

#[cfg(feature = "serde")]
#[test]
fn test_params_serde() -> Result<(), Box<dyn std::error::Error>> {
    let params = FilterParams {
        out_of_bounds: OutOfBoundsStrategy::MirrorImage,
        execution: ExecutionStrategy::Serial,
    };
    let json = serde_json::to_string(&params)?;
    let back: FilterParams = serde_json::from_str(&json)?;
    assert_eq!(back, params);
    Ok(())
}
