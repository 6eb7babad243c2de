use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use rasterfir_filter::{
    filter::{kernels::Kernel2D, GaussianFilter, GaussianFilterSeparable, VectorMedianFilter},
    ExecutionStrategy, Filter, FilterParams,
};
use rasterfir_image::Image;

fn bench_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("Gaussian Blur");

    for (width, height) in [(256, 224), (512, 448), (1024, 896)].iter() {
        for sigma in [0.5, 1.0, 2.0].iter() {
            let kernel_size = Kernel2D::gaussian(*sigma, *sigma).unwrap().width();
            group.throughput(criterion::Throughput::Elements(
                (*width * *height * kernel_size) as u64,
            ));

            let parameter_string = format!("{}x{}x{}", width, height, kernel_size);

            let image_size = [*width, *height].into();
            let image_u8 = Image::<u8, 3>::from_size_val(image_size, 0).unwrap();
            let image_f32 = Image::<f32, 3>::from_size_val(image_size, 0.0).unwrap();

            group.bench_with_input(
                BenchmarkId::new("gaussian_separable_u8", &parameter_string),
                &image_u8,
                |b, i| {
                    let mut filter = GaussianFilterSeparable::new(*sigma).unwrap();
                    let mut img = i.clone();
                    b.iter(|| black_box(filter.apply_to(&mut img)))
                },
            );

            group.bench_with_input(
                BenchmarkId::new("gaussian_separable_f32", &parameter_string),
                &image_f32,
                |b, i| {
                    let mut filter = GaussianFilterSeparable::new(*sigma).unwrap();
                    let mut img = i.clone();
                    b.iter(|| black_box(filter.apply_to(&mut img)))
                },
            );

            group.bench_with_input(
                BenchmarkId::new("gaussian_full_f32", &parameter_string),
                &image_f32,
                |b, i| {
                    let mut filter = GaussianFilter::new(*sigma).unwrap();
                    let mut img = i.clone();
                    b.iter(|| black_box(filter.apply_to(&mut img)))
                },
            );

            group.bench_with_input(
                BenchmarkId::new("gaussian_separable_serial_f32", &parameter_string),
                &image_f32,
                |b, i| {
                    let mut filter = GaussianFilterSeparable::new(*sigma).unwrap();
                    let params = FilterParams {
                        execution: ExecutionStrategy::Serial,
                        ..Default::default()
                    };
                    let mut img = i.clone();
                    b.iter(|| black_box(filter.apply_to_with(&mut img, &params)))
                },
            );
        }
    }

    group.finish();
}

fn bench_median(c: &mut Criterion) {
    let mut group = c.benchmark_group("Vector Median");
    group.sample_size(10);

    for radius in [1.0, 2.0, 3.0].iter() {
        let image = Image::<u8, 3>::from_size_val([256, 224].into(), 0).unwrap();
        group.bench_with_input(
            BenchmarkId::new("vector_median_u8", radius),
            &image,
            |b, i| {
                let mut filter = VectorMedianFilter::new(*radius).unwrap();
                let mut img = i.clone();
                b.iter(|| black_box(filter.apply_to(&mut img)))
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_filters, bench_median);
criterion_main!(benches);
