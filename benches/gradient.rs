use criterion::{Criterion, black_box, criterion_group, criterion_main};
use edge_drawing::tools::synthetic::render_disk;
use edge_drawing::utils::filters::{GaussianKernel, gaussian_blur};
use edge_drawing::utils::gradient::{DEFAULT_MAGNITUDE_THRESHOLD, GradientField, GradientOperator};
use edge_drawing::Point;

fn bench_blur(c: &mut Criterion) {
    let Ok(gray) = render_disk(1920, 1080, Point::new(960.0, 540.0), 300.0, 40, 200) else {
        return;
    };
    let kernel = GaussianKernel::default();
    c.bench_function("gaussian_5x5_1920x1080", |b| {
        b.iter(|| gaussian_blur(black_box(&gray), black_box(&kernel)))
    });
}

fn bench_sobel(c: &mut Criterion) {
    let Ok(gray) = render_disk(1920, 1080, Point::new(960.0, 540.0), 300.0, 40, 200) else {
        return;
    };
    c.bench_function("sobel_1920x1080", |b| {
        b.iter(|| {
            GradientField::compute(
                black_box(&gray),
                GradientOperator::Sobel,
                DEFAULT_MAGNITUDE_THRESHOLD,
            )
        })
    });
}

fn bench_prewitt(c: &mut Criterion) {
    let Ok(gray) = render_disk(640, 480, Point::new(320.0, 240.0), 120.0, 40, 200) else {
        return;
    };
    c.bench_function("prewitt_640x480", |b| {
        b.iter(|| {
            GradientField::compute(
                black_box(&gray),
                GradientOperator::Prewitt,
                DEFAULT_MAGNITUDE_THRESHOLD,
            )
        })
    });
}

criterion_group!(benches, bench_blur, bench_sobel, bench_prewitt);
criterion_main!(benches);
