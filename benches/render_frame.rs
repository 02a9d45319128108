//! Frame render benchmark for the software rasterizer.
//! Run: cargo bench

use std::path::Path;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pixelwall::config::SceneConfig;
use pixelwall::renderer::Renderer;
use pixelwall::session::Session;

fn bench_render_frame(c: &mut Criterion) {
    let mut session = Session::new(SceneConfig::default(), Path::new("missing-font.ttf"), Some(7))
        .expect("create session");
    session.apply_fragment("color=2&interval=0&text=demo");
    session.advance_to(500);

    let mut group = c.benchmark_group("render_frame");
    group.sample_size(50);

    group.bench_function("software_1000px_midspawn", |b| {
        let mut renderer = Renderer::for_session(&session).expect("create renderer");
        b.iter(|| {
            renderer.render(&session).expect("render");
            black_box(renderer.frame_rgba())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_render_frame);
criterion_main!(benches);
