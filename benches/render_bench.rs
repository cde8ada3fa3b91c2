// Render Benchmarks
// Window-gradient vs per-cell-gradient painting with every cell lit

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rust8::display::{FrameBuffer, RenderConfig, RenderMode, Renderer};
use rust8::image::ProgramImage;
use rust8::vm::{Chip8, LoadError, StepError, VmHandle};
use std::hint::black_box;

/// Display with a fixed lit pattern
struct PatternVm {
    lit: fn(usize, usize) -> bool,
}

impl VmHandle for PatternVm {
    fn load(&mut self, _image: ProgramImage) -> Result<(), LoadError> {
        Ok(())
    }

    fn step(&mut self) -> Result<(), StepError> {
        Ok(())
    }

    fn is_pixel_set(&self, x: usize, y: usize) -> bool {
        (self.lit)(x, y)
    }

    fn advance_time(&mut self, _dt_seconds: f64) {}
}

/// Benchmark one rendered frame per mode
/// All cells lit is the worst case for the per-cell mode
fn bench_render_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_frame");
    group.sample_size(20);

    let patterns: [(&str, fn(usize, usize) -> bool); 2] = [
        ("all_lit", |_, _| true),
        ("checkerboard", |x, y| (x + y) % 2 == 0),
    ];

    for (name, lit) in patterns {
        let vm = PatternVm { lit };

        for mode in [RenderMode::WindowGradient, RenderMode::PerCellGradient] {
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", mode), name),
                &vm,
                |b, vm| {
                    let mut renderer = Renderer::new(RenderConfig::new(640, 320, mode));
                    let mut surface = FrameBuffer::new(640, 320);

                    b.iter(|| {
                        let stats = renderer.render(vm, &mut surface).unwrap();
                        black_box(stats);
                    });
                },
            );
        }
    }

    group.finish();
}

/// Benchmark VM steps, for scale against a frame
fn bench_vm_step(c: &mut Criterion) {
    // 6000: LD V0, 0x00; 7001: ADD V0, 1; 1202: JP 0x202
    let program = ProgramImage::new(vec![0x60, 0x00, 0x70, 0x01, 0x12, 0x02]);

    c.bench_function("vm_step_1000", |b| {
        let mut vm = Chip8::with_seed(0);
        vm.load(program.clone()).unwrap();

        b.iter(|| {
            for _ in 0..1000 {
                vm.step().unwrap();
            }
            black_box(vm.cpu().v[0]);
        });
    });
}

criterion_group!(benches, bench_render_modes, bench_vm_step);
criterion_main!(benches);
