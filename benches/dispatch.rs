//! Virtual dispatch benchmarks
//!
//! Measures the cost of the override check against a plain call, and of a
//! full boundary round trip.

use std::cell::Cell;
use std::ffi::c_void;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use once_cell::sync::Lazy;
use wrapper_lib::boundary;
use wrapper_lib::dispatch::{DispatchTable, MethodIndex, Overridable};

const SCALE: MethodIndex = MethodIndex::new(1);

type ScaleFn = unsafe extern "C" fn(*mut c_void, i64) -> i64;

struct Scaler {
    calls: Cell<u64>,
}

impl Scaler {
    fn scale_base(&self, x: i64) -> i64 {
        self.calls.set(self.calls.get() + 1);
        x * 3
    }
}

unsafe extern "C" fn host_scale(_this: *mut c_void, x: i64) -> i64 {
    x * 5
}

static TABLE: Lazy<DispatchTable> = Lazy::new(|| {
    let table = DispatchTable::new("Scaler", 2);
    table.set_slot(SCALE, host_scale as ScaleFn).unwrap();
    table
});

fn scale(obj: &Overridable<Scaler>, x: i64) -> i64 {
    wrapper_lib::dispatch_virtual!(*obj, SCALE, fn(x: i64) -> i64, |base: &Scaler| base.scale_base(x))
}

fn new_scaler(overridden: bool) -> Overridable<Scaler> {
    let obj = Overridable::new(Scaler { calls: Cell::new(0) }, &TABLE);
    obj.set_flag(SCALE, overridden).unwrap();
    obj
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");

    let plain = Scaler { calls: Cell::new(0) };
    group.bench_function("direct_call", |b| b.iter(|| plain.scale_base(black_box(7))));

    for overridden in [false, true] {
        let obj = new_scaler(overridden);
        group.bench_with_input(
            BenchmarkId::new("virtual", if overridden { "host" } else { "native" }),
            &obj,
            |b, obj| b.iter(|| scale(obj, black_box(7))),
        );
    }

    group.finish();
}

fn bench_boundary(c: &mut Criterion) {
    let obj = new_scaler(true);
    let this = obj.as_opaque();

    c.bench_function("boundary_round_trip", |b| {
        b.iter(|| unsafe {
            boundary::with_instance(
                "Scaler_88_scale",
                black_box(this),
                |obj: &Overridable<Scaler>| Ok(scale(obj, 7)),
                Ok,
            )
        })
    });
}

criterion_group!(benches, bench_dispatch, bench_boundary);
criterion_main!(benches);
