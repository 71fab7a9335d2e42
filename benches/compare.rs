use smallfn::space::*;
use smallfn::{DefaultConfig, MoveOnly, SmallFn};

fn main() {
    divan::main();
}

#[divan::bench]
fn smallfn_small_closure_small_space() {
    divan::black_box({
        let x = divan::black_box(1usize);
        let small: SmallFn<fn() -> usize, DefaultConfig<S1>> = SmallFn::new(move || x);
        small
    });
}

#[divan::bench]
fn smallfn_small_closure_large_space() {
    divan::black_box({
        let x = divan::black_box(1usize);
        let small: SmallFn<fn() -> usize, DefaultConfig<S64>> = SmallFn::new(move || x);
        small
    });
}

#[divan::bench]
fn smallfn_large_closure_small_space() {
    divan::black_box({
        let xs = divan::black_box([0usize; 64]);
        let large: SmallFn<fn() -> usize, DefaultConfig<S1>> = SmallFn::new(move || xs[63]);
        large
    });
}

#[divan::bench]
fn smallfn_large_closure_large_space() {
    divan::black_box({
        let xs = divan::black_box([0usize; 64]);
        let large: SmallFn<fn() -> usize, DefaultConfig<S64>> = SmallFn::new(move || xs[63]);
        large
    });
}

#[divan::bench]
fn box_small_closure() {
    divan::black_box({
        let x = divan::black_box(1usize);
        let small: Box<dyn FnMut() -> usize> = Box::new(move || x);
        small
    });
}

#[divan::bench]
fn box_large_closure() {
    divan::black_box({
        let xs = divan::black_box([0usize; 64]);
        let large: Box<dyn FnMut() -> usize> = Box::new(move || xs[63]);
        large
    });
}

#[divan::bench]
fn smallfn_call(bencher: divan::Bencher) {
    let x = divan::black_box(3usize);
    let mut f: SmallFn<fn(usize) -> usize, MoveOnly> = SmallFn::new(move |y: usize| x + y);
    bencher.bench_local(|| f.call_mut(divan::black_box(4)));
}

#[divan::bench]
fn smallfn_fn_pointer_call(bencher: divan::Bencher) {
    fn add(x: usize) -> usize {
        x + 3
    }
    let mut f = SmallFn::<fn(usize) -> usize>::from_fn(add);
    bencher.bench_local(|| f.call_mut(divan::black_box(4)));
}

#[divan::bench]
fn box_call(bencher: divan::Bencher) {
    let x = divan::black_box(3usize);
    let mut f: Box<dyn FnMut(usize) -> usize> = Box::new(move |y: usize| x + y);
    bencher.bench_local(|| f(divan::black_box(4)));
}

#[divan::bench]
fn smallfn_clone(bencher: divan::Bencher) {
    let xs = divan::black_box([1usize; 3]);
    let f: SmallFn<fn() -> usize> = SmallFn::new(move || xs.iter().sum::<usize>());
    bencher.bench_local(|| f.clone());
}
