//! Compares `HybridBuffer` with `Vec` and `SmallVec` on the common operations.

use core::hint;
use criterion::{Bencher, Criterion, criterion_group, criterion_main};
use hybridvec::HybridBuffer;
use smallvec::SmallVec;
use std::sync::OnceLock;

use rand::Rng;

const SMALL_SIZE: usize = 16;
const LARGE_SIZE: usize = 40000;

/// A function used to generate a random amount of data.
///
/// Random inputs keep the compiler from specializing the benchmark bodies
/// on known sizes.
#[inline(never)]
fn gen_one(start: usize, end: usize) -> usize {
    let mut rng = rand::rng();
    rng.random_range(start..end)
}

/// The amount of data used in small data testing, fits inline.
static SMALL_BOUND: OnceLock<usize> = OnceLock::new();

/// The amount of data used in large data testing, always on the heap.
static LARGE_BOUND: OnceLock<usize> = OnceLock::new();

/// Generate an array of random content of a specified length.
#[inline(never)]
fn gen_rand(len: usize, start: u64, end: u64) -> Box<[u64]> {
    let mut rng = rand::rng();
    let mut vec: Vec<u64> = Vec::with_capacity(len);
    for _ in 0..len {
        vec.push(rng.random_range(start..end));
    }
    vec.into_boxed_slice()
}

/// The operations every benchmarked container provides.
trait VecLike {
    fn new_empty() -> Self;
    fn new_small() -> Self;
    fn new_large() -> Self;
    fn len(&self) -> usize;
    fn push(&mut self, value: u64);
    fn pop(&mut self) -> Option<u64>;
    fn insert(&mut self, index: usize, value: u64);
    fn remove(&mut self, index: usize) -> u64;
    fn get_mut(&mut self, index: usize) -> &mut u64;

    /// Brings the container to exactly `len` elements.
    ///
    /// Goes through `push` and `pop` so every container pays the same way,
    /// including `HybridBuffer` moving between its stores.
    #[inline(always)]
    fn refill(&mut self, len: usize) {
        while self.len() > len {
            self.pop();
        }
        while self.len() < len {
            self.push(0);
        }
    }
}

macro_rules! impl_vec_like {
    ($name:ty, $small:expr) => {
        impl VecLike for $name {
            #[inline(always)]
            fn new_empty() -> Self {
                <$name>::new()
            }
            #[inline(always)]
            fn new_small() -> Self {
                $small
            }
            #[inline(always)]
            fn new_large() -> Self {
                <$name>::with_capacity(LARGE_SIZE)
            }
            #[inline(always)]
            fn len(&self) -> usize {
                <$name>::len(self)
            }
            #[inline(always)]
            fn push(&mut self, value: u64) {
                <$name>::push(self, value)
            }
            #[inline(always)]
            fn pop(&mut self) -> Option<u64> {
                <$name>::pop(self)
            }
            #[inline(always)]
            fn insert(&mut self, index: usize, value: u64) {
                <$name>::insert(self, index, value);
            }
            #[inline(always)]
            fn remove(&mut self, index: usize) -> u64 {
                <$name>::remove(self, index)
            }
            #[inline(always)]
            fn get_mut(&mut self, index: usize) -> &mut u64 {
                &mut self[index]
            }
        }
    };
}

impl_vec_like!(Vec<u64>, Vec::with_capacity(SMALL_SIZE));
impl_vec_like!(SmallVec<u64, SMALL_SIZE>, SmallVec::new());
impl_vec_like!(HybridBuffer<u64, SMALL_SIZE>, HybridBuffer::new());

macro_rules! gen_bench_group {
    ($c:ident => $fn_name:ident) => {{
        let mut group_new = $c.benchmark_group(stringify!($fn_name));
        group_new.bench_function("Vec", |b| $fn_name::<Vec<u64>>(b));
        group_new.bench_function("SmallVec", |b| $fn_name::<SmallVec<u64, SMALL_SIZE>>(b));
        group_new.bench_function("HybridBuffer", |b| {
            $fn_name::<HybridBuffer<u64, SMALL_SIZE>>(b)
        });
    }};
}

fn bench_vec(c: &mut Criterion) {
    SMALL_BOUND.get_or_init(|| gen_one(14, 16));
    LARGE_BOUND.get_or_init(|| gen_one(36000, 36003));
    gen_bench_group!(c => new_empty);
    gen_bench_group!(c => new_small);
    gen_bench_group!(c => new_large);
    gen_bench_group!(c => push_small);
    gen_bench_group!(c => push_small_from_empty);
    gen_bench_group!(c => push_large);
    gen_bench_group!(c => push_large_from_empty);
    gen_bench_group!(c => pop_small);
    gen_bench_group!(c => insert_small);
    gen_bench_group!(c => insert_large);
    gen_bench_group!(c => remove_small);
    gen_bench_group!(c => remove_large);
    gen_bench_group!(c => cross_threshold);
    gen_bench_group!(c => index_small);
    gen_bench_group!(c => index_large);
}

/// Creation of an empty container, nothing is allocated.
#[inline(never)]
fn new_empty<T: VecLike>(b: &mut Bencher) {
    b.iter(|| hint::black_box(T::new_empty()));
}

/// Creation with room for 16 elements, only `Vec` allocates.
#[inline(never)]
fn new_small<T: VecLike>(b: &mut Bencher) {
    b.iter(|| hint::black_box(T::new_small()));
}

/// Creation with room for 40000 elements, every container allocates.
#[inline(never)]
fn new_large<T: VecLike>(b: &mut Bencher) {
    b.iter(|| hint::black_box(T::new_large()));
}

/// Pushes 14-15 elements into a container that already has room.
#[inline(never)]
fn push_small<T: VecLike>(b: &mut Bencher) {
    let mut vec = T::new_small();
    let data = gen_rand(*SMALL_BOUND.get().unwrap(), 0, 9999);
    let index = gen_one(0, *SMALL_BOUND.get().unwrap());

    b.iter(|| {
        let mut counter = 0u64;
        vec.refill(0);
        for item in &data {
            vec.push(*item);
        }
        counter += *vec.get_mut(index);
        hint::black_box(counter)
    });
}

/// Pushes 14-15 elements into a fresh container.
///
/// Only `Vec` allocates here.
#[inline(never)]
fn push_small_from_empty<T: VecLike>(b: &mut Bencher) {
    let data = gen_rand(*SMALL_BOUND.get().unwrap(), 0, 9999);
    let index = gen_one(0, *SMALL_BOUND.get().unwrap());

    b.iter(|| {
        let mut vec = T::new_empty();
        let mut counter = 0u64;
        for item in &data {
            vec.push(*item);
        }
        counter += *vec.get_mut(index);
        hint::black_box(counter)
    });
}

/// Pushes 36000-36002 elements into a container created with room for them.
#[inline(never)]
fn push_large<T: VecLike>(b: &mut Bencher) {
    let data = gen_rand(*LARGE_BOUND.get().unwrap(), 0, 9999);
    let index = gen_rand(10, 0, *LARGE_BOUND.get().unwrap() as _);

    b.iter(|| {
        let mut vec = T::new_large();
        let mut counter = 0u64;
        for item in &data {
            vec.push(*item);
        }
        for item in &index {
            counter += *vec.get_mut(*item as usize);
        }
        hint::black_box(counter)
    });
}

/// Pushes 36000-36002 elements into a fresh container, every container grows.
#[inline(never)]
fn push_large_from_empty<T: VecLike>(b: &mut Bencher) {
    let data = gen_rand(*LARGE_BOUND.get().unwrap(), 0, 9999);
    let index = gen_rand(10, 0, *LARGE_BOUND.get().unwrap() as _);

    b.iter(|| {
        let mut vec = T::new_empty();
        let mut counter = 0u64;
        for item in &data {
            vec.push(*item);
        }
        for item in &index {
            counter += *vec.get_mut(*item as usize);
        }
        hint::black_box(counter)
    });
}

/// Pops 14-15 elements, nothing moves between stores.
#[inline(never)]
fn pop_small<T: VecLike>(b: &mut Bencher) {
    let mut vec = T::new_small();
    let num = *SMALL_BOUND.get().unwrap();

    b.iter(|| {
        let mut counter = 0u64;
        vec.refill(num);
        for _ in 1..num {
            counter += vec.pop().unwrap_or_default();
        }
        hint::black_box(counter)
    });
}

/// Inserts into 12 elements, staying within 16.
#[inline(never)]
fn insert_small<T: VecLike>(b: &mut Bencher) {
    let mut vec = T::new_small();
    let num = *SMALL_BOUND.get().unwrap();
    let index = gen_one(0, 16);

    b.iter(|| {
        let mut counter = 0u64;
        vec.refill(12);
        vec.insert({ num + 4 } % 12, 6);
        vec.insert({ num + 7 } % 13, 7);
        vec.insert({ num + 9 } % 14, 8);
        vec.insert({ num + 14 } % 15, 11);
        counter += *vec.get_mut(index);
        hint::black_box(counter)
    });
}

/// Inserts into 36000 elements without reallocating.
#[inline(never)]
fn insert_large<T: VecLike>(b: &mut Bencher) {
    let mut vec = T::new_large();
    let num = *LARGE_BOUND.get().unwrap();
    let index = gen_one(0, 36004);

    b.iter(|| {
        let mut counter = 0u64;
        vec.refill(36000);
        vec.insert(num % 12 + 35000, 6);
        vec.insert(num % 20 + 20000, 7);
        vec.insert(num % 16 + 10000, 8);
        vec.insert(num % 13, 11);
        counter += *vec.get_mut(index);
        hint::black_box(counter)
    });
}

/// Removes from 16 elements, staying inline.
#[inline(never)]
fn remove_small<T: VecLike>(b: &mut Bencher) {
    let mut vec = T::new_small();
    let num = *SMALL_BOUND.get().unwrap();
    let index = gen_one(0, 12);

    b.iter(|| {
        let mut counter = 0u64;
        vec.refill(16);
        vec.remove({ num + 14 } % 15);
        vec.remove({ num + 9 } % 14);
        vec.remove({ num + 7 } % 13);
        vec.remove({ num + 4 } % 12);
        counter += *vec.get_mut(index);
        hint::black_box(counter)
    });
}

/// Removes from 36050 elements, staying on the heap.
#[inline(never)]
fn remove_large<T: VecLike>(b: &mut Bencher) {
    let mut vec = T::new_large();
    let num = *LARGE_BOUND.get().unwrap();
    let index = gen_one(0, 36000);

    b.iter(|| {
        let mut counter = 0u64;
        vec.refill(36050);
        vec.remove(num % 12 + 35000);
        vec.remove(num % 20 + 20000);
        vec.remove(num % 16 + 10000);
        vec.remove(num % 13);
        counter += *vec.get_mut(index);
        hint::black_box(counter)
    });
}

/// Oscillates around the inline capacity.
///
/// `HybridBuffer` moves between its stores on every round trip, the others
/// keep their heap buffer once they have one.
#[inline(never)]
fn cross_threshold<T: VecLike>(b: &mut Bencher) {
    let mut vec = T::new_empty();
    let num = *SMALL_BOUND.get().unwrap();
    let index = gen_one(0, 12);

    b.iter(|| {
        let mut counter = 0u64;
        vec.refill(num);
        for i in 0..4 {
            vec.push(i);
        }
        for _ in 0..4 {
            counter += vec.pop().unwrap_or_default();
        }
        counter += *vec.get_mut(index);
        hint::black_box(counter)
    });
}

/// Indexed writes into 16 elements.
#[inline(never)]
fn index_small<T: VecLike>(b: &mut Bencher) {
    let mut vec = T::new_small();
    vec.refill(16);

    let index = gen_one(0, 16);
    let range = gen_rand(10, 0, 16);

    b.iter(|| {
        let mut counter = 0u64;
        for item in &range {
            *vec.get_mut(*item as usize) += *item;
        }
        counter += *vec.get_mut(index);
        hint::black_box(counter)
    });
}

/// Indexed writes into 36000 elements.
#[inline(never)]
fn index_large<T: VecLike>(b: &mut Bencher) {
    let mut vec = T::new_large();
    vec.refill(36000);

    let index = gen_one(0, 36000);
    let range = gen_rand(2000, 0, 36000);

    b.iter(|| {
        let mut counter = 0u64;
        for item in &range {
            *vec.get_mut(*item as usize) += *item;
        }
        counter += *vec.get_mut(index);
        hint::black_box(counter)
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .sample_size(500)
        .warm_up_time(core::time::Duration::from_secs(3))
        .measurement_time(core::time::Duration::from_secs(12))
        .confidence_level(0.96)
        .noise_threshold(0.04);
    targets = bench_vec,
}
criterion_main!(benches);
