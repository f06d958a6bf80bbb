//! Benchmarks for `RadixTree` using Divan.
//!
//! Run with: `cargo bench --bench tree`

use divan::{Bencher, black_box};
use radixtree::{AllocPolicy, Index, RadixTree};

fn main() {
    divan::main();
}

/// Dense run `0..n` spread by `stride`.
fn setup_tree(n: u64, stride: u64) -> RadixTree<u64> {
    let mut tree = RadixTree::new();
    for i in 0..n {
        let _ = tree.insert(i * stride, i);
    }
    tree
}

// =============================================================================
// Construction
// =============================================================================

#[divan::bench_group]
mod construction {
    use super::RadixTree;

    #[divan::bench]
    fn new_tree() -> RadixTree<u64> {
        RadixTree::new()
    }

    #[divan::bench]
    fn new_narrow_tree() -> RadixTree<u64, 4> {
        RadixTree::new()
    }
}

// =============================================================================
// Insert Operations
// =============================================================================

#[divan::bench_group]
mod insert {
    use super::{AllocPolicy, Bencher, Index, RadixTree, black_box, setup_tree};

    #[divan::bench]
    fn insert_single(bencher: Bencher) {
        bencher
            .with_inputs(RadixTree::<u64>::new)
            .bench_local_values(|mut tree| {
                let _ = tree.insert(black_box(42), black_box(42u64));
                tree
            });
    }

    #[divan::bench]
    fn insert_into_existing_leaf(bencher: Bencher) {
        bencher
            .with_inputs(|| setup_tree(32, 1))
            .bench_local_values(|mut tree| {
                let _ = tree.insert(black_box(40), black_box(999u64));
                tree
            });
    }

    // Insert far above the current height
    #[divan::bench(args = [1, 2, 4, 6, 8])]
    fn insert_grows_height(bencher: Bencher, levels: u32) {
        let index: Index = 1 << (6 * levels).min(63);

        bencher
            .with_inputs(|| setup_tree(16, 1))
            .bench_local_values(|mut tree| {
                let _ = tree.insert(black_box(index), black_box(1u64));
                tree
            });
    }

    #[divan::bench(args = [100, 1000, 10000])]
    fn insert_sequential(bencher: Bencher, n: u64) {
        bencher.bench_local(|| setup_tree(black_box(n), 1));
    }

    #[divan::bench(args = [100, 1000, 10000])]
    fn insert_sparse(bencher: Bencher, n: u64) {
        bencher.bench_local(|| setup_tree(black_box(n), 0x9E37_79B9));
    }

    #[divan::bench]
    fn insert_atomic_preloaded(bencher: Bencher) {
        bencher
            .with_inputs(|| {
                let mut tree = setup_tree(64, 4096);
                tree.set_policy(AllocPolicy::Atomic);
                let _ = tree.preload();
                tree
            })
            .bench_local_values(|mut tree| {
                let _ = tree.insert(black_box(1 << 40), black_box(7u64));
                tree
            });
    }
}

// =============================================================================
// Lookup Operations
// =============================================================================

#[divan::bench_group]
mod lookup {
    use super::{Bencher, RadixTree, black_box, setup_tree};

    #[divan::bench]
    fn lookup_from_empty(bencher: Bencher) {
        let tree = RadixTree::<u64>::new();
        bencher.bench_local(|| tree.lookup(black_box(12345)));
    }

    #[divan::bench(args = [100, 10000])]
    fn lookup_hit(bencher: Bencher, n: u64) {
        let tree = setup_tree(n, 3);
        bencher.bench_local(|| tree.lookup(black_box((n / 2) * 3)));
    }

    #[divan::bench(args = [100, 10000])]
    fn lookup_miss(bencher: Bencher, n: u64) {
        let tree = setup_tree(n, 3);
        bencher.bench_local(|| tree.lookup(black_box((n / 2) * 3 + 1)));
    }
}

// =============================================================================
// Delete Operations
// =============================================================================

#[divan::bench_group]
mod delete {
    use super::{Bencher, black_box, setup_tree};

    #[divan::bench]
    fn delete_keeps_leaf(bencher: Bencher) {
        bencher
            .with_inputs(|| setup_tree(64, 1))
            .bench_local_values(|mut tree| {
                let _ = tree.delete(black_box(10));
                tree
            });
    }

    #[divan::bench]
    fn delete_collapses_path(bencher: Bencher) {
        bencher
            .with_inputs(|| {
                let mut tree = setup_tree(64, 1);
                let _ = tree.insert(1 << 40, 0);
                tree
            })
            .bench_local_values(|mut tree| {
                let _ = tree.delete(black_box(1 << 40));
                tree
            });
    }
}

// =============================================================================
// Gang Lookup
// =============================================================================

#[divan::bench_group]
mod gang {
    use super::{Bencher, black_box, setup_tree};

    #[divan::bench(args = [16, 64, 256])]
    fn gang_dense(bencher: Bencher, max_items: usize) {
        let tree = setup_tree(10_000, 1);
        bencher.bench_local(|| tree.gang_lookup(black_box(100), max_items).len());
    }

    #[divan::bench(args = [16, 64, 256])]
    fn gang_sparse(bencher: Bencher, max_items: usize) {
        let tree = setup_tree(10_000, 0x1_0000);
        bencher.bench_local(|| tree.gang_lookup(black_box(0), max_items).len());
    }

    #[divan::bench]
    fn iter_all(bencher: Bencher) {
        let tree = setup_tree(10_000, 7);
        bencher.bench_local(|| tree.iter().count());
    }
}
