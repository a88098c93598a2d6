//! # Facet Router Benchmarks
//!
//! | Path | Claim | Target |
//! |------|-------|--------|
//! | Proof verification | O(depth) hashing | < 50µs at depth 16 |
//! | Manifest tree build | O(n) hashing | < 10ms for 4096 routes |
//! | Dispatch | Lookup + codehash re-check + invoke | < 50µs |
//! | Manifest preflight | O(records) | < 5ms at 1024 records |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

use facet_router::prelude::*;
use facet_router::testing::{addr, RouterFixture, STRANGER};

// ============================================================================
// Proof verification
// ============================================================================

fn bench_proof_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("proof-verification");
    group.measurement_time(Duration::from_secs(5));
    let mut rng = StdRng::seed_from_u64(42);

    for depth in [4u32, 10, 16] {
        let size = 1usize << depth;
        let leaves: Vec<Hash> = (0..size).map(|_| Hash::new(rng.gen())).collect();
        let tree = ManifestTree::from_leaves(leaves.clone());
        let root = tree.root();
        let index = rng.gen_range(0..size);
        let proof = tree.proof(index).expect("index in range");

        group.bench_with_input(BenchmarkId::new("verify", depth), &depth, |b, _| {
            b.iter(|| {
                black_box(verify(
                    black_box(leaves[index]),
                    &proof.proof,
                    proof.positions,
                    &root,
                ))
            })
        });
    }
    group.finish();
}

// ============================================================================
// Tree construction
// ============================================================================

fn bench_tree_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("manifest-tree");
    let code = code_hash(&[0x60, 0x80]);

    for size in [16usize, 256, 4096] {
        let routes: Vec<(Selector, Address, Hash)> = (0..size)
            .map(|i| (Selector::from_u32(i as u32 + 1), addr((i % 250) as u8 + 1), code))
            .collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("from_routes", size), &routes, |b, routes| {
            b.iter(|| black_box(ManifestTree::from_routes(routes).root()))
        });
    }
    group.finish();
}

// ============================================================================
// Dispatch
// ============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let fx = RouterFixture::new();
    let selector = Selector::from_u32(0xaabb_ccdd);
    let hash = fx.deploy_echo(addr(0x01), &[0x60; 512]);
    rt.block_on(fx.install(&[(selector, addr(0x01), hash)]));

    let mut group = c.benchmark_group("dispatch");
    for payload_size in [0usize, 256, 4096] {
        let payload = Bytes::from(vec![0x42; payload_size]);
        group.throughput(Throughput::Bytes(payload_size as u64));
        group.bench_with_input(BenchmarkId::new("route_echo", payload_size), &payload, |b, payload| {
            b.iter(|| {
                rt.block_on(fx.router.route(STRANGER, selector, payload.clone()))
                    .expect("dispatch succeeds")
            })
        });
    }
    group.finish();
}

// ============================================================================
// Manifest preflight
// ============================================================================

fn bench_preflight(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let fx = RouterFixture::new();
    for i in 1..=16u8 {
        fx.deploy_echo(addr(i), &[i]);
    }

    let mut group = c.benchmark_group("preflight");
    for records in [16usize, 256, 1024] {
        let data = encode_manifest(
            &(0..records)
                .map(|i| ManifestRecord {
                    selector: Selector::from_u32(i as u32 + 1),
                    facet: addr((i % 16) as u8 + 1),
                })
                .collect::<Vec<_>>(),
        );
        group.throughput(Throughput::Elements(records as u64));
        group.bench_with_input(BenchmarkId::new("preflight_manifest", records), &data, |b, data| {
            b.iter(|| {
                let verdict = rt.block_on(fx.router.preflight_manifest(data));
                assert_eq!(verdict, PreflightError::Ok);
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_proof_verification,
    bench_tree_build,
    bench_dispatch,
    bench_preflight
);
criterion_main!(benches);
