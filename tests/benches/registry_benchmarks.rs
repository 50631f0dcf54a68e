//! # DID Registry Benchmarks
//!
//! | Path | What is measured |
//! |------|------------------|
//! | Selector derivation | keccak of a function signature |
//! | Call encoding | `createDID` head/tail encoding |
//! | Table cuts | atomic `apply` over growing selector sets |
//! | Dispatch | registry → module delegation on the in-memory ledger |

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use did_registry::modules::did::CREATE_DID;
use did_registry::modules::documents::GET_DOCUMENT_OWNER;
use did_registry::prelude::*;
use rand::Rng;

const ADMIN: Address = Address::repeat_byte(0xAD);
const ALICE: Address = Address::repeat_byte(0xA1);

// ============================================================================
// Call encoding
// ============================================================================

fn bench_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("abi");

    group.bench_function("selector_from_signature", |b| {
        b.iter(|| {
            black_box(Selector::from_signature(black_box(
                "createDID(address,uint256,string)",
            )))
        })
    });

    for len in [8usize, 256, 4096] {
        let content: String = "x".repeat(len);
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(BenchmarkId::new("encode_create_did", len), &content, |b, content| {
            b.iter(|| {
                CREATE_DID
                    .encode_call(&[
                        Token::Address(ALICE),
                        Token::Uint(U256::from(500)),
                        Token::String(content.clone()),
                    ])
                    .unwrap()
            })
        });
    }

    group.finish();
}

// ============================================================================
// Selector table
// ============================================================================

fn bench_table_cuts(c: &mut Criterion) {
    let mut group = c.benchmark_group("selector_table");
    let mut rng = rand::thread_rng();

    for size in [4usize, 64, 256] {
        let selectors: Vec<Selector> = (0..size).map(|_| Selector::new(rng.gen())).collect();
        let module = Address::repeat_byte(0x01);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(
            BenchmarkId::new("add_then_remove", size),
            &selectors,
            |b, selectors| {
                b.iter(|| {
                    let mut table = SelectorTable::new();
                    table
                        .apply(&[RouteChange::Add {
                            module,
                            selectors: selectors.clone(),
                        }])
                        .ok();
                    table
                        .apply(&[RouteChange::Remove {
                            module,
                            selectors: selectors.clone(),
                        }])
                        .ok();
                    black_box(table.len())
                })
            },
        );
    }

    group.finish();
}

// ============================================================================
// Dispatch
// ============================================================================

fn wired_ledger() -> (InMemoryLedger, Address) {
    let mut ledger = InMemoryLedger::new();
    let registry = ledger.deploy(ADMIN, Arc::new(RegistryModule::default())).unwrap();
    let did = ledger.deploy(ADMIN, Arc::new(DidModuleV2)).unwrap();
    let documents = ledger.deploy(ADMIN, Arc::new(DocumentsModule)).unwrap();

    for (module, selectors) in [
        (did, DidModuleV2.selectors()),
        (documents, DocumentsModule.selectors()),
    ] {
        let data = did_registry::modules::registry::ADD_MODULE
            .encode_call(&[Token::Address(module), Token::selectors(&selectors)])
            .unwrap();
        ledger.transact(ADMIN, registry, data.as_slice()).unwrap();
    }
    (ledger, registry)
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");

    group.bench_function("create_did_via_registry", |b| {
        let (mut ledger, registry) = wired_ledger();
        let mut next = 0u64;
        b.iter(|| {
            let data = CREATE_DID
                .encode_call(&[
                    Token::Address(ALICE),
                    Token::Uint(U256::from(next)),
                    Token::String("bench".into()),
                ])
                .unwrap();
            next += 1;
            black_box(ledger.transact(ALICE, registry, data.as_slice()).unwrap())
        })
    });

    for documents in [10u64, 1_000] {
        let (mut ledger, registry) = wired_ledger();
        for id in 0..documents {
            let data = CREATE_DID
                .encode_call(&[
                    Token::Address(ALICE),
                    Token::Uint(U256::from(id)),
                    Token::String("bench".into()),
                ])
                .unwrap();
            ledger.transact(ALICE, registry, data.as_slice()).unwrap();
        }
        let query = GET_DOCUMENT_OWNER
            .encode_call(&[Token::Address(registry), Token::Uint(U256::from(documents / 2))])
            .unwrap();

        group.bench_with_input(
            BenchmarkId::new("document_owner_query", documents),
            &query,
            |b, query| {
                b.iter(|| black_box(ledger.call(ALICE, registry, query.as_slice()).unwrap()))
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_encoding, bench_table_cuts, bench_dispatch);
criterion_main!(benches);
