// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use topo_import::import::NoopRegistrar;
use topo_import::import_topology;
use topo_import::store::{MemoryStore, WriteDurability};

mod fixtures;
mod profiler;

use fixtures::{Case, TempDir};

// Benchmark identity (keep stable):
// - Group names in this file: `import.reconcile`, `import.store_io`
// - Case IDs (the string after the `/`) must remain stable across refactors so
//   results stay comparable over time.
fn benches_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("import.reconcile");

    for (case, label) in [(Case::Small, "small"), (Case::Medium, "medium")] {
        group.bench_function(format!("create_{label}"), move |b| {
            b.iter_batched(
                || (fixtures::empty_store(), fixtures::definition(case, 1)),
                |(mut store, definition)| {
                    let report = import_topology(
                        &mut store,
                        &mut NoopRegistrar,
                        definition,
                        &fixtures::options(),
                    )
                    .expect("import");
                    black_box(fixtures::checksum_report(&report))
                },
                BatchSize::SmallInput,
            )
        });

        let populated = fixtures::populated_store(case);
        let unchanged_store = populated.clone();
        group.bench_function(format!("unchanged_{label}"), move |b| {
            b.iter_batched(
                || (unchanged_store.clone(), fixtures::definition(case, 1)),
                |(mut store, definition)| {
                    let report = import_topology(
                        &mut store,
                        &mut NoopRegistrar,
                        definition,
                        &fixtures::options(),
                    )
                    .expect("import");
                    black_box(fixtures::checksum_report(&report))
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("dry_run_update_{label}"), move |b| {
            let options = fixtures::options().with_dry_run(true);
            b.iter_batched(
                || fixtures::definition(case, 2),
                |definition| {
                    let mut store = populated.clone();
                    let report =
                        import_topology(&mut store, &mut NoopRegistrar, definition, &options)
                            .expect("import");
                    black_box(fixtures::checksum_report(&report))
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn benches_store_io(c: &mut Criterion) {
    let mut group = c.benchmark_group("import.store_io");

    let store = fixtures::populated_store(Case::Medium);
    group.bench_function("save_open_medium", move |b| {
        b.iter_batched_ref(
            || TempDir::new("import_store_io_medium"),
            |tmp| {
                let path = tmp.path().join("store.json");
                store.save(&path, WriteDurability::BestEffort).expect("save store");
                let reopened = MemoryStore::open(&path).expect("open store");
                black_box(reopened.table("cc_ModuleBase").len())
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_reconcile, benches_store_io
}
criterion_main!(benches);
