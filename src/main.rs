// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! topo-import CLI entrypoint.
//!
//! Loads a JSON store file and a target topology definition, reconciles the store with the
//! definition and writes the store back (unless `--dry-run` is given).
//!
//! Exit codes: 0 on success, 1 on errors, 2 on usage errors, 3 when deletes were blocked by
//! bound hosts.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;

use topo_import::import::NoopRegistrar;
use topo_import::model::kind::TABLE_OBJ_ASST;
use topo_import::model::{Mainline, OwnerId, TopologyDefinition};
use topo_import::store::{seed_mainline, MemoryStore, WriteDurability};
use topo_import::{import_topology, ImportOptions};

const DEFAULT_OWNER_ID: &str = "0";
const EXIT_BLOCKED: i32 = 3;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} --store <file> --target <file> [--owner <id>] [--dry-run] [--timeout-secs <n>] [--init-mainline] [--json] [--durable-writes]\n  {program} --print-schema\n\n--store is a JSON store document; a missing file starts an empty store.\n--owner sets the owner account of a business that has to be created (default {DEFAULT_OWNER_ID}).\n--init-mainline seeds the definition's mainline into a store that has none.\n--json prints the report as JSON instead of text.\n--durable-writes opts into slower, best-effort durable persistence (fsync/sync where supported).\n\nLog verbosity follows RUST_LOG (default `info`)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    store: Option<PathBuf>,
    target: Option<PathBuf>,
    owner: Option<String>,
    dry_run: bool,
    timeout_secs: Option<u64>,
    init_mainline: bool,
    json: bool,
    durable_writes: bool,
    print_schema: bool,
}

fn set_once<T>(slot: &mut Option<T>, value: T) -> Result<(), ()> {
    if slot.is_some() {
        return Err(());
    }
    *slot = Some(value);
    Ok(())
}

fn set_flag(flag: &mut bool) -> Result<(), ()> {
    if *flag {
        return Err(());
    }
    *flag = true;
    Ok(())
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--store" => set_once(&mut options.store, PathBuf::from(args.next().ok_or(())?))?,
            "--target" => set_once(&mut options.target, PathBuf::from(args.next().ok_or(())?))?,
            "--owner" => set_once(&mut options.owner, args.next().ok_or(())?)?,
            "--timeout-secs" => {
                let raw = args.next().ok_or(())?;
                let secs: u64 = raw.parse().map_err(|_| ())?;
                if secs == 0 {
                    return Err(());
                }
                set_once(&mut options.timeout_secs, secs)?;
            }
            "--dry-run" => set_flag(&mut options.dry_run)?,
            "--init-mainline" => set_flag(&mut options.init_mainline)?,
            "--json" => set_flag(&mut options.json)?,
            "--durable-writes" => set_flag(&mut options.durable_writes)?,
            "--print-schema" => set_flag(&mut options.print_schema)?,
            _ => return Err(()),
        }
    }

    if options.print_schema {
        if options != (CliOptions { print_schema: true, ..CliOptions::default() }) {
            return Err(());
        }
        return Ok(options);
    }

    if options.store.is_none() || options.target.is_none() {
        return Err(());
    }
    if options.dry_run && options.durable_writes {
        return Err(());
    }

    Ok(options)
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(options: CliOptions, store_path: &Path, target_path: &Path) -> Result<i32, Box<dyn Error>> {
    let owner_id = OwnerId::new(options.owner.as_deref().unwrap_or(DEFAULT_OWNER_ID))?;
    let definition = TopologyDefinition::load(target_path)?;
    let mut store = MemoryStore::open(store_path)?;

    if options.init_mainline && store.table(TABLE_OBJ_ASST).is_empty() {
        let mainline = Mainline::from_obj_ids(&definition.mainline)?;
        seed_mainline(&mut store, &mainline)?;
        tracing::info!(mainline = %mainline, "seeded mainline into empty store");
    }

    let mut import_options = ImportOptions::new(owner_id).with_dry_run(options.dry_run);
    if let Some(secs) = options.timeout_secs {
        import_options = import_options.with_timeout(Duration::from_secs(secs));
    }

    let report = import_topology(&mut store, &mut NoopRegistrar, definition, &import_options)?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }

    if !options.dry_run {
        let durability = if options.durable_writes {
            WriteDurability::Durable
        } else {
            WriteDurability::BestEffort
        };
        store.save(store_path, durability)?;
    }

    Ok(if report.blocked.is_empty() { 0 } else { EXIT_BLOCKED })
}

fn main() {
    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "topo-import".to_owned());

    let options = match parse_options(args) {
        Ok(options) => options,
        Err(()) => {
            print_usage(&program);
            std::process::exit(2);
        }
    };

    if options.print_schema {
        match serde_json::to_string_pretty(&TopologyDefinition::json_schema()) {
            Ok(schema) => println!("{schema}"),
            Err(err) => {
                eprintln!("topo-import: {err}");
                std::process::exit(1);
            }
        }
        return;
    }

    init_tracing();

    let (Some(store_path), Some(target_path)) = (options.store.clone(), options.target.clone())
    else {
        print_usage(&program);
        std::process::exit(2);
    };

    match run(options, &store_path, &target_path) {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("topo-import: {err}");
            std::process::exit(1);
        }
    }
}
