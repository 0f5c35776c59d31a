// Copyright 2024 Flush Policy Authors. Licensed under Apache-2.0.

//! Thin CLI shell around `flush_policy`: loads a `PolicyConfig` from TOML,
//! reads a JSON snapshot of candidates and TLS stats, and prints the ranked
//! selection. The policy core itself knows nothing about files, stdin, or
//! JSON — this binary is the "embedding collaborator" around it.

use std::{
    collections::HashMap,
    fs,
    io::{self, Read},
    process,
};

use clap::{App, Arg};
use flush_policy::{
    DiskGain, FlushContext, FlushHandler, FlushStrategy, FlushTarget, MemoryGain, PolicyConfig,
    TlsStats, TlsStatsMap,
};
use serde::Deserialize;
use slog::o;

#[derive(Debug, Deserialize)]
struct TargetSnapshot {
    name: String,
    handler: String,
    #[serde(default)]
    memory_before: u64,
    #[serde(default)]
    memory_after: u64,
    #[serde(default)]
    disk_before: u64,
    #[serde(default)]
    disk_after: u64,
    #[serde(default)]
    flushed_serial: u64,
    #[serde(default)]
    last_flush_time: u64,
    #[serde(default)]
    urgent: bool,
    #[serde(default)]
    last_serial: u64,
}

#[derive(Debug, Deserialize)]
struct HandlerTlsSnapshot {
    bytes: u64,
    first_serial: u64,
    last_serial: u64,
}

#[derive(Debug, Deserialize, Default)]
struct Snapshot {
    candidates: Vec<TargetSnapshot>,
    #[serde(default)]
    tls_stats: HashMap<String, HandlerTlsSnapshot>,
}

fn init_logger() {
    use slog::Drain;
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let logger = slog::Logger::root(drain, o!());
    slog_global::set_global(logger);
}

fn load_config(path: Option<&str>) -> PolicyConfig {
    match path {
        Some(path) => {
            let contents = fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("failed to read config {}: {}", path, e);
                process::exit(1);
            });
            toml::from_str(&contents).unwrap_or_else(|e| {
                eprintln!("failed to parse config {}: {}", path, e);
                process::exit(1);
            })
        }
        None => PolicyConfig::default(),
    }
}

fn read_snapshot(path: Option<&str>) -> Snapshot {
    let raw = match path {
        Some(path) => fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("failed to read snapshot {}: {}", path, e);
            process::exit(1);
        }),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).unwrap_or_else(|e| {
                eprintln!("failed to read snapshot from stdin: {}", e);
                process::exit(1);
            });
            buf
        }
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        eprintln!("failed to parse snapshot: {}", e);
        process::exit(1);
    })
}

fn main() {
    let matches = App::new("flush-policy-cli")
        .version("0.1.0")
        .about("Evaluates flush target selection against a candidate snapshot")
        .arg(
            Arg::with_name("config")
                .short("C")
                .long("config")
                .value_name("FILE")
                .help("TOML policy configuration; defaults are used if omitted")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("snapshot")
                .short("s")
                .long("snapshot")
                .value_name("FILE")
                .help("JSON candidate/TLS snapshot; read from stdin if omitted")
                .takes_value(true),
        )
        .get_matches();

    init_logger();

    let config = load_config(matches.value_of("config"));
    let snapshot = read_snapshot(matches.value_of("snapshot"));

    let handlers: HashMap<String, FlushHandler> = snapshot
        .candidates
        .iter()
        .map(|c| (c.handler.clone(), FlushHandler::new(c.handler.clone())))
        .collect();
    let targets: Vec<(String, FlushTarget, u64)> = snapshot
        .candidates
        .iter()
        .map(|c| {
            let target = FlushTarget::new(c.name.clone())
                .with_memory_gain(MemoryGain::new(c.memory_before, c.memory_after))
                .with_disk_gain(DiskGain::new(c.disk_before, c.disk_after))
                .with_flushed_serial(c.flushed_serial)
                .with_last_flush_time(c.last_flush_time)
                .with_urgent(c.urgent);
            (c.handler.clone(), target, c.last_serial)
        })
        .collect();
    let candidates: Vec<FlushContext<'_>> = targets
        .iter()
        .map(|(handler_name, target, last_serial)| {
            FlushContext::new(&handlers[handler_name], target, *last_serial)
        })
        .collect();

    let tls_stats: TlsStatsMap = snapshot
        .tls_stats
        .into_iter()
        .map(|(handler, s)| {
            (
                handler,
                TlsStats::new(s.bytes, s.first_serial, s.last_serial),
            )
        })
        .collect();

    let strategy = FlushStrategy::new(config).unwrap_or_else(|e| {
        eprintln!("invalid config: {}", e);
        process::exit(1);
    });
    let ranked = strategy.select(&candidates, &tls_stats);
    let names: Vec<&str> = ranked.iter().map(|c| c.name()).collect();
    println!("{}", serde_json::to_string_pretty(&names).unwrap());
}
