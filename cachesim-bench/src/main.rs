//  Copyright 2024 cachesim Project Authors
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

//! Replays one request trace through one or more cache policies and reports the outcome.

mod source;

use std::path::PathBuf;

use anyhow::anyhow;
use cachesim::prelude::*;
use clap::{Parser, ValueEnum};
use itertools::Itertools;

use crate::source::{source, SourceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
enum PolicyKind {
    Fifo,
    ProtectedFifo,
    Lru,
    Lfu,
    GlobalLfu,
    Belady,
    Noop,
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Cache capacity. (B)
    #[arg(long, default_value_t = 1000)]
    capacity: usize,

    /// Policies to compare over the identical trace. Repeat the flag for more than one.
    #[arg(long, value_enum, default_values_t = [PolicyKind::Fifo])]
    policy: Vec<PolicyKind>,

    /// Low watermark, as a fraction of the capacity.
    #[arg(long, default_value_t = 0.90)]
    low: f64,

    /// High watermark, as a fraction of the capacity.
    #[arg(long, default_value_t = 0.95)]
    high: f64,

    /// Largest object admitted by `protected-fifo`, as a fraction of the capacity.
    #[arg(long, default_value_t = 0.1)]
    limit_fraction: f64,

    #[arg(long, value_enum, default_value_t = SourceKind::Zipf)]
    source: SourceKind,

    /// Requests to replay.
    #[arg(long, default_value_t = 100_000)]
    count: usize,

    /// Issue time of the first synthetic request. (s)
    #[arg(long, default_value_t = 0.0)]
    start: f64,

    /// Time between synthetic requests. (s)
    #[arg(long, default_value_t = 1.0)]
    interval: f64,

    /// Seed of synthetic sources. Random if absent.
    #[arg(long)]
    seed: Option<u64>,

    /// For `--source csv` only.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// For `--source csv` only. Skip the first row.
    #[arg(long, default_value_t = false)]
    csv_headers: bool,

    /// For `--source constant` only.
    #[arg(long, default_value = "object")]
    key: String,

    /// Object size for `constant`, `population` and `zipf`. (B)
    #[arg(long, default_value_t = 1)]
    size: usize,

    /// Object max-age for `constant`, `population` and `zipf`. (s)
    #[arg(long, default_value_t = 3600)]
    max_age: i64,

    /// For `--source random` only. (B)
    #[arg(long, default_value_t = 2)]
    hash_len: usize,

    /// For `--source random` only. (B)
    #[arg(long, default_value_t = 1)]
    size_min: usize,

    /// For `--source random` only. (B)
    #[arg(long, default_value_t = 100)]
    size_max: usize,

    /// For `--source random` only. (s)
    #[arg(long, default_value_t = 60)]
    max_age_min: i64,

    /// For `--source random` only. (s)
    #[arg(long, default_value_t = 300)]
    max_age_max: i64,

    /// For `--source population` only. Object count.
    #[arg(long, default_value_t = 1000)]
    population: usize,

    /// For `--source population` only. Comma separated weight per object, uniform if absent.
    #[arg(long, value_delimiter = ',')]
    weights: Vec<f64>,

    /// For `--source zipf` only.
    #[arg(long, default_value_t = 10_000)]
    zipf_n: usize,

    /// For `--source zipf` only.
    #[arg(long, default_value_t = 1.0)]
    zipf_s: f64,

    /// Print the reports as json.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn init_logger() {
    use tracing_subscriber::{prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_line_number(true))
        .with(EnvFilter::from_default_env())
        .init();
}

fn eviction_config(
    policy: PolicyKind,
    args: &Args,
    requests: Option<&[Request<String>]>,
) -> anyhow::Result<EvictionConfig<String>> {
    let config = match policy {
        PolicyKind::Fifo => FifoConfig {}.into(),
        PolicyKind::ProtectedFifo => ProtectedFifoConfig {
            limit_fraction: args.limit_fraction,
        }
        .into(),
        PolicyKind::Lru => LruConfig {}.into(),
        PolicyKind::Lfu => LfuConfig {}.into(),
        PolicyKind::GlobalLfu => GlobalLfuConfig {}.into(),
        PolicyKind::Belady => {
            let requests = requests.ok_or_else(|| anyhow!("belady needs the whole trace up front"))?;
            BeladyConfig::new(collect_keys(requests)).into()
        }
        PolicyKind::Noop => NoopConfig {}.into(),
    };
    Ok(config)
}

fn text(reports: &[Report]) {
    for report in reports {
        println!("{report}");
    }
    if reports.len() < 2 {
        return;
    }

    println!();
    println!("{:20}{:>16}{:>16}{:>16}", "policy", "hit ratio", "byte hit ratio", "passes");
    for report in reports {
        println!(
            "{:20}{:>15.2}%{:>15.2}%{:>16}",
            report.name,
            report.hit_ratio * 100.0,
            report.byte_hit_ratio * 100.0,
            report.metrics.passes
        );
    }
}

fn main() -> anyhow::Result<()> {
    init_logger();

    let args = Args::parse();
    let watermark = Watermark::new(args.low, args.high)?;
    let policies = args.policy.iter().copied().unique().collect_vec();

    // Replay an identical trace to every policy, and give belady its future.
    let requests = if policies.len() > 1 || policies.contains(&PolicyKind::Belady) {
        Some(materialize(source(&args)?)?)
    } else {
        None
    };

    let mut reports = Vec::with_capacity(policies.len());
    for policy in policies {
        let config = eviction_config(policy, &args, requests.as_deref())?;
        let simulation = Simulation::new(config.name());
        let mut cache = CacheBuilder::new(args.capacity)
            .with_watermark(watermark)
            .with_eviction_config(config)
            .build()?;

        let report = match requests.as_ref() {
            Some(requests) => simulation.run(&mut cache, requests.iter().cloned().map(Ok), &mut TracingSink)?,
            None => simulation.run(&mut cache, source(&args)?, &mut TracingSink)?,
        };
        reports.push(report);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        text(&reports);
    }
    Ok(())
}
