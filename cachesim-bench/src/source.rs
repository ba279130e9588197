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

use std::path::PathBuf;

use anyhow::Context;
use cachesim::prelude::*;
use clap::ValueEnum;

use crate::Args;

/// Boxed request source.
pub type Source = Box<dyn Iterator<Item = Result<Request<String>>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Rows of `--csv`.
    Csv,
    /// `--key` repeated.
    Constant,
    /// Random keys of `--hash-len` bytes.
    Random,
    /// Weighted draws from `--population` objects.
    Population,
    /// Zipf distributed keys.
    Zipf,
}

pub fn source(args: &Args) -> anyhow::Result<Source> {
    let (start, interval) = (args.start, args.interval);
    let source: Source = match args.source {
        SourceKind::Csv => {
            let path: &PathBuf = args.csv.as_ref().context("`--source csv` requires `--csv <PATH>`")?;
            Box::new(CsvSource::new(path, args.count)?.with_headers(args.csv_headers))
        }
        SourceKind::Constant => Box::new(
            ConstantSource::new(args.key.clone(), args.size, args.max_age, args.count)
                .with_timeline(start, interval)?,
        ),
        SourceKind::Random => {
            let mut builder = RandomSource::builder(args.count)
                .with_hash_len(args.hash_len)
                .with_size_range(args.size_min..=args.size_max)
                .with_max_age_range(args.max_age_min..=args.max_age_max)
                .with_timeline(start, interval);
            if let Some(seed) = args.seed {
                builder = builder.with_seed(seed);
            }
            Box::new(builder.build()?)
        }
        SourceKind::Population => {
            let population = (0..args.population)
                .map(|i| Template::new(i.to_string(), args.size, args.max_age))
                .collect();
            let mut builder = if args.weights.is_empty() {
                PopulationSource::uniform(population, args.count)
            } else {
                PopulationSource::builder(population, args.weights.clone(), args.count)
            }
            .with_timeline(start, interval);
            if let Some(seed) = args.seed {
                builder = builder.with_seed(seed);
            }
            Box::new(builder.build()?)
        }
        SourceKind::Zipf => {
            let mut builder = ZipfSource::builder(args.zipf_n, args.zipf_s, args.count)
                .with_size(args.size)
                .with_max_age(args.max_age)
                .with_timeline(start, interval);
            if let Some(seed) = args.seed {
                builder = builder.with_seed(seed);
            }
            Box::new(builder.build()?)
        }
    };
    Ok(source)
}
