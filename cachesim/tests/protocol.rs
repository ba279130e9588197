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

use cachesim::prelude::*;
use itertools::Itertools;

/// Every caching policy, each over a fresh cache. Belady is told the keys of `requests` as its future.
fn caches(capacity: usize, requests: &[Request<String>]) -> Vec<(&'static str, Cache<String>)> {
    let configs: Vec<EvictionConfig<String>> = vec![
        FifoConfig {}.into(),
        ProtectedFifoConfig { limit_fraction: 1.0 }.into(),
        LruConfig {}.into(),
        LfuConfig {}.into(),
        GlobalLfuConfig {}.into(),
        BeladyConfig::new(collect_keys(requests)).into(),
    ];
    configs
        .into_iter()
        .map(|config| {
            let name = config.name();
            let cache = CacheBuilder::new(capacity).with_eviction_config(config).build().unwrap();
            (name, cache)
        })
        .collect()
}

fn outcomes(cache: &mut Cache<String>, requests: &[Request<String>]) -> Vec<Outcome> {
    cache
        .process_all(requests.iter().cloned())
        .map(|served| served.unwrap().outcome)
        .collect()
}

fn repeat(times: &[f64], size: usize, max_age: i64) -> Vec<Request<String>> {
    times
        .iter()
        .map(|&t| Request::new(t, "object".to_string(), size, max_age))
        .collect()
}

#[test_log::test]
fn test_repeat_request_stability() {
    let requests = repeat(&(0..50).map(|t| t as f64).collect_vec(), 10, 3600);

    for (name, mut cache) in caches(10, &requests) {
        let outcomes = outcomes(&mut cache, &requests);
        assert_eq!(outcomes[0], Outcome::Miss, "{name}");
        for (t, outcome) in outcomes.iter().enumerate().skip(1) {
            assert_eq!(*outcome, Outcome::Hit { age: t as f64 }, "{name}");
        }
    }
}

#[test_log::test]
fn test_expiry() {
    const MAX_AGE: i64 = 60;

    let requests = repeat(&[0.0, (MAX_AGE + 1) as f64], 10, MAX_AGE);
    for (name, mut cache) in caches(100, &requests) {
        assert_eq!(outcomes(&mut cache, &requests), vec![Outcome::Miss, Outcome::Miss], "{name}");
        assert_eq!(cache.occupancy(), 10, "{name}");
    }

    let requests = repeat(&[0.0, (MAX_AGE - 1) as f64], 10, MAX_AGE);
    for (name, mut cache) in caches(100, &requests) {
        assert_eq!(
            outcomes(&mut cache, &requests),
            vec![Outcome::Miss, Outcome::Hit { age: (MAX_AGE - 1) as f64 }],
            "{name}"
        );
    }
}

#[test_log::test]
fn test_refetched_expired_entry_is_replaced() {
    let requests = repeat(&[0.0, 61.0, 62.0, 122.0], 10, 60);
    for (name, mut cache) in caches(100, &requests) {
        assert_eq!(
            outcomes(&mut cache, &requests),
            vec![Outcome::Miss, Outcome::Miss, Outcome::Hit { age: 1.0 }, Outcome::Miss],
            "{name}"
        );
        assert_eq!(cache.occupancy(), 10, "{name}");
    }
}

#[test_log::test]
fn test_capacity_rejection() {
    let mut requests = (0..5)
        .map(|i| Request::new(i as f64, format!("small-{i}"), 10, 3600))
        .collect_vec();
    requests.push(Request::new(5.0, "huge".to_string(), 101, 3600));
    requests.push(Request::new(6.0, "huge".to_string(), 101, 3600));

    let mut all = caches(100, &requests);
    all.push((
        "noop",
        CacheBuilder::new(100).with_eviction_config(NoopConfig {}).build().unwrap(),
    ));

    for (name, mut cache) in all {
        let (small, huge) = requests.split_at(5);
        cache.process_all(small.iter().cloned()).for_each(|served| {
            served.unwrap();
        });
        let occupancy = cache.occupancy();

        for request in huge {
            let served = cache.process(request.clone()).unwrap();
            assert_eq!(served.outcome, Outcome::Pass, "{name}");
            assert_eq!(served.bytes(), 101, "{name}");
            assert_eq!(cache.occupancy(), occupancy, "{name}");
        }
    }
}

#[test_log::test]
fn test_non_cacheable_and_zero_capacity() {
    let requests = repeat(&[0.0, 1.0], 10, 0);
    for (name, mut cache) in caches(100, &requests) {
        assert_eq!(outcomes(&mut cache, &requests), vec![Outcome::Pass, Outcome::Pass], "{name}");
    }

    let requests = repeat(&[0.0, 1.0], 1, 3600);
    for (name, mut cache) in caches(0, &requests) {
        assert_eq!(outcomes(&mut cache, &requests), vec![Outcome::Pass, Outcome::Pass], "{name}");
        assert_eq!(cache.occupancy_fraction(), 0.0, "{name}");
    }
}

#[test_log::test]
fn test_idempotence() {
    let a = Request::new(3.0, "k".to_string(), 10, 60);
    let b = Request::new(3.0, "k".to_string(), 10, 60);
    assert_eq!(a, b);

    for ((name, mut x), (_, mut y)) in caches(100, &[a.clone()]).into_iter().zip_eq(caches(100, &[b.clone()])) {
        let x = x.process(a.clone()).unwrap();
        let y = y.process(b.clone()).unwrap();
        assert_eq!(x.outcome, y.outcome, "{name}");
        assert_eq!(x.request, y.request, "{name}");
    }
}

#[test_log::test]
fn test_out_of_order_stops_the_run() {
    let requests = vec![
        Request::new(10.0, "a".to_string(), 1, 60),
        Request::new(9.0, "b".to_string(), 1, 60),
        Request::new(11.0, "c".to_string(), 1, 60),
    ];
    for (name, mut cache) in caches(100, &requests) {
        let results = cache.process_all(requests.iter().cloned()).collect_vec();
        assert!(results[0].is_ok(), "{name}");
        match &results[1] {
            Err(e @ Error::OutOfOrder { .. }) => assert!(e.to_string().contains("\"b\""), "{name}: {e}"),
            other => panic!("{name}: expected out of order error, got {other:?}"),
        }
    }
}
