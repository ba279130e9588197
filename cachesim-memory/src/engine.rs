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

use cachesim_common::{
    error::{Error, Result},
    outcome::{Outcome, Served},
    request::{Fetched, Request, Timestamp},
    strict_assert,
};

use crate::{
    policy::{Context, Policy},
    watermark::Watermark,
};

/// Replays requests against a [`Policy`].
///
/// Owns the simulation clock and the policy state. Requests must be fed in non-decreasing time order.
#[derive(Debug)]
pub struct CacheEngine<P>
where
    P: Policy,
{
    policy: P,
    clock: Timestamp,
    position: usize,
}

impl<P> CacheEngine<P>
where
    P: Policy,
{
    /// Wrap a constructed policy. The engine capacity is the policy capacity.
    pub fn new(policy: P) -> Self {
        Self {
            policy,
            clock: Timestamp::NEG_INFINITY,
            position: 0,
        }
    }

    /// Construct the policy from its config and wrap it.
    pub fn with_config(capacity: usize, watermark: Watermark, config: P::Config) -> Result<Self> {
        P::new(capacity, watermark, config).map(Self::new)
    }

    /// Process a single request.
    ///
    /// Returns the served object and how it was served. Fails if the request precedes the simulation clock or if the
    /// policy breaks its contract; the run cannot continue in either case.
    pub fn process(&mut self, request: Request<P::Key>) -> Result<Served<P::Key>> {
        let now = request.issued_at();
        if !(now >= self.clock) {
            return Err(Error::out_of_order(request.key(), now, self.clock));
        }
        self.clock = now;
        let context = Context {
            now,
            position: self.position,
        };
        self.position += 1;

        let mut expired = false;
        if let Some(stored) = self.policy.lookup(request.key()) {
            if stored.is_expired(now) {
                expired = true;
            } else {
                let age = stored.age(now);
                let request = stored.reissue(now);
                tracing::trace!(key = ?request.key(), age, "hit");
                return Ok(Served {
                    request,
                    outcome: Outcome::Hit { age },
                });
            }
        }

        let fetched = request.fetch();

        if !self.is_eligible(&fetched) {
            tracing::trace!(key = ?fetched.key(), size = fetched.size(), "pass");
            return Ok(Served {
                request: fetched,
                outcome: Outcome::Pass,
            });
        }

        if expired {
            tracing::trace!(key = ?fetched.key(), "remove expired entry on refetch");
            self.policy.remove(fetched.key());
        }

        self.relieve(&context)?;

        if !self.fits(fetched.size()) {
            tracing::trace!(
                key = ?fetched.key(),
                size = fetched.size(),
                occupancy = self.policy.occupancy(),
                "pass, no room"
            );
            return Ok(Served {
                request: fetched,
                outcome: Outcome::Pass,
            });
        }

        self.policy.store(fetched.clone().store(now), &context)?;
        strict_assert!(self.policy.occupancy() <= self.policy.capacity());

        tracing::trace!(key = ?fetched.key(), size = fetched.size(), "miss");
        Ok(Served {
            request: fetched,
            outcome: Outcome::Miss,
        })
    }

    /// Lazily process every request in order.
    ///
    /// The iterator yields one result per request. Stop consuming it at the first error.
    pub fn process_all<'a, I>(&'a mut self, requests: I) -> impl Iterator<Item = Result<Served<P::Key>>> + 'a
    where
        I: IntoIterator<Item = Request<P::Key>>,
        I::IntoIter: 'a,
    {
        requests.into_iter().map(move |request| self.process(request))
    }

    /// The policy.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.policy.capacity()
    }

    /// Occupied bytes.
    pub fn occupancy(&self) -> usize {
        self.policy.occupancy()
    }

    /// Occupied fraction of the capacity. A zero capacity cache is always empty.
    pub fn occupancy_fraction(&self) -> f64 {
        match self.capacity() {
            0 => 0.0,
            capacity => self.occupancy() as f64 / capacity as f64,
        }
    }

    /// Time of the last processed request.
    pub fn clock(&self) -> Timestamp {
        self.clock
    }

    /// Count of processed requests.
    pub fn position(&self) -> usize {
        self.position
    }

    fn is_eligible(&self, fetched: &Fetched<P::Key>) -> bool {
        let capacity = self.policy.capacity();
        fetched.is_cacheable() && capacity > 0 && fetched.size() <= capacity && self.policy.admit(fetched)
    }

    /// Evict down to the low watermark once the high watermark is crossed.
    fn relieve(&mut self, context: &Context) -> Result<()> {
        if !self.policy.over_high_watermark() {
            return Ok(());
        }

        let mut entries = 0;
        let mut bytes = 0;
        while !self.policy.under_low_watermark() {
            let evicted = self.policy.evict(context)?;
            entries += 1;
            bytes += evicted.size();
        }

        tracing::debug!(
            position = context.position,
            entries,
            bytes,
            occupancy = self.policy.occupancy(),
            "watermark relief"
        );
        Ok(())
    }

    /// Returns `true` if an object of `size` bytes fits without further eviction.
    fn fits(&self, size: usize) -> bool {
        self.policy.occupancy() + size <= self.policy.capacity()
    }
}

#[cfg(test)]
mod tests {
    use cachesim_common::outcome::Outcome;
    use itertools::Itertools;

    use super::*;
    use crate::policy::{
        fifo::{Fifo, FifoConfig},
        lfu::{Lfu, LfuConfig},
        noop::{Noop, NoopConfig},
        protected_fifo::{ProtectedFifo, ProtectedFifoConfig},
    };

    fn fifo(capacity: usize) -> CacheEngine<Fifo<&'static str>> {
        CacheEngine::with_config(capacity, Watermark::default(), FifoConfig {}).unwrap()
    }

    fn outcomes<P: Policy>(engine: &mut CacheEngine<P>, requests: Vec<Request<P::Key>>) -> Vec<Outcome> {
        engine
            .process_all(requests)
            .map(|served| served.unwrap().outcome)
            .collect_vec()
    }

    #[test_log::test]
    fn test_repeat_request() {
        let mut engine = fifo(100);
        let requests = (0..10).map(|t| Request::new(t as f64, "a", 10, 60)).collect_vec();
        let got = outcomes(&mut engine, requests);

        assert_eq!(got[0], Outcome::Miss);
        for (t, outcome) in got.iter().enumerate().skip(1) {
            assert_eq!(*outcome, Outcome::Hit { age: t as f64 });
        }
        assert_eq!(engine.occupancy(), 10);
    }

    #[test_log::test]
    fn test_hit_reissues_copy() {
        let mut engine = fifo(100);
        engine.process(Request::new(1.0, "a", 10, 60)).unwrap();
        let served = engine.process(Request::new(5.0, "a", 10, 60)).unwrap();
        assert_eq!(served.outcome, Outcome::Hit { age: 4.0 });
        assert_eq!(served.request.issued_at(), 5.0);

        let stored = engine.policy().dump();
        assert_eq!(stored, vec!["a"]);
    }

    #[test_log::test]
    fn test_expiry() {
        let mut engine = fifo(100);
        let got = outcomes(
            &mut engine,
            vec![Request::new(0.0, "a", 10, 60), Request::new(61.0, "a", 10, 60)],
        );
        assert_eq!(got, vec![Outcome::Miss, Outcome::Miss]);
        // The stale entry was replaced, not duplicated.
        assert_eq!(engine.occupancy(), 10);
        assert_eq!(engine.policy().len(), 1);

        let mut engine = fifo(100);
        let got = outcomes(
            &mut engine,
            vec![Request::new(0.0, "a", 10, 60), Request::new(59.0, "a", 10, 60)],
        );
        assert_eq!(got, vec![Outcome::Miss, Outcome::Hit { age: 59.0 }]);

        let mut engine = fifo(100);
        let got = outcomes(
            &mut engine,
            vec![Request::new(0.0, "a", 10, 60), Request::new(60.0, "a", 10, 60)],
        );
        assert_eq!(got, vec![Outcome::Miss, Outcome::Hit { age: 60.0 }]);
    }

    #[test_log::test]
    fn test_expired_entry_kept_on_pass() {
        let mut engine =
            CacheEngine::<ProtectedFifo<&str>>::with_config(100, Watermark::default(), ProtectedFifoConfig::default())
                .unwrap();
        engine.process(Request::new(0.0, "a", 10, 60)).unwrap();
        // The refetched object grew beyond the protection limit.
        let served = engine.process(Request::new(100.0, "a", 20, 60)).unwrap();
        assert_eq!(served.outcome, Outcome::Pass);
        assert_eq!(engine.occupancy(), 10);
    }

    #[test_log::test]
    fn test_capacity_rejection() {
        let mut engine = fifo(100);
        engine.process(Request::new(0.0, "a", 10, 60)).unwrap();
        let served = engine.process(Request::new(1.0, "big", 101, 60)).unwrap();
        assert_eq!(served.outcome, Outcome::Pass);
        assert_eq!(served.bytes(), 101);
        assert_eq!(engine.occupancy(), 10);
    }

    #[test_log::test]
    fn test_non_cacheable() {
        let mut engine = fifo(100);
        let got = outcomes(
            &mut engine,
            vec![Request::new(0.0, "a", 10, 0), Request::new(1.0, "a", 10, -5)],
        );
        assert_eq!(got, vec![Outcome::Pass, Outcome::Pass]);
        assert_eq!(engine.occupancy(), 0);
    }

    #[test_log::test]
    fn test_zero_capacity() {
        let mut engine = fifo(0);
        let got = outcomes(
            &mut engine,
            vec![Request::new(0.0, "a", 0, 60), Request::new(1.0, "a", 1, 60)],
        );
        assert_eq!(got, vec![Outcome::Pass, Outcome::Pass]);
        assert_eq!(engine.occupancy_fraction(), 0.0);
    }

    #[test_log::test]
    fn test_out_of_order() {
        let mut engine = fifo(100);
        engine.process(Request::new(10.0, "a", 10, 60)).unwrap();
        engine.process(Request::new(10.0, "b", 10, 60)).unwrap();
        let err = engine.process(Request::new(9.0, "c", 10, 60)).unwrap_err();
        assert!(matches!(err, Error::OutOfOrder { issued_at, clock, .. } if issued_at == 9.0 && clock == 10.0));
        assert!(matches!(
            engine.process(Request::new(f64::NAN, "d", 10, 60)),
            Err(Error::OutOfOrder { .. })
        ));
        assert_eq!(engine.position(), 2);
        assert_eq!(engine.clock(), 10.0);
    }

    #[test_log::test]
    fn test_fifo_eviction_order() {
        // 20 objects of 5 bytes fill the cache exactly.
        let mut engine = fifo(100);
        for i in 0..20 {
            let key: &'static str = Box::leak(format!("k{i}").into_boxed_str());
            assert_eq!(engine.process(Request::new(i as f64, key, 5, 3600)).unwrap().outcome, Outcome::Miss);
        }
        assert_eq!(engine.occupancy(), 100);

        engine.process(Request::new(20.0, "k20", 5, 3600)).unwrap();
        // Relief down to 90 bytes evicts the two oldest, then k20 enters.
        let dump = engine.policy().dump();
        assert_eq!(dump.first(), Some(&"k2"));
        assert_eq!(dump.last(), Some(&"k20"));
        assert_eq!(engine.occupancy(), 95);
    }

    #[test_log::test]
    fn test_watermark_hysteresis() {
        let mut engine = CacheEngine::<Fifo<usize>>::with_config(100, Watermark::default(), FifoConfig {}).unwrap();
        let mut relieved = vec![];
        for i in 0..200usize {
            let before = engine.occupancy();
            engine.process(Request::new(i as f64, i, 1, 3600)).unwrap();
            let after = engine.occupancy();
            if after <= before {
                // Eviction fired while storing this object.
                assert!(before as f64 > 0.95 * 100.0);
                assert!(after as f64 - 1.0 <= 0.9 * 100.0);
                relieved.push(i);
            }
        }
        // Fires at 96 bytes and relieves to 90. The triggering object brings it to 91, five more reach 96 again.
        assert_eq!(relieved[0], 96);
        assert!(relieved.len() > 10);
        for w in relieved.windows(2) {
            assert_eq!(w[1] - w[0], 6);
        }
    }

    #[test_log::test]
    fn test_pass_without_room_under_high_watermark() {
        let mut engine = fifo(100);
        engine.process(Request::new(0.0, "a", 60, 3600)).unwrap();
        engine.process(Request::new(1.0, "b", 30, 3600)).unwrap();
        assert!(!engine.policy().over_high_watermark());

        // 90 + 20 does not fit, and nothing may be evicted below the high watermark.
        let served = engine.process(Request::new(2.0, "c", 20, 3600)).unwrap();
        assert_eq!(served.outcome, Outcome::Pass);
        assert_eq!(served.bytes(), 20);
        assert_eq!(engine.policy().dump(), vec!["a", "b"]);
        assert_eq!(engine.occupancy(), 90);

        // A small enough object still enters.
        let served = engine.process(Request::new(3.0, "d", 10, 3600)).unwrap();
        assert_eq!(served.outcome, Outcome::Miss);
        assert_eq!(engine.policy().dump(), vec!["a", "b", "d"]);
        assert_eq!(engine.occupancy(), 100);
    }

    #[test_log::test]
    fn test_pass_without_room_after_relief() {
        let mut engine = fifo(100);
        engine.process(Request::new(0.0, "a", 50, 3600)).unwrap();
        engine.process(Request::new(1.0, "b", 46, 3600)).unwrap();
        assert!(engine.policy().over_high_watermark());

        // Relief evicts `a` down to 46 bytes, which still leaves no room for 60 more.
        let served = engine.process(Request::new(2.0, "c", 60, 3600)).unwrap();
        assert_eq!(served.outcome, Outcome::Pass);
        assert_eq!(engine.policy().dump(), vec!["b"]);
        assert_eq!(engine.occupancy(), 46);

        // Below the high watermark now: no further eviction, and `c` fits on the next request.
        let served = engine.process(Request::new(3.0, "c", 54, 3600)).unwrap();
        assert_eq!(served.outcome, Outcome::Miss);
        assert_eq!(engine.policy().dump(), vec!["b", "c"]);
        assert_eq!(engine.occupancy(), 100);
    }

    #[test_log::test]
    fn test_lfu_engine() {
        let mut engine = CacheEngine::<Lfu<u64>>::with_config(10, Watermark::default(), LfuConfig {}).unwrap();
        for t in 0..10 {
            engine.process(Request::new(t as f64, t, 1, 3600)).unwrap();
        }
        // Make 0..5 frequent.
        for t in 0..5 {
            assert!(engine.process(Request::new(10.0 + t as f64, t, 1, 3600)).unwrap().outcome.is_hit());
        }
        // Full: the next miss relieves down to 9 bytes by evicting the coldest, oldest first.
        engine.process(Request::new(20.0, 100, 1, 3600)).unwrap();
        assert_eq!(engine.occupancy(), 10);
        assert_eq!(engine.policy().frequency(&5), None);
        assert_eq!(engine.policy().frequency(&6), Some(0));
        assert_eq!(engine.policy().frequency(&0), Some(1));
        assert_eq!(engine.policy().frequency(&100), Some(0));
    }

    #[test_log::test]
    fn test_noop() {
        let mut engine = CacheEngine::<Noop<&str>>::with_config(100, Watermark::default(), NoopConfig {}).unwrap();
        let got = outcomes(&mut engine, (0..10).map(|t| Request::new(t as f64, "a", 3, 300)).collect_vec());
        assert!(got.iter().all(Outcome::is_pass));
    }
}
