// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Per-Locality Scheduler
//!
//! Each locality runs one scheduler owning its worker threads. A worker
//! repeatedly asks the local policy for work and executes it inline; when
//! the locality is dry it attempts a steal from a uniformly chosen remote
//! locality, and otherwise backs off briefly on the locality's work signal.
//! Workers exit when the driver broadcasts the stop after the root task's
//! completion promise has fired.

use crate::cluster::LocalityId;
use crate::pool::Workpool;
use crate::signal::WorkSignal;
use crate::stats::LocalityStatistics;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

const IDLE_BACKOFF: Duration = Duration::from_micros(200);

struct SchedulerShared {
    locality: LocalityId,
    pools: Vec<Arc<dyn Workpool>>,
    signal: Arc<WorkSignal>,
    stats: Arc<LocalityStatistics>,
    stop: AtomicBool,
}

/// Worker threads of one locality.
pub struct Scheduler {
    shared: Arc<SchedulerShared>,
    workers: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Starts `worker_count` workers on `locality`. `pools` holds every
    /// locality's pool, indexed by locality id; workers steal through it.
    pub fn start(
        locality: LocalityId,
        pools: Vec<Arc<dyn Workpool>>,
        signal: Arc<WorkSignal>,
        stats: Arc<LocalityStatistics>,
        worker_count: usize,
    ) -> Self {
        let shared = Arc::new(SchedulerShared {
            locality,
            pools,
            signal,
            stats,
            stop: AtomicBool::new(false),
        });

        tracing::debug!(
            locality = locality.get(),
            workers = worker_count,
            "starting scheduler"
        );

        let workers = (0..worker_count)
            .map(|worker| {
                let shared = Arc::clone(&shared);
                std::thread::Builder::new()
                    .name(format!("arbor-{}-{}", locality.get(), worker))
                    .spawn(move || worker_loop(&shared))
                    .expect("failed to spawn scheduler worker thread")
            })
            .collect();

        Self { shared, workers }
    }

    /// Stops the workers and joins them. Queued tasks that were never
    /// popped are dropped; their latches have already been released by the
    /// stop protocol of the driver.
    pub fn stop(self) {
        self.shared.stop.store(true, Ordering::Relaxed);
        self.shared.signal.wake_all();
        for worker in self.workers {
            // A worker that panicked has already surfaced its failure
            // through the search context; nothing more to report here.
            let _ = worker.join();
        }
        tracing::debug!(
            locality = self.shared.locality.get(),
            "scheduler stopped"
        );
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scheduler(locality: {}, workers: {})",
            self.shared.locality,
            self.workers.len()
        )
    }
}

fn worker_loop(shared: &SchedulerShared) {
    let mut rng = SmallRng::from_entropy();
    let here = shared.locality.get();
    let locality_count = shared.pools.len();

    while !shared.stop.load(Ordering::Relaxed) {
        // Local work first.
        if let Some(item) = shared.pools[here].get_work() {
            item.run(shared.locality);
            continue;
        }

        // Inter-locality steal from a uniformly chosen victim.
        if locality_count > 1 {
            let mut victim = rng.gen_range(0..locality_count - 1);
            if victim >= here {
                victim += 1;
            }
            if let Some(item) = shared.pools[victim].steal() {
                shared.stats.on_steal();
                tracing::trace!(thief = here, victim, "stole work item");
                item.run(shared.locality);
                continue;
            }
        } else if let Some(item) = shared.pools[here].steal() {
            // Single locality: the steal path still matters for policies
            // that serve steal requests from live stacks.
            shared.stats.on_steal();
            item.run(shared.locality);
            continue;
        }

        shared.signal.wait_timeout(IDLE_BACKOFF);
    }
}
