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

//! # Position Manager (Indexed Subsystem)
//!
//! The indexed strategies identify a node by its path of child indexes from
//! the root. Stolen work carries a path, not a node: the thief replays the
//! path through `nth_child` to reconstruct its starting node. Each locality
//! hosts one [`PositionManager`] mapping its live tasks to their
//! [`PositionIndex`]es; a steal claims an index range under the position's
//! lock, so the victim's next `next_position` call skips it.
//!
//! Owner and thief work opposite ends of each level: the owner advances a
//! cursor from the front, thieves claim from the back, and both go through
//! the same mutex, which is what keeps victim expansion and steal decisions
//! serialized.

use crate::latch::CompletionLatch;
use crate::pool::Workpool;
use crate::signal::WorkSignal;
use crate::task::WorkItem;
use parking_lot::Mutex;
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::sync::{Arc, Weak};

/// A path of child indexes from the root. Paths are short for realistic
/// trees, so they live inline.
pub type IndexPath = SmallVec<[u32; 16]>;

#[derive(Clone, Copy, Debug)]
struct Level {
    /// Owner cursor: next unclaimed child index at this level.
    next: u32,
    /// Exclusive end of the unclaimed range; thieves decrement it.
    end: u32,
}

#[derive(Debug)]
struct PositionState {
    /// Path from the tree root to this task's starting node.
    root_path: IndexPath,
    /// Child index currently being expanded at each open level.
    trail: Vec<u32>,
    /// One entry per open level, shallowest first.
    levels: Vec<Level>,
}

/// The live position of one indexed task inside its subtree.
pub struct PositionIndex {
    state: Mutex<PositionState>,
}

impl PositionIndex {
    /// A fresh position rooted at `root_path`.
    pub fn new(root_path: IndexPath) -> Self {
        Self {
            state: Mutex::new(PositionState {
                root_path,
                trail: Vec::new(),
                levels: Vec::new(),
            }),
        }
    }

    /// Path from the tree root to this task's starting node.
    pub fn root_path(&self) -> IndexPath {
        self.state.lock().root_path.clone()
    }

    /// Opens a level for the children of the node now being expanded.
    pub fn enter(&self, num_children: usize) {
        self.state.lock().levels.push(Level {
            next: 0,
            end: num_children as u32,
        });
    }

    /// The next child index this task still owns at the current level, or
    /// `None` once the level is exhausted (including by steals).
    pub fn next_position(&self) -> Option<usize> {
        let mut state = self.state.lock();
        let level = state.levels.last_mut()?;
        if level.next < level.end {
            let index = level.next;
            level.next += 1;
            Some(index as usize)
        } else {
            None
        }
    }

    /// Records descent into child `index`. Brackets with [`Self::post_expand`].
    pub fn pre_expand(&self, index: u32) {
        self.state.lock().trail.push(index);
    }

    /// Closes the level opened for the child and pops the trail entry.
    pub fn post_expand(&self) {
        let mut state = self.state.lock();
        state.levels.pop();
        state.trail.pop();
    }

    /// Drops every remaining sibling at the current level.
    pub fn prune_level(&self) {
        let mut state = self.state.lock();
        if let Some(level) = state.levels.last_mut() {
            level.end = level.next;
        }
    }

    /// Claims one unvisited child index for a thief, preferring the
    /// shallowest level (the largest subtree). Returns the full path of the
    /// claimed node.
    pub fn steal(&self) -> Option<IndexPath> {
        let mut state = self.state.lock();
        for k in 0..state.levels.len() {
            if k > state.trail.len() {
                // A task that panicked mid-descent leaves deeper levels
                // without trail entries; nothing below is addressable.
                break;
            }
            let level = &mut state.levels[k];
            if level.end > level.next {
                level.end -= 1;
                let claimed = level.end;
                let mut path = state.root_path.clone();
                path.extend_from_slice(&state.trail[..k]);
                path.push(claimed);
                return Some(path);
            }
        }
        None
    }
}

impl std::fmt::Debug for PositionIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        write!(
            f,
            "PositionIndex(root_path: {:?}, open_levels: {})",
            state.root_path.as_slice(),
            state.levels.len()
        )
    }
}

/// Builds the task body for a position. Installed once by the skeleton at
/// initialization, exactly like the original manager being constructed
/// around its child-task binding.
pub type SpawnFn =
    Box<dyn Fn(Arc<PositionIndex>, Arc<CompletionLatch>) -> WorkItem + Send + Sync + 'static>;

struct ManagerState {
    queued: VecDeque<(Arc<PositionIndex>, Arc<CompletionLatch>)>,
    active: Vec<(Arc<PositionIndex>, Arc<CompletionLatch>)>,
}

/// Per-locality coordinator of indexed tasks.
pub struct PositionManager {
    state: Mutex<ManagerState>,
    signal: Arc<WorkSignal>,
    spawn: SpawnFn,
    this: Weak<PositionManager>,
}

impl PositionManager {
    /// Creates a manager whose tasks are built by `spawn`.
    pub fn new(signal: Arc<WorkSignal>, spawn: SpawnFn) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            state: Mutex::new(ManagerState {
                queued: VecDeque::new(),
                active: Vec::new(),
            }),
            signal,
            spawn,
            this: this.clone(),
        })
    }

    /// Queues the subtree at `path`, completing `latch` when it and all its
    /// descendants are done.
    pub fn add_path(&self, path: IndexPath, latch: Arc<CompletionLatch>) {
        let position = Arc::new(PositionIndex::new(path));
        self.state.lock().queued.push_back((position, latch));
        self.signal.notify_one();
    }

    /// Wraps a position into a runnable item and marks it active so thieves
    /// can see it. The wrapper deactivates the position and only then
    /// completes the latch: a thief that claimed an index range under the
    /// manager's lock has therefore always registered its child before the
    /// victim's completion can fire. Task bodies built by `spawn` must not
    /// complete the latch themselves.
    fn make_item(
        &self,
        state: &mut ManagerState,
        position: Arc<PositionIndex>,
        latch: Arc<CompletionLatch>,
    ) -> WorkItem {
        state.active.push((Arc::clone(&position), latch.clone()));
        let inner = (self.spawn)(Arc::clone(&position), latch.clone());
        let manager = self.this.clone();
        WorkItem::new(inner.depth(), move |locality| {
            inner.run(locality);
            if let Some(manager) = manager.upgrade() {
                manager.deactivate(&position);
            }
            latch.complete();
        })
    }

    fn deactivate(&self, position: &Arc<PositionIndex>) {
        self.state
            .lock()
            .active
            .retain(|(p, _)| !Arc::ptr_eq(p, position));
    }

    fn pop_queued_back(&self) -> Option<WorkItem> {
        let mut state = self.state.lock();
        let (position, latch) = state.queued.pop_back()?;
        Some(self.make_item(&mut state, position, latch))
    }

    fn steal_position(&self) -> Option<WorkItem> {
        let mut state = self.state.lock();
        if let Some((position, latch)) = state.queued.pop_front() {
            return Some(self.make_item(&mut state, position, latch));
        }
        // Claim an index range from a live task. The child registers on the
        // victim's latch before the victim can possibly complete, because
        // both happen under the position claim.
        for i in 0..state.active.len() {
            let (position, latch) = {
                let (p, l) = &state.active[i];
                (Arc::clone(p), l.clone())
            };
            if let Some(stolen) = position.steal() {
                let child_latch = latch.register_child();
                let stolen_position = Arc::new(PositionIndex::new(stolen));
                return Some(self.make_item(&mut state, stolen_position, child_latch));
            }
        }
        None
    }
}

impl Workpool for PositionManager {
    fn name(&self) -> &'static str {
        "position-manager"
    }

    fn get_work(&self) -> Option<WorkItem> {
        // Local workers also split live positions, so a locality with more
        // workers than queued paths still parallelizes its own subtree.
        self.pop_queued_back().or_else(|| self.steal_position())
    }

    fn steal(&self) -> Option<WorkItem> {
        self.steal_position()
    }

    fn work_remaining(&self) -> bool {
        let state = self.state.lock();
        !state.queued.is_empty() || !state.active.is_empty()
    }
}

impl std::fmt::Debug for PositionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        write!(
            f,
            "PositionManager(queued: {}, active: {})",
            state.queued.len(),
            state.active.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::LocalityId;
    use crate::promise::promise;
    use smallvec::smallvec;

    #[test]
    fn test_owner_takes_from_front() {
        let pos = PositionIndex::new(IndexPath::new());
        pos.enter(3);
        assert_eq!(pos.next_position(), Some(0));
        assert_eq!(pos.next_position(), Some(1));
        assert_eq!(pos.next_position(), Some(2));
        assert_eq!(pos.next_position(), None);
    }

    #[test]
    fn test_steal_claims_from_back_and_owner_skips_it() {
        let pos = PositionIndex::new(smallvec![4]);
        pos.enter(3);
        assert_eq!(pos.next_position(), Some(0));

        let stolen = pos.steal().expect("one sibling left to steal");
        assert_eq!(stolen.as_slice(), &[4, 2]);

        assert_eq!(pos.next_position(), Some(1));
        assert_eq!(pos.next_position(), None, "index 2 belongs to the thief");
    }

    #[test]
    fn test_steal_prefers_shallowest_level() {
        let pos = PositionIndex::new(IndexPath::new());
        pos.enter(2);
        assert_eq!(pos.next_position(), Some(0));
        pos.pre_expand(0);
        pos.enter(2);
        assert_eq!(pos.next_position(), Some(0));

        let stolen = pos.steal().unwrap();
        assert_eq!(stolen.as_slice(), &[1], "level 0 sibling goes first");

        let deeper = pos.steal().unwrap();
        assert_eq!(deeper.as_slice(), &[0, 1]);

        assert!(pos.steal().is_none());
    }

    #[test]
    fn test_prune_level_drops_remaining_siblings() {
        let pos = PositionIndex::new(IndexPath::new());
        pos.enter(4);
        assert_eq!(pos.next_position(), Some(0));
        pos.prune_level();
        assert_eq!(pos.next_position(), None);
        assert!(pos.steal().is_none());
    }

    #[test]
    fn test_post_expand_closes_level() {
        let pos = PositionIndex::new(IndexPath::new());
        pos.enter(1);
        assert_eq!(pos.next_position(), Some(0));
        pos.pre_expand(0);
        pos.enter(5);
        pos.post_expand();
        // Back at the root level, which is exhausted.
        assert_eq!(pos.next_position(), None);
    }

    #[test]
    fn test_manager_runs_queued_path_and_deactivates() {
        let signal = Arc::new(WorkSignal::new());
        let log: Arc<Mutex<Vec<Vec<u32>>>> = Arc::new(Mutex::new(Vec::new()));
        let log_in_spawn = Arc::clone(&log);

        let manager = PositionManager::new(
            signal,
            Box::new(move |position, _latch| {
                let log = Arc::clone(&log_in_spawn);
                WorkItem::new(position.root_path().len(), move |_| {
                    log.lock().push(position.root_path().to_vec());
                })
            }),
        );

        let (p, f) = promise();
        let root = CompletionLatch::root(p);
        manager.add_path(smallvec![2, 1], root.register_child());

        let item = manager.get_work().expect("queued path");
        assert!(manager.work_remaining(), "active while running");
        item.run(LocalityId::new(0));

        root.complete();
        f.wait();
        assert_eq!(*log.lock(), vec![vec![2, 1]]);
        assert!(!manager.work_remaining(), "deactivated after run");
    }

    #[test]
    fn test_manager_steals_from_active_position() {
        let signal = Arc::new(WorkSignal::new());
        let manager = PositionManager::new(
            signal,
            Box::new(move |position, _latch| {
                WorkItem::new(position.root_path().len(), move |_| {})
            }),
        );

        let (p, f) = promise();
        let root = CompletionLatch::root(p);
        manager.add_path(IndexPath::new(), root.register_child());

        // Activate the root position and open a level with two children.
        let item = manager.get_work().unwrap();
        let state = manager.state.lock();
        let position = Arc::clone(&state.active[0].0);
        drop(state);
        position.enter(2);
        assert_eq!(position.next_position(), Some(0));

        // A thief claims the remaining sibling as a new task.
        let stolen = manager.steal().expect("stealable sibling");
        stolen.run(LocalityId::new(1));

        item.run(LocalityId::new(0));
        root.complete();
        f.wait();
    }
}
