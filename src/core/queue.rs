/// Scene queue — pending scenes, per-track progress, and the policy that
/// picks which track the next scene comes from.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use tracing::debug;

use crate::core::catalog::SceneCatalog;
use crate::core::rng::RouteRng;
use crate::core::snapshot::SnapshotError;
use crate::schema::route::{RouteCategory, RoutePoints};
use crate::schema::scene::{Scene, SceneId};

/// Probability that the leading route supplies the next scene.
pub const DEFAULT_LEADER_WEIGHT: f64 = 0.7;

/// How many scenes of each track have been dispatched into the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<RouteCategory, usize>",
    into = "BTreeMap<RouteCategory, usize>"
)]
pub struct RouteProgress {
    cursors: [usize; RouteCategory::COUNT],
}

impl RouteProgress {
    pub fn cursor(&self, category: RouteCategory) -> usize {
        self.cursors[category.index()]
    }

    fn bump(&mut self, category: RouteCategory) {
        self.cursors[category.index()] += 1;
    }

    pub fn iter(&self) -> impl Iterator<Item = (RouteCategory, usize)> + '_ {
        RouteCategory::ALL.into_iter().map(|c| (c, self.cursor(c)))
    }
}

impl From<BTreeMap<RouteCategory, usize>> for RouteProgress {
    fn from(map: BTreeMap<RouteCategory, usize>) -> Self {
        let mut progress = Self::default();
        for (category, cursor) in map {
            progress.cursors[category.index()] = cursor;
        }
        progress
    }
}

impl From<RouteProgress> for BTreeMap<RouteCategory, usize> {
    fn from(progress: RouteProgress) -> Self {
        progress.iter().collect()
    }
}

/// FIFO of pending scenes over an immutable catalog. The head of the
/// queue is the scene currently shown.
#[derive(Debug, Clone)]
pub struct SceneQueue {
    catalog: SceneCatalog,
    pending: VecDeque<(RouteCategory, usize)>,
    progress: RouteProgress,
    leader_weight: f64,
}

impl SceneQueue {
    /// Create a queue seeded with the first main scene.
    pub fn new(catalog: SceneCatalog) -> Self {
        Self::with_leader_weight(catalog, DEFAULT_LEADER_WEIGHT)
    }

    pub fn with_leader_weight(catalog: SceneCatalog, leader_weight: f64) -> Self {
        let mut queue = Self {
            catalog,
            pending: VecDeque::new(),
            progress: RouteProgress::default(),
            leader_weight: leader_weight.clamp(0.0, 1.0),
        };
        queue.reset();
        queue
    }

    pub fn catalog(&self) -> &SceneCatalog {
        &self.catalog
    }

    pub fn progress(&self) -> &RouteProgress {
        &self.progress
    }

    pub fn leader_weight(&self) -> f64 {
        self.leader_weight
    }

    /// The queue head, or `None` once the story has run out.
    pub fn current_scene(&self) -> Option<&Scene> {
        let &(category, position) = self.pending.front()?;
        self.catalog.scene_at(category, position)
    }

    /// Drop the head. Does nothing on an empty queue.
    pub fn advance(&mut self) {
        self.pending.pop_front();
    }

    /// Enqueue at most one scene, chosen from the route scores.
    ///
    /// With no positive side route, main is taken in order and side
    /// tracks only fill in once main runs dry. With a leader, one draw
    /// decides between the leader (below the leader weight) and main,
    /// each falling back to the other. If both are spent, the remaining
    /// side tracks are tried in declared order so no content is stranded.
    ///
    /// Returns the enqueued scene, or `None` when every track is spent.
    pub fn populate(&mut self, points: &RoutePoints, rng: &mut dyn RouteRng) -> Option<SceneId> {
        let selected = match points.leading_side_route() {
            None => self.enqueue_first_available(&RouteCategory::ALL),
            Some(leader) => {
                let draw = rng.next_f64();
                let favour_leader = draw < self.leader_weight;
                debug!(
                    target: "novel_engine::queue",
                    leader = %leader,
                    draw,
                    favour_leader,
                    "queue.populate.draw"
                );
                let preferred = if favour_leader {
                    [leader, RouteCategory::Main]
                } else {
                    [RouteCategory::Main, leader]
                };
                self.enqueue_first_available(&preferred)
                    .or_else(|| self.enqueue_first_available(&RouteCategory::SIDE))
            }
        };

        if selected.is_none() {
            debug!(target: "novel_engine::queue", "queue.populate.exhausted");
        }
        selected
    }

    /// Empty the queue, rewind every track, and seed the first main scene.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.progress = RouteProgress::default();
        self.enqueue_next(RouteCategory::Main);
    }

    /// Copy of the pending scenes, head first.
    pub fn queue_snapshot(&self) -> Vec<Scene> {
        self.pending
            .iter()
            .filter_map(|&(c, p)| self.catalog.scene_at(c, p))
            .cloned()
            .collect()
    }

    pub fn queued_ids(&self) -> Vec<SceneId> {
        self.pending
            .iter()
            .filter_map(|&(c, p)| self.catalog.scene_at(c, p))
            .map(|s| s.id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn remaining_in_track(&self, category: RouteCategory) -> usize {
        self.catalog
            .track_len(category)
            .saturating_sub(self.progress.cursor(category))
    }

    pub fn is_exhausted(&self, category: RouteCategory) -> bool {
        self.remaining_in_track(category) == 0
    }

    /// True while anything is queued or left undispatched in any track.
    pub fn has_more_scenes(&self) -> bool {
        !self.pending.is_empty()
            || RouteCategory::ALL
                .into_iter()
                .any(|c| !self.is_exhausted(c))
    }

    /// Replace queue contents and cursors with previously saved values.
    ///
    /// Every queued scene must exist and must already have been
    /// dispatched by its track's cursor.
    pub fn restore(
        &mut self,
        queued: &[SceneId],
        progress: RouteProgress,
    ) -> Result<(), SnapshotError> {
        for (category, cursor) in progress.iter() {
            let len = self.catalog.track_len(category);
            if cursor > len {
                return Err(SnapshotError::CursorOutOfRange {
                    category,
                    cursor,
                    len,
                });
            }
        }

        let mut pending = VecDeque::with_capacity(queued.len());
        let mut seen = FxHashSet::default();
        for &id in queued {
            if !seen.insert(id) {
                return Err(SnapshotError::DuplicateQueuedScene(id));
            }
            let (category, position) = self
                .catalog
                .locate(id)
                .ok_or(SnapshotError::UnknownScene(id))?;
            if position >= progress.cursor(category) {
                return Err(SnapshotError::UndispatchedScene(id));
            }
            pending.push_back((category, position));
        }

        self.pending = pending;
        self.progress = progress;
        Ok(())
    }

    fn enqueue_first_available(&mut self, order: &[RouteCategory]) -> Option<SceneId> {
        order.iter().find_map(|&c| self.enqueue_next(c))
    }

    /// Dispatch the next unconsumed scene of `category`, if any.
    fn enqueue_next(&mut self, category: RouteCategory) -> Option<SceneId> {
        let position = self.progress.cursor(category);
        let id = self.catalog.scene_at(category, position)?.id;
        self.progress.bump(category);
        self.pending.push_back((category, position));
        debug!(
            target: "novel_engine::queue",
            scene = %id,
            category = %category,
            "queue.enqueue"
        );
        Some(id)
    }
}
