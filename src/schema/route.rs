use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("unknown route category '{0}'")]
    Unknown(String),
}

/// A narrative branch dimension. Used both to file scenes into tracks
/// and as a scoring axis for player choices.
///
/// The declared order is significant: it is the iteration order for
/// leading-route ties and for exhaustion fallback.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RouteCategory {
    Main,
    Romance,
    Friendship,
    Mystery,
    Action,
}

impl RouteCategory {
    pub const COUNT: usize = 5;

    /// Every category, main first.
    pub const ALL: [RouteCategory; Self::COUNT] = [
        Self::Main,
        Self::Romance,
        Self::Friendship,
        Self::Mystery,
        Self::Action,
    ];

    /// Side categories, i.e. everything except `Main`.
    pub const SIDE: [RouteCategory; Self::COUNT - 1] =
        [Self::Romance, Self::Friendship, Self::Mystery, Self::Action];

    /// Position of this category in [`RouteCategory::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_main(self) -> bool {
        self == Self::Main
    }

    /// Lowercase identifier, as used in catalog files and snapshots.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Romance => "romance",
            Self::Friendship => "friendship",
            Self::Mystery => "mystery",
            Self::Action => "action",
        }
    }
}

impl fmt::Display for RouteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RouteCategory {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| RouteError::Unknown(s.to_string()))
    }
}

/// Per-category score deltas carried by a choice. Categories without an
/// entry have no effect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteEffects(BTreeMap<RouteCategory, i32>);

impl RouteEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper: add (or replace) the delta for `category`.
    pub fn with(mut self, category: RouteCategory, delta: i32) -> Self {
        self.0.insert(category, delta);
        self
    }

    pub fn get(&self, category: RouteCategory) -> i32 {
        self.0.get(&category).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RouteCategory, i32)> + '_ {
        self.0.iter().map(|(c, d)| (*c, *d))
    }
}

impl FromIterator<(RouteCategory, i32)> for RouteEffects {
    fn from_iter<I: IntoIterator<Item = (RouteCategory, i32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Cumulative score for every route category.
///
/// Backed by a fixed array so every category is always present. Scores
/// may go negative when choices penalize a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<RouteCategory, i32>",
    into = "BTreeMap<RouteCategory, i32>"
)]
pub struct RoutePoints {
    scores: [i32; RouteCategory::COUNT],
}

impl RoutePoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: RouteCategory) -> i32 {
        self.scores[category.index()]
    }

    pub fn add(&mut self, category: RouteCategory, delta: i32) {
        let slot = &mut self.scores[category.index()];
        *slot = slot.saturating_add(delta);
    }

    /// Add every delta in `effects` to its category.
    pub fn apply(&mut self, effects: &RouteEffects) {
        for (category, delta) in effects.iter() {
            self.add(category, delta);
        }
    }

    /// True when `category` has reached at least `threshold` points.
    pub fn has_threshold(&self, category: RouteCategory, threshold: i32) -> bool {
        self.get(category) >= threshold
    }

    /// The side category with the strictly highest positive score.
    ///
    /// The running maximum starts at zero, so a route only leads once it
    /// scores above zero. On a tie the category declared first wins.
    pub fn leading_side_route(&self) -> Option<RouteCategory> {
        let mut leader = None;
        let mut highest = 0;
        for category in RouteCategory::SIDE {
            let score = self.get(category);
            if score > highest {
                highest = score;
                leader = Some(category);
            }
        }
        leader
    }

    pub fn iter(&self) -> impl Iterator<Item = (RouteCategory, i32)> + '_ {
        RouteCategory::ALL.into_iter().map(|c| (c, self.get(c)))
    }

    pub fn reset(&mut self) {
        self.scores = [0; RouteCategory::COUNT];
    }
}

impl From<BTreeMap<RouteCategory, i32>> for RoutePoints {
    fn from(map: BTreeMap<RouteCategory, i32>) -> Self {
        let mut points = Self::default();
        for (category, score) in map {
            points.scores[category.index()] = score;
        }
        points
    }
}

impl From<RoutePoints> for BTreeMap<RouteCategory, i32> {
    fn from(points: RoutePoints) -> Self {
        points.iter().collect()
    }
}
