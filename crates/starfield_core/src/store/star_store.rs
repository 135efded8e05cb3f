//! Authoritative in-memory list of stars and pending fragments.
//!
//! # Responsibility
//! - Create pending fragments after classification.
//! - Promote a pending fragment into a placed, colored star.
//! - Remove stars and fragments, alone or by owning entry.
//!
//! # Invariants
//! - `promote` is the only creation path for `StarPoint`.
//! - A promoted fragment leaves the pending list in the same call.
//! - Category is fixed on a star once created; there is no re-categorize.
//! - Operations on unknown ids are no-ops returning `None`/`0`.

use crate::config::SpawnConfig;
use crate::model::category::{CategoryId, CategoryInfo};
use crate::model::entry::EntryId;
use crate::model::star::{PendingFragment, PendingId, StarId, StarPoint};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;
use uuid::Uuid;

/// Removal summary for one entry cascade.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryCascade {
    pub removed_stars: Vec<StarId>,
    pub removed_pending: usize,
}

/// Saved star and pending lists, used to undo a mutation whose
/// persistence failed.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreCheckpoint {
    stars: Vec<StarPoint>,
    pending: Vec<PendingFragment>,
}

/// Star and pending-fragment owner.
#[derive(Debug)]
pub struct StarEntityStore<R = StdRng> {
    stars: Vec<StarPoint>,
    pending: Vec<PendingFragment>,
    spawn: SpawnConfig,
    rng: R,
}

impl StarEntityStore<StdRng> {
    /// Creates an empty store seeded from OS entropy.
    pub fn new(spawn: SpawnConfig) -> Self {
        Self::with_rng(spawn, StdRng::from_entropy())
    }
}

impl<R: Rng> StarEntityStore<R> {
    /// Creates an empty store using the provided random source.
    pub fn with_rng(spawn: SpawnConfig, rng: R) -> Self {
        Self {
            stars: Vec::new(),
            pending: Vec::new(),
            spawn,
            rng,
        }
    }

    /// Replaces the star list with persisted records, keeping their order.
    pub fn load_stars(&mut self, stars: Vec<StarPoint>) {
        self.stars = stars;
    }

    /// Stars in storage order.
    pub fn stars(&self) -> &[StarPoint] {
        &self.stars
    }

    pub fn pending(&self) -> &[PendingFragment] {
        &self.pending
    }

    pub fn star(&self, id: StarId) -> Option<&StarPoint> {
        self.stars.iter().find(|star| star.id == id)
    }

    pub fn pending_fragment(&self, id: PendingId) -> Option<&PendingFragment> {
        self.pending.iter().find(|fragment| fragment.id == id)
    }

    /// Stars of one category, in storage order.
    pub fn stars_in_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a StarPoint> + 'a {
        self.stars
            .iter()
            .filter(move |star| star.category == category)
    }

    /// Registers one extracted fragment. Touches no persisted state.
    pub fn create_pending(
        &mut self,
        text: impl Into<String>,
        initial_category: CategoryId,
        entry_id: EntryId,
    ) -> PendingFragment {
        let fragment = PendingFragment {
            id: Uuid::new_v4(),
            text: text.into(),
            category: initial_category,
            entry_id,
        };
        self.pending.push(fragment.clone());
        debug!(
            "event=pending_create module=store status=ok pending_id={} entry_id={}",
            fragment.id, fragment.entry_id
        );
        fragment
    }

    /// Turns a pending fragment into a star of `target`.
    ///
    /// Returns `None` when the fragment was already consumed.
    pub fn promote(&mut self, pending_id: PendingId, target: &CategoryInfo) -> Option<StarPoint> {
        let index = self
            .pending
            .iter()
            .position(|fragment| fragment.id == pending_id)?;
        let fragment = self.pending.remove(index);

        let star = StarPoint {
            id: Uuid::new_v4(),
            entry_id: fragment.entry_id,
            position: self.spawn_position(),
            color: target.color,
            content: fragment.text,
            category: target.id.clone(),
            size: self
                .rng
                .gen_range(self.spawn.min_size..=self.spawn.max_size),
        };
        self.stars.push(star.clone());

        info!(
            "event=star_promote module=store status=ok star_id={} pending_id={} category={} stars={}",
            star.id,
            pending_id,
            star.category,
            self.stars.len()
        );
        Some(star)
    }

    /// Drops a pending fragment without creating a star.
    pub fn discard_pending(&mut self, pending_id: PendingId) -> Option<PendingFragment> {
        let index = self
            .pending
            .iter()
            .position(|fragment| fragment.id == pending_id)?;
        Some(self.pending.remove(index))
    }

    /// Deletes one star.
    pub fn remove(&mut self, star_id: StarId) -> Option<StarPoint> {
        let index = self.stars.iter().position(|star| star.id == star_id)?;
        let removed = self.stars.remove(index);
        info!(
            "event=star_remove module=store status=ok star_id={} stars={}",
            star_id,
            self.stars.len()
        );
        Some(removed)
    }

    /// Deletes every star and pending fragment referencing `entry_id`.
    pub fn remove_for_entry(&mut self, entry_id: EntryId) -> EntryCascade {
        let mut cascade = EntryCascade::default();
        self.stars.retain(|star| {
            if star.entry_id == entry_id {
                cascade.removed_stars.push(star.id);
                false
            } else {
                true
            }
        });
        let pending_before = self.pending.len();
        self.pending.retain(|fragment| fragment.entry_id != entry_id);
        cascade.removed_pending = pending_before - self.pending.len();
        cascade
    }

    pub fn checkpoint(&self) -> StoreCheckpoint {
        StoreCheckpoint {
            stars: self.stars.clone(),
            pending: self.pending.clone(),
        }
    }

    /// Puts both lists back exactly as they were at `checkpoint`.
    pub fn restore(&mut self, checkpoint: StoreCheckpoint) {
        debug!(
            "event=store_restore module=store status=ok stars={} pending={}",
            checkpoint.stars.len(),
            checkpoint.pending.len()
        );
        self.stars = checkpoint.stars;
        self.pending = checkpoint.pending;
    }

    fn spawn_position(&mut self) -> [f32; 3] {
        let radius = self
            .rng
            .gen::<f32>()
            .powf(self.spawn.radial_exponent)
            * self.spawn.max_radius;
        let angle = self.rng.gen_range(0.0..TAU);
        let band = self.spawn.vertical_band;
        let y = if band > 0.0 {
            self.rng.gen_range(-band..=band)
        } else {
            0.0
        };
        [angle.cos() * radius, y, angle.sin() * radius]
    }
}
