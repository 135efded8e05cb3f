//! Live star field scene.
//!
//! # Responsibility
//! - Own categories, the star store, interaction state and the current
//!   nebula buffers.
//! - Route pointer events and resolve drag drops into promotions.
//! - Produce per-frame render parameters and carry the eased dim factor.
//!
//! # Invariants
//! - The field is swapped as one `Arc`; readers never see a half-built
//!   field.
//! - Removing a star also clears hover state pointing at it.
//! - A drop onto an unknown category behaves like a snap-back.
//! - Category ids are unique; a config that fails validation never builds a
//!   scene.

use crate::config::{ConfigError, StarfieldConfig};
use crate::field::generator::{FieldBuffers, FieldGenerator};
use crate::interaction::state::{
    CategoryAnchor, DragOutcome, InteractionState, PointerEvent, ScreenPoint,
};
use crate::model::category::{
    ensure_unique_ids, find_category, CategoryError, CategoryId, CategoryInfo,
};
use crate::model::entry::EntryId;
use crate::model::star::{PendingFragment, PendingId, StarId, StarPoint};
use crate::render::bridge::{FrameInput, RenderParameters, RenderStateBridge};
use crate::store::star_store::{EntryCascade, StarEntityStore, StoreCheckpoint};
use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Why a scene could not be built.
#[derive(Debug)]
pub enum SceneError {
    Config(ConfigError),
    Category(CategoryError),
}

impl Display for SceneError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Category(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SceneError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Category(err) => Some(err),
        }
    }
}

impl From<ConfigError> for SceneError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<CategoryError> for SceneError {
    fn from(value: CategoryError) -> Self {
        Self::Category(value)
    }
}

/// What a released drag turned into.
#[derive(Debug, Clone, PartialEq)]
pub enum DragResolution {
    Promoted(StarPoint),
    SnappedBack {
        fragment: PendingId,
        origin: ScreenPoint,
    },
}

pub struct Starfield<R = StdRng> {
    categories: Vec<CategoryInfo>,
    store: StarEntityStore<R>,
    interaction: InteractionState,
    generator: FieldGenerator,
    bridge: RenderStateBridge,
    field: Arc<FieldBuffers>,
    field_rng: R,
    dim_factor: f32,
}

impl Starfield<StdRng> {
    /// Builds a scene with entropy-seeded generators.
    pub fn new(
        config: StarfieldConfig,
        categories: Vec<CategoryInfo>,
    ) -> Result<Self, SceneError> {
        Self::with_rngs(
            config,
            categories,
            StdRng::from_entropy(),
            StdRng::from_entropy(),
        )
    }
}

impl<R: Rng> Starfield<R> {
    /// Builds a scene with caller-provided random sources for field
    /// generation and star spawning.
    ///
    /// Fails when `config` does not validate or two categories share an id.
    pub fn with_rngs(
        config: StarfieldConfig,
        categories: Vec<CategoryInfo>,
        mut field_rng: R,
        spawn_rng: R,
    ) -> Result<Self, SceneError> {
        config.validate()?;
        ensure_unique_ids(&categories)?;
        let generator = FieldGenerator::new(config.field);
        let field = Arc::new(generator.generate(&mut field_rng, &categories));
        Ok(Self {
            categories,
            store: StarEntityStore::with_rng(config.spawn, spawn_rng),
            interaction: InteractionState::new(config.interaction),
            generator,
            bridge: RenderStateBridge::new(config.render),
            field,
            field_rng,
            dim_factor: 1.0,
        })
    }

    pub fn categories(&self) -> &[CategoryInfo] {
        &self.categories
    }

    pub fn store(&self) -> &StarEntityStore<R> {
        &self.store
    }

    pub fn stars(&self) -> &[StarPoint] {
        self.store.stars()
    }

    pub fn pending(&self) -> &[PendingFragment] {
        self.store.pending()
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    /// Current nebula buffers. Clones of the `Arc` stay valid after a
    /// regeneration.
    pub fn field(&self) -> Arc<FieldBuffers> {
        Arc::clone(&self.field)
    }

    pub fn dim_factor(&self) -> f32 {
        self.dim_factor
    }

    /// Replaces the category list and regenerates the field.
    ///
    /// A list with repeated ids is refused and the current one kept.
    pub fn set_categories(&mut self, categories: Vec<CategoryInfo>) -> Result<(), CategoryError> {
        ensure_unique_ids(&categories)?;
        self.categories = categories;
        self.regenerate_field();
        Ok(())
    }

    /// Appends a category and regenerates the field.
    pub fn add_category(&mut self, category: CategoryInfo) -> Result<(), CategoryError> {
        if find_category(&self.categories, &category.id).is_some() {
            return Err(CategoryError::DuplicateId(category.id));
        }
        self.categories.push(category);
        self.regenerate_field();
        Ok(())
    }

    /// Renames one category. Stars keep their frozen colors and the field is
    /// left as is.
    pub fn rename_category(&mut self, id: &str, name: &str) -> Result<(), CategoryError> {
        let category = self
            .categories
            .iter_mut()
            .find(|category| category.id == id)
            .ok_or_else(|| CategoryError::NotFound(id.to_string()))?;
        category.rename(name)
    }

    pub fn load_stars(&mut self, stars: Vec<StarPoint>) {
        self.store.load_stars(stars);
    }

    pub fn create_pending(
        &mut self,
        text: impl Into<String>,
        initial_category: CategoryId,
        entry_id: EntryId,
    ) -> PendingFragment {
        self.store.create_pending(text, initial_category, entry_id)
    }

    /// Promotes a pending fragment into the category with `category_id`.
    pub fn promote(&mut self, pending_id: PendingId, category_id: &str) -> Option<StarPoint> {
        let target = find_category(&self.categories, category_id)?;
        self.store.promote(pending_id, target)
    }

    pub fn discard_pending(&mut self, pending_id: PendingId) -> Option<PendingFragment> {
        self.interaction.forget_fragment(pending_id);
        self.store.discard_pending(pending_id)
    }

    /// Deletes a star and clears hover if it pointed there.
    pub fn remove_star(&mut self, star_id: StarId) -> Option<StarPoint> {
        self.interaction.forget_star(star_id);
        self.store.remove(star_id)
    }

    /// Deletes everything derived from one entry.
    pub fn remove_entry(&mut self, entry_id: EntryId) -> EntryCascade {
        let dragged = self.interaction.drag().map(|drag| drag.fragment);
        if let Some(fragment) = dragged {
            let owned_by_entry = self
                .store
                .pending_fragment(fragment)
                .is_some_and(|pending| pending.entry_id == entry_id);
            if owned_by_entry {
                self.interaction.forget_fragment(fragment);
            }
        }

        let cascade = self.store.remove_for_entry(entry_id);
        for star_id in &cascade.removed_stars {
            self.interaction.forget_star(*star_id);
        }
        cascade
    }

    /// Snapshot of stars and pending fragments.
    pub fn checkpoint(&self) -> StoreCheckpoint {
        self.store.checkpoint()
    }

    /// Rolls stars and pending fragments back to `checkpoint`. Hover and
    /// drag state pointing at entities that no longer exist stay cleared.
    pub fn restore(&mut self, checkpoint: StoreCheckpoint) {
        self.store.restore(checkpoint);
    }

    /// Feeds one pointer event through the interaction state machine.
    ///
    /// Returns a resolution only when a drag was released.
    pub fn handle_pointer(
        &mut self,
        event: PointerEvent,
        anchors: &[CategoryAnchor],
    ) -> Option<DragResolution> {
        match self.interaction.handle(event, anchors)? {
            DragOutcome::Drop {
                fragment,
                category,
                origin,
            } => match self.promote(fragment, &category) {
                Some(star) => Some(DragResolution::Promoted(star)),
                None => {
                    warn!(
                        "event=drag_drop module=scene status=rejected pending_id={} category={}",
                        fragment, category
                    );
                    Some(DragResolution::SnappedBack { fragment, origin })
                }
            },
            DragOutcome::SnapBack { fragment, origin } => {
                Some(DragResolution::SnappedBack { fragment, origin })
            }
        }
    }

    /// Advances the animation by one frame.
    pub fn frame(&mut self, time: f32, delta: f32) -> RenderParameters {
        let params = self.bridge.frame(&FrameInput {
            time,
            delta,
            previous_dim: self.dim_factor,
            stars: self.store.stars(),
            interaction: &self.interaction,
        });
        self.dim_factor = params.uniforms.dim_factor;
        params
    }

    fn regenerate_field(&mut self) {
        let field = self.generator.generate(&mut self.field_rng, &self.categories);
        self.field = Arc::new(field);
    }
}
