//! Diary use-case service.
//!
//! # Responsibility
//! - Load entries, stars and categories and rebuild the scene from them.
//! - Run the write -> classify -> pending-fragments flow with a loading
//!   phase.
//! - Flush the affected record list after every mutation.
//! - Cascade entry deletion into stars and pending fragments.
//!
//! # Invariants
//! - Only one entry can be classifying at a time; the render loop is never
//!   blocked by it.
//! - Collaborator failures never surface as errors: classification falls
//!   back to the first category, transcription to an empty string.
//! - Every mutation rewrites the full list for the key it touched.
//! - A mutation whose save fails leaves entries, stars, pending fragments
//!   and categories as they were before the call.

use crate::config::{ConfigError, StarfieldConfig};
use crate::interaction::state::{CategoryAnchor, PointerEvent};
use crate::model::category::{
    default_categories, ensure_unique_ids, CategoryError, CategoryId, CategoryInfo,
};
use crate::model::color::{ColorParseError, Rgb};
use crate::model::entry::{DiaryEntry, EntryId};
use crate::model::star::{PendingFragment, PendingId, StarId, StarPoint};
use crate::render::bridge::RenderParameters;
use crate::repo::record_repo::{RecordKey, RecordRepository, RepoError};
use crate::scene::{DragResolution, SceneError, Starfield};
use crate::service::collaborators::{
    extract_fragments, resolve_category, Classification, Classifier, CollaboratorError,
    Transcriber,
};
use crate::store::star_store::EntryCascade;
use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for diary use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Another entry is still being classified.
    Busy,
    /// Entry text is empty after trimming.
    EmptyEntry,
    /// There is no category to file an entry under.
    NoCategories,
    /// The ticket does not belong to the classification in flight.
    StaleTicket,
    Config(ConfigError),
    Category(CategoryError),
    Color(ColorParseError),
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Busy => write!(f, "an entry is already being classified"),
            Self::EmptyEntry => write!(f, "entry text cannot be empty"),
            Self::NoCategories => write!(f, "no categories available"),
            Self::StaleTicket => write!(f, "entry ticket is not the one in flight"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Category(err) => write!(f, "{err}"),
            Self::Color(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Category(err) => Some(err),
            Self::Color(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ConfigError> for ServiceError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<SceneError> for ServiceError {
    fn from(value: SceneError) -> Self {
        match value {
            SceneError::Config(err) => Self::Config(err),
            SceneError::Category(err) => Self::Category(err),
        }
    }
}

impl From<CategoryError> for ServiceError {
    fn from(value: CategoryError) -> Self {
        Self::Category(value)
    }
}

impl From<ColorParseError> for ServiceError {
    fn from(value: ColorParseError) -> Self {
        Self::Color(value)
    }
}

/// Writing-flow phase shown by the host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritingPhase {
    Idle,
    /// Waiting on the classifier; writing input is suspended.
    Classifying,
}

/// Handle for one in-flight classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryTicket {
    sequence: u64,
    text: String,
}

impl EntryTicket {
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Result of a completed entry submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedEntry {
    pub entry: DiaryEntry,
    pub fragments: Vec<PendingFragment>,
    /// Whether the category came from the first-category fallback.
    pub used_fallback: bool,
}

/// Diary facade over a record repository and a live scene.
pub struct DiaryService<P: RecordRepository, R = StdRng> {
    repo: P,
    entries: Vec<DiaryEntry>,
    scene: Starfield<R>,
    phase: WritingPhase,
    sequence: u64,
}

impl<P: RecordRepository> DiaryService<P, StdRng> {
    /// Loads persisted state and builds an entropy-seeded scene.
    pub fn load(repo: P, config: StarfieldConfig) -> ServiceResult<Self> {
        Self::load_with_rngs(
            repo,
            config,
            StdRng::from_entropy(),
            StdRng::from_entropy(),
        )
    }
}

impl<P: RecordRepository, R: Rng> DiaryService<P, R> {
    /// Loads persisted state using caller-provided random sources.
    ///
    /// Absent lists default to empty (entries, stars) or to the default
    /// category set. An invalid config or a stored category list with
    /// repeated ids is an error.
    pub fn load_with_rngs(
        repo: P,
        config: StarfieldConfig,
        field_rng: R,
        spawn_rng: R,
    ) -> ServiceResult<Self> {
        let categories = repo
            .load_list::<CategoryInfo>(RecordKey::Categories)?
            .unwrap_or_else(default_categories);
        let entries = repo
            .load_list::<DiaryEntry>(RecordKey::Entries)?
            .unwrap_or_default();
        let stars = repo
            .load_list::<StarPoint>(RecordKey::Stars)?
            .unwrap_or_default();

        info!(
            "event=service_load module=service status=ok entries={} stars={} categories={}",
            entries.len(),
            stars.len(),
            categories.len()
        );

        let mut scene = Starfield::with_rngs(config, categories, field_rng, spawn_rng)?;
        scene.load_stars(stars);
        Ok(Self {
            repo,
            entries,
            scene,
            phase: WritingPhase::Idle,
            sequence: 0,
        })
    }

    pub fn entries(&self) -> &[DiaryEntry] {
        &self.entries
    }

    pub fn scene(&self) -> &Starfield<R> {
        &self.scene
    }

    pub fn phase(&self) -> WritingPhase {
        self.phase
    }

    /// Starts classifying `text`; the writing flow is suspended until
    /// [`Self::complete_entry`] or [`Self::cancel_entry`].
    pub fn begin_entry(&mut self, text: impl Into<String>) -> ServiceResult<EntryTicket> {
        if self.phase == WritingPhase::Classifying {
            return Err(ServiceError::Busy);
        }
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ServiceError::EmptyEntry);
        }

        self.sequence += 1;
        self.phase = WritingPhase::Classifying;
        Ok(EntryTicket {
            sequence: self.sequence,
            text,
        })
    }

    /// Abandons the classification in flight without saving anything.
    pub fn cancel_entry(&mut self, ticket: &EntryTicket) -> ServiceResult<()> {
        self.check_ticket(ticket)?;
        self.phase = WritingPhase::Idle;
        Ok(())
    }

    /// Finishes a classification: stores the entry and creates its pending
    /// fragments.
    pub fn complete_entry(
        &mut self,
        ticket: EntryTicket,
        outcome: Result<Classification, CollaboratorError>,
    ) -> ServiceResult<SubmittedEntry> {
        self.check_ticket(&ticket)?;
        self.phase = WritingPhase::Idle;

        let classification = outcome.unwrap_or_else(|err| {
            warn!(
                "event=classify module=service status=fallback error_code=collaborator_failed error={err}"
            );
            Classification::default()
        });
        let categories = self.scene.categories();
        let category: CategoryId =
            resolve_category(classification.category_id.as_deref(), categories)
                .ok_or(ServiceError::NoCategories)?;
        let used_fallback = classification.category_id.as_deref().map(str::trim)
            != Some(category.as_str());
        let fragment_texts = extract_fragments(&ticket.text, &classification.fragments);

        let entry = DiaryEntry::new(ticket.text, category.clone(), now_epoch_ms());
        let mut entries = self.entries.clone();
        entries.push(entry.clone());
        self.repo.save_list(RecordKey::Entries, &entries)?;
        self.entries = entries;

        let fragments: Vec<PendingFragment> = fragment_texts
            .into_iter()
            .map(|text| self.scene.create_pending(text, category.clone(), entry.id))
            .collect();

        info!(
            "event=entry_submit module=service status=ok entry_id={} category={} fragments={} fallback={}",
            entry.id,
            category,
            fragments.len(),
            used_fallback
        );
        Ok(SubmittedEntry {
            entry,
            fragments,
            used_fallback,
        })
    }

    /// Runs begin -> classify -> complete in one call.
    pub fn submit_entry(
        &mut self,
        text: impl Into<String>,
        classifier: &impl Classifier,
    ) -> ServiceResult<SubmittedEntry> {
        let ticket = self.begin_entry(text)?;
        let outcome = classifier.classify(ticket.text(), self.scene.categories());
        self.complete_entry(ticket, outcome)
    }

    /// Best-effort transcription. Failures come back as an empty string.
    pub fn transcribe(&self, audio: &[u8], transcriber: &impl Transcriber) -> String {
        match transcriber.transcribe(audio) {
            Ok(text) => text.trim().to_string(),
            Err(err) => {
                warn!(
                    "event=transcribe module=service status=fallback bytes={} error={err}",
                    audio.len()
                );
                String::new()
            }
        }
    }

    /// Routes a pointer event; persists stars when a drop promotes one.
    ///
    /// When that save fails the promotion is undone and the fragment is
    /// pending again.
    pub fn handle_pointer(
        &mut self,
        event: PointerEvent,
        anchors: &[CategoryAnchor],
    ) -> ServiceResult<Option<DragResolution>> {
        let checkpoint = matches!(event, PointerEvent::DragEnd { .. })
            .then(|| self.scene.checkpoint());
        let resolution = self.scene.handle_pointer(event, anchors);
        if let (Some(DragResolution::Promoted(_)), Some(checkpoint)) = (&resolution, checkpoint) {
            if let Err(err) = self.flush_stars() {
                self.scene.restore(checkpoint);
                return Err(err);
            }
        }
        Ok(resolution)
    }

    /// Promotes a pending fragment without a drag gesture.
    pub fn promote(
        &mut self,
        pending_id: PendingId,
        category_id: &str,
    ) -> ServiceResult<Option<StarPoint>> {
        let checkpoint = self.scene.checkpoint();
        let star = self.scene.promote(pending_id, category_id);
        if star.is_some() {
            if let Err(err) = self.flush_stars() {
                self.scene.restore(checkpoint);
                return Err(err);
            }
        }
        Ok(star)
    }

    pub fn discard_pending(&mut self, pending_id: PendingId) -> Option<PendingFragment> {
        self.scene.discard_pending(pending_id)
    }

    /// Deletes one star. Unknown ids are a no-op returning `false`.
    pub fn remove_star(&mut self, star_id: StarId) -> ServiceResult<bool> {
        let checkpoint = self.scene.checkpoint();
        if self.scene.remove_star(star_id).is_none() {
            return Ok(false);
        }
        if let Err(err) = self.flush_stars() {
            self.scene.restore(checkpoint);
            return Err(err);
        }
        Ok(true)
    }

    /// Deletes an entry and everything excerpted from it.
    ///
    /// Returns `None` when the entry does not exist.
    pub fn delete_entry(&mut self, entry_id: EntryId) -> ServiceResult<Option<EntryCascade>> {
        let Some(index) = self.entries.iter().position(|entry| entry.id == entry_id) else {
            return Ok(None);
        };
        let mut entries = self.entries.clone();
        entries.remove(index);
        let checkpoint = self.scene.checkpoint();
        let cascade = self.scene.remove_entry(entry_id);

        if !cascade.removed_stars.is_empty() {
            if let Err(err) = self.flush_stars() {
                self.scene.restore(checkpoint);
                return Err(err);
            }
        }
        if let Err(err) = self.repo.save_list(RecordKey::Entries, &entries) {
            let stars_written = !cascade.removed_stars.is_empty();
            self.scene.restore(checkpoint);
            if stars_written {
                if let Err(rewrite) = self.flush_stars() {
                    error!(
                        "event=entry_delete module=service status=error entry_id={} error_code=star_rollback_failed error={rewrite}",
                        entry_id
                    );
                }
            }
            return Err(err.into());
        }
        self.entries = entries;
        info!(
            "event=entry_delete module=service status=ok entry_id={} stars_removed={} pending_removed={}",
            entry_id,
            cascade.removed_stars.len(),
            cascade.removed_pending
        );
        Ok(Some(cascade))
    }

    /// Creates a category from a name and `#rrggbb` color.
    pub fn add_category(&mut self, name: &str, color_hex: &str) -> ServiceResult<CategoryInfo> {
        let category = CategoryInfo::new(name, Rgb::from_hex(color_hex)?)?;
        let mut categories = self.scene.categories().to_vec();
        categories.push(category.clone());
        ensure_unique_ids(&categories)?;
        self.repo.save_list(RecordKey::Categories, &categories)?;
        self.scene.add_category(category.clone())?;
        info!(
            "event=category_add module=service status=ok category={} categories={}",
            category.id,
            self.scene.categories().len()
        );
        Ok(category)
    }

    /// Renames a category. Existing stars keep their colors.
    pub fn rename_category(&mut self, id: &str, name: &str) -> ServiceResult<()> {
        let mut categories = self.scene.categories().to_vec();
        categories
            .iter_mut()
            .find(|category| category.id == id)
            .ok_or_else(|| CategoryError::NotFound(id.to_string()))?
            .rename(name)?;
        self.repo.save_list(RecordKey::Categories, &categories)?;
        self.scene.rename_category(id, name)?;
        Ok(())
    }

    /// Advances the render state by one frame.
    pub fn frame(&mut self, time: f32, delta: f32) -> RenderParameters {
        self.scene.frame(time, delta)
    }

    fn check_ticket(&self, ticket: &EntryTicket) -> ServiceResult<()> {
        if self.phase != WritingPhase::Classifying || ticket.sequence != self.sequence {
            return Err(ServiceError::StaleTicket);
        }
        Ok(())
    }

    fn flush_stars(&self) -> ServiceResult<()> {
        self.repo.save_list(RecordKey::Stars, self.scene.stars())?;
        Ok(())
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
