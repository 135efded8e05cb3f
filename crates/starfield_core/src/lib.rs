//! Core logic for the diary star field.
//!
//! Turns tagged diary excerpts into stars embedded in a procedurally
//! generated nebula, and maps pointer interaction plus the animation clock
//! to per-frame render parameters.

pub mod config;
pub mod db;
pub mod field;
pub mod interaction;
pub mod logging;
pub mod model;
pub mod render;
pub mod repo;
pub mod scene;
pub mod service;
pub mod store;

pub use config::{
    ConfigError, FieldConfig, InteractionConfig, RenderConfig, SpawnConfig, StarfieldConfig,
};
pub use field::generator::{BackgroundStars, FieldBuffers, FieldGenerator, Particle, ParticleRole};
pub use field::trajectory::{generate_trajectories, Trajectory};
pub use interaction::state::{
    CategoryAnchor, DragOutcome, DragState, InteractionState, PointerEvent, ScreenPoint,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::category::{default_categories, CategoryError, CategoryId, CategoryInfo};
pub use model::color::{ColorParseError, Rgb};
pub use model::entry::{DiaryEntry, EntryId};
pub use model::star::{PendingFragment, PendingId, StarId, StarPoint};
pub use render::bridge::{
    Constellation, FrameInput, RenderParameters, RenderStateBridge, StarEmphasis, StarVisual,
    Uniforms,
};
pub use repo::record_repo::{
    RecordKey, RecordRepository, RepoError, RepoResult, SqliteRecordRepository,
};
pub use scene::{DragResolution, SceneError, Starfield};
pub use service::collaborators::{Classification, Classifier, CollaboratorError, Transcriber};
pub use service::diary_service::{
    DiaryService, EntryTicket, ServiceError, ServiceResult, SubmittedEntry, WritingPhase,
};
pub use store::star_store::{EntryCascade, StarEntityStore, StoreCheckpoint};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
