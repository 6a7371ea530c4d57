//! Persistence and collaborator ports used by the tracking services.

mod collaborators;
mod items;
mod projects;

pub use collaborators::{BrandingOutcome, GeoTagger, MediaStore, SpreadsheetAdapter, Watermarker};
pub use items::{EvidenceRepository, IssueRepository, ItemRepository};
pub use projects::ProjectRepository;
