//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod exif_geo_tagger;
mod filesystem_media_store;
mod image_watermarker;
mod in_memory_rate_limit_repository;
mod in_memory_tracker_repository;
mod postgres_audit_log_repository;
mod postgres_item_repository;
mod postgres_project_repository;
mod postgres_rate_limit_repository;
mod postgres_security_event_repository;
mod postgres_user_repository;
mod redis_rate_limit_repository;
mod tabular_spreadsheet_adapter;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use exif_geo_tagger::ExifGeoTagger;
pub use filesystem_media_store::FilesystemMediaStore;
pub use image_watermarker::{ImageWatermarker, WatermarkConfig};
pub use in_memory_rate_limit_repository::InMemoryRateLimitRepository;
pub use in_memory_tracker_repository::InMemoryTrackerRepository;
pub use postgres_audit_log_repository::PostgresAuditLogRepository;
pub use postgres_item_repository::PostgresItemRepository;
pub use postgres_project_repository::PostgresProjectRepository;
pub use postgres_rate_limit_repository::PostgresRateLimitRepository;
pub use postgres_security_event_repository::PostgresSecurityEventRepository;
pub use postgres_user_repository::PostgresUserRepository;
pub use redis_rate_limit_repository::RedisRateLimitRepository;
pub use tabular_spreadsheet_adapter::TabularSpreadsheetAdapter;
