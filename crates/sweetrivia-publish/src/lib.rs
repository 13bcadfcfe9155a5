//! # sweetrivia-publish
//!
//! Uploads finished CSV exports to object storage and records a metadata row
//! for each upload.
//!
//! - [`Publisher`] - single-flight publish per session
//! - [`ObjectStore`] / [`RecordStore`] - storage seams
//! - [`SupabaseStorage`] - Supabase Storage + PostgREST
//! - [`LocalStorage`] - a local directory acting as the bucket

mod error;
mod flight;
mod local;
mod publisher;
mod supabase;
mod traits;

pub use error::{PublishError, StorageError};
pub use flight::{FlightGuard, SingleFlight};
pub use local::{LocalStorage, RECORDS_FILE};
pub use publisher::{PublishReceipt, Publisher};
pub use supabase::{SupabaseConfig, SupabaseStorage};
pub use traits::{ExportRecord, ObjectStore, RecordStore};
