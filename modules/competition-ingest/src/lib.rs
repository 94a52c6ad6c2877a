pub mod blacklist;
pub mod config;
pub mod error;
pub mod ingestor;
pub mod normalize;
pub mod publisher;
pub mod region;
pub mod server;
pub mod types;

pub use blacklist::{load_blacklist, Blacklist, BlobStore, S3BlobStore, StaticBlobStore};
pub use config::{BlacklistLocation, IngestConfig};
pub use error::{IngestError, Result};
pub use ingestor::{IngestOutcome, Ingestor};
pub use normalize::normalize;
pub use publisher::{MockPublisher, QueuePublisher, SqsPublisher};
pub use region::classify_region;
pub use types::{CompetitionRecord, QueueMessage, RegionCode};
