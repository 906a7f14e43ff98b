// Service exports
pub mod discovery;
pub mod memory;
pub mod postgres;
pub mod reports;
pub mod search;
pub mod store;

pub use discovery::{DiscoveryOutcome, DiscoverySettings, DiscoveryStage, MatchDiscoveryEngine};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use reports::{CreatedReport, ReportService};
pub use search::{RadiusSearchService, SearchSettings};
pub use store::{MatchStore, StoreError};
