pub mod backup;
pub mod cloud_providers;
pub mod ingest;
pub mod notifier;
pub mod sanitize;
pub mod stats;
pub mod token_manager;
