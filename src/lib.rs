pub mod config;
pub mod ingest;
pub mod metrics;
pub mod output;
pub mod reduce;
pub mod report;
pub mod server;
pub mod store;
pub mod table;
pub mod units;

pub use config::Config;
pub use ingest::{IngestedReport, UploadError};
pub use output::{OutputFormat, TableWriter, create_writer};
pub use reduce::reduce;
pub use report::{MetricSamples, ReportDocument, StoredMetric};
pub use store::{Report, Store, StoreError, SystemInfo};
pub use table::{ReportTable, RunTable, Table, format_values};
