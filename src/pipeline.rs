//! Extract, archive, transform and load, once per invocation.

use seasync_extract::Client;
use seasync_store::Repository;
use seasync_store::error::ErrorKind as StoreErrorKind;
use seasync_transform::transform;
use std::path::PathBuf;
use tracing::instrument;

use crate::snapshot;

const PREVIEW_RECORDS: usize = 3;

/// What a sync run managed to do. Failures along the way are logged, not
/// returned: a run that fetched nothing still completes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    pub fetched: bool,
    pub transformed: usize,
    pub loaded: u64,
}

pub struct Pipeline {
    client: Client,
    repo: Repository,
    chain: String,
    snapshot: PathBuf,
}

impl Pipeline {
    pub fn new(client: Client, repo: Repository, chain: impl Into<String>, snapshot: impl Into<PathBuf>) -> Self {
        Self { client, repo, chain: chain.into(), snapshot: snapshot.into() }
    }

    #[instrument(skip(self), fields(chain = %self.chain, endpoint = %self.client.endpoint()))]
    pub async fn run(&self) -> Report {
        tracing::info!("Starting ETL pipeline");
        let report = self.sync().await;
        tracing::info!(
            fetched = report.fetched,
            transformed = report.transformed,
            loaded = report.loaded,
            "ETL pipeline completed"
        );
        report
    }

    async fn sync(&self) -> Report {
        let mut report = Report::default();
        let raw = match self.client.fetch_collections(&self.chain).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return report,
            Err(err) => {
                tracing::error!(error = ?err, "Could not fetch collections");
                return report;
            },
        };
        report.fetched = true;

        if let Err(err) = snapshot::save(&self.snapshot, &raw).await {
            tracing::error!(error = ?err, path = %self.snapshot.display(), "Could not save raw snapshot");
        }

        let records = transform(&raw);
        report.transformed = records.len();
        let preview = &records[..records.len().min(PREVIEW_RECORDS)];
        tracing::info!(?preview, "Preview of transformed data");

        match self.repo.bulk_load(&records).await {
            Ok(loaded) => report.loaded = loaded,
            Err(err) if matches!(&*err, StoreErrorKind::Duplicate) => {
                tracing::error!(error = ?err, "Database integrity error; nothing was loaded");
            },
            Err(err) => tracing::error!(error = ?err, "Unexpected database error; nothing was loaded"),
        }
        report
    }
}
