use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::archive::{ArchiveReport, Archiver, Cooldown, ThreadCooldown};
use crate::config::ResolvedConfig;
use crate::domain::{ReportPeriod, ReportingMonth};
use crate::error::ArchiverError;
use crate::grid::SheetsClient;
use crate::nodeping::{NodepingClient, uptimes_for_contact_group};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub contact_group: String,
    pub period: ReportPeriod,
    pub count_limit: usize,
}

impl From<&ResolvedConfig> for RunOptions {
    fn from(config: &ResolvedConfig) -> Self {
        Self {
            contact_group: config.contact_group.clone(),
            period: config.period,
            count_limit: config.count_limit,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub contact_group: String,
    pub period: String,
    pub month: ReportingMonth,
    pub checks_found: usize,
    pub archive: ArchiveReport,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct App<N: NodepingClient, S: SheetsClient, C: Cooldown> {
    nodeping: N,
    archiver: Archiver<S, C>,
}

impl<N: NodepingClient, S: SheetsClient> App<N, S, ThreadCooldown> {
    pub fn new(nodeping: N, sheets: S) -> Self {
        Self {
            nodeping,
            archiver: Archiver::new(sheets),
        }
    }
}

impl<N: NodepingClient, S: SheetsClient, C: Cooldown> App<N, S, C> {
    pub fn with_archiver(nodeping: N, archiver: Archiver<S, C>) -> Self {
        Self { nodeping, archiver }
    }

    pub fn archiver(&self) -> &Archiver<S, C> {
        &self.archiver
    }

    pub fn run(
        &self,
        options: &RunOptions,
        now: DateTime<Utc>,
        sink: &dyn ProgressSink,
    ) -> Result<RunResult, ArchiverError> {
        let window = options.period.window(now)?;
        sink.event(ProgressEvent {
            message: format!(
                "phase=Fetch; uptimes for {} ({})",
                options.contact_group, options.period
            ),
            elapsed: None,
        });
        let results = uptimes_for_contact_group(&self.nodeping, &options.contact_group, &window)?;
        let month = ReportingMonth::from_timestamp(results.start_time)?;
        let samples = results.samples();
        info!(
            group = %options.contact_group,
            %month,
            checks = results.check_labels.len(),
            samples = samples.len(),
            "fetched uptimes"
        );

        let archive = self
            .archiver
            .archive(month, &samples, options.count_limit, sink)?;

        Ok(RunResult {
            contact_group: options.contact_group.clone(),
            period: options.period.to_string(),
            month,
            checks_found: results.check_labels.len(),
            archive,
        })
    }
}
