use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::app::{ProgressEvent, ProgressSink};
use crate::domain::{MetricSample, ReportingMonth};
use crate::error::ArchiverError;
use crate::grid::{
    CHECK_COLUMN, CellRef, Dimension, FIRST_CHECK_ROW, FIRST_MONTH_COLUMN, HEADER_ROW, RangeRef,
    SheetsClient, TabProperties, column_letters,
};
use crate::locate::{Slot, locate_column, locate_row};

pub const DEFAULT_COUNT_LIMIT: usize = 1000;
/// Sheets allows 100 writes per 100 seconds per credential.
pub const WRITES_PER_COOLDOWN: usize = 20;
pub const COOLDOWN: Duration = Duration::from_secs(22);

pub const CHECKS_LABEL: &str = "Checks";
pub const UPTIME_LABEL: &str = "Uptime Percent";

pub trait Cooldown {
    fn pause(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadCooldown;

impl Cooldown for ThreadCooldown {
    fn pause(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

#[derive(Debug, Clone)]
pub struct EnsuredTab {
    pub properties: TabProperties,
    pub created: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPlacement {
    pub column: usize,
    pub label: String,
    pub inserted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowPlacement {
    pub row: usize,
    pub inserted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveReport {
    pub tab: String,
    pub tab_created: bool,
    pub column_label: String,
    pub column: String,
    pub column_inserted: bool,
    pub rows_inserted: usize,
    pub written: usize,
    pub skipped: usize,
    pub pauses: usize,
}

pub struct Archiver<S: SheetsClient, C: Cooldown> {
    sheets: S,
    cooldown: C,
}

impl<S: SheetsClient> Archiver<S, ThreadCooldown> {
    pub fn new(sheets: S) -> Self {
        Self::with_cooldown(sheets, ThreadCooldown)
    }
}

impl<S: SheetsClient, C: Cooldown> Archiver<S, C> {
    pub fn with_cooldown(sheets: S, cooldown: C) -> Self {
        Self { sheets, cooldown }
    }

    pub fn sheets(&self) -> &S {
        &self.sheets
    }

    pub fn cooldown(&self) -> &C {
        &self.cooldown
    }

    pub fn ensure_tab(&self, title: &str) -> Result<EnsuredTab, ArchiverError> {
        if let Some(properties) = self.sheets.find_tab(title)? {
            return Ok(EnsuredTab {
                properties,
                created: false,
            });
        }

        info!(tab = title, "creating sheet tab");
        self.sheets
            .create_tab(title)
            .map_err(|err| ArchiverError::TabCreationFailed {
                title: title.to_string(),
                message: err.to_string(),
            })?;

        let properties = self
            .sheets
            .find_tab(title)?
            .ok_or_else(|| ArchiverError::TabNotFoundAfterCreation(title.to_string()))?;

        let seeds = [
            (CellRef::new(HEADER_ROW, CHECK_COLUMN), CHECKS_LABEL),
            (CellRef::new(0, FIRST_MONTH_COLUMN), UPTIME_LABEL),
        ];
        for (cell, label) in seeds {
            if let Err(err) = self.sheets.write_cell(title, cell, label) {
                warn!(tab = title, %cell, %err, "failed to seed header label");
            }
        }

        Ok(EnsuredTab {
            properties,
            created: true,
        })
    }

    pub fn ensure_month_column(
        &self,
        tab: &mut TabProperties,
        target: ReportingMonth,
    ) -> Result<ColumnPlacement, ArchiverError> {
        let range = RangeRef::row_from(CellRef::new(HEADER_ROW, FIRST_MONTH_COLUMN));
        let header = self
            .sheets
            .read_range(&tab.title, range)?
            .into_iter()
            .next()
            .unwrap_or_default();

        let location = locate_column(target.month, &header);
        let column = FIRST_MONTH_COLUMN + location.index;
        let label = target.header_label();
        match location.slot {
            Slot::Insert => {
                info!(tab = %tab.title, column = %column_letters(column), %label, "inserting month column");
                self.sheets.insert_dimension(tab.id, Dimension::Columns, column)?;
                tab.grow(Dimension::Columns, 1);
            }
            Slot::Vacant => self.ensure_capacity(tab, Dimension::Columns, column)?,
            Slot::Existing => debug!(%label, column, "month column already present"),
        }
        if location.needs_key() {
            self.sheets
                .write_cell(&tab.title, CellRef::new(HEADER_ROW, column), &label)?;
        }

        Ok(ColumnPlacement {
            column,
            label,
            inserted: location.must_insert(),
        })
    }

    pub fn ensure_check_row(
        &self,
        tab: &mut TabProperties,
        check: &str,
    ) -> Result<RowPlacement, ArchiverError> {
        let range = RangeRef::column_from(CellRef::new(FIRST_CHECK_ROW, CHECK_COLUMN));
        let rows = self.sheets.read_range(&tab.title, range)?;

        let location = locate_row(check, &rows);
        let row = FIRST_CHECK_ROW + location.index;
        match location.slot {
            Slot::Insert => {
                info!(tab = %tab.title, row = row + 1, check, "inserting check row");
                self.sheets.insert_dimension(tab.id, Dimension::Rows, row)?;
                tab.grow(Dimension::Rows, 1);
            }
            Slot::Vacant => self.ensure_capacity(tab, Dimension::Rows, row)?,
            Slot::Existing => {}
        }
        if location.needs_key() {
            self.sheets
                .write_cell(&tab.title, CellRef::new(row, CHECK_COLUMN), check)?;
        }

        Ok(RowPlacement {
            row,
            inserted: location.must_insert(),
        })
    }

    pub fn archive(
        &self,
        target: ReportingMonth,
        samples: &[MetricSample],
        limit: usize,
        sink: &dyn ProgressSink,
    ) -> Result<ArchiveReport, ArchiverError> {
        let limit = if limit == 0 { DEFAULT_COUNT_LIMIT } else { limit };
        let start = Instant::now();

        let title = target.tab_title();
        sink.event(ProgressEvent {
            message: format!("phase=Tab; resolving tab {title}"),
            elapsed: None,
        });
        let ensured = self.ensure_tab(&title)?;
        let mut tab = ensured.properties;

        sink.event(ProgressEvent {
            message: format!("phase=Column; resolving {target}"),
            elapsed: Some(start.elapsed()),
        });
        let column = self.ensure_month_column(&mut tab, target)?;

        let pending = samples.len().min(limit);
        let mut written = 0usize;
        let mut pauses = 0usize;
        let mut rows_inserted = 0usize;
        for sample in samples.iter().take(pending) {
            let row = self.ensure_check_row(&mut tab, &sample.check)?;
            if row.inserted {
                rows_inserted += 1;
            }
            let cell = CellRef::new(row.row, column.column);
            self.sheets.write_cell(&tab.title, cell, &sample.cell_value())?;
            written += 1;
            sink.event(ProgressEvent {
                message: format!("phase=Write; {} -> {cell}", sample.check),
                elapsed: Some(start.elapsed()),
            });

            if written % WRITES_PER_COOLDOWN == 0 {
                info!(written, cooldown_secs = COOLDOWN.as_secs(), "pausing for write quota");
                self.cooldown.pause(COOLDOWN);
                pauses += 1;
            }
        }

        info!(tab = %tab.title, month = %column.label, written, "archive complete");
        Ok(ArchiveReport {
            tab: tab.title,
            tab_created: ensured.created,
            column_label: column.label,
            column: column_letters(column.column),
            column_inserted: column.inserted,
            rows_inserted,
            written,
            skipped: samples.len() - written,
            pauses,
        })
    }

    fn ensure_capacity(
        &self,
        tab: &mut TabProperties,
        dimension: Dimension,
        index: usize,
    ) -> Result<(), ArchiverError> {
        let size = tab.size(dimension);
        if index < size {
            return Ok(());
        }
        let count = index + 1 - size;
        info!(tab = %tab.title, %dimension, count, "appending to grid");
        self.sheets.append_dimension(tab.id, dimension, count)?;
        tab.grow(dimension, count);
        Ok(())
    }
}
