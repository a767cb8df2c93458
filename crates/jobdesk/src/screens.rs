//! Screen state: filter forms wired to the fetch layer.
//!
//! Each screen owns its form and its last good data. A fetch takes a ticket
//! from the screen's sequencer before it starts; a response is applied only if
//! its ticket is still the newest, and a failed fetch leaves the data alone.

use std::thread;

use chrono::NaiveDate;

use jobsheet::filter::{FilterForm, JobQuery};
use jobsheet::insights::{InsightFilter, InsightRow, total_jobs};
use jobsheet::job::{JobDraft, JobRecord, next_job_id};
use jobsheet::picker::PickerList;
use jobsheet::sequence::{Latest, RequestSequencer, Ticket};
use jobsheet::session::AppContext;
use jobsheet::table::{JobTable, PageSize};

use crate::api::{ApiError, JobsApi};
use crate::error::Result;

/// Sequencer keys, one per independently refreshed resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Jobs,
    Insights,
}

/// The job list: filter form plus the searchable, paged table.
#[derive(Debug)]
pub struct JobListScreen {
    form: FilterForm,
    table: JobTable,
    sequencer: RequestSequencer<Resource>,
    loaded: Option<JobQuery>,
}

impl JobListScreen {
    #[must_use]
    pub fn new(today: NaiveDate, page_size: PageSize) -> Self {
        Self {
            form: FilterForm::new(today),
            table: JobTable::default().with_page_size(page_size),
            sequencer: RequestSequencer::new(),
            loaded: None,
        }
    }

    #[must_use]
    pub fn form(&self) -> &FilterForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FilterForm {
        &mut self.form
    }

    #[must_use]
    pub fn table(&self) -> &JobTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut JobTable {
        &mut self.table
    }

    /// The query behind the rows currently shown.
    #[must_use]
    pub fn loaded_query(&self) -> Option<&JobQuery> {
        self.loaded.as_ref()
    }

    /// Validates the form and issues a ticket for the fetch.
    pub fn begin_fetch(&self) -> jobsheet::Result<(Ticket<Resource>, JobQuery)> {
        let query = self.form.query()?;
        Ok((self.sequencer.issue(Resource::Jobs), query))
    }

    /// Applies a completed fetch unless a newer one was started since.
    pub fn finish_fetch(
        &mut self,
        ticket: &Ticket<Resource>,
        query: JobQuery,
        records: Vec<JobRecord>,
    ) -> bool {
        if !self.sequencer.accept(ticket) {
            tracing::warn!(seq = ticket.seq(), "dropping stale job list");
            return false;
        }
        tracing::info!(count = records.len(), range = %query.range, status = %query.status, "job list loaded");
        self.table.set_records(records);
        self.loaded = Some(query);
        true
    }

    /// Fetches with the current form and applies the result.
    ///
    /// Returns whether the rows were replaced.
    pub fn refresh<A: JobsApi + ?Sized>(&mut self, api: &A, ctx: &AppContext) -> Result<bool> {
        let (ticket, query) = self.begin_fetch()?;
        let records = api.list_jobs(ctx, &query)?;
        Ok(self.finish_fetch(&ticket, query, records))
    }
}

/// Business insights: counts per group over a date range.
#[derive(Debug)]
pub struct InsightsScreen {
    filter: InsightFilter,
    rows: Latest<Vec<InsightRow>>,
    sequencer: RequestSequencer<Resource>,
}

impl InsightsScreen {
    #[must_use]
    pub fn new(today: NaiveDate) -> Self {
        Self {
            filter: InsightFilter::new(today),
            rows: Latest::default(),
            sequencer: RequestSequencer::new(),
        }
    }

    #[must_use]
    pub fn filter(&self) -> &InsightFilter {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut InsightFilter {
        &mut self.filter
    }

    #[must_use]
    pub fn rows(&self) -> &[InsightRow] {
        self.rows.get()
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        total_jobs(self.rows.get())
    }

    pub fn refresh<A: JobsApi + ?Sized>(&mut self, api: &A, ctx: &AppContext) -> Result<bool> {
        let query = self.filter.query()?;
        let ticket = self.sequencer.issue(Resource::Insights);
        let rows = api.insights(ctx, &query)?;
        Ok(self.rows.apply(&self.sequencer, &ticket, rows))
    }
}

/// What a new job sheet needs before it can be shown.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSheetSetup {
    pub job_id: String,
    pub pickers: PickerList,
}

impl JobSheetSetup {
    /// A blank draft with the pickers' first values pre-selected.
    #[must_use]
    pub fn blank_draft(&self, today: NaiveDate) -> JobDraft {
        JobDraft::blank(self.job_id.clone(), &self.pickers, today)
    }
}

/// Fetches the last job id and the picker lists in parallel.
///
/// Both must succeed; the first error is returned.
pub fn load_job_sheet_setup<A>(
    api: &A,
    ctx: &AppContext,
    today: NaiveDate,
) -> std::result::Result<JobSheetSetup, ApiError>
where
    A: JobsApi + Sync + ?Sized,
{
    let (last, pickers) = thread::scope(|scope| {
        let last = scope.spawn(|| api.last_job_id(ctx));
        let pickers = api.list_pickers(ctx);
        let last = last
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
        (last, pickers)
    });
    let last = last?;
    let pickers = pickers?;
    let job_id = next_job_id(&last, today);
    tracing::debug!(%last, next = %job_id, "job sheet setup loaded");
    Ok(JobSheetSetup { job_id, pickers })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn job(id: &str) -> JobRecord {
        JobRecord {
            job_id: id.into(),
            ..JobRecord::default()
        }
    }

    #[test]
    fn later_fetch_wins_when_earlier_returns_last() {
        let mut screen = JobListScreen::new(d(2024, 6, 15), PageSize::Ten);
        let (first, first_query) = screen.begin_fetch().unwrap();
        screen.form_mut().set_status("Pending");
        let (second, second_query) = screen.begin_fetch().unwrap();

        assert!(screen.finish_fetch(&second, second_query, vec![job("new")]));
        assert!(!screen.finish_fetch(&first, first_query, vec![job("old")]));

        assert_eq!(screen.table().records()[0].job_id, "new");
        assert_eq!(screen.loaded_query().unwrap().status, "Pending");
    }

    #[test]
    fn superseded_fetch_is_dropped_even_if_it_arrives_first() {
        let mut screen = JobListScreen::new(d(2024, 6, 15), PageSize::Ten);
        let (first, query) = screen.begin_fetch().unwrap();
        let _second = screen.begin_fetch().unwrap();
        assert!(!screen.finish_fetch(&first, query, vec![job("old")]));
        assert!(screen.table().records().is_empty());
        assert!(screen.loaded_query().is_none());
    }

    #[test]
    fn inverted_dates_fail_before_fetching() {
        let mut screen = JobListScreen::new(d(2024, 6, 15), PageSize::Ten);
        screen.form_mut().set_to_date(d(2020, 1, 1));
        assert!(matches!(
            screen.begin_fetch(),
            Err(jobsheet::Error::InvertedRange { .. })
        ));
    }

    #[test]
    fn page_size_carries_into_table() {
        let screen = JobListScreen::new(d(2024, 6, 15), PageSize::TwentyFive);
        assert_eq!(screen.table().page_size(), PageSize::TwentyFive);
    }

    #[test]
    fn blank_draft_uses_setup() {
        let setup = JobSheetSetup {
            job_id: "iTek2406042".into(),
            pickers: PickerList {
                engineers: vec!["Ravi".into()],
                ..PickerList::default()
            },
        };
        let draft = setup.blank_draft(d(2024, 6, 15));
        assert_eq!(draft.job_id, "iTek2406042");
        assert_eq!(draft.engineer, "Ravi");
    }
}
