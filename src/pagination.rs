//! Lazy pagination over search results.
//!
//! Search endpoints cap both page size and total result count, so anything
//! that wants "all matches" has to drive repeated calls. [`SearchPager`]
//! turns a search-executing function into a pull-driven stream of result
//! batches; [`DateRangePager`] layers date partitioning on top so very
//! large intervals can be fetched without tripping the service's result
//! ceiling. Both stop issuing calls the moment the consumer stops pulling.
//!
//! Streams are not restartable: rebuild one from the initial criteria to
//! search again.

use chrono::NaiveDate;
use futures_util::stream::{self, BoxStream, Stream};
use futures_util::{StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;

use crate::core::{SharedRateLimit, Zendesk};
use crate::error::{Result, ZendeskError};
use crate::options::SortOrder;
use crate::organizations::Organization;
use crate::search::{ExportSearchCriteria, SearchCriteria, SearchResponse};
use crate::tickets::Ticket;
use crate::traits::SearchOperations;
use crate::users::User;

/// Remaining-quota level at which the pager pauses between pages. This is a
/// courtesy on top of the transport's own quota handling.
const QUOTA_COURTESY_THRESHOLD: u32 = 10;
const QUOTA_COURTESY_PAUSE: Duration = Duration::from_secs(1);

/// Batch stream returned by the bulk search helpers.
pub type BatchStream<T> = Pin<Box<dyn Stream<Item = Result<Vec<T>>> + Send>>;

/// One page of results in the shape the pager drives on.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub count: u32,
    /// Link to the next page; absence means the sequence is exhausted
    pub next_page: Option<String>,
}

impl<T> From<SearchResponse<T>> for Page<T> {
    fn from(response: SearchResponse<T>) -> Self {
        Page {
            results: response.results,
            count: response.count,
            next_page: response.next_page,
        }
    }
}

/// Progress snapshot emitted after every fetched page and at every date
/// partition boundary. Purely observational; consuming it is optional and
/// never affects the sequence itself.
#[derive(Debug, Clone)]
pub struct SearchProgress {
    pub total_pages: u32,
    pub current_page: u32,
    pub processed_results: usize,
    pub estimated_total: usize,
    pub started: Instant,
    pub elapsed: Duration,
}

/// Observer invoked with progress snapshots.
pub type ProgressObserver = Arc<dyn Fn(&SearchProgress) + Send + Sync>;

fn quota_is_low(handle: Option<&SharedRateLimit>) -> bool {
    let Some(handle) = handle else {
        return false;
    };
    let guard = handle.lock().unwrap_or_else(|e| e.into_inner());
    guard
        .as_ref()
        .is_some_and(|state| state.remaining <= QUOTA_COURTESY_THRESHOLD)
}

/// Drives repeated calls of a search-executing function into a lazy stream
/// of result batches.
///
/// Pages are fetched strictly in increasing order, one at a time. The
/// stream ends the first time a batch comes back empty or without a
/// next-page link. A failed call ends the stream with a
/// [`ZendeskError::Search`] carrying the failing page number; batches
/// yielded before the failure remain valid.
pub struct SearchPager<F> {
    search_fn: F,
    criteria: SearchCriteria,
    rate_limit: Option<SharedRateLimit>,
    observer: Option<ProgressObserver>,
}

struct PagerState<F> {
    search_fn: F,
    criteria: SearchCriteria,
    rate_limit: Option<SharedRateLimit>,
    observer: Option<ProgressObserver>,
    page: u32,
    processed: usize,
    started: Instant,
    done: bool,
}

impl<F> SearchPager<F> {
    pub fn new(search_fn: F, criteria: SearchCriteria) -> Self {
        Self {
            search_fn,
            criteria,
            rate_limit: None,
            observer: None,
        }
    }

    /// Attaches the transport's quota snapshot so the pager can pause
    /// between pages when the remaining budget runs low.
    pub fn with_rate_limit(mut self, rate_limit: SharedRateLimit) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }

    pub fn with_observer(mut self, observer: ProgressObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn into_stream<T, Fut>(self) -> impl Stream<Item = Result<Vec<T>>>
    where
        F: Fn(SearchCriteria) -> Fut,
        Fut: Future<Output = Result<Page<T>>>,
    {
        let state = PagerState {
            page: self.criteria.page.unwrap_or(1),
            processed: 0,
            started: Instant::now(),
            done: false,
            search_fn: self.search_fn,
            criteria: self.criteria,
            rate_limit: self.rate_limit,
            observer: self.observer,
        };

        stream::try_unfold(state, |mut st| async move {
            if st.done {
                return Ok(None);
            }

            if quota_is_low(st.rate_limit.as_ref()) {
                tracing::debug!("Request quota low, pausing before next page");
                sleep(QUOTA_COURTESY_PAUSE).await;
            }

            let criteria = st.criteria.clone().with_page(st.page);
            let page = match (st.search_fn)(criteria).await {
                Ok(page) => page,
                Err(source) => {
                    return Err(ZendeskError::Search {
                        query: st.criteria.query.clone(),
                        page: st.page,
                        source: Box::new(source),
                    });
                }
            };

            if page.results.is_empty() {
                return Ok(None);
            }

            st.processed += page.results.len();
            let has_more = page.next_page.is_some();
            let fetched_page = st.page;
            st.page += 1;
            if !has_more {
                st.done = true;
            }

            if let Some(observer) = &st.observer {
                let progress = SearchProgress {
                    total_pages: if has_more { st.page } else { fetched_page },
                    current_page: fetched_page,
                    processed_results: st.processed,
                    estimated_total: st.processed,
                    started: st.started,
                    elapsed: st.started.elapsed(),
                };
                observer(&progress);
            }

            Ok(Some((page.results, st)))
        })
    }
}

/// Date field the partitioner bounds its sub-queries on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateField {
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl DateField {
    pub fn as_str(self) -> &'static str {
        match self {
            DateField::CreatedAt => "created_at",
            DateField::UpdatedAt => "updated_at",
        }
    }
}

/// What to do when fetching one date partition fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartitionErrorPolicy {
    /// Log the failure and move on to the next partition. Results from the
    /// failed partition are silently missing from the stream, so callers
    /// needing strict completeness should use [`PartitionErrorPolicy::Abort`].
    #[default]
    Skip,
    /// End the stream with the partition's error.
    Abort,
}

/// Criteria for a date-partitioned bulk search over `[start_date, end_date)`
#[derive(Debug, Clone)]
pub struct BulkSearchCriteria {
    pub query: String,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub per_page: Option<u32>,
    pub include: Option<Vec<String>>,
    /// Which date field the partition bounds apply to
    pub date_field: DateField,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Width of each partition in days
    pub chunk_days: i64,
    /// Cap on the total number of results yielded across all partitions
    pub max_results: Option<usize>,
    pub on_partition_error: PartitionErrorPolicy,
}

impl BulkSearchCriteria {
    pub fn new(query: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            query: query.into(),
            sort_by: None,
            sort_order: None,
            per_page: None,
            include: None,
            date_field: DateField::default(),
            start_date,
            end_date,
            chunk_days: 30,
            max_results: None,
            on_partition_error: PartitionErrorPolicy::default(),
        }
    }

    pub fn with_date_field(mut self, date_field: DateField) -> Self {
        self.date_field = date_field;
        self
    }

    pub fn with_chunk_days(mut self, chunk_days: i64) -> Self {
        self.chunk_days = chunk_days;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn with_sort(mut self, sort_by: impl Into<String>, sort_order: SortOrder) -> Self {
        self.sort_by = Some(sort_by.into());
        self.sort_order = Some(sort_order);
        self
    }

    pub fn with_include(mut self, include: Vec<String>) -> Self {
        self.include = Some(include);
        self
    }

    pub fn with_partition_error_policy(mut self, policy: PartitionErrorPolicy) -> Self {
        self.on_partition_error = policy;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.start_date >= self.end_date {
            return Err(ZendeskError::InvalidSearchCriteria(format!(
                "start_date {} must be before end_date {} for query {:?}",
                self.start_date, self.end_date, self.query
            )));
        }
        if self.chunk_days <= 0 {
            return Err(ZendeskError::InvalidSearchCriteria(format!(
                "chunk_days must be positive, got {}",
                self.chunk_days
            )));
        }
        Ok(())
    }

    fn partition_count(&self) -> u32 {
        let days = (self.end_date - self.start_date).num_days();
        ((days + self.chunk_days - 1) / self.chunk_days) as u32
    }

    /// Single-partition criteria with explicit bounds on the date field.
    fn partition_criteria(&self, lower: NaiveDate, upper: NaiveDate) -> SearchCriteria {
        let field = self.date_field.as_str();
        let query = format!(
            "{} {}>={} {}<{}",
            self.query,
            field,
            lower.format("%Y-%m-%d"),
            field,
            upper.format("%Y-%m-%d")
        );

        SearchCriteria {
            query,
            sort_by: self.sort_by.clone(),
            sort_order: self.sort_order,
            page: Some(1),
            per_page: self.per_page,
            include: self.include.clone(),
        }
    }
}

/// Decomposes one large-interval query into bounded sub-queries, paginating
/// each partition with a [`SearchPager`] and yielding batches across the
/// whole interval.
///
/// A failing partition is logged and skipped by default so one bad
/// sub-range cannot sink an export that is hours in; see
/// [`PartitionErrorPolicy`]. When `max_results` is set the final batch is
/// truncated to land exactly on the cap and the stream ends there,
/// whatever date range remains.
pub struct DateRangePager<F> {
    search_fn: F,
    criteria: BulkSearchCriteria,
    rate_limit: Option<SharedRateLimit>,
    observer: Option<ProgressObserver>,
}

struct RangeState<F, T> {
    search_fn: F,
    criteria: BulkSearchCriteria,
    rate_limit: Option<SharedRateLimit>,
    observer: Option<ProgressObserver>,
    cursor: NaiveDate,
    partition: u32,
    total_partitions: u32,
    processed: usize,
    started: Instant,
    inner: Option<BoxStream<'static, Result<Vec<T>>>>,
    done: bool,
}

impl<F, T> RangeState<F, T> {
    fn emit_progress(&self) {
        if let Some(observer) = &self.observer {
            let progress = SearchProgress {
                total_pages: self.total_partitions,
                current_page: self.partition,
                processed_results: self.processed,
                estimated_total: self.processed,
                started: self.started,
                elapsed: self.started.elapsed(),
            };
            observer(&progress);
        }
    }
}

impl<F> DateRangePager<F> {
    pub fn new(search_fn: F, criteria: BulkSearchCriteria) -> Self {
        Self {
            search_fn,
            criteria,
            rate_limit: None,
            observer: None,
        }
    }

    pub fn with_rate_limit(mut self, rate_limit: SharedRateLimit) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }

    pub fn with_observer(mut self, observer: ProgressObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn into_stream<T, Fut>(self) -> impl Stream<Item = Result<Vec<T>>>
    where
        T: Send + 'static,
        F: Fn(SearchCriteria) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<Page<T>>> + Send + 'static,
    {
        if let Err(error) = self.criteria.validate() {
            return stream::once(async move { Err::<Vec<T>, _>(error) }).left_stream();
        }

        let state = RangeState {
            cursor: self.criteria.start_date,
            partition: 0,
            total_partitions: self.criteria.partition_count(),
            processed: 0,
            started: Instant::now(),
            inner: None,
            done: false,
            search_fn: self.search_fn,
            criteria: self.criteria,
            rate_limit: self.rate_limit,
            observer: self.observer,
        };

        stream::try_unfold(state, |mut st| async move {
            loop {
                if st.done {
                    return Ok(None);
                }

                if let Some(inner) = st.inner.as_mut() {
                    match inner.try_next().await {
                        Ok(Some(mut batch)) => {
                            if let Some(max) = st.criteria.max_results {
                                let remaining = max.saturating_sub(st.processed);
                                if batch.len() >= remaining {
                                    batch.truncate(remaining);
                                    st.processed += batch.len();
                                    st.done = true;
                                    return Ok(Some((batch, st)));
                                }
                            }
                            st.processed += batch.len();
                            return Ok(Some((batch, st)));
                        }
                        Ok(None) => {
                            st.inner = None;
                            st.emit_progress();
                        }
                        Err(error) => match st.criteria.on_partition_error {
                            PartitionErrorPolicy::Skip => {
                                tracing::warn!(
                                    "Failed to search date partition {}/{}: {}. Continuing with next partition.",
                                    st.partition,
                                    st.total_partitions,
                                    error
                                );
                                st.inner = None;
                                st.emit_progress();
                            }
                            PartitionErrorPolicy::Abort => return Err(error),
                        },
                    }
                    continue;
                }

                if st.cursor >= st.criteria.end_date {
                    return Ok(None);
                }

                let upper = std::cmp::min(
                    st.cursor + chrono::Duration::days(st.criteria.chunk_days),
                    st.criteria.end_date,
                );
                let criteria = st.criteria.partition_criteria(st.cursor, upper);
                st.cursor = upper;
                st.partition += 1;

                let mut pager = SearchPager::new(st.search_fn.clone(), criteria);
                if let Some(rate_limit) = &st.rate_limit {
                    pager = pager.with_rate_limit(Arc::clone(rate_limit));
                }
                if let Some(observer) = &st.observer {
                    pager = pager.with_observer(Arc::clone(observer));
                }
                st.inner = Some(pager.into_stream().boxed());
            }
        })
        .right_stream()
    }
}

impl Zendesk {
    /// Streams every ticket matching the criteria, page by page.
    pub fn search_all_tickets(
        &self,
        criteria: SearchCriteria,
        observer: Option<ProgressObserver>,
    ) -> BatchStream<Ticket> {
        let client = self.clone();
        let mut pager = SearchPager::new(
            move |criteria: SearchCriteria| {
                let client = client.clone();
                async move { client.search_tickets(criteria).await.map(Page::from) }
            },
            criteria,
        )
        .with_rate_limit(self.rate_limit_handle());
        if let Some(observer) = observer {
            pager = pager.with_observer(observer);
        }
        pager.into_stream().boxed()
    }

    /// Streams every user matching the criteria, page by page.
    pub fn search_all_users(
        &self,
        criteria: SearchCriteria,
        observer: Option<ProgressObserver>,
    ) -> BatchStream<User> {
        let client = self.clone();
        let mut pager = SearchPager::new(
            move |criteria: SearchCriteria| {
                let client = client.clone();
                async move { client.search_users(criteria).await.map(Page::from) }
            },
            criteria,
        )
        .with_rate_limit(self.rate_limit_handle());
        if let Some(observer) = observer {
            pager = pager.with_observer(observer);
        }
        pager.into_stream().boxed()
    }

    /// Streams every organization matching the criteria, page by page.
    pub fn search_all_organizations(
        &self,
        criteria: SearchCriteria,
        observer: Option<ProgressObserver>,
    ) -> BatchStream<Organization> {
        let client = self.clone();
        let mut pager = SearchPager::new(
            move |criteria: SearchCriteria| {
                let client = client.clone();
                async move {
                    client
                        .search_organizations(criteria)
                        .await
                        .map(Page::from)
                }
            },
            criteria,
        )
        .with_rate_limit(self.rate_limit_handle());
        if let Some(observer) = observer {
            pager = pager.with_observer(observer);
        }
        pager.into_stream().boxed()
    }

    /// Streams tickets across a date-partitioned interval.
    pub fn search_tickets_by_date_range(
        &self,
        criteria: BulkSearchCriteria,
        observer: Option<ProgressObserver>,
    ) -> BatchStream<Ticket> {
        let client = self.clone();
        let mut pager = DateRangePager::new(
            move |criteria: SearchCriteria| {
                let client = client.clone();
                async move { client.search_tickets(criteria).await.map(Page::from) }
            },
            criteria,
        )
        .with_rate_limit(self.rate_limit_handle());
        if let Some(observer) = observer {
            pager = pager.with_observer(observer);
        }
        pager.into_stream().boxed()
    }

    /// Streams users across a date-partitioned interval.
    pub fn search_users_by_date_range(
        &self,
        criteria: BulkSearchCriteria,
        observer: Option<ProgressObserver>,
    ) -> BatchStream<User> {
        let client = self.clone();
        let mut pager = DateRangePager::new(
            move |criteria: SearchCriteria| {
                let client = client.clone();
                async move { client.search_users(criteria).await.map(Page::from) }
            },
            criteria,
        )
        .with_rate_limit(self.rate_limit_handle());
        if let Some(observer) = observer {
            pager = pager.with_observer(observer);
        }
        pager.into_stream().boxed()
    }

    /// Streams organizations across a date-partitioned interval.
    pub fn search_organizations_by_date_range(
        &self,
        criteria: BulkSearchCriteria,
        observer: Option<ProgressObserver>,
    ) -> BatchStream<Organization> {
        let client = self.clone();
        let mut pager = DateRangePager::new(
            move |criteria: SearchCriteria| {
                let client = client.clone();
                async move {
                    client
                        .search_organizations(criteria)
                        .await
                        .map(Page::from)
                }
            },
            criteria,
        )
        .with_rate_limit(self.rate_limit_handle());
        if let Some(observer) = observer {
            pager = pager.with_observer(observer);
        }
        pager.into_stream().boxed()
    }

    /// Streams export search batches, following the cursor until the
    /// service reports the end of the stream.
    pub fn export_stream<T>(&self, criteria: ExportSearchCriteria) -> BatchStream<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let client = self.clone();
        stream::try_unfold(
            (client, criteria, false),
            |(client, mut criteria, done)| async move {
                if done {
                    return Ok(None);
                }

                let response = client.export_search_typed::<T>(criteria.clone()).await?;
                if response.results.is_empty() {
                    return Ok(None);
                }

                let next_cursor = response.next_cursor().map(str::to_string);
                let exhausted = response.is_exhausted() || next_cursor.is_none();
                if let Some(cursor) = next_cursor {
                    criteria.cursor = Some(cursor);
                }

                Ok(Some((response.results, (client, criteria, exhausted))))
            },
        )
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn page(ids: &[u64], next: Option<&str>) -> Page<u64> {
        Page {
            results: ids.to_vec(),
            count: ids.len() as u32,
            next_page: next.map(str::to_string),
        }
    }

    /// Search function that replays a fixed script of responses and counts
    /// how many calls were made.
    fn scripted(
        script: Vec<Result<Page<u64>>>,
    ) -> (
        impl Fn(SearchCriteria) -> std::future::Ready<Result<Page<u64>>> + Clone,
        Arc<AtomicUsize>,
        Arc<Mutex<Vec<SearchCriteria>>>,
    ) {
        let script = Arc::new(Mutex::new(VecDeque::from(script)));
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let fetch = {
            let calls = Arc::clone(&calls);
            let seen = Arc::clone(&seen);
            move |criteria: SearchCriteria| {
                calls.fetch_add(1, Ordering::SeqCst);
                seen.lock().unwrap().push(criteria);
                let response = script
                    .lock()
                    .unwrap()
                    .pop_front()
                    .expect("search called more often than scripted");
                std::future::ready(response)
            }
        };

        (fetch, calls, seen)
    }

    #[tokio::test]
    async fn pager_stops_on_first_empty_batch() {
        let (fetch, calls, _) = scripted(vec![
            Ok(page(&[1, 2], Some("page=2"))),
            Ok(page(&[], Some("page=3"))),
        ]);

        let batches: Vec<Vec<u64>> = SearchPager::new(fetch, SearchCriteria::new("q"))
            .into_stream()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(batches, vec![vec![1, 2]]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn pager_stops_when_next_page_is_absent() {
        let (fetch, calls, _) = scripted(vec![Ok(page(&[1, 2, 3], None))]);

        let batches: Vec<Vec<u64>> = SearchPager::new(fetch, SearchCriteria::new("q"))
            .into_stream()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(batches, vec![vec![1, 2, 3]]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn pager_requests_pages_in_increasing_order() {
        let (fetch, _, seen) = scripted(vec![
            Ok(page(&[1], Some("next"))),
            Ok(page(&[2], Some("next"))),
            Ok(page(&[3], None)),
        ]);

        let _: Vec<Vec<u64>> = SearchPager::new(fetch, SearchCriteria::new("q"))
            .into_stream()
            .try_collect()
            .await
            .unwrap();

        let pages: Vec<Option<u32>> = seen.lock().unwrap().iter().map(|c| c.page).collect();
        assert_eq!(pages, vec![Some(1), Some(2), Some(3)]);
    }

    #[tokio::test]
    async fn pager_wraps_failures_with_page_context() {
        let (fetch, _, _) = scripted(vec![
            Ok(page(&[1], Some("next"))),
            Err(ZendeskError::Authentication),
        ]);

        let stream = SearchPager::new(fetch, SearchCriteria::new("status:open")).into_stream();
        futures_util::pin_mut!(stream);

        let first = stream.try_next().await.unwrap();
        assert_eq!(first, Some(vec![1]));

        match stream.try_next().await {
            Err(ZendeskError::Search { query, page, source }) => {
                assert_eq!(query, "status:open");
                assert_eq!(page, 2);
                assert!(matches!(*source, ZendeskError::Authentication));
            }
            other => panic!("expected search error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn pager_emits_progress_after_each_page() {
        let (fetch, _, _) = scripted(vec![
            Ok(page(&[1, 2], Some("next"))),
            Ok(page(&[3], None)),
        ]);

        let snapshots = Arc::new(Mutex::new(Vec::new()));
        let observer: ProgressObserver = {
            let snapshots = Arc::clone(&snapshots);
            Arc::new(move |progress: &SearchProgress| {
                snapshots.lock().unwrap().push(progress.clone());
            })
        };

        let _: Vec<Vec<u64>> = SearchPager::new(fetch, SearchCriteria::new("q"))
            .with_observer(observer)
            .into_stream()
            .try_collect()
            .await
            .unwrap();

        let snapshots = snapshots.lock().unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].current_page, 1);
        assert_eq!(snapshots[0].processed_results, 2);
        assert_eq!(snapshots[1].current_page, 2);
        assert_eq!(snapshots[1].processed_results, 3);
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn partitioner_derives_bounded_subqueries() {
        let (fetch, calls, seen) = scripted(vec![Ok(page(&[], None)), Ok(page(&[], None))]);

        let criteria = BulkSearchCriteria::new("status:closed", date(2024, 1, 1), date(2024, 3, 1));
        let batches: Vec<Vec<u64>> = DateRangePager::new(fetch, criteria)
            .into_stream()
            .try_collect()
            .await
            .unwrap();

        assert!(batches.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let queries: Vec<String> = seen.lock().unwrap().iter().map(|c| c.query.clone()).collect();
        assert_eq!(
            queries,
            vec![
                "status:closed created_at>=2024-01-01 created_at<2024-01-31".to_string(),
                "status:closed created_at>=2024-01-31 created_at<2024-03-01".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn partitioner_respects_updated_at_field() {
        let (fetch, _, seen) = scripted(vec![Ok(page(&[], None))]);

        let criteria = BulkSearchCriteria::new("status:open", date(2024, 1, 1), date(2024, 1, 10))
            .with_date_field(DateField::UpdatedAt);
        let _: Vec<Vec<u64>> = DateRangePager::new(fetch, criteria)
            .into_stream()
            .try_collect()
            .await
            .unwrap();

        let queries = seen.lock().unwrap();
        assert_eq!(
            queries[0].query,
            "status:open updated_at>=2024-01-01 updated_at<2024-01-10"
        );
    }

    #[tokio::test]
    async fn partitioner_truncates_final_batch_to_max_results() {
        let (fetch, calls, _) = scripted(vec![
            Ok(page(&[1, 2, 3], Some("next"))),
            Ok(page(&[4, 5, 6], Some("next"))),
        ]);

        let criteria = BulkSearchCriteria::new("q", date(2024, 1, 1), date(2024, 1, 20))
            .with_max_results(5);
        let batches: Vec<Vec<u64>> = DateRangePager::new(fetch, criteria)
            .into_stream()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(batches, vec![vec![1, 2, 3], vec![4, 5]]);
        let total: usize = batches.iter().map(Vec::len).sum();
        assert_eq!(total, 5);
        // no further fetches once the cap is reached
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn partitioner_cap_on_exact_boundary() {
        let (fetch, _, _) = scripted(vec![Ok(page(&[1, 2, 3], Some("next")))]);

        let criteria =
            BulkSearchCriteria::new("q", date(2024, 1, 1), date(2024, 1, 20)).with_max_results(3);
        let batches: Vec<Vec<u64>> = DateRangePager::new(fetch, criteria)
            .into_stream()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(batches, vec![vec![1, 2, 3]]);
    }

    #[tokio::test]
    async fn partitioner_skips_failed_partitions_by_default() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetch = {
            let calls = Arc::clone(&calls);
            move |criteria: SearchCriteria| {
                calls.fetch_add(1, Ordering::SeqCst);
                let response = if criteria.query.contains(">=2024-01-01") {
                    Err(ZendeskError::Authentication)
                } else {
                    Ok(page(&[7], None))
                };
                std::future::ready(response)
            }
        };

        let criteria = BulkSearchCriteria::new("q", date(2024, 1, 1), date(2024, 1, 20))
            .with_chunk_days(10);
        let batches: Vec<Vec<u64>> = DateRangePager::new(fetch, criteria)
            .into_stream()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(batches, vec![vec![7]]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn partitioner_abort_policy_propagates_failure() {
        let fetch = |_criteria: SearchCriteria| {
            std::future::ready(Err::<Page<u64>, _>(ZendeskError::Authentication))
        };

        let criteria = BulkSearchCriteria::new("q", date(2024, 1, 1), date(2024, 1, 20))
            .with_partition_error_policy(PartitionErrorPolicy::Abort);
        let result: Result<Vec<Vec<u64>>> = DateRangePager::new(fetch, criteria)
            .into_stream()
            .try_collect()
            .await;

        assert!(matches!(result, Err(ZendeskError::Search { page: 1, .. })));
    }

    #[tokio::test]
    async fn partitioner_rejects_inverted_date_range() {
        let fetch = |_criteria: SearchCriteria| {
            std::future::ready(Ok::<_, ZendeskError>(page(&[], None)))
        };

        let criteria = BulkSearchCriteria::new("q", date(2024, 2, 1), date(2024, 1, 1));
        let result: Result<Vec<Vec<u64>>> = DateRangePager::new(fetch, criteria)
            .into_stream()
            .try_collect()
            .await;

        assert!(matches!(result, Err(ZendeskError::InvalidSearchCriteria(_))));
    }

    #[tokio::test]
    async fn partitioner_rejects_non_positive_chunk() {
        let fetch = |_criteria: SearchCriteria| {
            std::future::ready(Ok::<_, ZendeskError>(page(&[], None)))
        };

        let criteria =
            BulkSearchCriteria::new("q", date(2024, 1, 1), date(2024, 2, 1)).with_chunk_days(0);
        let result: Result<Vec<Vec<u64>>> = DateRangePager::new(fetch, criteria)
            .into_stream()
            .try_collect()
            .await;

        assert!(matches!(result, Err(ZendeskError::InvalidSearchCriteria(_))));
    }

    #[tokio::test]
    async fn partitioner_reports_partition_progress() {
        let (fetch, _, _) = scripted(vec![Ok(page(&[], None)), Ok(page(&[], None))]);

        let snapshots = Arc::new(Mutex::new(Vec::new()));
        let observer: ProgressObserver = {
            let snapshots = Arc::clone(&snapshots);
            Arc::new(move |progress: &SearchProgress| {
                snapshots.lock().unwrap().push(progress.clone());
            })
        };

        let criteria = BulkSearchCriteria::new("q", date(2024, 1, 1), date(2024, 3, 1));
        let _: Vec<Vec<u64>> = DateRangePager::new(fetch, criteria)
            .with_observer(observer)
            .into_stream()
            .try_collect()
            .await
            .unwrap();

        let snapshots = snapshots.lock().unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].current_page, 1);
        assert_eq!(snapshots[0].total_pages, 2);
        assert_eq!(snapshots[1].current_page, 2);
    }
}
