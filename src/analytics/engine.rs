use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use futures::try_join;
use tracing::{debug, info, instrument};

use super::buckets::WeekStart;
use super::cache::{BlobStore, CacheKey, CollectionCache, FileStore, MemoryStore, SystemClock};
use super::fetcher::fetch_all;
use super::kpi::{DashboardReport, Selection, compute_dashboard};
use super::lists::{Joined, PayrollRow, WorkLogRow, payroll_rows, work_log_rows};
use super::resolver::{EmployeeDirectory, Resolution, resolve};
use super::Dataset;
use crate::client::RecordSource;
use crate::config::Config;
use crate::error::{EngineError, FetchError};
use crate::model::{EntityKind, Employee, Expense, Income, Payroll, Record, WorkLog};

/// Fetches, caches, joins and aggregates the HR collections for the console screens.
pub struct AnalyticsEngine {
    source: Arc<dyn RecordSource>,
    /// Whole-collection snapshots behind the dashboard and payroll list.
    dashboard_cache: CollectionCache,
    /// Joined work-log rows per period; short-lived because logs change often.
    worklog_cache: CollectionCache,
    directory: EmployeeDirectory,
    page_size: u32,
    week_start: WeekStart,
}

impl AnalyticsEngine {
    pub fn new(
        source: Arc<dyn RecordSource>,
        dashboard_cache: CollectionCache,
        worklog_cache: CollectionCache,
        page_size: u32,
        week_start: WeekStart,
    ) -> Self {
        Self {
            directory: EmployeeDirectory::new(dashboard_cache.ttl()),
            source,
            dashboard_cache,
            worklog_cache,
            page_size,
            week_start,
        }
    }

    pub fn from_config(config: &Config, source: Arc<dyn RecordSource>) -> Self {
        let store: Arc<dyn BlobStore> = match &config.cache_dir {
            Some(dir) => Arc::new(FileStore::new(dir)),
            None => Arc::new(MemoryStore::new(1_000)),
        };
        let clock = Arc::new(SystemClock);

        Self::new(
            source,
            CollectionCache::new(
                "dashboard",
                Duration::from_secs(config.dashboard_cache_ttl),
                store.clone(),
                clock.clone(),
            ),
            CollectionCache::new(
                "worklog-list",
                Duration::from_secs(config.worklog_cache_ttl),
                store,
                clock,
            ),
            config.page_size,
            config.week_starts_on,
        )
    }

    /// Every page of one collection, from `cache` when it holds a fresh snapshot.
    async fn collection<T: Record>(&self, cache: Option<&CollectionCache>) -> Result<Vec<T>, EngineError> {
        let key = CacheKey::collection(T::KIND);
        if let Some(records) = cache.and_then(|c| c.get::<Vec<T>>(&key)) {
            debug!(kind = %T::KIND, count = records.len(), "collection cache hit");
            return Ok(records);
        }

        let source = &self.source;
        let limit = self.page_size;
        let records = fetch_all(
            |page| async move { source.fetch_page(T::KIND, page, limit).await?.decode::<T>() },
            limit,
        )
        .await
        .map_err(|source| EngineError::Load {
            kind: T::KIND,
            source,
        })?;

        info!(kind = %T::KIND, count = records.len(), "collection fetched");
        if let Some(cache) = cache {
            cache.set(&key, &records);
        }
        Ok(records)
    }

    /// Join `refs` against the bulk employees, the session directory and, last,
    /// per-id fetches.
    async fn resolve_employees<'a, I>(&self, employees: &[Employee], refs: I) -> Resolution
    where
        I: IntoIterator<Item = &'a str>,
    {
        let refs: BTreeSet<&str> = refs.into_iter().filter(|id| !id.is_empty()).collect();
        let mut known: HashMap<String, Employee> =
            employees.iter().map(|e| (e.id().to_string(), e.clone())).collect();

        for id in &refs {
            if !known.contains_key(*id) {
                if let Some(employee) = self.directory.get(id).await {
                    known.insert(id.to_string(), employee);
                }
            }
        }

        let source = &self.source;
        let resolution = resolve(refs.iter().copied(), known, |id| async move {
            match source.fetch_one(EntityKind::Employees, &id).await? {
                Some(raw) => serde_json::from_value::<Employee>(raw)
                    .map(Some)
                    .map_err(|source| FetchError::Decode {
                        kind: EntityKind::Employees,
                        source,
                    }),
                None => Ok(None),
            }
        })
        .await;

        self.directory.merge(&resolution.fetched).await;
        resolution
    }

    /// Load all five collections and join them. Any required collection that fails
    /// to load fails the whole cycle; nothing partial is returned.
    #[instrument(name = "load_dataset", skip(self))]
    pub async fn load_dataset(&self) -> Result<Dataset, EngineError> {
        let cache = Some(&self.dashboard_cache);
        let (employees, work_logs, payrolls, incomes, expenses) = try_join!(
            self.collection::<Employee>(cache),
            self.collection::<WorkLog>(cache),
            self.collection::<Payroll>(cache),
            self.collection::<Income>(cache),
            self.collection::<Expense>(cache),
        )?;

        let refs = work_logs
            .iter()
            .map(|w| w.employee_id.as_str())
            .chain(payrolls.iter().map(|p| p.employee_id.as_str()));
        let Resolution {
            lookup,
            resolved_all,
            ..
        } = self.resolve_employees(&employees, refs).await;

        let data = Dataset {
            employees,
            lookup,
            work_logs,
            payrolls,
            incomes,
            expenses,
            resolved_all,
        };

        let (orphan_work_logs, orphan_payrolls) = (data.orphan_work_logs(), data.orphan_payrolls());
        if orphan_work_logs + orphan_payrolls > 0 {
            debug!(orphan_work_logs, orphan_payrolls, "records with missing employees excluded");
        }

        Ok(data)
    }

    #[instrument(name = "dashboard", skip(self), fields(period = %selection.period.key(), employee = ?selection.employee.id()))]
    pub async fn dashboard(&self, selection: &Selection) -> Result<DashboardReport, EngineError> {
        let data = self.load_dataset().await?;
        Ok(compute_dashboard(&data, selection, self.week_start))
    }

    /// Joined work logs for a period, employee filter applied, newest first.
    #[instrument(name = "work_log_list", skip(self), fields(period = %selection.period.key()))]
    pub async fn work_log_list(&self, selection: &Selection) -> Result<Joined<WorkLogRow>, EngineError> {
        let key = CacheKey::new(EntityKind::WorkLogs, selection.period);

        let joined = match self.worklog_cache.get::<Joined<WorkLogRow>>(&key) {
            Some(joined) => joined,
            None => {
                let (employees, work_logs) = try_join!(
                    self.collection::<Employee>(None),
                    self.collection::<WorkLog>(None),
                )?;
                let resolution = self
                    .resolve_employees(&employees, work_logs.iter().map(|w| w.employee_id.as_str()))
                    .await;

                let joined = work_log_rows(&work_logs, &resolution.lookup, selection.period);
                self.worklog_cache.set(&key, &joined);
                joined
            }
        };

        Ok(narrow_to_employee(joined, selection, |r| &r.employee_id))
    }

    /// Joined payrolls for a period, employee filter applied, newest period first.
    #[instrument(name = "payroll_list", skip(self), fields(period = %selection.period.key()))]
    pub async fn payroll_list(&self, selection: &Selection) -> Result<Joined<PayrollRow>, EngineError> {
        let data = self.load_dataset().await?;
        let joined = payroll_rows(&data.payrolls, &data.lookup, selection.period);

        Ok(narrow_to_employee(joined, selection, |r| &r.employee_id))
    }

    /// Forget every cached snapshot that depends on `kind`, after a create/update/delete.
    pub fn invalidate(&self, kind: EntityKind) {
        self.dashboard_cache.invalidate_kind(kind);

        match kind {
            EntityKind::Employees => {
                self.directory.clear();
                self.worklog_cache.invalidate_kind(EntityKind::WorkLogs);
            }
            EntityKind::WorkLogs => self.worklog_cache.invalidate_kind(EntityKind::WorkLogs),
            _ => {}
        }

        info!(%kind, "cache invalidated");
    }
}

fn narrow_to_employee<T>(joined: Joined<T>, selection: &Selection, employee_of: impl Fn(&T) -> &String) -> Joined<T> {
    Joined {
        rows: joined
            .rows
            .into_iter()
            .filter(|r| selection.employee.matches(employee_of(r)))
            .collect(),
        orphaned: joined.orphaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::kpi::EmployeeFilter;
    use crate::analytics::period::Period;
    use crate::analytics::testing::{ManualClock, engine_over, sample_source};
    use serde_json::json;

    fn march_2024() -> Selection {
        Selection {
            period: Period::month_of(2, 2024),
            employee: EmployeeFilter::All,
        }
    }

    #[actix_web::test]
    async fn end_to_end_dashboard_from_upstream_json() {
        let source = Arc::new(sample_source());
        let engine = engine_over(source.clone(), Arc::new(ManualClock::new(0)));

        let report = engine.dashboard(&march_2024()).await.unwrap();

        assert_eq!(report.onboard_count, 1);
        assert_eq!(report.performance.quantity, 10.0);
        assert_eq!(report.performance.total_value, 5000.0);
        assert_eq!(report.monthly_payroll, 20000.0);
        assert_eq!(report.monthly_income, 100000.0);
        assert_eq!(report.monthly_expense, 30000.0);
        assert_eq!(report.monthly_profit, 50000.0);
        assert_eq!(report.orphan_work_logs, 1);
        assert!(!report.references_resolved);
        assert_eq!(source.id_calls(), vec!["e2"]);
    }

    #[actix_web::test]
    async fn second_refresh_within_ttl_is_served_from_cache() {
        let source = Arc::new(sample_source());
        let clock = Arc::new(ManualClock::new(0));
        let engine = engine_over(source.clone(), clock.clone());

        engine.dashboard(&march_2024()).await.unwrap();
        let calls = source.page_calls();

        clock.advance_ms(60_000);
        engine.dashboard(&march_2024()).await.unwrap();
        assert_eq!(source.page_calls(), calls);

        clock.advance_ms(300_000);
        engine.dashboard(&march_2024()).await.unwrap();
        assert!(source.page_calls() > calls);
    }

    #[actix_web::test]
    async fn failing_page_aborts_the_cycle_and_caches_nothing_for_it() {
        let source = Arc::new(sample_source().failing_on(EntityKind::Payrolls, 1));
        let engine = engine_over(source, Arc::new(ManualClock::new(0)));

        let err = engine.dashboard(&march_2024()).await.unwrap_err();
        assert_eq!(err.kind(), EntityKind::Payrolls);
        assert!(engine.dashboard_cache.get::<Vec<Payroll>>(&CacheKey::collection(EntityKind::Payrolls)).is_none());
    }

    #[actix_web::test]
    async fn employee_resolved_by_id_joins_and_is_remembered() {
        let source = Arc::new(sample_source().with_hidden(
            EntityKind::Employees,
            "e2",
            json!({ "id": "e2", "name": "Karim", "status": "resigned", "joinedDate": "2020-01-01" }),
        ));
        let clock = Arc::new(ManualClock::new(0));
        let engine = engine_over(source.clone(), clock.clone());

        let report = engine.dashboard(&march_2024()).await.unwrap();
        assert_eq!(report.performance.quantity, 109.0);
        assert_eq!(report.orphan_work_logs, 0);
        assert!(report.references_resolved);

        // Snapshot expired, but e2 stays in the session directory.
        engine.invalidate(EntityKind::WorkLogs);
        engine.dashboard(&march_2024()).await.unwrap();
        assert_eq!(source.id_calls(), vec!["e2"]);
    }

    #[actix_web::test]
    async fn invalidate_forces_refetch_of_that_kind() {
        let source = Arc::new(sample_source());
        let engine = engine_over(source.clone(), Arc::new(ManualClock::new(0)));

        engine.dashboard(&march_2024()).await.unwrap();
        source.replace(
            EntityKind::Incomes,
            vec![json!({ "id": "i9", "title": "Bulk order", "amount": 1000, "date": "2024-03-07" })],
        );

        let cached = engine.dashboard(&march_2024()).await.unwrap();
        assert_eq!(cached.monthly_income, 100000.0);

        engine.invalidate(EntityKind::Incomes);
        let fresh = engine.dashboard(&march_2024()).await.unwrap();
        assert_eq!(fresh.monthly_income, 1000.0);
    }

    #[actix_web::test]
    async fn work_log_list_excludes_orphans_and_filters_employee() {
        let source = Arc::new(sample_source());
        let engine = engine_over(source.clone(), Arc::new(ManualClock::new(0)));

        let all = engine.work_log_list(&march_2024()).await.unwrap();
        assert_eq!(all.rows.len(), 1);
        assert_eq!(all.rows[0].employee_name, "Rahim");
        assert_eq!(all.orphaned, 1);

        let calls = source.page_calls();
        let other = Selection {
            employee: EmployeeFilter::One("e9".into()),
            ..march_2024()
        };
        let none = engine.work_log_list(&other).await.unwrap();
        assert!(none.rows.is_empty());
        assert_eq!(source.page_calls(), calls);
    }

    #[actix_web::test]
    async fn payroll_list_joins_employee_names() {
        let engine = engine_over(Arc::new(sample_source()), Arc::new(ManualClock::new(0)));

        let list = engine.payroll_list(&march_2024()).await.unwrap();
        assert_eq!(list.rows.len(), 1);
        assert_eq!(list.rows[0].employee_name, "Rahim");
        assert_eq!(list.rows[0].total_salary, 20000.0);
    }
}
