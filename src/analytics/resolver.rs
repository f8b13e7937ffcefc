//! Employee reference resolution.
//!
//! Work logs and payrolls point at employees by id. Ids missing from the bulk
//! employee fetch are looked up one by one, concurrently. Whatever still cannot
//! be found is an orphan: its records are left out of joins, never an error.

use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::time::Duration;

use futures::future::join_all;
use moka::future::Cache;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::model::Employee;

pub struct Resolution {
    /// Known employees plus every id resolved by this call.
    pub lookup: HashMap<String, Employee>,
    /// Employees obtained through per-id fetches.
    pub fetched: Vec<Employee>,
    /// Every referenced id ended up in `lookup`.
    pub resolved_all: bool,
}

/// Resolve the distinct, non-empty `ids` against `known`, fetching the rest with `fetch_by_id`.
pub async fn resolve<'a, I, F, Fut>(ids: I, known: HashMap<String, Employee>, fetch_by_id: F) -> Resolution
where
    I: IntoIterator<Item = &'a str>,
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<Option<Employee>, FetchError>>,
{
    let missing: BTreeSet<&str> = ids
        .into_iter()
        .filter(|id| !id.is_empty() && !known.contains_key(*id))
        .collect();

    let mut lookup = known;
    if missing.is_empty() {
        return Resolution {
            lookup,
            fetched: Vec::new(),
            resolved_all: true,
        };
    }

    debug!(count = missing.len(), "resolving employees by id");

    let results = join_all(missing.iter().map(|id| {
        let fut = fetch_by_id(id.to_string());
        async move { (*id, fut.await) }
    }))
    .await;

    let mut fetched = Vec::new();
    let mut resolved_all = true;
    for (id, result) in results {
        match result {
            Ok(Some(employee)) => {
                lookup.insert(id.to_string(), employee.clone());
                fetched.push(employee);
            }
            Ok(None) => {
                debug!(employee_id = id, "employee no longer exists");
                resolved_all = false;
            }
            Err(e) => {
                warn!(employee_id = id, error = %e, "employee lookup failed");
                resolved_all = false;
            }
        }
    }

    Resolution {
        lookup,
        fetched,
        resolved_all,
    }
}

/// Session-wide memory of employees resolved by id, so the same dangling-looking
/// reference is not fetched again on every dashboard refresh.
#[derive(Clone)]
pub struct EmployeeDirectory {
    cache: Cache<String, Employee>,
}

impl EmployeeDirectory {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(50_000)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get(&self, id: &str) -> Option<Employee> {
        self.cache.get(id).await
    }

    pub async fn merge(&self, employees: &[Employee]) {
        let inserts: Vec<_> = employees
            .iter()
            .map(|e| self.cache.insert(e.id.clone(), e.clone()))
            .collect();

        join_all(inserts).await;
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}
