//! Fakes shared by the unit tests: an in-memory upstream API and a hand-driven clock.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::buckets::WeekStart;
use super::cache::{Clock, CollectionCache, MemoryStore};
use super::{AnalyticsEngine, Dataset};
use crate::client::RecordSource;
use crate::error::FetchError;
use crate::model::employee::EmployeeStatus;
use crate::model::{EntityKind, Employee, Expense, Income, Page, Payroll, WorkLog};

pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(start_ms),
        }
    }

    pub fn advance_ms(&self, ms: i64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Serves collections from memory, paginated like the real API.
#[derive(Default)]
pub struct InMemorySource {
    collections: Mutex<HashMap<EntityKind, Vec<Value>>>,
    /// Records reachable by id but absent from the list endpoint.
    hidden: HashMap<(EntityKind, String), Value>,
    failing: Option<(EntityKind, u32)>,
    page_calls: AtomicUsize,
    id_calls: Mutex<Vec<String>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, kind: EntityKind, rows: Vec<Value>) -> Self {
        self.collections.lock().unwrap().insert(kind, rows);
        self
    }

    pub fn with_hidden(mut self, kind: EntityKind, id: &str, row: Value) -> Self {
        self.hidden.insert((kind, id.to_string()), row);
        self
    }

    pub fn failing_on(mut self, kind: EntityKind, page: u32) -> Self {
        self.failing = Some((kind, page));
        self
    }

    pub fn replace(&self, kind: EntityKind, rows: Vec<Value>) {
        self.collections.lock().unwrap().insert(kind, rows);
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub fn id_calls(&self) -> Vec<String> {
        self.id_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordSource for InMemorySource {
    async fn fetch_page(&self, kind: EntityKind, page: u32, limit: u32) -> Result<Page<Value>, FetchError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing == Some((kind, page)) {
            return Err(FetchError::Status {
                url: format!("mem://{}?page={}", kind, page),
                status: 503,
            });
        }

        let rows = self.collections.lock().unwrap().get(&kind).cloned().unwrap_or_default();
        let start = ((page - 1) * limit) as usize;
        let data: Vec<Value> = rows.iter().skip(start).take(limit as usize).cloned().collect();

        Ok(Page {
            data,
            total: rows.len() as u64,
            page,
            limit,
            total_pages: (rows.len() as u32).div_ceil(limit),
        })
    }

    async fn fetch_one(&self, kind: EntityKind, id: &str) -> Result<Option<Value>, FetchError> {
        self.id_calls.lock().unwrap().push(id.to_string());
        if let Some(row) = self.hidden.get(&(kind, id.to_string())) {
            return Ok(Some(row.clone()));
        }

        let rows = self.collections.lock().unwrap().get(&kind).cloned().unwrap_or_default();
        Ok(rows.into_iter().find(|r| r["id"] == id))
    }
}

pub fn memory_cache(namespace: &'static str, ttl_secs: u64, clock: Arc<ManualClock>) -> CollectionCache {
    CollectionCache::new(
        namespace,
        Duration::from_secs(ttl_secs),
        Arc::new(MemoryStore::new(64)),
        clock,
    )
}

pub fn engine_over(source: Arc<InMemorySource>, clock: Arc<ManualClock>) -> AnalyticsEngine {
    AnalyticsEngine::new(
        source,
        memory_cache("dashboard", 300, clock.clone()),
        memory_cache("worklog-list", 30, clock),
        2,
        WeekStart::Sunday,
    )
}

pub fn employee(id: &str, joined: &str) -> Employee {
    Employee {
        id: id.to_string(),
        name: format!("Employee {}", id),
        position: Some("Tailor".to_string()),
        status: EmployeeStatus::Active,
        joined_date: Some(joined.to_string()),
    }
}

pub fn work_log(id: &str, employee_id: &str, quantity: f64, total_price: f64, at: &str) -> WorkLog {
    WorkLog {
        id: id.to_string(),
        employee_id: employee_id.to_string(),
        product_id: "prod-1".to_string(),
        product_name: None,
        quantity,
        total_price,
        updated_at: Some(at.to_string()),
    }
}

pub fn payroll(id: &str, employee_id: &str, total_salary: f64, period: &str) -> Payroll {
    Payroll {
        id: id.to_string(),
        employee_id: employee_id.to_string(),
        total_quantity: 0.0,
        total_salary,
        period: Some(period.to_string()),
    }
}

pub fn income(amount: f64, date: &str) -> Income {
    Income {
        id: format!("i-{}", date),
        title: "Sales".to_string(),
        amount,
        date: Some(date.to_string()),
        description: None,
    }
}

pub fn expense(amount: f64, date: &str) -> Expense {
    Expense {
        id: format!("x-{}", date),
        title: "Fabric".to_string(),
        amount,
        date: Some(date.to_string()),
        description: None,
    }
}

/// The March 2024 scenario: one employee, one orphaned work log.
pub fn sample_dataset() -> Dataset {
    let e1 = employee("e1", "2024-03-10");
    Dataset {
        lookup: HashMap::from([(e1.id.clone(), e1.clone())]),
        employees: vec![e1],
        work_logs: vec![
            work_log("w1", "e1", 10.0, 5000.0, "2024-03-12"),
            work_log("w2", "e2", 99.0, 9999.0, "2024-03-12"),
        ],
        payrolls: vec![payroll("p1", "e1", 20000.0, "2024-03-01")],
        incomes: vec![income(100000.0, "2024-03-05")],
        expenses: vec![expense(30000.0, "2024-03-20")],
        resolved_all: false,
    }
}

/// The same scenario as raw upstream JSON.
pub fn sample_source() -> InMemorySource {
    InMemorySource::new()
        .with(
            EntityKind::Employees,
            vec![json!({ "id": "e1", "name": "Rahim", "status": "active", "joinedDate": "2024-03-10" })],
        )
        .with(
            EntityKind::WorkLogs,
            vec![
                json!({ "id": "w1", "employeeId": "e1", "productId": "p", "quantity": 10, "totalPrice": 5000, "updatedAt": "2024-03-12T09:00:00Z" }),
                json!({ "id": "w2", "employeeId": "e2", "productId": "p", "quantity": 99, "totalPrice": 9999, "updatedAt": "2024-03-12T10:00:00Z" }),
            ],
        )
        .with(
            EntityKind::Payrolls,
            vec![json!({ "id": "p1", "employeeId": "e1", "totalQuantity": 10, "totalSalary": 20000, "period": "2024-03-01" })],
        )
        .with(
            EntityKind::Incomes,
            vec![json!({ "id": "i1", "title": "Order", "amount": 100000, "date": "2024-03-05" })],
        )
        .with(
            EntityKind::Expenses,
            vec![json!({ "id": "x1", "title": "Rent", "amount": 30000, "date": "2024-03-20" })],
        )
}
