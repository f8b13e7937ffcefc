pub mod employee;
pub mod finance;
pub mod payroll;
pub mod work_log;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::error::FetchError;

pub use employee::Employee;
pub use finance::{Expense, Income};
pub use payroll::Payroll;
pub use work_log::WorkLog;

/// The five collections the upstream HR API exposes.
/// The string form is the REST path segment (`/employees`, `/worklogs`, ...).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
    Employees,
    WorkLogs,
    Payrolls,
    Incomes,
    Expenses,
}

/// A record type that lives in one upstream collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> &str;
}

/// Paginated list envelope: `{ data, total, page, limit, totalPages }`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total_pages: u32,
}

impl Page<Value> {
    /// Decode every row of a raw page. One bad row fails the whole page.
    pub fn decode<T: Record>(self) -> Result<Page<T>, FetchError> {
        let data = self
            .data
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()
            .map_err(|source| FetchError::Decode {
                kind: T::KIND,
                source,
            })?;

        Ok(Page {
            data,
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        })
    }
}

/// Ids arrive as strings from document stores and as integers from SQL backends.
pub(crate) fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Text(s)) => s,
        Some(RawId::Number(n)) => n.to_string(),
        None => String::new(),
    })
}
