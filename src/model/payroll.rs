use serde::{Deserialize, Serialize};

use super::{EntityKind, Record, de_id};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payroll {
    #[serde(alias = "_id", deserialize_with = "de_id")]
    pub id: String,

    #[serde(default, deserialize_with = "de_id")]
    pub employee_id: String,

    #[serde(default)]
    pub total_quantity: f64,

    #[serde(default)]
    pub total_salary: f64,

    /// First day of the month this payroll covers.
    #[serde(default)]
    pub period: Option<String>,
}

impl Record for Payroll {
    const KIND: EntityKind = EntityKind::Payrolls;

    fn id(&self) -> &str {
        &self.id
    }
}
