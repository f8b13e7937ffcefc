use serde::{Deserialize, Serialize};

use super::{EntityKind, Record, de_id};

/// One production entry: an employee made `quantity` units of a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkLog {
    #[serde(alias = "_id", deserialize_with = "de_id")]
    pub id: String,

    #[serde(default, deserialize_with = "de_id")]
    pub employee_id: String,

    #[serde(default, deserialize_with = "de_id")]
    pub product_id: String,

    #[serde(default)]
    pub product_name: Option<String>,

    #[serde(default)]
    pub quantity: f64,

    #[serde(default)]
    pub total_price: f64,

    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Record for WorkLog {
    const KIND: EntityKind = EntityKind::WorkLogs;

    fn id(&self) -> &str {
        &self.id
    }
}
