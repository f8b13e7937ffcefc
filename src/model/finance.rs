use serde::{Deserialize, Serialize};

use super::{EntityKind, Record, de_id};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    #[serde(alias = "_id", deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(alias = "_id", deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Record for Income {
    const KIND: EntityKind = EntityKind::Incomes;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Expense {
    const KIND: EntityKind = EntityKind::Expenses;

    fn id(&self) -> &str {
        &self.id
    }
}
