use serde::{Deserialize, Serialize};
use strum::Display;
use utoipa::ToSchema;

use super::{EntityKind, Record, de_id};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum EmployeeStatus {
    Active,
    Inactive,
    OnLeave,
    Resigned,
    /// Anything the upstream API sends that we don't know about.
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "id": "e1",
        "name": "John Doe",
        "position": "Tailor",
        "status": "active",
        "joinedDate": "2024-03-10"
    })
)]
pub struct Employee {
    #[serde(alias = "_id", deserialize_with = "de_id")]
    #[schema(example = "e1")]
    pub id: String,

    #[serde(default)]
    #[schema(example = "John Doe")]
    pub name: String,

    #[serde(default)]
    #[schema(example = "Tailor", nullable = true)]
    pub position: Option<String>,

    #[serde(default)]
    #[schema(value_type = String, example = "active")]
    pub status: EmployeeStatus,

    /// Raw timestamp as sent by the API; parsed on demand.
    #[serde(default)]
    #[schema(example = "2024-03-10", nullable = true)]
    pub joined_date: Option<String>,
}

impl Employee {
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }
}

impl Record for Employee {
    const KIND: EntityKind = EntityKind::Employees;

    fn id(&self) -> &str {
        &self.id
    }
}
