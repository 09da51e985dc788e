//! Shared record fixtures for unit and integration tests.
//!
//! Enabled for this crate's own tests and, through the `test-support`
//! feature, for downstream crates' tests.

use crate::record::{Record, RecordSchema};
use crate::{field, reference};
use chrono::NaiveDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub active: bool,
    pub joined_at: NaiveDateTime,
    pub external_ref: Uuid,
    pub nickname: Option<String>,
    pub internal_note: String,
}

impl Record for User {
    const TYPE_NAME: &'static str = "User";

    fn schema() -> RecordSchema<Self> {
        RecordSchema::new("id")
            .field(field!(id))
            .field(field!(name))
            .field(field!(email))
            .field(field!(active))
            .field(field!(joined_at))
            .field(field!(external_ref))
            .field(field!(nickname, "omit"))
            .field(field!(internal_note).unexported())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Category {
    pub id: u32,
    pub title: String,
    pub user_id: i64,
}

impl Record for Category {
    const TYPE_NAME: &'static str = "Category";

    fn schema() -> RecordSchema<Self> {
        RecordSchema::new("id")
            .storage("categories")
            .field(field!(id))
            .field(field!(title))
            .field(field!(user_id, "foreignKey,struct:User"))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubCategory {
    pub id: i64,
    pub label: String,
    pub price: f64,
    pub category_id: u64,
    pub user_id: Option<i64>,
    pub category: Option<Category>,
}

impl Record for SubCategory {
    const TYPE_NAME: &'static str = "SubCategory";

    fn schema() -> RecordSchema<Self> {
        RecordSchema::new("id")
            .field(field!(id))
            .field(field!(label))
            .field(field!(price))
            .field(field!(
                category_id,
                "foreignKey,struct:Category,table:categories,field:category"
            ))
            .field(field!(user_id, "foreignKey,struct:User"))
            .field(reference!(category))
    }
}

/// Half of a mutual dependency: `Alpha -> Beta -> Alpha`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Alpha {
    pub id: i64,
    pub beta_id: i64,
}

impl Record for Alpha {
    const TYPE_NAME: &'static str = "Alpha";

    fn schema() -> RecordSchema<Self> {
        RecordSchema::new("id")
            .field(field!(id))
            .field(field!(beta_id, "foreignKey,struct:Beta"))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Beta {
    pub id: i64,
    pub alpha_id: i64,
}

impl Record for Beta {
    const TYPE_NAME: &'static str = "Beta";

    fn schema() -> RecordSchema<Self> {
        RecordSchema::new("id")
            .field(field!(id))
            .field(field!(alpha_id, "foreignKey,struct:Alpha"))
    }
}
