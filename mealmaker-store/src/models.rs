use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

use crate::schema::{documents, sequences};

#[derive(Queryable, Selectable, Insertable, Debug, PartialEq)]
#[diesel(table_name = documents)]
pub struct DocumentRow {
    pub namespace: String,
    pub collection: String,
    pub id: String,
    pub body: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, PartialEq)]
#[diesel(table_name = sequences)]
pub struct NewSequence<'a> {
    pub namespace: &'a str,
    pub name: &'a str,
    pub value: i64,
}
