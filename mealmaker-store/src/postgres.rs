//! PostgreSQL backend: every collection lives in the `documents` table as
//! JSONB bodies keyed by `(namespace, collection, id)`.
//!
//! `_id` equality, other equality conditions (as JSONB containment) and
//! instant ranges are pushed down to SQL. The full filter is then evaluated
//! again on the decoded bodies.

use async_trait::async_trait;
use chrono::Utc;
use diesel::{
    dsl::sql,
    insert_into,
    pg::Pg,
    prelude::*,
    result::{DatabaseErrorKind, Error::DatabaseError},
    sql_types::{Array, Bool, Text, Timestamptz},
};
use diesel_async::{
    async_connection_wrapper::AsyncConnectionWrapper, scoped_futures::ScopedFutureExt,
    AsyncConnection, AsyncPgConnection, RunQueryDsl,
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use serde_json::Value;
use tracing::{debug, info};

use crate::document::{document_key, lookup, Filter, InstantBound, Sort, Update, ID_FIELD};
use crate::error::{StoreError, StoreResult};
use crate::models::{DocumentRow, NewSequence};
use crate::schema::{documents, sequences};
use crate::store::{DocumentStore, UpdateResult};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

type Predicate = Box<dyn BoxableExpression<documents::table, Pg, SqlType = Bool>>;

pub struct PgStore {
    database_url: String,
    namespace: String,
}

impl PgStore {
    pub fn new(database_url: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn connect(&self) -> StoreResult<AsyncPgConnection> {
        Ok(AsyncPgConnection::establish(&self.database_url).await?)
    }

    pub async fn run_migrations(&self) -> StoreResult<()> {
        let conn = self.connect().await?;
        let mut wrapper: AsyncConnectionWrapper<AsyncPgConnection> =
            AsyncConnectionWrapper::from(conn);
        let applied = tokio::task::spawn_blocking(move || {
            wrapper
                .run_pending_migrations(MIGRATIONS)
                .map(|versions| versions.len())
                .map_err(|e| StoreError::Migration(e.to_string()))
        })
        .await
        .map_err(|e| StoreError::Migration(e.to_string()))??;
        info!(applied, "document store migrations up to date");
        Ok(())
    }

    /// Rows of `collection` that match `filter`, in storage order.
    async fn load_matching(
        conn: &mut AsyncPgConnection,
        namespace: &str,
        collection: &str,
        filter: &Filter,
        lock: bool,
    ) -> StoreResult<Vec<DocumentRow>> {
        let query = documents::table
            .filter(pushdown(namespace, collection, filter))
            .select(DocumentRow::as_select());
        let rows: Vec<DocumentRow> = if lock {
            query.for_update().load(conn).await?
        } else {
            query.load(conn).await?
        };
        Ok(rows
            .into_iter()
            .filter(|row| filter.matches(&row.body))
            .collect())
    }
}

/// SQL predicate that narrows the scan to a superset of the rows `filter`
/// accepts.
fn pushdown(namespace: &str, collection: &str, filter: &Filter) -> Predicate {
    let mut predicate: Predicate = Box::new(
        documents::namespace
            .eq(namespace.to_string())
            .and(documents::collection.eq(collection.to_string())),
    );
    if let Some(key) = filter.id_key() {
        predicate = Box::new(predicate.and(documents::id.eq(key)));
    }
    if let Some(fields) = filter.containment() {
        predicate = Box::new(predicate.and(documents::body.contains(fields)));
    }
    for (path, bound) in filter.instant_bounds() {
        predicate = Box::new(predicate.and(instant_range(path, bound)));
    }
    predicate
}

/// `body #>> path` compared as `timestamptz`. Only fields shaped like
/// RFC 3339 instants are cast; anything else fails the bound.
fn instant_range(path: &str, bound: InstantBound) -> Predicate {
    let segments: Vec<String> = path.split('.').map(str::to_string).collect();
    let (op, at) = match bound {
        InstantBound::AtLeast(at) => (">=", at),
        InstantBound::Before(at) => ("<", at),
    };
    Box::new(
        sql::<Bool>("(CASE WHEN (body #>> ")
            .bind::<Array<Text>, _>(segments.clone())
            .sql(") ~ '^\\d{4}-\\d{2}-\\d{2}T' THEN (body #>> ")
            .bind::<Array<Text>, _>(segments)
            .sql(&format!(")::timestamptz {op} "))
            .bind::<Timestamptz, _>(at)
            .sql(" ELSE FALSE END)"),
    )
}

fn key_of(collection: &str, document: &Value) -> StoreResult<String> {
    lookup(document, ID_FIELD)
        .and_then(document_key)
        .ok_or_else(|| StoreError::MissingId {
            collection: collection.to_string(),
        })
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Option<&Sort>,
    ) -> StoreResult<Vec<Value>> {
        let conn = &mut self.connect().await?;
        let rows = Self::load_matching(conn, &self.namespace, collection, filter, false).await?;
        debug!(collection, found = rows.len(), "find");
        let mut found: Vec<Value> = rows.into_iter().map(|row| row.body).collect();
        if let Some(sort) = sort {
            sort.apply(&mut found);
        }
        Ok(found)
    }

    async fn insert_one(&self, collection: &str, document: Value) -> StoreResult<()> {
        let id = key_of(collection, &document)?;
        let now = Utc::now();
        let row = DocumentRow {
            namespace: self.namespace.clone(),
            collection: collection.to_string(),
            id: id.clone(),
            body: document,
            created_at: now,
            updated_at: now,
        };

        let conn = &mut self.connect().await?;
        match insert_into(documents::table).values(&row).execute(conn).await {
            Ok(_) => Ok(()),
            Err(DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Err(StoreError::Duplicate {
                    collection: collection.to_string(),
                    id,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
        upsert: bool,
    ) -> StoreResult<UpdateResult> {
        let namespace = self.namespace.as_str();
        let conn = &mut self.connect().await?;
        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                let rows = Self::load_matching(conn, namespace, collection, filter, true).await?;
                if let Some(row) = rows.into_iter().next() {
                    let mut body = row.body.clone();
                    update.apply(&mut body);
                    let modified = body != row.body;
                    if modified {
                        diesel::update(documents::table.find((namespace, collection, &row.id)))
                            .set((
                                documents::body.eq(&body),
                                documents::updated_at.eq(Utc::now()),
                            ))
                            .execute(conn)
                            .await?;
                    }
                    return Ok(UpdateResult {
                        matched: 1,
                        modified: u64::from(modified),
                        upserted: false,
                    });
                }

                if !upsert {
                    return Ok(UpdateResult::default());
                }
                let body = update.upsert_document(filter);
                let now = Utc::now();
                let row = DocumentRow {
                    namespace: namespace.to_string(),
                    collection: collection.to_string(),
                    id: key_of(collection, &body)?,
                    body,
                    created_at: now,
                    updated_at: now,
                };
                insert_into(documents::table).values(&row).execute(conn).await?;
                Ok(UpdateResult {
                    matched: 0,
                    modified: 0,
                    upserted: true,
                })
            }
            .scope_boxed()
        })
        .await
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let namespace = self.namespace.as_str();
        let conn = &mut self.connect().await?;
        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                let rows = Self::load_matching(conn, namespace, collection, filter, true).await?;
                let Some(row) = rows.into_iter().next() else {
                    return Ok(0);
                };
                let deleted = diesel::delete(documents::table.find((namespace, collection, &row.id)))
                    .execute(conn)
                    .await?;
                Ok(deleted as u64)
            }
            .scope_boxed()
        })
        .await
    }

    async fn next_sequence(&self, name: &str) -> StoreResult<i64> {
        let conn = &mut self.connect().await?;
        let value = insert_into(sequences::table)
            .values(&NewSequence {
                namespace: &self.namespace,
                name,
                value: 1,
            })
            .on_conflict((sequences::namespace, sequences::name))
            .do_update()
            .set(sequences::value.eq(sequences::value + 1))
            .returning(sequences::value)
            .get_result::<i64>(conn)
            .await?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(filter: &Filter) -> String {
        let query = documents::table
            .filter(pushdown("meal-maker-db", "orders", filter))
            .select(DocumentRow::as_select());
        diesel::debug_query::<Pg, _>(&query).to_string()
    }

    #[test]
    fn test_partner_listing_is_narrowed_in_sql() {
        let filter = Filter::new()
            .eq("partner_id", 1)
            .gte("created_at", "2024-08-02T03:00:00+00:00")
            .lt("created_at", "2024-08-03T03:00:00+00:00")
            .ne("status", 3);
        let sql = rendered(&filter);
        assert!(sql.contains("@>"), "{sql}");
        assert!(sql.contains("::timestamptz >="), "{sql}");
        assert!(sql.contains("::timestamptz <"), "{sql}");
    }

    #[test]
    fn test_id_lookup_uses_key_column_only() {
        let sql = rendered(&Filter::by_id(7));
        assert!(sql.contains(r#""documents"."id" ="#), "{sql}");
        assert!(!sql.contains("@>"), "{sql}");
        assert!(!sql.contains("timestamptz"), "{sql}");
    }
}
