//! Postgres-backed store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (serialization failure) | `40001` | `Conflict` |
//! | Database (other) | Any other | `Database` |
//! | PoolClosed / RowNotFound / Other | N/A | `Database` |
//!
//! Every query carries `org_id` in its WHERE clause. Listing batches lock the
//! referenced item rows (`FOR UPDATE`) before validating, so validation and
//! write see the same rows.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::instrument;
use uuid::Uuid;

use cardstock_catalog::{Card, CatalogQuery};
use cardstock_core::{
    CardId, CurrencyCode, InventoryItemId, ListingId, LocationId, OrgId, OrgOwned, Organization,
    Page, PageRequest,
};
use cardstock_inventory::{InventoryItem, InventoryItemRecord, InventoryStatus, Location};
use cardstock_listings::{
    Listing, ListingPolicy, ListingProposal, ListingRecord, ListingStatus, plan_listings,
};

use super::{
    CatalogRepository, InventoryRepository, InventoryValue, ListingRepository, LocationRepository,
    OrganizationRepository, StoreError, StoreResult,
};

const ITEM_COLUMNS: &str = "id, org_id, card_id, condition, grade, acquisition_cost, \
    location_id, status, photos, created_at";
const LISTING_COLUMNS: &str =
    "id, org_id, inventory_item_id, price, currency, status, channel, created_at";
const LOCATION_COLUMNS: &str = "id, org_id, name, kind, created_at";
const CARD_COLUMNS: &str = "id, set_code, number, name, rarity, attributes, created_at";

/// Postgres store over a shared connection pool.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool and apply the embedded schema.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("migration failed: {e}")))
    }

    async fn begin(&self, operation: &str) -> StoreResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error(operation, e))
    }
}

async fn rollback(tx: Transaction<'_, Postgres>, err: StoreError) -> StoreError {
    match tx.rollback().await {
        Ok(()) => err,
        Err(e) => map_sqlx_error("rollback", e),
    }
}

async fn commit(tx: Transaction<'_, Postgres>) -> StoreResult<()> {
    tx.commit().await.map_err(|e| map_sqlx_error("commit", e))
}

async fn location_exists(
    tx: &mut Transaction<'_, Postgres>,
    org_id: OrgId,
    location_id: LocationId,
) -> StoreResult<bool> {
    let row = sqlx::query("SELECT 1 AS found FROM locations WHERE org_id = $1 AND id = $2")
        .bind(org_id.as_uuid())
        .bind(location_id.as_uuid())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("location_exists", e))?;
    Ok(row.is_some())
}

async fn lock_item(
    tx: &mut Transaction<'_, Postgres>,
    org_id: OrgId,
    id: InventoryItemId,
) -> StoreResult<Option<InventoryItem>> {
    let row = sqlx::query(&format!(
        "SELECT {ITEM_COLUMNS} FROM inventory_items WHERE org_id = $1 AND id = $2 FOR UPDATE"
    ))
    .bind(org_id.as_uuid())
    .bind(id.as_uuid())
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("lock_item", e))?;
    row.as_ref().map(item_from_row).transpose()
}

async fn write_item_status(
    tx: &mut Transaction<'_, Postgres>,
    item: &InventoryItem,
) -> StoreResult<()> {
    sqlx::query("UPDATE inventory_items SET status = $3 WHERE org_id = $1 AND id = $2")
        .bind(item.org_id().as_uuid())
        .bind(item.id_typed().as_uuid())
        .bind(item.status().as_str())
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("update_item_status", e))?;
    Ok(())
}

#[async_trait]
impl InventoryRepository for PostgresStore {
    #[instrument(
        skip(self, item),
        fields(org_id = %item.org_id(), item_id = %item.id_typed()),
        err
    )]
    async fn add_item(&self, item: InventoryItem) -> StoreResult<InventoryItem> {
        let mut tx = self.begin("add_item").await?;
        if !location_exists(&mut tx, item.org_id(), item.location_id()).await? {
            return Err(rollback(tx, StoreError::NotFound("location")).await);
        }

        let record = item.to_record();
        let inserted = sqlx::query(
            r#"
            INSERT INTO inventory_items (
                id, org_id, card_id, condition, grade, acquisition_cost,
                location_id, status, photos, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.org_id.as_uuid())
        .bind(record.card_id.as_uuid())
        .bind(&record.condition)
        .bind(record.grade)
        .bind(record.acquisition_cost)
        .bind(record.location_id.as_uuid())
        .bind(record.status.as_str())
        .bind(Json(&record.photos))
        .bind(record.created_at)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            return Err(rollback(tx, map_sqlx_error("insert_item", e)).await);
        }
        commit(tx).await?;
        Ok(item)
    }

    #[instrument(skip(self), fields(org_id = %org_id), err)]
    async fn get_item(
        &self,
        org_id: OrgId,
        id: InventoryItemId,
    ) -> StoreResult<Option<InventoryItem>> {
        let row = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items WHERE org_id = $1 AND id = $2"
        ))
        .bind(org_id.as_uuid())
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_item", e))?;
        row.as_ref().map(item_from_row).transpose()
    }

    #[instrument(skip(self, ids), fields(org_id = %org_id, requested = ids.len()), err)]
    async fn find_items(
        &self,
        org_id: OrgId,
        ids: &[InventoryItemId],
    ) -> StoreResult<Vec<InventoryItem>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items WHERE org_id = $1 AND id = ANY($2)"
        ))
        .bind(org_id.as_uuid())
        .bind(&uuids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_items", e))?;

        let mut by_id = HashMap::with_capacity(rows.len());
        for row in &rows {
            let item = item_from_row(row)?;
            by_id.insert(item.id_typed(), item);
        }
        // Request order; `remove` drops repeated ids.
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    #[instrument(skip(self), fields(org_id = %org_id), err)]
    async fn list_items(
        &self,
        org_id: OrgId,
        status: Option<InventoryStatus>,
        page: PageRequest,
    ) -> StoreResult<Page<InventoryItem>> {
        let status = status.map(InventoryStatus::as_str);

        let total: i64 = sqlx::query(
            r#"
            SELECT COUNT(*) AS total FROM inventory_items
            WHERE org_id = $1 AND ($2::text IS NULL OR status = $2)
            "#,
        )
        .bind(org_id.as_uuid())
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .and_then(|row| row.try_get("total"))
        .map_err(|e| map_sqlx_error("count_items", e))?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM inventory_items
            WHERE org_id = $1 AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(org_id.as_uuid())
        .bind(status)
        .bind(i64::from(page.page_size()))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_items", e))?;

        let items = rows.iter().map(item_from_row).collect::<StoreResult<Vec<_>>>()?;
        Ok(Page {
            items,
            total: total.max(0) as u64,
            page: page.page(),
            page_size: page.page_size(),
        })
    }

    #[instrument(skip(self), fields(org_id = %org_id), err)]
    async fn move_item(
        &self,
        org_id: OrgId,
        id: InventoryItemId,
        location_id: LocationId,
    ) -> StoreResult<InventoryItem> {
        let mut tx = self.begin("move_item").await?;
        let Some(mut item) = lock_item(&mut tx, org_id, id).await? else {
            return Err(rollback(tx, StoreError::NotFound("inventory item")).await);
        };
        if !location_exists(&mut tx, org_id, location_id).await? {
            return Err(rollback(tx, StoreError::NotFound("location")).await);
        }

        item.move_to(location_id);
        let updated = sqlx::query(
            "UPDATE inventory_items SET location_id = $3 WHERE org_id = $1 AND id = $2",
        )
        .bind(org_id.as_uuid())
        .bind(id.as_uuid())
        .bind(location_id.as_uuid())
        .execute(&mut *tx)
        .await;
        if let Err(e) = updated {
            return Err(rollback(tx, map_sqlx_error("move_item", e)).await);
        }
        commit(tx).await?;
        Ok(item)
    }

    #[instrument(skip(self), fields(org_id = %org_id), err)]
    async fn change_item_status(
        &self,
        org_id: OrgId,
        id: InventoryItemId,
        status: InventoryStatus,
    ) -> StoreResult<InventoryItem> {
        let mut tx = self.begin("change_item_status").await?;
        let Some(mut item) = lock_item(&mut tx, org_id, id).await? else {
            return Err(rollback(tx, StoreError::NotFound("inventory item")).await);
        };
        if let Err(e) = item.transition_to(status) {
            return Err(rollback(tx, e.into()).await);
        }
        if let Err(e) = write_item_status(&mut tx, &item).await {
            return Err(rollback(tx, e).await);
        }
        commit(tx).await?;
        Ok(item)
    }

    #[instrument(skip(self), fields(org_id = %org_id), err)]
    async fn inventory_value(&self, org_id: OrgId) -> StoreResult<InventoryValue> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(acquisition_cost), 0) AS total_cost, COUNT(*) AS item_count
            FROM inventory_items
            WHERE org_id = $1 AND status IN ('ACTIVE', 'LISTED')
            "#,
        )
        .bind(org_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("inventory_value", e))?;

        let total_cost: Decimal = row
            .try_get("total_cost")
            .map_err(|e| map_sqlx_error("inventory_value", e))?;
        let item_count: i64 = row
            .try_get("item_count")
            .map_err(|e| map_sqlx_error("inventory_value", e))?;
        Ok(InventoryValue {
            total_cost,
            item_count: item_count.max(0) as u64,
        })
    }
}

#[async_trait]
impl ListingRepository for PostgresStore {
    #[instrument(
        skip(self, proposals, policy),
        fields(org_id = %org_id, proposals = proposals.len()),
        err
    )]
    async fn create_listings(
        &self,
        org_id: OrgId,
        proposals: &[ListingProposal],
        policy: &ListingPolicy,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<Listing>> {
        if proposals.is_empty() {
            return Ok(vec![]);
        }

        let mut tx = self.begin("create_listings").await?;

        let uuids: Vec<Uuid> = proposals
            .iter()
            .map(|p| *p.inventory_item_id.as_uuid())
            .collect();
        let locked = sqlx::query(&lock_items_sql())
        .bind(org_id.as_uuid())
        .bind(&uuids)
        .fetch_all(&mut *tx)
        .await;
        let rows = match locked {
            Ok(rows) => rows,
            Err(e) => return Err(rollback(tx, map_sqlx_error("lock_items", e)).await),
        };

        let mut items = HashMap::with_capacity(rows.len());
        for row in &rows {
            match item_from_row(row) {
                Ok(item) => {
                    items.insert(item.id_typed(), item);
                }
                Err(e) => return Err(rollback(tx, e).await),
            }
        }

        let plan = match plan_listings(org_id, proposals, |id| items.get(&id), policy, now) {
            Ok(plan) => plan,
            Err(e) => return Err(rollback(tx, e.into()).await),
        };

        for listing in &plan.listings {
            let record = listing.to_record();
            let inserted = sqlx::query(
                r#"
                INSERT INTO listings (
                    id, org_id, inventory_item_id, price, currency, status, channel, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(record.id.as_uuid())
            .bind(record.org_id.as_uuid())
            .bind(record.inventory_item_id.as_uuid())
            .bind(record.price)
            .bind(record.currency.as_str())
            .bind(record.status.as_str())
            .bind(&record.channel)
            .bind(record.created_at)
            .execute(&mut *tx)
            .await;
            if let Err(e) = inserted {
                return Err(rollback(tx, map_sqlx_error("insert_listing", e)).await);
            }
        }

        for item in &plan.updated_items {
            if let Err(e) = write_item_status(&mut tx, item).await {
                return Err(rollback(tx, e).await);
            }
        }

        commit(tx).await?;
        tracing::info!(created = plan.listings.len(), "listings created");
        Ok(plan.listings)
    }

    #[instrument(skip(self), fields(org_id = %org_id), err)]
    async fn list_listings(
        &self,
        org_id: OrgId,
        status: Option<ListingStatus>,
    ) -> StoreResult<Vec<Listing>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {LISTING_COLUMNS}
            FROM listings
            WHERE org_id = $1 AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(org_id.as_uuid())
        .bind(status.map(ListingStatus::as_str))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_listings", e))?;

        rows.iter().map(listing_from_row).collect()
    }

    #[instrument(skip(self), fields(org_id = %org_id), err)]
    async fn change_listing_status(
        &self,
        org_id: OrgId,
        id: ListingId,
        status: ListingStatus,
    ) -> StoreResult<Listing> {
        let mut tx = self.begin("change_listing_status").await?;
        let locked = sqlx::query(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE org_id = $1 AND id = $2 FOR UPDATE"
        ))
        .bind(org_id.as_uuid())
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await;

        let mut listing = match locked.map_err(|e| map_sqlx_error("lock_listing", e)) {
            Ok(Some(row)) => match listing_from_row(&row) {
                Ok(listing) => listing,
                Err(e) => return Err(rollback(tx, e).await),
            },
            Ok(None) => return Err(rollback(tx, StoreError::NotFound("listing")).await),
            Err(e) => return Err(rollback(tx, e).await),
        };

        if let Err(e) = listing.transition_to(status) {
            return Err(rollback(tx, e.into()).await);
        }

        let updated = sqlx::query("UPDATE listings SET status = $3 WHERE org_id = $1 AND id = $2")
            .bind(org_id.as_uuid())
            .bind(id.as_uuid())
            .bind(listing.status().as_str())
            .execute(&mut *tx)
            .await;
        if let Err(e) = updated {
            return Err(rollback(tx, map_sqlx_error("update_listing_status", e)).await);
        }
        commit(tx).await?;
        Ok(listing)
    }
}

#[async_trait]
impl CatalogRepository for PostgresStore {
    #[instrument(skip(self), err)]
    async fn search_cards(&self, query: &CatalogQuery) -> StoreResult<Vec<Card>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {CARD_COLUMNS}
            FROM cards
            WHERE ($1::text IS NULL OR name ILIKE $1)
            ORDER BY name, set_code, number
            LIMIT $2
            "#
        ))
        .bind(query.like_pattern())
        .bind(CatalogQuery::MAX_RESULTS as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("search_cards", e))?;

        rows.iter().map(card_from_row).collect()
    }

    #[instrument(skip(self, card), fields(card = %card.printing_key()), err)]
    async fn insert_card(&self, card: Card) -> StoreResult<Card> {
        sqlx::query(
            r#"
            INSERT INTO cards (id, set_code, number, name, rarity, attributes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(card.id.as_uuid())
        .bind(&card.set_code)
        .bind(&card.number)
        .bind(&card.name)
        .bind(&card.rarity)
        .bind(card.attributes.as_ref().map(Json))
        .bind(card.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_card", e))?;
        Ok(card)
    }
}

#[async_trait]
impl LocationRepository for PostgresStore {
    #[instrument(
        skip(self, location),
        fields(org_id = %location.org_id, name = %location.name),
        err
    )]
    async fn create_location(&self, location: Location) -> StoreResult<Location> {
        sqlx::query(
            r#"
            INSERT INTO locations (id, org_id, name, kind, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(location.id.as_uuid())
        .bind(location.org_id.as_uuid())
        .bind(&location.name)
        .bind(&location.kind)
        .bind(location.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_location", e))?;
        Ok(location)
    }

    #[instrument(skip(self), fields(org_id = %org_id), err)]
    async fn list_locations(&self, org_id: OrgId) -> StoreResult<Vec<Location>> {
        let rows = sqlx::query(&format!(
            "SELECT {LOCATION_COLUMNS} FROM locations WHERE org_id = $1 ORDER BY name"
        ))
        .bind(org_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_locations", e))?;

        rows.iter().map(location_from_row).collect()
    }

    #[instrument(skip(self), fields(org_id = %org_id), err)]
    async fn get_location(&self, org_id: OrgId, id: LocationId) -> StoreResult<Option<Location>> {
        let row = sqlx::query(&format!(
            "SELECT {LOCATION_COLUMNS} FROM locations WHERE org_id = $1 AND id = $2"
        ))
        .bind(org_id.as_uuid())
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_location", e))?;
        row.as_ref().map(location_from_row).transpose()
    }
}

#[async_trait]
impl OrganizationRepository for PostgresStore {
    #[instrument(skip(self, org), fields(org_id = %org.id), err)]
    async fn insert_organization(&self, org: Organization) -> StoreResult<Organization> {
        sqlx::query(
            "INSERT INTO organizations (id, name, plan, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(org.id.as_uuid())
        .bind(&org.name)
        .bind(&org.plan)
        .bind(org.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_organization", e))?;
        Ok(org)
    }

    async fn organization_count(&self) -> StoreResult<u64> {
        let count: i64 = sqlx::query("SELECT COUNT(*) AS total FROM organizations")
            .fetch_one(&self.pool)
            .await
            .and_then(|row| row.try_get("total"))
            .map_err(|e| map_sqlx_error("organization_count", e))?;
        Ok(count.max(0) as u64)
    }
}

// Row mapping

fn decode<T>(row: &PgRow, column: &str) -> StoreResult<T>
where
    T: for<'r> sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(column)
        .map_err(|e| StoreError::Database(format!("failed to read {column}: {e}")))
}

fn parse_column<T>(row: &PgRow, column: &str) -> StoreResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw: String = decode(row, column)?;
    raw.parse()
        .map_err(|e| StoreError::Database(format!("invalid {column} '{raw}': {e}")))
}

fn item_from_row(row: &PgRow) -> StoreResult<InventoryItem> {
    let photos: Json<Vec<String>> = decode(row, "photos")?;
    Ok(InventoryItem::from_record(InventoryItemRecord {
        id: InventoryItemId::from_uuid(decode(row, "id")?),
        org_id: OrgId::from_uuid(decode(row, "org_id")?),
        card_id: CardId::from_uuid(decode(row, "card_id")?),
        condition: decode(row, "condition")?,
        grade: decode(row, "grade")?,
        acquisition_cost: decode(row, "acquisition_cost")?,
        location_id: LocationId::from_uuid(decode(row, "location_id")?),
        status: parse_column::<InventoryStatus>(row, "status")?,
        photos: photos.0,
        created_at: decode(row, "created_at")?,
    }))
}

fn listing_from_row(row: &PgRow) -> StoreResult<Listing> {
    Ok(Listing::from_record(ListingRecord {
        id: ListingId::from_uuid(decode(row, "id")?),
        org_id: OrgId::from_uuid(decode(row, "org_id")?),
        inventory_item_id: InventoryItemId::from_uuid(decode(row, "inventory_item_id")?),
        price: decode(row, "price")?,
        currency: parse_column::<CurrencyCode>(row, "currency")?,
        status: parse_column::<ListingStatus>(row, "status")?,
        channel: decode(row, "channel")?,
        created_at: decode(row, "created_at")?,
    }))
}

fn location_from_row(row: &PgRow) -> StoreResult<Location> {
    Ok(Location {
        id: LocationId::from_uuid(decode(row, "id")?),
        org_id: OrgId::from_uuid(decode(row, "org_id")?),
        name: decode(row, "name")?,
        kind: decode(row, "kind")?,
        created_at: decode(row, "created_at")?,
    })
}

fn card_from_row(row: &PgRow) -> StoreResult<Card> {
    let attributes: Option<Json<serde_json::Value>> = decode(row, "attributes")?;
    Ok(Card {
        id: CardId::from_uuid(decode(row, "id")?),
        set_code: decode(row, "set_code")?,
        number: decode(row, "number")?,
        name: decode(row, "name")?,
        rarity: decode(row, "rarity")?,
        attributes: attributes.map(|a| a.0),
        created_at: decode(row, "created_at")?,
    })
}

/// Map SQLx errors to StoreError.
/// Row locks for a listing batch, taken in id order so overlapping batches queue
/// instead of deadlocking.
fn lock_items_sql() -> String {
    format!(
        "SELECT {ITEM_COLUMNS} FROM inventory_items \
         WHERE org_id = $1 AND id = ANY($2) ORDER BY id FOR UPDATE"
    )
}

/// Unique violation, serialization failure, deadlock.
fn is_conflict_code(code: &str) -> bool {
    matches!(code, "23505" | "40001" | "40P01")
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some(code) if is_conflict_code(code) => StoreError::Conflict(msg),
                _ => StoreError::Database(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Database(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Database(format!("sqlx error in {}: {}", operation, err)),
    }
}
