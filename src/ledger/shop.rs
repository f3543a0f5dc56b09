//! Shop catalog and purchases.
//!
//! What an item does when bought is carried in a typed, serialized
//! [`ItemEffect`] column instead of being inferred from the item name.
//! Card purchases follow a small state machine: rows start `pending` and
//! move exactly once to `confirmed`, `failed` or `expired`; the item effect
//! is applied on confirmation only. Points purchases debit and confirm in
//! the same transaction.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, ToSql};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::core::error::{LedgerError, LedgerResult};
use crate::ledger::{points, users};
use crate::storage::db::DbConnection;

/// What buying an item does to the buyer's account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemEffect {
    /// Credit a points package
    GrantPoints { amount: i64 },
    /// Start or extend a VIP membership
    GrantVip { days: i64 },
    /// Nothing automatic (courses and certificates are fulfilled manually)
    #[default]
    None,
}

/// Lifecycle of a purchase row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseStatus {
    Pending,
    Confirmed,
    Failed,
    Expired,
}

impl PurchaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseStatus::Pending => "pending",
            PurchaseStatus::Confirmed => "confirmed",
            PurchaseStatus::Failed => "failed",
            PurchaseStatus::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Option<PurchaseStatus> {
        match s {
            "pending" => Some(PurchaseStatus::Pending),
            "confirmed" => Some(PurchaseStatus::Confirmed),
            "failed" => Some(PurchaseStatus::Failed),
            "expired" => Some(PurchaseStatus::Expired),
            _ => None,
        }
    }
}

impl fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromSql for PurchaseStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        PurchaseStatus::parse(s).ok_or(FromSqlError::InvalidType)
    }
}

impl ToSql for PurchaseStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

/// How a purchase was paid for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Points,
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Points => "points",
            PaymentMethod::Card => "card",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromSql for PaymentMethod {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "points" => Ok(PaymentMethod::Points),
            "card" => Ok(PaymentMethod::Card),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

impl ToSql for PaymentMethod {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

/// A shop item row
#[derive(Debug, Clone)]
pub struct ShopItem {
    pub id: i64,
    pub name_ar: String,
    pub name_en: String,
    pub description_ar: Option<String>,
    pub description_en: Option<String>,
    /// 0 means the item cannot be bought with points
    pub price_points: i64,
    pub price_usd: f64,
    /// "points", "vip", "course" or "certificate"
    pub category: String,
    pub effect: ItemEffect,
    pub is_available: bool,
}

/// Fields needed to insert a shop item (seeding, admin tooling)
#[derive(Debug, Clone)]
pub struct NewShopItem {
    pub name_ar: String,
    pub name_en: String,
    pub description_ar: Option<String>,
    pub description_en: Option<String>,
    pub price_points: i64,
    pub price_usd: f64,
    pub category: String,
    pub effect: ItemEffect,
}

/// A purchase row
#[derive(Debug, Clone)]
pub struct Purchase {
    pub id: String,
    pub user_id: i64,
    pub item_id: i64,
    pub payment_method: PaymentMethod,
    pub amount_points: i64,
    pub amount_usd: f64,
    pub status: PurchaseStatus,
    pub purchase_date: String,
}

fn item_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ShopItem> {
    let effect_json: String = row.get(8)?;
    Ok(ShopItem {
        id: row.get(0)?,
        name_ar: row.get(1)?,
        name_en: row.get(2)?,
        description_ar: row.get(3)?,
        description_en: row.get(4)?,
        price_points: row.get(5)?,
        price_usd: row.get(6)?,
        category: row.get(7)?,
        effect: serde_json::from_str(&effect_json).unwrap_or_default(),
        is_available: row.get::<_, i64>(9)? != 0,
    })
}

const ITEM_COLUMNS: &str = "id, name_ar, name_en, description_ar, description_en, price_points, \
     price_usd, category, effect, is_available";

fn purchase_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Purchase> {
    Ok(Purchase {
        id: row.get(0)?,
        user_id: row.get(1)?,
        item_id: row.get(2)?,
        payment_method: row.get(3)?,
        amount_points: row.get(4)?,
        amount_usd: row.get(5)?,
        status: row.get(6)?,
        purchase_date: row.get(7)?,
    })
}

const PURCHASE_COLUMNS: &str =
    "id, user_id, item_id, payment_method, amount_points, amount_usd, status, purchase_date";

/// Insert a shop item and return its id
pub fn insert_item(conn: &Connection, item: &NewShopItem) -> LedgerResult<i64> {
    let effect_json = serde_json::to_string(&item.effect)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
    conn.execute(
        "INSERT INTO shop_items (name_ar, name_en, description_ar, description_en,
            price_points, price_usd, category, effect)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            item.name_ar,
            item.name_en,
            item.description_ar,
            item.description_en,
            item.price_points,
            item.price_usd,
            item.category,
            effect_json,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn item_by_id(conn: &Connection, item_id: i64) -> LedgerResult<Option<ShopItem>> {
    let item = conn
        .query_row(
            &format!("SELECT {} FROM shop_items WHERE id = ?1", ITEM_COLUMNS),
            params![item_id],
            item_from_row,
        )
        .optional()?;
    Ok(item)
}

/// Fetch an item by id
pub fn get_item(conn: &DbConnection, item_id: i64) -> LedgerResult<Option<ShopItem>> {
    item_by_id(conn, item_id)
}

/// Available items of a category, cheapest (in points) first
pub fn items_by_category(conn: &DbConnection, category: &str) -> LedgerResult<Vec<ShopItem>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM shop_items WHERE category = ?1 AND is_available = 1
         ORDER BY price_points, id",
        ITEM_COLUMNS
    ))?;
    let rows = stmt.query_map(params![category], item_from_row)?;

    let mut items = Vec::new();
    for row in rows {
        items.push(row?);
    }
    Ok(items)
}

/// Number of items in the catalog
pub fn item_count(conn: &Connection) -> LedgerResult<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM shop_items", [], |row| row.get(0))?;
    Ok(count)
}

/// Apply an item's effect to the buyer inside the purchase transaction
fn apply_effect(conn: &Connection, user_id: i64, item: &ShopItem) -> LedgerResult<()> {
    match item.effect {
        ItemEffect::GrantPoints { amount } => points::credit(
            conn,
            user_id,
            amount,
            &format!("Points package: {}", item.name_en),
        ),
        ItemEffect::GrantVip { days } => users::grant_vip(conn, user_id, days),
        ItemEffect::None => Ok(()),
    }
}

/// Buy an item with points
///
/// Debits the points price, writes a `confirmed` purchase row and applies
/// the item effect, all in one transaction. A failed debit (insufficient
/// balance, unknown user) leaves no purchase row behind.
pub fn record_points_purchase(
    conn: &mut DbConnection,
    user_id: i64,
    item_id: i64,
) -> LedgerResult<Purchase> {
    let tx = conn.transaction()?;

    let item = item_by_id(&tx, item_id)?.ok_or(LedgerError::ItemNotFound(item_id))?;
    if item.price_points <= 0 {
        return Err(LedgerError::NotPurchasableWithPoints(item_id));
    }

    points::debit(
        &tx,
        user_id,
        item.price_points,
        &format!("Purchase: {}", item.name_en),
    )?;

    let purchase_id = Uuid::new_v4().to_string();
    tx.execute(
        "INSERT INTO purchases (id, user_id, item_id, payment_method, amount_points, amount_usd, status)
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
        params![
            purchase_id,
            user_id,
            item_id,
            PaymentMethod::Points,
            item.price_points,
            PurchaseStatus::Confirmed,
        ],
    )?;

    apply_effect(&tx, user_id, &item)?;

    let purchase = tx.query_row(
        &format!("SELECT {} FROM purchases WHERE id = ?1", PURCHASE_COLUMNS),
        params![purchase_id],
        purchase_from_row,
    )?;

    tx.commit()?;

    log::info!(
        "User {} bought item {} for {} points (purchase {})",
        user_id,
        item_id,
        item.price_points,
        purchase.id
    );

    Ok(purchase)
}

/// Open a card purchase
///
/// Writes a `pending` row and returns it; the caller hands the purchase id
/// to the payment collaborator and later settles the row through
/// [`confirm_purchase`], [`fail_purchase`] or [`expire_purchase`]. Nothing
/// is granted until confirmation.
pub fn begin_card_purchase(
    conn: &mut DbConnection,
    user_id: i64,
    item_id: i64,
) -> LedgerResult<Purchase> {
    let tx = conn.transaction()?;

    let item = item_by_id(&tx, item_id)?.ok_or(LedgerError::ItemNotFound(item_id))?;
    let exists: Option<i64> = tx
        .query_row(
            "SELECT 1 FROM users WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .optional()?;
    if exists.is_none() {
        return Err(LedgerError::UserNotFound(user_id));
    }

    let purchase_id = Uuid::new_v4().to_string();
    tx.execute(
        "INSERT INTO purchases (id, user_id, item_id, payment_method, amount_points, amount_usd, status)
         VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6)",
        params![
            purchase_id,
            user_id,
            item_id,
            PaymentMethod::Card,
            item.price_usd,
            PurchaseStatus::Pending,
        ],
    )?;

    let purchase = tx.query_row(
        &format!("SELECT {} FROM purchases WHERE id = ?1", PURCHASE_COLUMNS),
        params![purchase_id],
        purchase_from_row,
    )?;

    tx.commit()?;
    Ok(purchase)
}

/// Move a pending purchase to a terminal status
fn transition(
    conn: &mut DbConnection,
    purchase_id: &str,
    to: PurchaseStatus,
    apply: bool,
) -> LedgerResult<Purchase> {
    let tx = conn.transaction()?;

    let purchase = tx
        .query_row(
            &format!("SELECT {} FROM purchases WHERE id = ?1", PURCHASE_COLUMNS),
            params![purchase_id],
            purchase_from_row,
        )
        .optional()?
        .ok_or_else(|| LedgerError::PurchaseNotFound(purchase_id.to_string()))?;

    if purchase.status != PurchaseStatus::Pending {
        return Err(LedgerError::InvalidTransition {
            from: purchase.status,
            to,
        });
    }

    tx.execute(
        "UPDATE purchases SET status = ?1 WHERE id = ?2",
        params![to, purchase_id],
    )?;

    if apply {
        let item = item_by_id(&tx, purchase.item_id)?
            .ok_or(LedgerError::ItemNotFound(purchase.item_id))?;
        apply_effect(&tx, purchase.user_id, &item)?;
    }

    tx.commit()?;

    log::info!("Purchase {} -> {}", purchase_id, to);

    Ok(Purchase {
        status: to,
        ..purchase
    })
}

/// Settle a pending purchase as paid and apply the item effect
pub fn confirm_purchase(conn: &mut DbConnection, purchase_id: &str) -> LedgerResult<Purchase> {
    transition(conn, purchase_id, PurchaseStatus::Confirmed, true)
}

/// Settle a pending purchase as declined; nothing is granted
pub fn fail_purchase(conn: &mut DbConnection, purchase_id: &str) -> LedgerResult<Purchase> {
    transition(conn, purchase_id, PurchaseStatus::Failed, false)
}

/// Settle a pending purchase as abandoned; nothing is granted
pub fn expire_purchase(conn: &mut DbConnection, purchase_id: &str) -> LedgerResult<Purchase> {
    transition(conn, purchase_id, PurchaseStatus::Expired, false)
}

/// Fetch a purchase by id
pub fn get_purchase(conn: &DbConnection, purchase_id: &str) -> LedgerResult<Option<Purchase>> {
    let purchase = conn
        .query_row(
            &format!("SELECT {} FROM purchases WHERE id = ?1", PURCHASE_COLUMNS),
            params![purchase_id],
            purchase_from_row,
        )
        .optional()?;
    Ok(purchase)
}

/// All purchases of a user, newest first
pub fn user_purchases(conn: &DbConnection, user_id: i64) -> LedgerResult<Vec<Purchase>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM purchases WHERE user_id = ?1 ORDER BY purchase_date DESC, id",
        PURCHASE_COLUMNS
    ))?;
    let rows = stmt.query_map(params![user_id], purchase_from_row)?;

    let mut purchases = Vec::new();
    for row in rows {
        purchases.push(row?);
    }
    Ok(purchases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // The JSON tags are the on-disk format of the effect column, so they
    // are pinned here.
    #[test]
    fn test_item_effect_json_tags() {
        let json = serde_json::to_string(&ItemEffect::GrantPoints { amount: 100 }).unwrap();
        assert_eq!(json, r#"{"kind":"grant_points","amount":100}"#);

        let json = serde_json::to_string(&ItemEffect::GrantVip { days: 30 }).unwrap();
        assert_eq!(json, r#"{"kind":"grant_vip","days":30}"#);

        let json = serde_json::to_string(&ItemEffect::None).unwrap();
        assert_eq!(json, r#"{"kind":"none"}"#);
    }

    #[test]
    fn test_unknown_effect_falls_back_to_none() {
        let effect: ItemEffect =
            serde_json::from_str(r#"{"kind":"teleport"}"#).unwrap_or_default();
        assert_eq!(effect, ItemEffect::None);
    }

    #[test]
    fn test_purchase_status_round_trip() {
        for status in [
            PurchaseStatus::Pending,
            PurchaseStatus::Confirmed,
            PurchaseStatus::Failed,
            PurchaseStatus::Expired,
        ] {
            assert_eq!(PurchaseStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(PurchaseStatus::parse("completed"), None);
    }
}
