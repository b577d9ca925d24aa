//! Order Commit Engine
//!
//! Turns a normalized cart into a persisted order. Every mutation runs in a
//! single SQLite transaction, so readers see either the old item set or the
//! new one, never a mix.

use std::collections::{HashMap, HashSet};

use shared::models::{
    Customer, Order, OrderDetail, OrderItem, OrderItemDetail, PaymentMethod, Product, SaleType,
    UserPublic,
};
use sqlx::SqlitePool;

use super::error::{OrderError, OrderResult};
use super::money::{amounts_match, order_total};
use super::payload::{CartLine, OrderDraft};
use crate::auth::CurrentUser;
use crate::db::repository::order::OrderScalars;
use crate::db::repository::{RepoError, customer, order, product, user};

/// Page size bounds for `GET /api/orders`
pub const DEFAULT_PAGE_SIZE: i64 = 100;
pub const MAX_PAGE_SIZE: i64 = 500;

/// Create result: a new order, or the one already committed under the
/// same idempotency key.
#[derive(Debug)]
pub enum CreateOutcome {
    Created(OrderDetail),
    Replayed(OrderDetail),
}

impl CreateOutcome {
    pub fn into_detail(self) -> OrderDetail {
        match self {
            Self::Created(d) | Self::Replayed(d) => d,
        }
    }
}

#[derive(Clone, Debug)]
pub struct OrderCommitEngine {
    pool: SqlitePool,
}

impl OrderCommitEngine {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Create an order for the session's staff member.
    ///
    /// `staffId` always comes from `staff`, never from the payload.
    pub async fn create(&self, staff: &CurrentUser, draft: OrderDraft) -> OrderResult<CreateOutcome> {
        let customer_id = draft.customer_id.clone().ok_or(OrderError::MissingCustomer)?;
        if draft.lines.is_empty() {
            return Err(OrderError::Empty);
        }

        if let Some(key) = &draft.idempotency_key
            && let Some(existing) = order::find_by_idempotency_key(&self.pool, key).await?
        {
            tracing::info!(order_id = %existing.id, idempotency_key = %key, "Order create replayed");
            return Ok(CreateOutcome::Replayed(self.load_detail(existing).await?));
        }

        self.ensure_customer(&customer_id).await?;
        self.ensure_products(&draft.lines).await?;
        let total = checked_total(&draft)?;

        let now = shared::util::now_millis();
        let new_order = Order {
            id: shared::util::new_id(),
            staff_id: staff.id.clone(),
            customer_id,
            payment_method: draft.payment_method.unwrap_or(PaymentMethod::Cash),
            sale_type: draft.sale_type.unwrap_or(SaleType::Store),
            total_amount: total,
            status: draft.status_or_default(),
            version: 1,
            idempotency_key: draft.idempotency_key.clone(),
            created_at: now,
            updated_at: now,
        };
        let items = build_items(&new_order.id, &draft.lines);

        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        match order::insert_order(&mut tx, &new_order).await {
            Ok(()) => {}
            // lost an idempotency race: the other request's order wins
            Err(RepoError::Duplicate(column)) if column == "idempotency_key" => {
                drop(tx);
                let key = new_order.idempotency_key.as_deref().unwrap_or_default();
                let existing = order::find_by_idempotency_key(&self.pool, key)
                    .await?
                    .ok_or_else(|| OrderError::NotFound(key.to_string()))?;
                return Ok(CreateOutcome::Replayed(self.load_detail(existing).await?));
            }
            Err(e) => return Err(e.into()),
        }
        order::insert_items(&mut tx, &items).await?;
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(
            order_id = %new_order.id,
            staff_id = %new_order.staff_id,
            items = items.len(),
            total = new_order.total_amount,
            "Order created"
        );
        Ok(CreateOutcome::Created(self.load_detail(new_order).await?))
    }

    /// Replace an order's items and scalars in one transaction.
    ///
    /// An empty item list is accepted here and yields an order with no items.
    /// Omitted scalars keep their stored values; `staffId` and `createdAt`
    /// never change. With `expected_version` set, a stale version fails with
    /// [`OrderError::VersionConflict`]; without it the last writer wins.
    pub async fn update(&self, id: &str, draft: OrderDraft) -> OrderResult<OrderDetail> {
        let current = order::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))?;

        if let Some(expected) = draft.expected_version
            && expected != current.version
        {
            return Err(OrderError::VersionConflict {
                id: id.to_string(),
                expected,
                actual: current.version,
            });
        }

        let customer_id = draft
            .customer_id
            .clone()
            .unwrap_or_else(|| current.customer_id.clone());
        if customer_id != current.customer_id {
            self.ensure_customer(&customer_id).await?;
        }
        self.ensure_products(&draft.lines).await?;
        let total = checked_total(&draft)?;

        let scalars = OrderScalars {
            customer_id,
            payment_method: draft.payment_method.unwrap_or(current.payment_method),
            sale_type: draft.sale_type.unwrap_or(current.sale_type),
            status: draft.status.clone().unwrap_or_else(|| current.status.clone()),
            total_amount: total,
            updated_at: shared::util::now_millis(),
        };
        let items = build_items(id, &draft.lines);

        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        order::delete_items(&mut tx, id).await?;
        if !order::update_scalars(&mut tx, id, draft.expected_version, &scalars).await? {
            // changed or deleted between the read and this write
            let actual = order::find_by_id(&mut *tx, id).await?;
            return Err(match (actual, draft.expected_version) {
                (Some(o), Some(expected)) => OrderError::VersionConflict {
                    id: id.to_string(),
                    expected,
                    actual: o.version,
                },
                _ => OrderError::NotFound(id.to_string()),
            });
        }
        order::insert_items(&mut tx, &items).await?;
        let updated = order::find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))?;
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(
            order_id = %id,
            version = updated.version,
            items = items.len(),
            total = updated.total_amount,
            "Order updated"
        );
        self.load_detail(updated).await
    }

    /// Delete an order and its items. Returns whether the order existed;
    /// deleting a missing order is not an error.
    pub async fn delete(&self, id: &str) -> OrderResult<bool> {
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let removed_items = order::delete_items(&mut tx, id).await?;
        let existed = order::delete_order(&mut tx, id).await?;
        tx.commit().await.map_err(RepoError::from)?;

        if existed {
            tracing::info!(order_id = %id, items = removed_items, "Order deleted");
        } else {
            tracing::debug!(order_id = %id, "Delete of missing order treated as done");
        }
        Ok(existed)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub async fn get(&self, id: &str) -> OrderResult<Option<OrderDetail>> {
        match order::find_by_id(&self.pool, id).await? {
            Some(o) => Ok(Some(self.load_detail(o).await?)),
            None => Ok(None),
        }
    }

    /// Newest first
    pub async fn list(&self, limit: Option<i64>, offset: Option<i64>) -> OrderResult<Vec<OrderDetail>> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = offset.unwrap_or(0).max(0);
        let orders = order::find_page(&self.pool, limit, offset).await?;
        self.load_details(orders).await
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn ensure_customer(&self, customer_id: &str) -> OrderResult<()> {
        if customer::find_by_id(&self.pool, customer_id).await?.is_none() {
            return Err(OrderError::UnknownCustomer(customer_id.to_string()));
        }
        Ok(())
    }

    async fn ensure_products(&self, lines: &[CartLine]) -> OrderResult<()> {
        let ids = unique_product_ids(lines);
        let found: HashSet<String> = product::find_by_ids(&self.pool, &ids)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();
        if let Some(missing) = ids.into_iter().find(|id| !found.contains(id)) {
            return Err(OrderError::UnknownProduct(missing));
        }
        Ok(())
    }

    async fn load_detail(&self, o: Order) -> OrderResult<OrderDetail> {
        let mut details = self.load_details(vec![o]).await?;
        details
            .pop()
            .ok_or_else(|| OrderError::Storage(RepoError::Database("Order detail lost".into())))
    }

    /// Attach items (with products), customer and staff to each order.
    async fn load_details(&self, orders: Vec<Order>) -> OrderResult<Vec<OrderDetail>> {
        let order_ids: Vec<String> = orders.iter().map(|o| o.id.clone()).collect();
        let items = order::find_items_for_orders(&self.pool, &order_ids).await?;

        let product_ids: Vec<String> = items
            .iter()
            .map(|i| i.product_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let products: HashMap<String, Product> = product::find_by_ids(&self.pool, &product_ids)
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        let mut customers: HashMap<String, Option<Customer>> = HashMap::new();
        let mut staff: HashMap<String, Option<UserPublic>> = HashMap::new();
        for o in &orders {
            if !customers.contains_key(&o.customer_id) {
                let c = customer::find_by_id(&self.pool, &o.customer_id).await?;
                customers.insert(o.customer_id.clone(), c);
            }
            if !staff.contains_key(&o.staff_id) {
                let u = user::find_public(&self.pool, &o.staff_id).await?;
                staff.insert(o.staff_id.clone(), u);
            }
        }

        let mut items_by_order: HashMap<String, Vec<OrderItemDetail>> = HashMap::new();
        for item in items {
            let product = products.get(&item.product_id).cloned();
            items_by_order
                .entry(item.order_id.clone())
                .or_default()
                .push(OrderItemDetail { item, product });
        }

        Ok(orders
            .into_iter()
            .map(|o| OrderDetail {
                items: items_by_order.remove(&o.id).unwrap_or_default(),
                customer: customers.get(&o.customer_id).cloned().flatten(),
                staff: staff.get(&o.staff_id).cloned().flatten(),
                order: o,
            })
            .collect())
    }
}

fn unique_product_ids(lines: &[CartLine]) -> Vec<String> {
    let mut seen = HashSet::new();
    lines
        .iter()
        .filter(|l| seen.insert(l.product_id.as_str()))
        .map(|l| l.product_id.clone())
        .collect()
}

fn build_items(order_id: &str, lines: &[CartLine]) -> Vec<OrderItem> {
    lines
        .iter()
        .map(|l| OrderItem {
            id: shared::util::new_id(),
            order_id: order_id.to_string(),
            product_id: l.product_id.clone(),
            quantity: l.quantity,
            price: l.price,
        })
        .collect()
}

/// Server-side total; a declared total must agree within one cent.
fn checked_total(draft: &OrderDraft) -> OrderResult<f64> {
    let computed = order_total(draft.lines.iter().map(|l| (l.price, l.quantity)));
    if let Some(declared) = draft.declared_total
        && !amounts_match(declared, computed)
    {
        tracing::warn!(declared, computed, "Order total mismatch");
        return Err(OrderError::TotalMismatch { declared, computed });
    }
    Ok(computed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::category;
    use crate::db::repository::product::ProductFields;
    use shared::models::{UserCreate, UserRole};

    struct Fixture {
        engine: OrderCommitEngine,
        staff: CurrentUser,
        coke: String,
        pepsi: String,
        db: DbService,
    }

    async fn fixture() -> Fixture {
        fixture_on(DbService::in_memory().await.unwrap()).await
    }

    async fn fixture_on(db: DbService) -> Fixture {
        let u = user::create(
            &db.pool,
            UserCreate {
                username: "cashier01".into(),
                password_hash: "x".into(),
                role: UserRole::Staff,
                email: "c@example.com".into(),
                full_name: "Cashier".into(),
                nic: "1".into(),
                mobile_number: "0".into(),
            },
        )
        .await
        .unwrap();
        let cat = category::create(&db.pool, "Beverages").await.unwrap();
        let mut ids = Vec::new();
        for (name, price) in [("Coke", 150.0), ("Pepsi", 140.0)] {
            let p = product::create(
                &db.pool,
                ProductFields {
                    name: name.into(),
                    price,
                    category_id: cat.id.clone(),
                    barcode: None,
                    description: None,
                    image_url: None,
                },
            )
            .await
            .unwrap();
            ids.push(p.id);
        }
        Fixture {
            engine: OrderCommitEngine::new(db.pool.clone()),
            staff: CurrentUser {
                id: u.id,
                username: u.username,
                role: UserRole::Staff,
            },
            pepsi: ids.pop().unwrap(),
            coke: ids.pop().unwrap(),
            db,
        }
    }

    fn draft(lines: Vec<CartLine>) -> OrderDraft {
        OrderDraft {
            customer_id: Some("cust-seed-1".into()),
            lines,
            payment_method: None,
            sale_type: None,
            declared_total: None,
            status: None,
            idempotency_key: None,
            expected_version: None,
        }
    }

    fn line(product_id: &str, quantity: i64, price: f64) -> CartLine {
        CartLine {
            product_id: product_id.into(),
            quantity,
            price,
        }
    }

    #[tokio::test]
    async fn create_persists_order_and_items() {
        let f = fixture().await;
        let mut d = draft(vec![line(&f.coke, 2, 150.0)]);
        d.declared_total = Some(300.0);

        let detail = f.engine.create(&f.staff, d).await.unwrap().into_detail();
        assert_eq!(detail.order.total_amount, 300.0);
        assert_eq!(detail.order.status, "PAID");
        assert_eq!(detail.order.payment_method, PaymentMethod::Cash);
        assert_eq!(detail.order.sale_type, SaleType::Store);
        assert_eq!(detail.order.staff_id, f.staff.id);
        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.items[0].item.quantity, 2);
        assert_eq!(detail.items[0].product.as_ref().unwrap().name, "Coke");
        assert_eq!(detail.customer.unwrap().id, "cust-seed-1");
        assert_eq!(detail.staff.unwrap().username, "cashier01");
    }

    #[tokio::test]
    async fn empty_cart_writes_nothing() {
        let f = fixture().await;
        let err = f.engine.create(&f.staff, draft(vec![])).await.unwrap_err();
        assert!(matches!(err, OrderError::Empty));
        assert!(f.engine.list(None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn mismatching_total_is_rejected() {
        let f = fixture().await;
        let mut d = draft(vec![line(&f.coke, 2, 150.0)]);
        d.declared_total = Some(1.0);
        let err = f.engine.create(&f.staff, d).await.unwrap_err();
        assert!(matches!(err, OrderError::TotalMismatch { computed, .. } if computed == 300.0));
        assert!(f.engine.list(None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_references_are_rejected() {
        let f = fixture().await;
        let err = f
            .engine
            .create(&f.staff, draft(vec![line("ghost", 1, 1.0)]))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::UnknownProduct(ref id) if id == "ghost"));

        let mut d = draft(vec![line(&f.coke, 1, 150.0)]);
        d.customer_id = Some("nobody".into());
        let err = f.engine.create(&f.staff, d).await.unwrap_err();
        assert!(matches!(err, OrderError::UnknownCustomer(_)));

        let mut d = draft(vec![line(&f.coke, 1, 150.0)]);
        d.customer_id = None;
        assert!(matches!(
            f.engine.create(&f.staff, d).await.unwrap_err(),
            OrderError::MissingCustomer
        ));
    }

    #[tokio::test]
    async fn idempotency_key_replays_the_first_order() {
        let f = fixture().await;
        let mut d = draft(vec![line(&f.coke, 1, 150.0)]);
        d.idempotency_key = Some("cart-42".into());

        let first = f.engine.create(&f.staff, d.clone()).await.unwrap();
        let CreateOutcome::Created(first) = first else {
            panic!("expected a new order");
        };
        let second = f.engine.create(&f.staff, d).await.unwrap();
        let CreateOutcome::Replayed(second) = second else {
            panic!("expected a replay");
        };
        assert_eq!(first.order.id, second.order.id);
        assert_eq!(f.engine.list(None, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_replaces_items_and_bumps_version() {
        let f = fixture().await;
        let created = f
            .engine
            .create(
                &f.staff,
                draft(vec![line(&f.coke, 1, 150.0), line(&f.pepsi, 2, 140.0)]),
            )
            .await
            .unwrap()
            .into_detail();
        assert_eq!(created.items.len(), 2);

        let mut d = draft(vec![line(&f.pepsi, 3, 140.0)]);
        d.customer_id = None;
        d.payment_method = Some(PaymentMethod::Card);
        let updated = f.engine.update(&created.order.id, d).await.unwrap();

        assert_eq!(updated.items.len(), 1);
        assert_eq!(updated.items[0].item.quantity, 3);
        assert_eq!(updated.order.total_amount, 420.0);
        assert_eq!(updated.order.version, 2);
        assert_eq!(updated.order.payment_method, PaymentMethod::Card);
        assert_eq!(updated.order.sale_type, SaleType::Store);
        assert_eq!(updated.order.customer_id, "cust-seed-1");
        assert_eq!(updated.order.created_at, created.order.created_at);
        assert_eq!(updated.order.staff_id, created.order.staff_id);
    }

    #[tokio::test]
    async fn stale_version_is_a_conflict() {
        let f = fixture().await;
        let created = f
            .engine
            .create(&f.staff, draft(vec![line(&f.coke, 1, 150.0)]))
            .await
            .unwrap()
            .into_detail();

        let mut first = draft(vec![line(&f.coke, 2, 150.0)]);
        first.expected_version = Some(1);
        f.engine.update(&created.order.id, first).await.unwrap();

        let mut stale = draft(vec![line(&f.pepsi, 1, 140.0)]);
        stale.expected_version = Some(1);
        let err = f.engine.update(&created.order.id, stale).await.unwrap_err();
        assert!(matches!(err, OrderError::VersionConflict { actual: 2, .. }));

        let kept = f.engine.get(&created.order.id).await.unwrap().unwrap();
        assert_eq!(kept.items.len(), 1);
        assert_eq!(kept.items[0].item.quantity, 2);
    }

    #[tokio::test]
    async fn price_snapshot_survives_catalog_change() {
        let f = fixture().await;
        let created = f
            .engine
            .create(&f.staff, draft(vec![line(&f.coke, 1, 150.0)]))
            .await
            .unwrap()
            .into_detail();
        sqlx::query("UPDATE products SET price = 999 WHERE id = ?")
            .bind(&f.coke)
            .execute(&f.db.pool)
            .await
            .unwrap();

        let read = f.engine.get(&created.order.id).await.unwrap().unwrap();
        assert_eq!(read.items[0].item.price, 150.0);
        assert_eq!(read.order.total_amount, 150.0);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let f = fixture().await;
        let created = f
            .engine
            .create(&f.staff, draft(vec![line(&f.coke, 1, 150.0)]))
            .await
            .unwrap()
            .into_detail();
        assert!(f.engine.delete(&created.order.id).await.unwrap());
        assert!(!f.engine.delete(&created.order.id).await.unwrap());
        assert!(f.engine.get(&created.order.id).await.unwrap().is_none());

        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
            .fetch_one(&f.db.pool)
            .await
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn update_of_missing_order_is_not_found() {
        let f = fixture().await;
        let err = f
            .engine
            .update("missing", draft(vec![line(&f.coke, 1, 150.0)]))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::NotFound(_)));
    }

    #[tokio::test]
    async fn failed_update_rolls_back_item_replacement() {
        let f = fixture().await;
        let created = f
            .engine
            .create(
                &f.staff,
                draft(vec![line(&f.coke, 1, 150.0), line(&f.pepsi, 2, 140.0)]),
            )
            .await
            .unwrap()
            .into_detail();

        // items are already deleted inside the transaction when this fires
        sqlx::query(
            "CREATE TRIGGER reject_items BEFORE INSERT ON order_items \
             BEGIN SELECT RAISE(ABORT, 'insert refused'); END",
        )
        .execute(&f.db.pool)
        .await
        .unwrap();

        let err = f
            .engine
            .update(&created.order.id, draft(vec![line(&f.pepsi, 5, 140.0)]))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Storage(_)));

        let kept = f.engine.get(&created.order.id).await.unwrap().unwrap();
        assert_eq!(kept.order.version, 1);
        assert_eq!(kept.order.total_amount, 430.0);
        let quantities: Vec<i64> = kept.items.iter().map(|i| i.item.quantity).collect();
        assert_eq!(quantities, vec![1, 2]);
    }

    #[tokio::test]
    async fn concurrent_updates_without_version_both_apply() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.db");
        let f = fixture_on(DbService::new(&path.to_string_lossy()).await.unwrap()).await;
        let id = f
            .engine
            .create(&f.staff, draft(vec![line(&f.coke, 1, 150.0)]))
            .await
            .unwrap()
            .into_detail()
            .order
            .id;

        for _ in 0..10 {
            let (a, b) = tokio::join!(
                f.engine.update(&id, draft(vec![line(&f.coke, 2, 150.0)])),
                f.engine.update(&id, draft(vec![line(&f.coke, 3, 150.0)])),
            );
            a.unwrap();
            b.unwrap();
        }

        let last = f.engine.get(&id).await.unwrap().unwrap();
        assert_eq!(last.order.version, 21);
        assert_eq!(last.items.len(), 1);
        assert!([2, 3].contains(&last.items[0].item.quantity));
    }

    #[tokio::test]
    async fn concurrent_updates_with_same_version_admit_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.db");
        let f = fixture_on(DbService::new(&path.to_string_lossy()).await.unwrap()).await;
        let id = f
            .engine
            .create(&f.staff, draft(vec![line(&f.coke, 1, 150.0)]))
            .await
            .unwrap()
            .into_detail()
            .order
            .id;

        for version in 1..=10 {
            let mut first = draft(vec![line(&f.coke, 2, 150.0)]);
            first.expected_version = Some(version);
            let mut second = draft(vec![line(&f.coke, 3, 150.0)]);
            second.expected_version = Some(version);

            let (a, b) = tokio::join!(f.engine.update(&id, first), f.engine.update(&id, second));
            let outcomes = [a, b];
            assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
            assert!(outcomes.iter().any(|r| matches!(r, Err(OrderError::VersionConflict { .. }))));
        }

        let last = f.engine.get(&id).await.unwrap().unwrap();
        assert_eq!(last.order.version, 11);
        assert_eq!(last.items.len(), 1);
    }
}
