//! Product Repository

use std::collections::HashMap;

use super::{RepoError, RepoResult, category, contains_pattern};
use shared::models::{Product, ProductWithCategory};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, name, price, category_id, barcode, description, image_url, created_at";

/// Validated product fields, as written to the row
#[derive(Debug, Clone)]
pub struct ProductFields {
    pub name: String,
    pub price: f64,
    pub category_id: String,
    pub barcode: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl From<Product> for ProductFields {
    fn from(p: Product) -> Self {
        Self {
            name: p.name,
            price: p.price,
            category_id: p.category_id,
            barcode: p.barcode,
            description: p.description,
            image_url: p.image_url,
        }
    }
}

/// Attach categories to a batch of products (one lookup for the batch)
async fn with_categories(
    pool: &SqlitePool,
    products: Vec<Product>,
) -> RepoResult<Vec<ProductWithCategory>> {
    let categories: HashMap<String, _> = category::find_all(pool)
        .await?
        .into_iter()
        .map(|c| (c.id.clone(), c))
        .collect();
    Ok(products
        .into_iter()
        .map(|product| ProductWithCategory {
            category: categories.get(&product.category_id).cloned(),
            product,
        })
        .collect())
}

/// List products, newest first. `q` matches name, barcode or description
/// (contains, case-insensitive).
pub async fn find_all(
    pool: &SqlitePool,
    q: Option<&str>,
    category_id: Option<&str>,
) -> RepoResult<Vec<ProductWithCategory>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM products WHERE 1 = 1"));
    if let Some(q) = q {
        let pattern = contains_pattern(q);
        qb.push(" AND (lower(name) LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR lower(barcode) LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR lower(description) LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
    if let Some(category_id) = category_id {
        qb.push(" AND category_id = ").push_bind(category_id.to_string());
    }
    qb.push(" ORDER BY created_at DESC, rowid DESC");

    let products = qb.build_query_as::<Product>().fetch_all(pool).await?;
    with_categories(pool, products).await
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<Product>> {
    let sql = format!("SELECT {COLUMNS} FROM products WHERE id = ?");
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(product)
}

pub async fn find_by_barcode(pool: &SqlitePool, barcode: &str) -> RepoResult<Option<Product>> {
    let sql = format!("SELECT {COLUMNS} FROM products WHERE barcode = ? LIMIT 1");
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(barcode)
        .fetch_optional(pool)
        .await?;
    Ok(product)
}

pub async fn find_with_category(
    pool: &SqlitePool,
    id: &str,
) -> RepoResult<Option<ProductWithCategory>> {
    let Some(product) = find_by_id(pool, id).await? else {
        return Ok(None);
    };
    let category = category::find_by_id(pool, &product.category_id).await?;
    Ok(Some(ProductWithCategory { product, category }))
}

/// Products whose id is in `ids` (missing ids are simply absent)
pub async fn find_by_ids<'e, E>(exec: E, ids: &[String]) -> RepoResult<Vec<Product>>
where
    E: SqliteExecutor<'e>,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM products WHERE id IN ("));
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(id.clone());
    }
    separated.push_unseparated(")");
    let products = qb.build_query_as::<Product>().fetch_all(exec).await?;
    Ok(products)
}

pub async fn create(pool: &SqlitePool, data: ProductFields) -> RepoResult<Product> {
    let id = shared::util::new_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO products (id, name, price, category_id, barcode, description, image_url, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )
    .bind(&id)
    .bind(&data.name)
    .bind(data.price)
    .bind(&data.category_id)
    .bind(&data.barcode)
    .bind(&data.description)
    .bind(&data.image_url)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, &id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create product".into()))
}

/// Overwrite every mutable column
pub async fn update(pool: &SqlitePool, id: &str, data: ProductFields) -> RepoResult<Product> {
    let rows = sqlx::query(
        "UPDATE products SET name = ?1, price = ?2, category_id = ?3, barcode = ?4, \
         description = ?5, image_url = ?6 WHERE id = ?7",
    )
    .bind(&data.name)
    .bind(data.price)
    .bind(&data.category_id)
    .bind(&data.barcode)
    .bind(&data.description)
    .bind(&data.image_url)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
}

/// Delete a product. Refused while order items reference it.
pub async fn delete(pool: &SqlitePool, id: &str) -> RepoResult<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items WHERE product_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Err(RepoError::Conflict(format!(
            "Product is referenced by {count} order item(s)"
        )));
    }
    let rows = sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product {id} not found")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    async fn seed(pool: &SqlitePool) -> String {
        let cat = category::create(pool, "Beverages").await.unwrap();
        for (name, price, barcode) in [("Coke", 150.0, "COKE001"), ("Pepsi", 140.0, "PEPSI001")] {
            create(
                pool,
                ProductFields {
                    name: name.into(),
                    price,
                    category_id: cat.id.clone(),
                    barcode: Some(barcode.into()),
                    description: None,
                    image_url: None,
                },
            )
            .await
            .unwrap();
        }
        cat.id
    }

    #[tokio::test]
    async fn list_filters_by_query_and_category() {
        let db = DbService::in_memory().await.unwrap();
        let cat_id = seed(&db.pool).await;

        let all = find_all(&db.pool, None, None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|p| p.category.as_ref().map(|c| c.name.as_str()) == Some("Beverages")));

        let by_barcode = find_all(&db.pool, Some("pepsi0"), None).await.unwrap();
        assert_eq!(by_barcode.len(), 1);
        assert_eq!(by_barcode[0].product.name, "Pepsi");

        assert_eq!(find_all(&db.pool, None, Some(cat_id.as_str())).await.unwrap().len(), 2);
        assert!(find_all(&db.pool, None, Some("other")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_by_ids_skips_unknown() {
        let db = DbService::in_memory().await.unwrap();
        seed(&db.pool).await;
        let all = find_all(&db.pool, None, None).await.unwrap();
        let ids = vec![all[0].product.id.clone(), "missing".to_string()];
        let found = find_by_ids(&db.pool, &ids).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(find_by_ids(&db.pool, &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_category_is_rejected_by_foreign_key() {
        let db = DbService::in_memory().await.unwrap();
        let err = create(
            &db.pool,
            ProductFields {
                name: "Ghost".into(),
                price: 1.0,
                category_id: "missing".into(),
                barcode: None,
                description: None,
                image_url: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));
    }
}
