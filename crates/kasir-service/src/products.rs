//! # Product Service
//!
//! Catalog reads for everyone, mutations for admins.
//!
//! ## Listing Scope
//! ```text
//! list(session, page, search, warehouse_filter)
//!      │
//!      ├── staff scoped to W ──► warehouse = W  (filter argument ignored)
//!      └── otherwise ─────────► warehouse = warehouse_filter
//!      │
//!      ▼
//! count(search, warehouse)  ┐ same predicate, so total_pages always
//! list_page(search, ...)    ┘ agrees with the rows returned
//! ```

use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, info};

use kasir_core::validation::validate_search_query;
use kasir_core::{
    ImportOutcome, NewProduct, Page, PageRequest, Product, ProductExport, ProductRecord,
    ProductUpdate, StockSummary,
};
use kasir_db::Database;

use crate::error::{ServiceError, ServiceResult};
use crate::session::Session;
use crate::warehouses::WarehouseService;

#[derive(Debug, Clone)]
pub struct ProductService {
    db: Database,
}

impl ProductService {
    pub fn new(db: Database) -> Self {
        ProductService { db }
    }

    fn warehouses(&self) -> WarehouseService {
        WarehouseService::new(self.db.clone())
    }

    /// One page of products matching the search and warehouse filter.
    pub async fn list(
        &self,
        session: &Session,
        request: PageRequest,
        search: Option<&str>,
        warehouse_filter: Option<i64>,
    ) -> ServiceResult<Page<Product>> {
        let search = validate_search_query(search.unwrap_or_default())?;
        let warehouse_id = session.warehouse_scope().or(warehouse_filter);
        debug!(
            page = request.page(),
            limit = request.limit(),
            ?search,
            ?warehouse_id,
            "Listing products"
        );

        let repo = self.db.products();
        let total = repo.count(search.as_deref(), warehouse_id).await?;
        let data = repo
            .list_page(search.as_deref(), warehouse_id, request.offset(), request.limit())
            .await?;

        Ok(Page::new(data, request, total))
    }

    /// Gets one product. Scoped staff cannot see other warehouses' products.
    pub async fn get(&self, session: &Session, id: i64) -> ServiceResult<Product> {
        let product = self
            .db
            .products()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", id))?;

        match session.warehouse_scope() {
            Some(scope) if scope != product.warehouse_id => {
                Err(ServiceError::not_found("Product", id))
            }
            _ => Ok(product),
        }
    }

    pub async fn create(&self, session: &Session, input: NewProduct) -> ServiceResult<Product> {
        session.require_admin()?;
        let input = input.validated()?;
        self.warehouses().ensure_exists(input.warehouse_id).await?;

        let product = self.db.products().insert(&input).await?;
        info!(product_id = product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// Updates name, prices and stock. The warehouse is left as it was.
    pub async fn update(
        &self,
        session: &Session,
        id: i64,
        input: ProductUpdate,
    ) -> ServiceResult<Product> {
        session.require_admin()?;
        let input = input.validated()?;

        self.db.products().update(id, &input).await?;
        info!(product_id = id, "Product updated");
        self.get(session, id).await
    }

    pub async fn delete(&self, session: &Session, id: i64) -> ServiceResult<()> {
        session.require_admin()?;
        self.db.products().delete(id).await?;
        info!(product_id = id, "Product deleted");
        Ok(())
    }

    /// Product count, units and stock value per warehouse.
    pub async fn stock_summary(&self, session: &Session) -> ServiceResult<StockSummary> {
        session.require_admin()?;
        let rows = self.db.products().stock_by_warehouse().await?;
        Ok(StockSummary::from_rows(rows))
    }

    /// Every product as a portable document.
    pub async fn export(&self, session: &Session) -> ServiceResult<ProductExport> {
        session.require_admin()?;
        let products = self.db.products().list_all(None).await?;
        info!(count = products.len(), "Products exported");

        Ok(ProductExport {
            exported_at: Utc::now(),
            products: products.iter().map(ProductRecord::from).collect(),
        })
    }

    /// Applies an export document.
    ///
    /// Every row is checked before anything is written. The first bad row
    /// rejects the whole document, naming its 1-based row number.
    pub async fn import(
        &self,
        session: &Session,
        document: ProductExport,
    ) -> ServiceResult<ImportOutcome> {
        session.require_admin()?;

        let mut records = Vec::with_capacity(document.products.len());
        for (index, record) in document.products.into_iter().enumerate() {
            let checked = NewProduct {
                name: record.name,
                purchase_price: record.purchase_price,
                selling_price: record.selling_price,
                stock: record.stock,
                warehouse_id: record.warehouse_id,
            }
            .validated()
            .map_err(|e| ServiceError::Validation(format!("Row {}: {}", index + 1, e)))?;

            records.push(ProductRecord {
                id: record.id,
                name: checked.name,
                purchase_price: checked.purchase_price,
                selling_price: checked.selling_price,
                stock: checked.stock,
                warehouse_id: checked.warehouse_id,
            });
        }

        let warehouse_ids: HashSet<i64> = records.iter().map(|r| r.warehouse_id).collect();
        for id in warehouse_ids {
            self.warehouses().ensure_exists(id).await?;
        }

        let outcome = self.db.products().import(&records).await?;
        info!(
            created = outcome.created,
            updated = outcome.updated,
            "Products imported"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{kasir_with_admin, new_product, new_warehouse, staff_session};
    use kasir_core::Money;

    #[tokio::test]
    async fn test_create_requires_existing_warehouse() {
        let (kasir, admin) = kasir_with_admin().await;

        let err = kasir
            .products()
            .create(&admin, new_product("Kopi", 99, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_pages_cover_every_match_once() {
        let (kasir, admin) = kasir_with_admin().await;
        let w = new_warehouse(&kasir, &admin, "Gudang").await;

        for i in 0..23 {
            kasir
                .products()
                .create(&admin, new_product(&format!("Mie {i}"), w.id, 5))
                .await
                .unwrap();
        }
        kasir
            .products()
            .create(&admin, new_product("Sabun", w.id, 5))
            .await
            .unwrap();

        let first = kasir
            .products()
            .list(&admin, PageRequest::new(1, 10), Some("mie"), None)
            .await
            .unwrap();
        assert_eq!(first.meta.total_items, 23);
        assert_eq!(first.meta.total_pages, 3);

        let mut seen = Vec::new();
        for page in 1..=first.meta.total_pages {
            let p = kasir
                .products()
                .list(&admin, PageRequest::new(page, 10), Some("mie"), None)
                .await
                .unwrap();
            seen.extend(p.data.into_iter().map(|p| p.id));
        }
        let mut sorted = seen.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(seen.len(), 23);
        assert_eq!(sorted, seen);
    }

    #[tokio::test]
    async fn test_scoped_staff_only_see_their_warehouse() {
        let (kasir, admin) = kasir_with_admin().await;
        let a = new_warehouse(&kasir, &admin, "A").await;
        let b = new_warehouse(&kasir, &admin, "B").await;

        let in_a = kasir
            .products()
            .create(&admin, new_product("Teh", a.id, 5))
            .await
            .unwrap();
        let in_b = kasir
            .products()
            .create(&admin, new_product("Kopi", b.id, 5))
            .await
            .unwrap();

        let staff = staff_session(Some(a.id));
        let page = kasir
            .products()
            .list(&staff, PageRequest::default(), None, Some(b.id))
            .await
            .unwrap();
        assert_eq!(page.meta.total_items, 1);
        assert_eq!(page.data[0].id, in_a.id);

        assert!(kasir.products().get(&staff, in_a.id).await.is_ok());
        assert!(matches!(
            kasir.products().get(&staff, in_b.id).await,
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_warehouse() {
        let (kasir, admin) = kasir_with_admin().await;
        let w = new_warehouse(&kasir, &admin, "Gudang").await;
        let p = kasir
            .products()
            .create(&admin, new_product("Teh", w.id, 5))
            .await
            .unwrap();

        let updated = kasir
            .products()
            .update(
                &admin,
                p.id,
                ProductUpdate {
                    name: "Teh Manis".to_string(),
                    purchase_price: Money::from_rupiah(3_000),
                    selling_price: Money::from_rupiah(5_000),
                    stock: 12,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Teh Manis");
        assert_eq!(updated.stock, 12);
        assert_eq!(updated.warehouse_id, w.id);

        assert!(matches!(
            kasir.products().delete(&staff_session(None), p.id).await,
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_export_then_import() {
        let (kasir, admin) = kasir_with_admin().await;
        let w = new_warehouse(&kasir, &admin, "Gudang").await;
        kasir
            .products()
            .create(&admin, new_product("Teh", w.id, 5))
            .await
            .unwrap();

        let mut doc = kasir.products().export(&admin).await.unwrap();
        assert_eq!(doc.products.len(), 1);

        doc.products[0].stock = 40;
        doc.products.push(ProductRecord {
            id: None,
            name: "Kopi".to_string(),
            purchase_price: Money::from_rupiah(2_000),
            selling_price: Money::from_rupiah(4_000),
            stock: 8,
            warehouse_id: w.id,
        });

        let outcome = kasir.products().import(&admin, doc).await.unwrap();
        assert_eq!(outcome, ImportOutcome { created: 1, updated: 1 });

        let all = kasir
            .products()
            .list(&admin, PageRequest::default(), None, None)
            .await
            .unwrap();
        assert_eq!(all.meta.total_items, 2);
        assert_eq!(all.data[0].stock, 40);
    }

    #[tokio::test]
    async fn test_import_rejects_bad_row_before_writing() {
        let (kasir, admin) = kasir_with_admin().await;
        let w = new_warehouse(&kasir, &admin, "Gudang").await;

        let mut bad = ProductRecord::from(&Product {
            id: 0,
            name: "Minyak".to_string(),
            purchase_price: Money::from_rupiah(10_000),
            selling_price: Money::from_rupiah(14_000),
            stock: 3,
            warehouse_id: w.id,
            created_at: Utc::now(),
        });
        bad.id = None;
        let mut negative = bad.clone();
        negative.stock = -1;

        let doc = ProductExport {
            exported_at: Utc::now(),
            products: vec![bad, negative],
        };
        let err = kasir.products().import(&admin, doc).await.unwrap_err();
        assert!(err.to_string().starts_with("Row 2:"));

        let all = kasir
            .products()
            .list(&admin, PageRequest::default(), None, None)
            .await
            .unwrap();
        assert_eq!(all.meta.total_items, 0);
    }

    #[tokio::test]
    async fn test_stock_summary() {
        let (kasir, admin) = kasir_with_admin().await;
        let w = new_warehouse(&kasir, &admin, "Gudang").await;
        kasir
            .products()
            .create(&admin, new_product("Teh", w.id, 4))
            .await
            .unwrap();

        let summary = kasir.products().stock_summary(&admin).await.unwrap();
        assert_eq!(summary.total_products, 1);
        assert_eq!(summary.total_stock, 4);
        assert_eq!(summary.total_value, Money::from_rupiah(40_000));
    }
}
