use sqlx::Executor;
use tracing::info;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

/// The storefront's default catalog, in display order.
const SEED_PRODUCTS: &[SeedProductContract] = &[
    SeedProductContract {
        id: "p1",
        name: "Nordic TV Console",
        base_price: 45_000,
        category: "living_room",
        materials_json: r#"["mdf","birch_plywood","oak_veneer"]"#,
        colors_json: r#"["matte_white","natural","walnut_stain"]"#,
    },
    SeedProductContract {
        id: "p2",
        name: "Lagos Bookshelf",
        base_price: 35_000,
        category: "storage",
        materials_json: r#"["mdf","solid_pine"]"#,
        colors_json: r#"["matte_white","matte_black","natural"]"#,
    },
    SeedProductContract {
        id: "p3",
        name: "Zen Coffee Table",
        base_price: 28_000,
        category: "living_room",
        materials_json: r#"["birch_plywood","oak_veneer"]"#,
        colors_json: r#"["natural","walnut_stain"]"#,
    },
    SeedProductContract {
        id: "p4",
        name: "Tech Desk Alpha",
        base_price: 42_000,
        category: "office",
        materials_json: r#"["mdf","birch_plywood"]"#,
        colors_json: r#"["matte_white","slate_grey","matte_black"]"#,
    },
    SeedProductContract {
        id: "p5",
        name: "Bedside Cube",
        base_price: 15_000,
        category: "bedroom",
        materials_json: r#"["mdf","solid_pine"]"#,
        colors_json: r#"["matte_white","natural","slate_grey"]"#,
    },
    SeedProductContract {
        id: "p6",
        name: "Hexagon Wall Shelf",
        base_price: 12_000,
        category: "decor",
        materials_json: r#"["solid_pine","birch_plywood"]"#,
        colors_json: r#"["natural","walnut_stain","matte_black"]"#,
    },
];

/// Default furniture catalog seed.
///
/// Loading is idempotent: rows that already exist (including admin edits) are left alone.
pub struct CatalogSeedDataset;

impl CatalogSeedDataset {
    pub const SQL: &str = include_str!("../../../config/fixtures/catalog_seed.sql");

    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;

        let before: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM product")
            .fetch_one(&mut *tx)
            .await?;
        tx.execute(sqlx::query(Self::SQL)).await?;
        let after: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM product")
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        let inserted = usize::try_from(after - before).unwrap_or_default();
        info!(event_name = "db.seed.catalog", inserted, "default catalog seeded");

        let products_seeded = SEED_PRODUCTS
            .iter()
            .map(|product| ProductSeedInfo { id: product.id, name: product.name })
            .collect::<Vec<_>>();

        Ok(SeedResult { products_seeded, inserted })
    }

    /// Verify that every seed product exists with its published price and option sets.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        for product in SEED_PRODUCTS {
            let present: i64 = sqlx::query_scalar(
                "SELECT EXISTS(
                    SELECT 1 FROM product
                    WHERE id = ?1 AND name = ?2 AND base_price = ?3 AND category = ?4
                      AND materials_json = ?5 AND colors_json = ?6
                 )",
            )
            .bind(product.id)
            .bind(product.name)
            .bind(product.base_price)
            .bind(product.category)
            .bind(product.materials_json)
            .bind(product.colors_json)
            .fetch_one(pool)
            .await?;
            checks.push((product.id, present == 1));
        }

        let all_present = checks.iter().all(|(_, ok)| *ok);
        Ok(VerificationResult { all_present, checks })
    }

    /// Remove the seed products from a test database.
    pub async fn clean(pool: &DbPool) -> Result<(), RepositoryError> {
        let mut tx = pool.begin().await?;
        for product in SEED_PRODUCTS {
            sqlx::query("DELETE FROM product WHERE id = ?")
                .bind(product.id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub fn product_ids() -> Vec<&'static str> {
        SEED_PRODUCTS.iter().map(|product| product.id).collect()
    }
}

#[derive(Debug, Clone, Copy)]
struct SeedProductContract {
    id: &'static str,
    name: &'static str,
    base_price: i64,
    category: &'static str,
    materials_json: &'static str,
    colors_json: &'static str,
}

#[derive(Debug)]
pub struct SeedResult {
    pub products_seeded: Vec<ProductSeedInfo>,
    pub inserted: usize,
}

#[derive(Debug)]
pub struct ProductSeedInfo {
    pub id: &'static str,
    pub name: &'static str,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}
