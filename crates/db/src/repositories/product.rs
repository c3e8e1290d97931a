use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};

use replique_core::domain::dimensions::Dimensions;
use replique_core::domain::options::{Category, FinishColor, Material};
use replique_core::domain::product::{Product, ProductId};

use super::{ProductRepository, RepositoryError};
use crate::DbPool;

const PRODUCT_COLUMNS: &str = "id,
    name,
    description,
    category,
    base_price,
    base_width,
    base_height,
    base_depth,
    image_url,
    materials_json,
    colors_json";

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ProductRepository for SqlProductRepository {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE id = ?"))
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.map(product_from_row).transpose()
    }

    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product ORDER BY position ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(product_from_row).collect()
    }

    /// Upsert. New products are appended after the current last position; updates keep
    /// their place in the catalog.
    async fn save(&self, product: Product) -> Result<(), RepositoryError> {
        product.validate().map_err(|error| RepositoryError::Decode(error.to_string()))?;

        let materials_json = serde_json::to_string(&product.available_materials)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;
        let colors_json = serde_json::to_string(&product.available_colors)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;
        let now = Utc::now().to_rfc3339();
        let base_price = i64::try_from(product.base_price).map_err(|_| {
            RepositoryError::Decode(format!(
                "base_price `{}` does not fit in a sqlite integer",
                product.base_price
            ))
        })?;

        sqlx::query(
            "INSERT INTO product (
                id,
                position,
                name,
                description,
                category,
                base_price,
                base_width,
                base_height,
                base_depth,
                image_url,
                materials_json,
                colors_json,
                created_at,
                updated_at
             ) VALUES (
                ?,
                (SELECT COALESCE(MAX(position), 0) + 1 FROM product),
                ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
             )
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                category = excluded.category,
                base_price = excluded.base_price,
                base_width = excluded.base_width,
                base_height = excluded.base_height,
                base_depth = excluded.base_depth,
                image_url = excluded.image_url,
                materials_json = excluded.materials_json,
                colors_json = excluded.colors_json,
                updated_at = excluded.updated_at",
        )
        .bind(&product.id.0)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.category.as_str())
        .bind(base_price)
        .bind(product.base_dimensions.width.to_string())
        .bind(product.base_dimensions.height.to_string())
        .bind(product.base_dimensions.depth.to_string())
        .bind(&product.image_url)
        .bind(materials_json)
        .bind(colors_json)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn product_from_row(row: SqliteRow) -> Result<Product, RepositoryError> {
    let id: String = row.try_get("id")?;

    let category_raw = row.try_get::<String, _>("category")?;
    let category = Category::parse(&category_raw).ok_or_else(|| {
        RepositoryError::Decode(format!("unknown category `{category_raw}` for product `{id}`"))
    })?;

    let base_price_raw: i64 = row.try_get("base_price")?;
    let base_price = u64::try_from(base_price_raw).map_err(|_| {
        RepositoryError::Decode(format!(
            "invalid value for `base_price` (expected non-negative integer): {base_price_raw}"
        ))
    })?;

    let base_dimensions = Dimensions::new(
        parse_decimal("base_width", row.try_get("base_width")?)?,
        parse_decimal("base_height", row.try_get("base_height")?)?,
        parse_decimal("base_depth", row.try_get("base_depth")?)?,
    );

    let available_materials: Vec<Material> =
        parse_json_list("materials_json", row.try_get("materials_json")?)?;
    let available_colors: Vec<FinishColor> =
        parse_json_list("colors_json", row.try_get("colors_json")?)?;

    Ok(Product {
        id: ProductId(id),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        category,
        base_price,
        base_dimensions,
        image_url: row.try_get("image_url")?,
        available_materials,
        available_colors,
    })
}

fn parse_decimal(column: &str, value: String) -> Result<Decimal, RepositoryError> {
    Decimal::from_str(value.trim()).map_err(|error| {
        RepositoryError::Decode(format!("invalid decimal in `{column}`: `{value}` ({error})"))
    })
}

fn parse_json_list<T>(column: &str, value: String) -> Result<Vec<T>, RepositoryError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(&value).map_err(|error| {
        RepositoryError::Decode(format!("invalid option list in `{column}`: `{value}` ({error})"))
    })
}

#[cfg(test)]
mod tests {
    use replique_core::domain::dimensions::Dimensions;
    use replique_core::domain::options::{Category, FinishColor, Material};
    use replique_core::domain::product::{Product, ProductId};

    use super::SqlProductRepository;
    use crate::fixtures::CatalogSeedDataset;
    use crate::migrations;
    use crate::repositories::{load_catalog, ProductRepository, RepositoryError};
    use crate::{connect_with_settings, DbPool};

    async fn setup_pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    fn desk() -> Product {
        Product {
            id: ProductId::new("p4"),
            name: "Tech Desk Alpha".to_string(),
            description: "Simple, sturdy desk optimized for small home offices.".to_string(),
            category: Category::Office,
            base_price: 42_000,
            base_dimensions: Dimensions::whole_cm(120, 75, 60),
            image_url: "https://picsum.photos/id/1072/600/400".to_string(),
            available_materials: vec![Material::Mdf, Material::BirchPlywood],
            available_colors: vec![
                FinishColor::MatteWhite,
                FinishColor::SlateGrey,
                FinishColor::MatteBlack,
            ],
        }
    }

    fn shelf() -> Product {
        Product {
            id: ProductId::new("p6"),
            name: "Hexagon Wall Shelf".to_string(),
            description: "Set of 3 hexagonal floating shelves for decorative display.".to_string(),
            category: Category::Decor,
            base_price: 12_000,
            base_dimensions: Dimensions::whole_cm(30, 26, 10),
            image_url: "https://picsum.photos/id/1068/600/400".to_string(),
            available_materials: vec![Material::SolidPine, Material::BirchPlywood],
            available_colors: vec![FinishColor::Natural, FinishColor::WalnutStain],
        }
    }

    #[tokio::test]
    async fn sql_product_repo_round_trip_preserves_option_order() {
        let repo = SqlProductRepository::new(setup_pool().await);
        let product = desk();

        repo.save(product.clone()).await.expect("save product");
        let found = repo.find_by_id(&product.id).await.expect("find product");

        assert_eq!(found, Some(product));
        assert_eq!(repo.find_by_id(&ProductId::new("p404")).await.expect("lookup"), None);
    }

    #[tokio::test]
    async fn list_keeps_insertion_order_across_updates() {
        let repo = SqlProductRepository::new(setup_pool().await);
        repo.save(shelf()).await.expect("save shelf");
        repo.save(desk()).await.expect("save desk");

        let mut repriced = shelf();
        repriced.base_price = 13_500;
        repo.save(repriced).await.expect("update shelf");

        let listed = repo.list().await.expect("list");
        let ids: Vec<&str> = listed.iter().map(|product| product.id.as_str()).collect();
        assert_eq!(ids, vec!["p6", "p4"]);
        assert_eq!(listed[0].base_price, 13_500);

        let catalog = load_catalog(&repo).await.expect("catalog");
        assert_eq!(catalog.len(), 2);
    }

    #[tokio::test]
    async fn invalid_products_are_not_persisted() {
        let repo = SqlProductRepository::new(setup_pool().await);
        let mut broken = desk();
        broken.available_colors.clear();

        let error = repo.save(broken).await.expect_err("empty color set is rejected");
        assert!(matches!(error, RepositoryError::Decode(_)));
        assert!(repo.list().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn undecodable_rows_surface_as_decode_errors() {
        let pool = setup_pool().await;
        sqlx::query(
            "INSERT INTO product (id, position, name, description, category, base_price,
                base_width, base_height, base_depth, image_url, materials_json, colors_json,
                created_at, updated_at)
             VALUES ('p9', 1, 'Broken', '', 'garden', 1000, '10', '10', '10', '',
                '[\"mdf\"]', '[\"natural\"]', '2026-01-01T00:00:00+00:00',
                '2026-01-01T00:00:00+00:00')",
        )
        .execute(&pool)
        .await
        .expect("insert raw row");

        let repo = SqlProductRepository::new(pool);
        let error = repo.find_by_id(&ProductId::new("p9")).await.expect_err("bad category");
        assert!(matches!(
            error,
            RepositoryError::Decode(ref message) if message.contains("garden")
        ));
    }

    #[tokio::test]
    async fn load_catalog_skips_invalid_rows_and_keeps_the_rest() {
        let pool = setup_pool().await;
        CatalogSeedDataset::load(&pool).await.expect("seed default catalog");
        sqlx::query(
            "INSERT INTO product (id, position, name, description, category, base_price,
                base_width, base_height, base_depth, image_url, materials_json, colors_json,
                created_at, updated_at)
             VALUES ('flat', 99, 'Flat Shelf', '', 'decor', 9000, '0', '20', '20', '',
                '[\"mdf\"]', '[\"natural\"]', '2026-01-01T00:00:00+00:00',
                '2026-01-01T00:00:00+00:00')",
        )
        .execute(&pool)
        .await
        .expect("insert zero-width row");

        let catalog = load_catalog(&SqlProductRepository::new(pool)).await.expect("catalog");

        assert_eq!(catalog.len(), 6);
        assert!(catalog.find(&ProductId::new("flat")).is_none());
        assert!(catalog.find(&ProductId::new("p1")).is_some());
    }
}
