use std::collections::HashSet;

use replique_core::cart::CartConsolidator;
use replique_core::cpq::pricing::DeterministicPricingEngine;
use replique_core::domain::dimensions::Axis;
use replique_core::domain::product::ProductId;
use replique_core::flows::{ConfiguratorSession, SessionState};
use replique_db::{
    connect_with_settings, load_catalog, migrations, CatalogSeedDataset, SqlCartSnapshotStore,
    SqlProductRepository,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tempfile::TempDir;

type SeedContractTestResult<T = ()> = Result<T, String>;

macro_rules! require {
    ($cond:expr) => {
        if !$cond {
            return Err(format!("assertion failed: `{}`", stringify!($cond)));
        }
    };
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            return Err(format!($($arg)*));
        }
    };
}

macro_rules! require_eq {
    ($left:expr, $right:expr) => {
        if $left != $right {
            return Err(format!(
                "assertion failed: `left == right` (`{:?}` != `{:?}`)",
                $left,
                $right
            ));
        }
    };
    ($left:expr, $right:expr, $($arg:tt)*) => {
        if $left != $right {
            return Err(format!($($arg)*));
        }
    };
}

#[derive(Debug, Deserialize)]
struct SeedProductContract {
    id: String,
    name: String,
    category: String,
    base_price: u64,
    base_dimensions: [u32; 3],
    materials: Vec<String>,
    colors: Vec<String>,
    default_unit_price: u64,
}

#[derive(Debug, Deserialize)]
struct SeedContract {
    dataset_version: String,
    seed_dataset: String,
    currency: String,
    assembly_fee: u64,
    delivery_fee: u64,
    products: Vec<SeedProductContract>,
}

fn contract() -> SeedContractTestResult<SeedContract> {
    serde_json::from_str(include_str!("../../../config/fixtures/catalog_seed_contract.json"))
        .map_err(|error| format!("seed contract JSON must parse: {error}"))
}

async fn file_pool(dir: &TempDir) -> SeedContractTestResult<replique_db::DbPool> {
    let url = format!("sqlite://{}", dir.path().join("replique.db").display());
    let pool = connect_with_settings(&url, 2, 5).await.map_err(|error| error.to_string())?;
    migrations::run_pending(&pool).await.map_err(|error| error.to_string())?;
    Ok(pool)
}

#[test]
fn seed_contract_matches_catalog_seed_sql_fixture() -> SeedContractTestResult {
    let fixture_sql = CatalogSeedDataset::SQL;
    let contract = contract()?;
    let mut ids_seen = HashSet::new();

    require_eq!(contract.dataset_version, "catalog-v1");
    require_eq!(contract.seed_dataset, "default_storefront_catalog");
    require_eq!(contract.currency, "NGN");
    require_eq!(contract.products.len(), 6);
    require!(fixture_sql.contains("ON CONFLICT(id) DO NOTHING"), "seed must be idempotent");

    for product in &contract.products {
        require!(ids_seen.insert(product.id.clone()), "duplicate product id: {}", product.id);
        require!(fixture_sql.contains(&format!("('{}',", product.id)), "missing {}", product.id);
        require!(fixture_sql.contains(&format!("'{}'", product.name)), "missing {}", product.name);
        require!(fixture_sql.contains(&format!("'{}'", product.category)));
        require!(fixture_sql.contains(&format!(", {},", product.base_price)));

        let materials = serde_json::to_string(&product.materials).map_err(|e| e.to_string())?;
        let colors = serde_json::to_string(&product.colors).map_err(|e| e.to_string())?;
        require!(fixture_sql.contains(&materials), "materials for {} drifted", product.id);
        require!(fixture_sql.contains(&colors), "colors for {} drifted", product.id);
    }

    let expected_ids: Vec<&str> = contract.products.iter().map(|p| p.id.as_str()).collect();
    require_eq!(CatalogSeedDataset::product_ids(), expected_ids);
    Ok(())
}

#[tokio::test]
async fn seeded_catalog_prices_defaults_as_published() -> SeedContractTestResult {
    let dir = TempDir::new().map_err(|error| error.to_string())?;
    let pool = file_pool(&dir).await?;
    CatalogSeedDataset::load(&pool).await.map_err(|error| error.to_string())?;

    let contract = contract()?;
    let catalog = load_catalog(&SqlProductRepository::new(pool))
        .await
        .map_err(|error| error.to_string())?;

    for expected in &contract.products {
        let product = catalog
            .find(&ProductId::new(expected.id.as_str()))
            .ok_or_else(|| format!("{} should be in the catalog", expected.id))?;
        let [width, height, depth] = expected.base_dimensions;
        require_eq!(product.name, expected.name);
        require_eq!(product.base_price, expected.base_price);
        require_eq!(product.base_dimensions.width, Decimal::from(width));
        require_eq!(product.base_dimensions.height, Decimal::from(height));
        require_eq!(product.base_dimensions.depth, Decimal::from(depth));

        let session = ConfiguratorSession::open(
            product.clone(),
            DeterministicPricingEngine::default(),
            None,
        )
        .map_err(|error| error.to_string())?;
        let quote = session.quote().map_err(|error| error.to_string())?;
        require_eq!(
            quote.unit_price,
            expected.default_unit_price,
            "default price of {}",
            expected.id
        );
    }

    Ok(())
}

#[tokio::test]
async fn configured_cart_persists_across_pools() -> SeedContractTestResult {
    let dir = TempDir::new().map_err(|error| error.to_string())?;
    let contract = contract()?;

    {
        let pool = file_pool(&dir).await?;
        CatalogSeedDataset::load(&pool).await.map_err(|error| error.to_string())?;
        let catalog = load_catalog(&SqlProductRepository::new(pool.clone()))
            .await
            .map_err(|error| error.to_string())?;

        let mut cart = CartConsolidator::load(SqlCartSnapshotStore::new(pool.clone()))
            .await
            .map_err(|error| error.to_string())?;

        let mut session = ConfiguratorSession::open_from_catalog(
            &catalog,
            &ProductId::new("p1"),
            DeterministicPricingEngine::default(),
            None,
        )
        .map_err(|error| error.to_string())?;
        session.set_dimension(Axis::Width, Decimal::from(180)).map_err(|e| e.to_string())?;
        session.set_quantity(2).map_err(|e| e.to_string())?;
        session.add_to_cart(&mut cart).await.map_err(|error| error.to_string())?;
        require_eq!(session.state(), SessionState::Committed);

        pool.close().await;
    }

    let pool = file_pool(&dir).await?;
    let cart = CartConsolidator::load(SqlCartSnapshotStore::new(pool))
        .await
        .map_err(|error| error.to_string())?;

    require_eq!(cart.cart().len(), 1);
    let line = &cart.cart().lines[0];
    require_eq!(line.unit_price, 50_400);
    require_eq!(line.quantity, 2);
    require_eq!(cart.totals(contract.delivery_fee).total, 105_800);
    require!(contract.assembly_fee == 15_000);
    Ok(())
}
