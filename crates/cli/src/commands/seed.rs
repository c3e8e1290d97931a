use replique_core::config::AppConfig;
use replique_db::{CatalogSeedDataset, DbPool, ProductSeedInfo, SeedResult};
use serde_json::json;

use crate::commands::{execute, open_database, CommandFailure, CommandOutput, CommandResult};

pub fn run() -> CommandResult {
    execute("seed", seed)
}

async fn seed(config: AppConfig) -> Result<CommandOutput, CommandFailure> {
    let pool = open_database(&config).await?;
    let seeded = load_and_verify(&pool).await;
    pool.close().await;
    let seed_result = seeded?;

    let message = format!(
        "default catalog ready ({} new):\n{}",
        seed_result.inserted,
        product_lines(&seed_result.products_seeded)
    );
    let data = json!({
        "inserted": seed_result.inserted,
        "products": seed_result
            .products_seeded
            .iter()
            .map(|product| json!({ "id": product.id, "name": product.name }))
            .collect::<Vec<_>>(),
    });
    Ok((message, Some(data)))
}

async fn load_and_verify(pool: &DbPool) -> Result<SeedResult, CommandFailure> {
    let seed_result = CatalogSeedDataset::load(pool)
        .await
        .map_err(|error| CommandFailure::new("seed_execution", error.to_string(), 5))?;
    let verification = CatalogSeedDataset::verify(pool)
        .await
        .map_err(|error| CommandFailure::new("seed_verification", error.to_string(), 6))?;

    if !verification.all_present {
        let failed = verification
            .checks
            .iter()
            .filter_map(|(check, passed)| (!passed).then_some(*check))
            .collect::<Vec<_>>();
        return Err(CommandFailure::new("seed_verification", verification_message(&failed), 6));
    }
    Ok(seed_result)
}

fn product_lines(products: &[ProductSeedInfo]) -> String {
    products
        .iter()
        .map(|product| format!("  - {}: {}", product.id, product.name))
        .collect::<Vec<_>>()
        .join("\n")
}

fn verification_message(failed: &[&str]) -> String {
    if failed.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for products: {}", failed.join(", "))
    }
}
