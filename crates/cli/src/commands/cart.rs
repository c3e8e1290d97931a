use clap::Subcommand;
use replique_core::config::AppConfig;
use replique_core::{
    AddOutcome, CartConsolidator, CartLineId, DeterministicPricingEngine, ProductId,
};
use replique_db::{DbPool, SqlCartSnapshotStore};
use serde_json::json;

use crate::commands::price::{configure, ConfigureArgs};
use crate::commands::{
    execute, open_database, read_catalog, CommandFailure, CommandOutput, CommandResult,
};

#[derive(Debug, Clone, Subcommand)]
pub enum CartCommand {
    #[command(about = "Show cart lines and totals")]
    Show,
    #[command(about = "Configure a product and commit it to the cart")]
    Add(ConfigureArgs),
    #[command(about = "Remove every line for a product")]
    Remove {
        #[arg(help = "Catalog product id")]
        product: String,
    },
    #[command(about = "Remove exactly one line by its line id")]
    RemoveLine {
        #[arg(help = "Line id as printed by `cart show`")]
        line_id: String,
    },
    #[command(about = "Empty the cart")]
    Clear,
}

pub fn run(command: CartCommand) -> CommandResult {
    execute("cart", |config| cart(config, command))
}

async fn cart(config: AppConfig, command: CartCommand) -> Result<CommandOutput, CommandFailure> {
    let pool = open_database(&config).await?;
    let result = dispatch(&config, &pool, command).await;
    pool.close().await;
    result
}

async fn dispatch(
    config: &AppConfig,
    pool: &DbPool,
    command: CartCommand,
) -> Result<CommandOutput, CommandFailure> {
    let store = SqlCartSnapshotStore::with_slot(pool.clone(), config.cart.snapshot_slot.clone());
    let mut cart = CartConsolidator::load(store).await?;

    let message = match command {
        CartCommand::Show => format!("{} line(s) in cart", cart.cart().len()),
        CartCommand::Add(args) => {
            let catalog = read_catalog(pool).await?;
            let pricing = DeterministicPricingEngine::new(config.pricing.fee_schedule());
            let mut configured = configure(&catalog, &args, pricing)?;
            let receipt = configured.session.add_to_cart(&mut cart).await?;
            match receipt.outcome {
                AddOutcome::Appended { line_id } => {
                    format!("added {} as line {}", receipt.line.product_name, line_id.0)
                }
                AddOutcome::Merged { line_id, quantity } => format!(
                    "merged {} into line {}, quantity now {quantity}",
                    receipt.line.product_name, line_id.0
                ),
            }
        }
        CartCommand::Remove { product } => {
            let removed = cart.remove_line_item(&ProductId::new(product.trim())).await?;
            format!("removed {removed} line(s) for {}", product.trim())
        }
        CartCommand::RemoveLine { line_id } => {
            let line_id = CartLineId(line_id.trim().to_string());
            if !cart.remove_line(&line_id).await? {
                return Err(CommandFailure::new(
                    "line_not_found",
                    format!("no cart line with id `{}`", line_id.0),
                    8,
                ));
            }
            format!("removed line {}", line_id.0)
        }
        CartCommand::Clear => {
            cart.clear().await?;
            "cart cleared".to_string()
        }
    };

    let data = json!({
        "lines": cart.cart().lines,
        "totals": cart.totals(config.pricing.delivery_fee),
    });
    Ok((message, Some(data)))
}
