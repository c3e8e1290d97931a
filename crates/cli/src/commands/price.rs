use clap::Args;
use replique_core::config::AppConfig;
use replique_core::cpq::preferences::resolve_option;
use replique_core::{
    ApplicationError, Axis, Catalog, ConfiguratorSession, DeterministicPricingEngine,
    DomainError, PreferenceHint, ProductId,
};
use rust_decimal::Decimal;
use serde_json::json;

use crate::commands::{
    execute, open_database, read_catalog, CommandFailure, CommandOutput, CommandResult,
};

/// Selection flags shared by `price` and `cart add`.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigureArgs {
    #[arg(long, help = "Catalog product id, e.g. p1")]
    pub product: String,
    #[arg(long, help = "Material name or fragment, e.g. plywood")]
    pub material: Option<String>,
    #[arg(long, help = "Finish color name or fragment, e.g. walnut")]
    pub color: Option<String>,
    #[arg(long, help = "Width in cm; clamped to the allowed range")]
    pub width: Option<Decimal>,
    #[arg(long, help = "Height in cm; clamped to the allowed range")]
    pub height: Option<Decimal>,
    #[arg(long, help = "Depth in cm; clamped to the allowed range")]
    pub depth: Option<Decimal>,
    #[arg(long, help = "Request professional assembly")]
    pub assembly: bool,
    #[arg(long, default_value_t = 1)]
    pub quantity: u32,
}

impl ConfigureArgs {
    fn requested_dimensions(&self) -> [(Axis, Option<Decimal>); 3] {
        [(Axis::Width, self.width), (Axis::Height, self.height), (Axis::Depth, self.depth)]
    }
}

pub fn run(args: ConfigureArgs) -> CommandResult {
    execute("price", |config| price(config, args))
}

async fn price(config: AppConfig, args: ConfigureArgs) -> Result<CommandOutput, CommandFailure> {
    let pool = open_database(&config).await?;
    let catalog = read_catalog(&pool).await;
    pool.close().await;

    let pricing = DeterministicPricingEngine::new(config.pricing.fee_schedule());
    let configured = configure(&catalog?, &args, pricing)?;
    price_output(&configured)
}

/// A seeded session with every flag applied, plus the axes the validator had to adjust.
pub struct ConfiguredSession {
    pub session: ConfiguratorSession,
    pub adjusted_axes: Vec<Axis>,
}

/// Opens a session seeded from the material/color flags, then applies the remaining flags as
/// edits. Flags that name no offered option are rejected rather than silently defaulted.
pub fn configure(
    catalog: &Catalog,
    args: &ConfigureArgs,
    pricing: DeterministicPricingEngine,
) -> Result<ConfiguredSession, ApplicationError> {
    let hint = PreferenceHint { color: args.color.clone(), material: args.material.clone() };
    let mut session = ConfiguratorSession::open_from_catalog(
        catalog,
        &ProductId::new(args.product.trim()),
        pricing,
        Some(&hint),
    )?;

    let product = session.product();
    if let Some(material) = args.material.as_deref() {
        if resolve_option(material, &product.available_materials).is_none() {
            return Err(unknown_option("material", material));
        }
    }
    if let Some(color) = args.color.as_deref() {
        if resolve_option(color, &product.available_colors).is_none() {
            return Err(unknown_option("finish color", color));
        }
    }

    let mut adjusted_axes = Vec::new();
    for (axis, requested) in args.requested_dimensions() {
        if let Some(requested) = requested {
            let applied = session.set_dimension(axis, requested)?;
            if applied != requested {
                adjusted_axes.push(axis);
            }
        }
    }
    session.set_assembly(args.assembly)?;
    session.set_quantity(args.quantity)?;

    Ok(ConfiguredSession { session, adjusted_axes })
}

fn unknown_option(kind: &str, value: &str) -> ApplicationError {
    DomainError::UnknownOption { kind: kind.to_string(), value: value.to_string() }.into()
}

fn price_output(configured: &ConfiguredSession) -> Result<CommandOutput, CommandFailure> {
    let session = &configured.session;
    let quote = session.quote().map_err(ApplicationError::from)?;
    let product = session.product();

    let message = format!(
        "{} x{} at {} each, total {}",
        product.name, quote.quantity, quote.unit_price, quote.total_price
    );
    let data = json!({
        "product": { "id": product.id, "name": product.name },
        "configuration": session.configuration(),
        "adjusted_axes": configured.adjusted_axes,
        "quote": quote,
        "bounds": session.bounds(),
    });
    Ok((message, Some(data)))
}
