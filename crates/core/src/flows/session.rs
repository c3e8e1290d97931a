use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::cart::{AddOutcome, CartConsolidator, CartSnapshotStore};
use crate::cpq::catalog::Catalog;
use crate::cpq::constraints::{
    self, AxisBounds, DimensionConstraintValidator, DimensionValidator,
};
use crate::cpq::preferences::{PreferenceHint, PreferenceResolver};
use crate::cpq::pricing::{
    compute_total_price, DeterministicPricingEngine, PricingEngine, PricingInput, PricingResult,
};
use crate::domain::cart::{CartLineId, CartLineItem};
use crate::domain::configuration::Configuration;
use crate::domain::dimensions::Axis;
use crate::domain::options::{FinishColor, Material};
use crate::domain::product::{Product, ProductId};
use crate::errors::ApplicationError;
use crate::flows::states::{transition, SessionError, SessionEvent, SessionState};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// Price shown for the current configuration. Derived, never stored in the cart directly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub unit_price: u64,
    pub total_price: u64,
    pub quantity: u32,
    pub customized: bool,
    pub breakdown: PricingResult,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitReceipt {
    pub session_id: SessionId,
    pub line: CartLineItem,
    pub outcome: AddOutcome,
}

/// Derives the display price from product and configuration. No side effects.
pub fn recompute<P: PricingEngine>(
    pricing: &P,
    product: &Product,
    configuration: &Configuration,
) -> PriceQuote {
    let breakdown = pricing.price(&PricingInput {
        product,
        material: configuration.material,
        dimensions: configuration.dimensions,
        assembly_requested: configuration.assembly_requested,
    });

    PriceQuote {
        unit_price: breakdown.unit_price,
        total_price: compute_total_price(breakdown.unit_price, configuration.quantity),
        quantity: configuration.quantity,
        customized: configuration.is_customized(product),
        breakdown,
    }
}

/// In-progress configuration for one product view.
pub struct ConfiguratorSession<P = DeterministicPricingEngine> {
    id: SessionId,
    product: Product,
    state: SessionState,
    configuration: Option<Configuration>,
    quote: Option<PriceQuote>,
    pricing: P,
    resolver: PreferenceResolver,
    validator: DimensionConstraintValidator,
}

impl<P> ConfiguratorSession<P>
where
    P: PricingEngine,
{
    pub fn new(product: Product, pricing: P) -> Self {
        Self {
            id: SessionId(Uuid::new_v4().to_string()),
            product,
            state: SessionState::Seeding,
            configuration: None,
            quote: None,
            pricing,
            resolver: PreferenceResolver,
            validator: DimensionConstraintValidator,
        }
    }

    /// Creates and seeds in one step.
    pub fn open(
        product: Product,
        pricing: P,
        hint: Option<&PreferenceHint>,
    ) -> Result<Self, SessionError> {
        let mut session = Self::new(product, pricing);
        session.seed(hint)?;
        Ok(session)
    }

    pub fn open_from_catalog(
        catalog: &Catalog,
        product_id: &ProductId,
        pricing: P,
        hint: Option<&PreferenceHint>,
    ) -> Result<Self, SessionError> {
        let product = catalog
            .find(product_id)
            .cloned()
            .ok_or_else(|| SessionError::ProductNotFound { product_id: product_id.0.clone() })?;
        Self::open(product, pricing, hint)
    }

    /// Defaults first, then any resolvable hint on top. Unresolvable hints fall back silently.
    pub fn seed(&mut self, hint: Option<&PreferenceHint>) -> Result<&PriceQuote, SessionError> {
        let next = transition(self.state, SessionEvent::Seeded)?;
        let mut configuration =
            Configuration::defaults_for(&self.product).ok_or(SessionError::NotReady)?;

        if let Some(hint) = hint {
            if let Some(color_hint) = hint.color.as_deref() {
                match self.resolver.resolve_color(color_hint, &self.product.available_colors) {
                    Some(color) => configuration.color = color,
                    None => debug!(
                        event_name = "configurator.hint.unresolved",
                        session_id = %self.id.0,
                        field = "color",
                        hint = color_hint,
                        "color hint did not match an offered finish"
                    ),
                }
            }
            if let Some(material_hint) = hint.material.as_deref() {
                let offered = &self.product.available_materials;
                match self.resolver.resolve_material(material_hint, offered) {
                    Some(material) => configuration.material = material,
                    None => debug!(
                        event_name = "configurator.hint.unresolved",
                        session_id = %self.id.0,
                        field = "material",
                        hint = material_hint,
                        "material hint did not match an offered material"
                    ),
                }
            }
        }

        info!(
            event_name = "configurator.session.seeded",
            session_id = %self.id.0,
            product_id = %self.product.id.0,
            material = %configuration.material,
            color = %configuration.color,
            "configurator session seeded"
        );

        let quote = recompute(&self.pricing, &self.product, &configuration);
        self.configuration = Some(configuration);
        self.state = next;
        Ok(&*self.quote.insert(quote))
    }

    pub fn select_material(&mut self, material: Material) -> Result<&PriceQuote, SessionError> {
        if !self.product.offers_material(material) {
            self.ensure_editing()?;
            return Err(SessionError::UnavailableMaterial { material });
        }
        self.apply(SessionEvent::MaterialSelected, |configuration| {
            configuration.material = material;
        })
    }

    pub fn select_color(&mut self, color: FinishColor) -> Result<&PriceQuote, SessionError> {
        if !self.product.offers_color(color) {
            self.ensure_editing()?;
            return Err(SessionError::UnavailableColor { color });
        }
        self.apply(SessionEvent::ColorSelected, |configuration| {
            configuration.color = color;
        })
    }

    /// Clamps into the allowed range for that axis and returns the value actually applied.
    pub fn set_dimension(
        &mut self,
        axis: Axis,
        requested: Decimal,
    ) -> Result<Decimal, SessionError> {
        let applied = self.validator.clamp(requested, self.product.base_dimensions.get(axis));
        self.apply(SessionEvent::DimensionChanged, |configuration| {
            configuration.dimensions = configuration.dimensions.with_axis(axis, applied);
        })?;
        Ok(applied)
    }

    pub fn reset_dimensions(&mut self) -> Result<&PriceQuote, SessionError> {
        let base = constraints::reset_to_base(&self.product.base_dimensions);
        self.apply(SessionEvent::DimensionsReset, |configuration| {
            configuration.dimensions = base;
        })
    }

    pub fn set_assembly(&mut self, requested: bool) -> Result<&PriceQuote, SessionError> {
        self.apply(SessionEvent::AssemblyChanged, |configuration| {
            configuration.assembly_requested = requested;
        })
    }

    pub fn toggle_assembly(&mut self) -> Result<&PriceQuote, SessionError> {
        self.apply(SessionEvent::AssemblyChanged, |configuration| {
            configuration.assembly_requested = !configuration.assembly_requested;
        })
    }

    /// Any value is accepted while editing; zero is refused at commit.
    pub fn set_quantity(&mut self, quantity: u32) -> Result<&PriceQuote, SessionError> {
        self.apply(SessionEvent::QuantityChanged, |configuration| {
            configuration.quantity = quantity;
        })
    }

    /// Builds the line item, hands it to the consolidator and ends the session. Validation or
    /// persistence failures leave the session in `Editing` and the cart untouched.
    pub async fn add_to_cart<S>(
        &mut self,
        cart: &mut CartConsolidator<S>,
    ) -> Result<CommitReceipt, ApplicationError>
    where
        S: CartSnapshotStore,
    {
        let next = transition(self.state, SessionEvent::AddToCartRequested)?;
        let configuration = self.configuration.clone().ok_or(SessionError::NotReady)?;
        if configuration.quantity == 0 {
            return Err(SessionError::InvalidQuantity { quantity: configuration.quantity }.into());
        }

        let quote = recompute(&self.pricing, &self.product, &configuration);
        let line = CartLineItem {
            line_id: CartLineId::generate(),
            product_id: self.product.id.clone(),
            product_name: self.product.name.clone(),
            quantity: configuration.quantity,
            material: configuration.material,
            color: configuration.color,
            dimensions: configuration.dimensions,
            assembly_requested: configuration.assembly_requested,
            unit_price: quote.unit_price,
            image_url: self.product.image_url.clone(),
        };

        let outcome = cart.add_line_item(line.clone()).await?;
        self.state = next;
        info!(
            event_name = "configurator.session.committed",
            session_id = %self.id.0,
            product_id = %self.product.id.0,
            unit_price = quote.unit_price,
            quantity = configuration.quantity,
            "configuration committed to cart"
        );

        Ok(CommitReceipt { session_id: self.id.clone(), line, outcome })
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn configuration(&self) -> Option<&Configuration> {
        self.configuration.as_ref()
    }

    /// `NotReady` until seeding completes.
    pub fn quote(&self) -> Result<&PriceQuote, SessionError> {
        self.quote.as_ref().ok_or(SessionError::NotReady)
    }

    pub fn bounds(&self) -> [AxisBounds; 3] {
        constraints::axis_bounds(&self.product.base_dimensions)
    }

    fn ensure_editing(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Editing => Ok(()),
            SessionState::Seeding => Err(SessionError::NotReady),
            SessionState::Committed => Err(SessionError::AlreadyCommitted),
        }
    }

    fn apply(
        &mut self,
        event: SessionEvent,
        edit: impl FnOnce(&mut Configuration),
    ) -> Result<&PriceQuote, SessionError> {
        let next = transition(self.state, event)?;
        let configuration = self.configuration.as_mut().ok_or(SessionError::NotReady)?;
        edit(configuration);
        let quote = recompute(&self.pricing, &self.product, configuration);
        self.state = next;
        Ok(&*self.quote.insert(quote))
    }
}
