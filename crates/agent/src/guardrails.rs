#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreferenceField {
    Color,
    Material,
}

impl PreferenceField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Material => "material",
        }
    }
}

/// One piece of model output, checked before it reaches the shopper.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardrailIntent<'a> {
    RecommendProduct { product_id: &'a str, in_catalog: bool, already_recommended: usize },
    SeedPreference { field: PreferenceField, value: &'a str },
}

impl GuardrailIntent<'_> {
    pub fn action_key(&self) -> String {
        match self {
            Self::RecommendProduct { .. } => "recommendation.product".to_string(),
            Self::SeedPreference { field, .. } => {
                format!("recommendation.preference.{}", field.as_str())
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardrailDecision {
    Allow,
    Deny { reason_code: &'static str },
}

impl GuardrailDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardrailPolicy {
    pub max_recommendations: usize,
    pub max_preference_len: usize,
}

impl Default for GuardrailPolicy {
    fn default() -> Self {
        Self { max_recommendations: 6, max_preference_len: 40 }
    }
}

impl GuardrailPolicy {
    pub fn evaluate(&self, intent: &GuardrailIntent<'_>) -> GuardrailDecision {
        match intent {
            GuardrailIntent::RecommendProduct { in_catalog: false, .. } => {
                GuardrailDecision::Deny { reason_code: "unknown_product" }
            }
            GuardrailIntent::RecommendProduct { already_recommended, .. }
                if *already_recommended >= self.max_recommendations =>
            {
                GuardrailDecision::Deny { reason_code: "recommendation_limit" }
            }
            GuardrailIntent::RecommendProduct { .. } => GuardrailDecision::Allow,
            GuardrailIntent::SeedPreference { value, .. } if value.trim().is_empty() => {
                GuardrailDecision::Deny { reason_code: "blank_preference" }
            }
            GuardrailIntent::SeedPreference { value, .. }
                if value.trim().chars().count() > self.max_preference_len =>
            {
                GuardrailDecision::Deny { reason_code: "preference_too_long" }
            }
            GuardrailIntent::SeedPreference { .. } => GuardrailDecision::Allow,
        }
    }
}
