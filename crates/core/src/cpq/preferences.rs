use serde::{Deserialize, Serialize};

use crate::domain::options::{FinishColor, Material, OptionLabel};

/// Loosely worded suggestion handed over by the recommender. Only ever used to seed defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceHint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
}

impl PreferenceHint {
    pub fn is_empty(&self) -> bool {
        blank(self.color.as_deref()) && blank(self.material.as_deref())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PreferenceResolver;

impl PreferenceResolver {
    pub fn resolve_color(&self, hint: &str, available: &[FinishColor]) -> Option<FinishColor> {
        resolve_option(hint, available)
    }

    pub fn resolve_material(&self, hint: &str, available: &[Material]) -> Option<Material> {
        resolve_option(hint, available)
    }
}

/// Case-insensitive substring match of the hint against each label, in declared order.
/// A blank hint is no hint at all.
pub fn resolve_option<T: OptionLabel>(hint: &str, available: &[T]) -> Option<T> {
    let needle = hint.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    available.iter().copied().find(|option| option.label().to_lowercase().contains(&needle))
}

fn blank(value: Option<&str>) -> bool {
    value.map(|value| value.trim().is_empty()).unwrap_or(true)
}
