//! Explicit, side-effect-free checker registry construction.

use std::collections::HashMap;
use std::sync::Arc;

use defarm_input_models::InputType;

use crate::Checker;
use crate::checkers;

/// Per-checker overrides applied at registry construction time, keyed by
/// checker name (`CHECKER_<NAME>_ENABLED` / `CHECKER_<NAME>_TIMEOUT_MS`).
#[derive(Debug, Clone, Default)]
pub struct RegistryConfig {
    /// Checker name -> enabled override.
    pub enabled_overrides: HashMap<String, bool>,
    /// Checker name -> timeout override, in milliseconds.
    pub timeout_overrides: HashMap<String, u64>,
}

impl RegistryConfig {
    /// Reads overrides from `CHECKER_<NAME>_ENABLED` / `CHECKER_<NAME>_TIMEOUT_MS`
    /// environment variables for each name in `known_names`.
    #[must_use]
    pub fn from_env(known_names: &[&str]) -> Self {
        let mut enabled_overrides = HashMap::new();
        let mut timeout_overrides = HashMap::new();

        for name in known_names {
            let env_name = name.to_uppercase();
            if let Ok(raw) = std::env::var(format!("CHECKER_{env_name}_ENABLED")) {
                if let Ok(value) = raw.parse::<bool>() {
                    enabled_overrides.insert((*name).to_string(), value);
                }
            }
            if let Ok(raw) = std::env::var(format!("CHECKER_{env_name}_TIMEOUT_MS")) {
                if let Ok(value) = raw.parse::<u64>() {
                    timeout_overrides.insert((*name).to_string(), value);
                }
            }
        }

        Self {
            enabled_overrides,
            timeout_overrides,
        }
    }
}

/// An immutable collection of checkers, queryable by name, category, and
/// applicable input type.
pub struct CheckerRegistry {
    checkers: Vec<Arc<dyn Checker>>,
}

impl CheckerRegistry {
    /// Looks up a checker by its descriptor name.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn Checker>> {
        self.checkers
            .iter()
            .find(|c| c.descriptor().name == name)
            .cloned()
    }

    /// Returns every checker in the given category.
    #[must_use]
    pub fn get_by_category(
        &self,
        category: defarm_checker_models::Category,
    ) -> Vec<Arc<dyn Checker>> {
        self.checkers
            .iter()
            .filter(|c| c.descriptor().category == category)
            .cloned()
            .collect()
    }

    /// Returns every enabled checker applicable to `input_type`, ordered by
    /// descending priority and then ascending name for determinism.
    #[must_use]
    pub fn get_applicable(&self, input_type: InputType) -> Vec<Arc<dyn Checker>> {
        let mut applicable: Vec<_> = self
            .checkers
            .iter()
            .filter(|c| c.descriptor().enabled && c.applies_to(input_type))
            .cloned()
            .collect();

        applicable.sort_by(|a, b| {
            b.descriptor()
                .priority
                .cmp(&a.descriptor().priority)
                .then_with(|| a.descriptor().name.cmp(b.descriptor().name))
        });

        applicable
    }

    /// Returns every registered checker, regardless of enabled state.
    #[must_use]
    pub fn all(&self) -> &[Arc<dyn Checker>] {
        &self.checkers
    }
}

/// Builds the checker registry. Called once from `main`; applies
/// `config`'s overrides to each checker's compiled descriptor enabled/timeout
/// fields by wrapping it in an [`OverriddenChecker`].
#[must_use]
pub fn build_registry(config: &RegistryConfig) -> CheckerRegistry {
    let base: Vec<Arc<dyn Checker>> = vec![
        Arc::new(checkers::labor_blacklist::LaborBlacklistChecker),
        Arc::new(checkers::environmental_embargoes::EnvironmentalEmbargoesChecker),
        Arc::new(checkers::sanctions::SanctionsChecker),
        Arc::new(checkers::indigenous_land::IndigenousLandChecker),
        Arc::new(checkers::conservation_unit::ConservationUnitChecker),
        Arc::new(checkers::annual_deforestation::AnnualDeforestationChecker),
        Arc::new(checkers::deforestation_alert::DeforestationAlertChecker),
        Arc::new(checkers::validated_deforestation::ValidatedDeforestationChecker),
        Arc::new(checkers::fire_hotspot::FireHotspotChecker),
        Arc::new(checkers::water_permit::WaterPermitChecker),
        Arc::new(checkers::rural_property::RuralPropertyChecker),
        Arc::new(checkers::car_deforestation::CarDeforestationChecker),
        Arc::new(checkers::embargo_proximity::EmbargoProximityChecker),
    ];

    let checkers = base
        .into_iter()
        .map(|checker| -> Arc<dyn Checker> {
            let name = checker.descriptor().name;
            if config.enabled_overrides.contains_key(name) || config.timeout_overrides.contains_key(name) {
                Arc::new(OverriddenChecker {
                    inner: checker,
                    enabled_override: config.enabled_overrides.get(name).copied(),
                    timeout_override: config.timeout_overrides.get(name).copied(),
                    descriptor_cell: std::sync::OnceLock::new(),
                })
            } else {
                checker
            }
        })
        .collect();

    CheckerRegistry { checkers }
}

/// Wraps a checker to override its `enabled`/`timeoutMs` descriptor fields
/// without modifying its compiled `const fn descriptor()`.
struct OverriddenChecker {
    inner: Arc<dyn Checker>,
    enabled_override: Option<bool>,
    timeout_override: Option<u64>,
    descriptor_cell: std::sync::OnceLock<&'static defarm_checker_models::CheckerDescriptor>,
}

#[async_trait::async_trait]
impl Checker for OverriddenChecker {
    fn descriptor(&self) -> &'static defarm_checker_models::CheckerDescriptor {
        *self.descriptor_cell.get_or_init(|| {
            let mut descriptor = self.inner.descriptor().clone();
            if let Some(enabled) = self.enabled_override {
                descriptor.enabled = enabled;
            }
            if let Some(timeout_ms) = self.timeout_override {
                descriptor.timeout_ms = timeout_ms;
            }
            // `descriptor()` must return `&'static`; leaked exactly once per
            // `OverriddenChecker`, via `OnceLock`.
            Box::leak(Box::new(descriptor))
        })
    }

    async fn execute(
        &self,
        input: &defarm_input_models::NormalizedInput,
        ctx: &crate::CheckContext,
    ) -> defarm_checker_models::CheckerResult {
        self.inner.execute(input, ctx).await
    }
}
