//! Template selection shared by every signing provider.

use serde::Deserialize;

use super::models::PaymentScheme;

/// Provider template ids, one per document variant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplateTable {
    pub standard: String,
    pub flat_with_guarantee: String,
    pub flat_without_guarantee: String,
    pub conversion: String,
    pub base_salary: String,
}

impl TemplateTable {
    /// Load `{PREFIX}_TEMPLATE_STANDARD`, `{PREFIX}_TEMPLATE_FLAT_WITH_GUARANTEE`, ...
    pub fn from_env(prefix: &str) -> anyhow::Result<Self> {
        use anyhow::Context;

        let var = |suffix: &str| {
            let key = format!("{}_TEMPLATE_{}", prefix, suffix);
            std::env::var(&key).with_context(|| format!("{} must be set", key))
        };

        Ok(Self {
            standard: var("STANDARD")?,
            flat_with_guarantee: var("FLAT_WITH_GUARANTEE")?,
            flat_without_guarantee: var("FLAT_WITHOUT_GUARANTEE")?,
            conversion: var("CONVERSION")?,
            base_salary: var("BASE_SALARY")?,
        })
    }
}

/// Pick the template for a payment scheme.
///
/// Flat fees have two documents depending on whether a guarantee period
/// applies. Unknown schemes fall back to the standard document.
pub fn resolve_template(
    scheme: PaymentScheme,
    guarantee_days: Option<u32>,
    table: &TemplateTable,
) -> &str {
    match scheme {
        PaymentScheme::Flat => match guarantee_days {
            Some(days) if days > 0 => &table.flat_with_guarantee,
            _ => &table.flat_without_guarantee,
        },
        PaymentScheme::Standard => &table.standard,
        PaymentScheme::Conversion => &table.conversion,
        PaymentScheme::BaseSalary => &table.base_salary,
        PaymentScheme::Unknown => &table.standard,
    }
}
