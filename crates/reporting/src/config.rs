//! Report configuration, read from the environment.

use finreport_core::CurrencyCode;

pub const DEFAULT_CURRENCY_ENV: &str = "FINREPORT_DEFAULT_CURRENCY";
pub const PAGE_SIZE_ENV: &str = "FINREPORT_PAGE_SIZE";
pub const MAX_PAGE_SIZE_ENV: &str = "FINREPORT_MAX_PAGE_SIZE";
pub const AGING_BY_CURRENCY_ENV: &str = "FINREPORT_AGING_BY_CURRENCY";

/// Tunables for the report handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportingConfig {
    /// Currency stamped on MRR rows when the query names none.
    pub default_currency: CurrencyCode,
    /// Page size used when the query names none.
    pub default_page_size: u32,
    /// Requested page sizes above this are clamped.
    pub max_page_size: u32,
    /// Key aging rows by (customer, currency) instead of customer alone.
    pub aging_by_currency: bool,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            default_currency: CurrencyCode::usd(),
            default_page_size: 25,
            max_page_size: 200,
            aging_by_currency: true,
        }
    }
}

impl ReportingConfig {
    /// Load from process environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` for each variable; unparsable values are logged and
    /// replaced by the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let default_currency = match lookup(DEFAULT_CURRENCY_ENV) {
            Some(raw) => CurrencyCode::new(&raw).unwrap_or_else(|e| {
                tracing::warn!("{DEFAULT_CURRENCY_ENV}={raw:?} is invalid ({e}); using {}", defaults.default_currency);
                defaults.default_currency.clone()
            }),
            None => defaults.default_currency.clone(),
        };

        let max_page_size = parse_or(&lookup, MAX_PAGE_SIZE_ENV, defaults.max_page_size, |v: &u32| *v > 0);
        let mut default_page_size =
            parse_or(&lookup, PAGE_SIZE_ENV, defaults.default_page_size, |v: &u32| *v > 0);
        if default_page_size > max_page_size {
            tracing::warn!(
                "{PAGE_SIZE_ENV}={default_page_size} exceeds {MAX_PAGE_SIZE_ENV}={max_page_size}; clamping"
            );
            default_page_size = max_page_size;
        }

        let aging_by_currency =
            parse_or(&lookup, AGING_BY_CURRENCY_ENV, defaults.aging_by_currency, |_| true);

        Self {
            default_currency,
            default_page_size,
            max_page_size,
            aging_by_currency,
        }
    }
}

fn parse_or<F, T, P>(lookup: &F, key: &str, default: T, accept: P) -> T
where
    F: Fn(&str) -> Option<String>,
    T: core::str::FromStr + core::fmt::Debug,
    P: Fn(&T) -> bool,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(v) if accept(&v) => v,
        _ => {
            tracing::warn!("{key}={raw:?} is invalid; using {default:?}");
            default
        }
    }
}
