use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::Local;
use dotenvy::dotenv;

use crate::import::calculator::PayrunPolicy;
use crate::import::service::ImportSettings;
use crate::import::validate::DEFAULT_MIN_AGE;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub api_prefix: String,

    // Rate limiting
    pub rate_import_per_min: u32,
    pub rate_protected_per_min: u32,

    pub template_cache_ttl_secs: u64,
    pub min_employee_age: u32,
    pub payrun_policy: PayrunPolicy,
}

fn required(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("{name} must be set"))
}

fn parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let defaults = PayrunPolicy::default();
        let payrun_policy = PayrunPolicy {
            gst_rate: parse_or("GST_RATE", defaults.gst_rate)?,
            pf_rate: parse_or("PF_RATE", defaults.pf_rate)?,
            pf_wage_ceiling: parse_or("PF_WAGE_CEILING", defaults.pf_wage_ceiling)?,
            esi_rate: parse_or("ESI_RATE", defaults.esi_rate)?,
            esi_wage_ceiling: parse_or("ESI_WAGE_CEILING", defaults.esi_wage_ceiling)?,
            incentive_threshold_days: parse_or(
                "INCENTIVE_THRESHOLD_DAYS",
                defaults.incentive_threshold_days,
            )?,
            incentive_amount: parse_or("INCENTIVE_AMOUNT", defaults.incentive_amount)?,
            standard_hours_per_day: parse_or(
                "STANDARD_HOURS_PER_DAY",
                defaults.standard_hours_per_day,
            )?,
        };

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            rate_import_per_min: parse_or("RATE_IMPORT_PER_MIN", 30)?,
            rate_protected_per_min: parse_or("RATE_PROTECTED_PER_MIN", 1000)?,

            template_cache_ttl_secs: parse_or("TEMPLATE_CACHE_TTL_SECS", 3600)?,
            min_employee_age: parse_or("MIN_EMPLOYEE_AGE", DEFAULT_MIN_AGE)?,
            payrun_policy,
        })
    }

    /// Import settings for a request handled now.
    pub fn import_settings(&self) -> ImportSettings {
        ImportSettings {
            today: Local::now().date_naive(),
            min_age: self.min_employee_age,
            policy: self.payrun_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_uses_default_when_unset() {
        let value: u32 = parse_or("PAYRUN_TEST_SURELY_UNSET_VAR", 30).unwrap();
        assert_eq!(value, 30);
    }

    #[test]
    fn test_import_settings_carry_policy() {
        let config = Config {
            database_url: "mysql://localhost/payrun".into(),
            server_addr: "127.0.0.1:8080".into(),
            api_prefix: "/api".into(),
            rate_import_per_min: 30,
            rate_protected_per_min: 1000,
            template_cache_ttl_secs: 3600,
            min_employee_age: 21,
            payrun_policy: PayrunPolicy {
                gst_rate: 0.12,
                ..PayrunPolicy::default()
            },
        };
        let settings = config.import_settings();
        assert_eq!(settings.min_age, 21);
        assert_eq!(settings.policy.gst_rate, 0.12);
    }
}
