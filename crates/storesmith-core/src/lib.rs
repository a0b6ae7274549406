pub mod config;
pub mod product;

pub use config::{load_config, load_config_from_env, ConfigError, ScrapeConfig};
pub use product::{Platform, ProductRecord, ProductVariant, Specification, VariantOption};
