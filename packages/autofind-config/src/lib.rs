mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Brand, Catalog, Client, Config, Postgres, Search, Service, Storage};

use std::{collections::HashSet, fs, path::Path};

pub const MAX_YEAR_WINDOW: i32 = 50;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.bind.trim().is_empty() {
		return Err(Error::invalid("service.bind", "must be non-empty."));
	}
	if cfg.service.max_frame_bytes == 0 {
		return Err(Error::invalid("service.max_frame_bytes", "must be greater than zero."));
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::invalid("storage.postgres.dsn", "must be non-empty."));
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::invalid("storage.postgres.pool_max_conns", "must be greater than zero."));
	}
	if cfg.search.default_limit == 0 {
		return Err(Error::invalid("search.default_limit", "must be greater than zero."));
	}
	if cfg.search.max_limit < cfg.search.default_limit {
		return Err(Error::invalid(
			"search.max_limit",
			"must be at least search.default_limit.",
		));
	}
	if !(0..=MAX_YEAR_WINDOW).contains(&cfg.search.year_window) {
		return Err(Error::invalid(
			"search.year_window",
			format!("must be between 0 and {MAX_YEAR_WINDOW}."),
		));
	}
	if cfg.client.server_addr.trim().is_empty() {
		return Err(Error::invalid("client.server_addr", "must be non-empty."));
	}
	if cfg.client.max_attempts == 0 {
		return Err(Error::invalid("client.max_attempts", "must be greater than zero."));
	}
	if cfg.client.timeout_ms == 0 {
		return Err(Error::invalid("client.timeout_ms", "must be greater than zero."));
	}
	if cfg.client.max_response_bytes == 0 {
		return Err(Error::invalid("client.max_response_bytes", "must be greater than zero."));
	}

	validate_catalog(&cfg.catalog)
}

fn validate_catalog(catalog: &Catalog) -> Result<()> {
	if catalog.brands.is_empty() {
		return Err(Error::invalid("catalog.brands", "must be non-empty."));
	}

	let mut seen = HashSet::new();

	for brand in &catalog.brands {
		if brand.name.is_empty() {
			return Err(Error::invalid("catalog.brands.name", "must be non-empty."));
		}
		if !seen.insert(brand.name.to_lowercase()) {
			return Err(Error::invalid(
				"catalog.brands.name",
				format!("must be unique ignoring case, found {:?} twice.", brand.name),
			));
		}
		if brand.models.iter().any(String::is_empty) {
			return Err(Error::invalid(
				"catalog.brands.models",
				format!("must not contain empty names (brand {:?}).", brand.name),
			));
		}
	}

	if catalog.options.iter().any(String::is_empty) {
		return Err(Error::invalid("catalog.options", "must not contain empty names."));
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.service.read_timeout_ms == Some(0) {
		cfg.service.read_timeout_ms = None;
	}

	for brand in &mut cfg.catalog.brands {
		brand.name = brand.name.trim().to_string();

		for model in &mut brand.models {
			*model = model.trim().to_string();
		}
	}
	for option in &mut cfg.catalog.options {
		*option = option.trim().to_string();
	}
}
