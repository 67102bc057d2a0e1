use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre;
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

use autofind_client::CatalogClient;

#[derive(Debug, Parser)]
#[command(version, rename_all = "kebab")]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Overrides `client.server_addr`.
	#[arg(long, value_name = "HOST:PORT")]
	pub addr: Option<String>,
	/// Search criteria as one JSON object, e.g. '{"marca":"Toyota","preco_max":90000}'.
	#[arg(value_name = "CRITERIA_JSON")]
	pub criteria: String,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = autofind_config::load(&args.config)?;
	init_tracing(&config)?;
	let criteria = parse_criteria(&args.criteria)?;
	let mut client = CatalogClient::new(&config.client);

	if let Some(addr) = args.addr {
		client = client.with_server_addr(addr);
	}

	match client.search(&criteria).await {
		Ok(reply) => {
			println!("{}", serde_json::to_string_pretty(&reply)?);

			Ok(())
		},
		Err(err) => {
			println!("{}", serde_json::to_string_pretty(&err.to_reply())?);

			Err(err.into())
		},
	}
}

pub fn parse_criteria(raw: &str) -> color_eyre::Result<Map<String, Value>> {
	match serde_json::from_str::<Value>(raw)? {
		Value::Object(criteria) => Ok(criteria),
		other => Err(eyre::eyre!("Criteria must be a JSON object, got {other}.")),
	}
}

fn init_tracing(config: &autofind_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
	Ok(())
}
