pub mod server;

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use autofind_service::{CatalogService, PgCatalog};

use crate::server::ServerOptions;

#[derive(Debug, Parser)]
#[command(version, rename_all = "kebab")]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = autofind_config::load(&args.config)?;
	init_tracing(&config)?;
	let store = PgCatalog::connect(&config.storage.postgres).await?;
	let service = Arc::new(CatalogService::new(&config, Arc::new(store)));
	let listener = TcpListener::bind(config.service.bind.as_str()).await?;
	let addr = listener.local_addr()?;
	tracing::info!(%addr, "Catalog server listening.");

	server::serve(listener, service, ServerOptions::from(&config.service), shutdown_signal()).await;

	tracing::info!("Catalog server stopped.");
	Ok(())
}

fn init_tracing(config: &autofind_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_env_filter(filter).init();
	Ok(())
}

async fn shutdown_signal() {
	if let Err(err) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %err, "Failed to listen for Ctrl-C; serving until killed.");

		std::future::pending::<()>().await;
	}
}
