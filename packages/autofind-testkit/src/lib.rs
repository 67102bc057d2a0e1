//! Scratch Postgres databases for the ignored storage tests.

mod error;

pub use error::{Error, Result};

use std::{env, str::FromStr, thread};

use sqlx::{
	ConnectOptions, Connection, Executor,
	postgres::{PgConnectOptions, PgConnection},
};
use tokio::runtime::Builder;
use uuid::Uuid;

use autofind_config::Postgres;

pub const DSN_ENV: &str = "AUTOFIND_PG_DSN";

/// Server-side database every Postgres install has; used to create and drop scratch databases.
const MAINTENANCE_DATABASE: &str = "postgres";

/// A scratch database on the server named by `AUTOFIND_PG_DSN`. Call
/// [`ScratchDatabase::drop_database`] at the end of a test; a panicking test still drops it from
/// `Drop`.
pub struct ScratchDatabase {
	name: String,
	server: PgConnectOptions,
	dropped: bool,
}
impl ScratchDatabase {
	pub async fn create(base_dsn: &str) -> Result<Self> {
		let server = PgConnectOptions::from_str(base_dsn)
			.map_err(|err| Error::InvalidDsn { message: err.to_string() })?;
		let name = format!("autofind_test_{}", Uuid::new_v4().simple());
		let mut conn = maintenance_connection(&server).await?;

		conn.execute(format!(r#"CREATE DATABASE "{name}""#).as_str()).await?;
		conn.close().await?;

		Ok(Self { name, server, dropped: false })
	}

	/// Storage settings that point at this database.
	pub fn postgres(&self, pool_max_conns: u32) -> Postgres {
		let dsn = self.server.clone().database(&self.name).to_url_lossy().to_string();

		Postgres { dsn, pool_max_conns }
	}

	pub async fn drop_database(mut self) -> Result<()> {
		self.dropped = true;

		drop_database(&self.server, &self.name).await
	}
}
impl Drop for ScratchDatabase {
	fn drop(&mut self) {
		if self.dropped {
			return;
		}

		let name = std::mem::take(&mut self.name);
		let server = self.server.clone();
		// The test runtime may already be shutting down, so use a private one.
		let outcome = thread::spawn(move || -> Result<()> {
			let runtime = Builder::new_current_thread().enable_all().build()?;

			runtime.block_on(drop_database(&server, &name))
		})
		.join();

		match outcome {
			Ok(Ok(())) => {},
			Ok(Err(err)) => eprintln!("Failed to drop scratch database: {err}"),
			Err(_) => eprintln!("Scratch database cleanup thread panicked."),
		}
	}
}

/// The base DSN for ignored tests, if configured.
pub fn env_dsn() -> Option<String> {
	env::var(DSN_ENV).ok().filter(|dsn| !dsn.trim().is_empty())
}

async fn maintenance_connection(server: &PgConnectOptions) -> Result<PgConnection> {
	let options = server.clone().database(MAINTENANCE_DATABASE);

	Ok(PgConnection::connect_with(&options).await?)
}

async fn drop_database(server: &PgConnectOptions, name: &str) -> Result<()> {
	let mut conn = maintenance_connection(server).await?;

	// FORCE terminates sessions a leaked pool may still hold.
	conn.execute(format!(r#"DROP DATABASE IF EXISTS "{name}" WITH (FORCE)"#).as_str()).await?;
	conn.close().await?;

	Ok(())
}
