use autofind_domain::{QueryPlan, Vehicle};
use autofind_storage::{db::Db, queries};

use crate::{BoxFuture, CatalogStore, Result};

/// Postgres-backed catalog. Each search checks out its own pooled connection.
pub struct PgCatalog {
	db: Db,
}
impl PgCatalog {
	/// Connects with the storage section of the config and bootstraps the schema.
	pub async fn connect(cfg: &autofind_config::Postgres) -> Result<Self> {
		let db = Db::connect(cfg).await?;

		db.ensure_schema().await?;

		Ok(Self { db })
	}
}
impl CatalogStore for PgCatalog {
	fn search<'a>(&'a self, plan: &'a QueryPlan) -> BoxFuture<'a, Result<Vec<Vehicle>>> {
		Box::pin(async move { Ok(queries::search_vehicles(&self.db, plan).await?) })
	}
}
