pub mod memory;
pub mod search;
pub mod store;

mod error;

pub use error::{Error, Result};
pub use memory::MemoryCatalog;
pub use store::PgCatalog;

use std::{future::Future, pin::Pin, sync::Arc};

use autofind_config::Config;
use autofind_domain::{PlanPolicy, QueryPlan, Vehicle, Vocabulary};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Executes query plans against some vehicle catalog.
pub trait CatalogStore
where
	Self: Send + Sync,
{
	fn search<'a>(&'a self, plan: &'a QueryPlan) -> BoxFuture<'a, Result<Vec<Vehicle>>>;
}

/// Request-independent search context: the vocabulary the normalizer resolves against, the plan
/// policy, and the store handle. Shared across connections behind an `Arc`.
pub struct CatalogService {
	vocabulary: Vocabulary,
	policy: PlanPolicy,
	store: Arc<dyn CatalogStore>,
}
impl CatalogService {
	pub fn new(cfg: &Config, store: Arc<dyn CatalogStore>) -> Self {
		Self {
			vocabulary: Vocabulary::from_config(&cfg.catalog),
			policy: PlanPolicy::from(&cfg.search),
			store,
		}
	}

	pub fn vocabulary(&self) -> &Vocabulary {
		&self.vocabulary
	}

	pub fn policy(&self) -> &PlanPolicy {
		&self.policy
	}
}
