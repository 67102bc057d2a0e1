use serde_json::{Map, Value};

use autofind_domain::{QueryPlan, VehicleListing, normalize};

use crate::{CatalogService, Result};

impl CatalogService {
	/// Normalizes and plans one criteria map. Never fails: bad fields are dropped or skipped and
	/// logged.
	pub fn plan(&self, criteria: &Map<String, Value>) -> QueryPlan {
		let normalized = normalize::normalize(criteria, &self.vocabulary);

		for dropped in &normalized.dropped {
			tracing::debug!(
				field = %dropped.field,
				reason = dropped.reason.as_str(),
				"Dropping criteria field."
			);
		}

		let plan = QueryPlan::build(&normalized.criteria, &self.policy);

		for skipped in &plan.skipped {
			tracing::warn!(
				field = %skipped.field,
				reason = skipped.reason.as_str(),
				"Skipping predicate for malformed criteria value."
			);
		}

		plan
	}

	pub async fn search(&self, criteria: &Map<String, Value>) -> Result<Vec<VehicleListing>> {
		let plan = self.plan(criteria);
		let vehicles = self.store.search(&plan).await?;

		tracing::debug!(
			predicates = plan.predicates.len(),
			limit = plan.limit,
			results = vehicles.len(),
			"Catalog search completed."
		);

		Ok(vehicles.into_iter().map(VehicleListing::from).collect())
	}
}
