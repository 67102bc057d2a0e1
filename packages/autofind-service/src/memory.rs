use std::sync::RwLock;

use uuid::Uuid;

use autofind_domain::{NewVehicle, QueryPlan, Vehicle};

use crate::{BoxFuture, CatalogStore, Result};

/// In-process catalog that evaluates plans with [`QueryPlan::apply`].
#[derive(Default)]
pub struct MemoryCatalog {
	vehicles: RwLock<Vec<Vehicle>>,
}
impl MemoryCatalog {
	pub fn new(vehicles: Vec<Vehicle>) -> Self {
		Self { vehicles: RwLock::new(vehicles) }
	}

	pub fn insert(&self, vehicle: NewVehicle) -> Result<Uuid> {
		vehicle.validate()?;

		let vehicle_id = Uuid::new_v4();
		let vehicle = vehicle.into_vehicle(vehicle_id);

		self.vehicles.write().unwrap_or_else(|err| err.into_inner()).push(vehicle);

		Ok(vehicle_id)
	}

	pub fn len(&self) -> usize {
		self.vehicles.read().unwrap_or_else(|err| err.into_inner()).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
impl CatalogStore for MemoryCatalog {
	fn search<'a>(&'a self, plan: &'a QueryPlan) -> BoxFuture<'a, Result<Vec<Vehicle>>> {
		let snapshot = self.vehicles.read().unwrap_or_else(|err| err.into_inner()).clone();

		Box::pin(async move { Ok(plan.apply(snapshot)) })
	}
}
