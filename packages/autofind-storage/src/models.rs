use time::OffsetDateTime;
use uuid::Uuid;

use autofind_domain::{Condition, FuelType, Transmission, Vehicle};

use crate::{Error, Result};

#[derive(Debug, sqlx::FromRow)]
pub struct VehicleRow {
	pub vehicle_id: Uuid,
	pub brand: String,
	pub model: String,
	pub manufacture_year: i32,
	pub model_year: i32,
	pub color: Option<String>,
	pub fuel: String,
	pub transmission: String,
	pub condition: String,
	pub price: f64,
	pub engine: String,
	pub mileage: i64,
	pub door_count: i32,
	pub city: Option<String>,
	pub state: Option<String>,
	pub created_at: OffsetDateTime,
}
impl VehicleRow {
	pub fn into_vehicle(self, options: Vec<String>) -> Result<Vehicle> {
		let fuel = parse_label(FuelType::parse, "fuel", &self.fuel)?;
		let transmission = parse_label(Transmission::parse, "transmission", &self.transmission)?;
		let condition = parse_label(Condition::parse, "condition", &self.condition)?;

		Ok(Vehicle {
			vehicle_id: self.vehicle_id,
			brand: self.brand,
			model: self.model,
			manufacture_year: self.manufacture_year,
			model_year: self.model_year,
			color: self.color,
			fuel,
			transmission,
			condition,
			price: self.price,
			engine: self.engine,
			mileage: self.mileage,
			door_count: self.door_count,
			city: self.city,
			state: self.state,
			options,
		})
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct VehicleOptionName {
	pub vehicle_id: Uuid,
	pub name: String,
}

fn parse_label<T>(parse: fn(&str) -> Option<T>, column: &str, raw: &str) -> Result<T> {
	parse(raw).ok_or_else(|| Error::InvalidRow(format!("Unknown {column} label {raw:?}.")))
}
