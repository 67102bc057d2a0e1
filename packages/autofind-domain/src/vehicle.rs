use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, text};

pub const MIN_MODEL_YEAR: i32 = 1980;
pub const MAX_MODEL_YEAR: i32 = 2026;

/// Declares a catalog enum whose canonical wire label is also its storage value. `parse` folds
/// case and accents and accepts any of the listed aliases.
macro_rules! labeled_enum {
	(
		$(#[$meta:meta])*
		$name:ident {
			$($variant:ident => $label:literal $(| $alias:literal)*),+ $(,)?
		}
	) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		pub enum $name {
			$(#[serde(rename = $label)] $variant),+
		}
		impl $name {
			pub const ALL: &'static [Self] = &[$(Self::$variant),+];

			pub fn as_str(&self) -> &'static str {
				match self {
					$(Self::$variant => $label),+
				}
			}

			pub fn parse(raw: &str) -> Option<Self> {
				let key = text::fold_label(raw);

				if key.is_empty() {
					return None;
				}

				$(
					if key == text::fold_label($label) $(|| key == text::fold_label($alias))* {
						return Some(Self::$variant);
					}
				)+

				None
			}
		}
		impl std::fmt::Display for $name {
			fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
				f.write_str(self.as_str())
			}
		}
	};
}

labeled_enum! {
	FuelType {
		Gasoline => "Gasolina" | "gasoline" | "petrol",
		Ethanol => "Etanol" | "ethanol" | "alcool",
		Flex => "Flex",
		Hybrid => "Híbrido" | "hybrid",
		Diesel => "Diesel",
		Electric => "Elétrico" | "electric",
		Cng => "GNV" | "cng",
	}
}

labeled_enum! {
	Transmission {
		Manual => "Manual",
		Automatic => "Automático" | "automatic" | "auto",
		Automated => "Automatizado" | "automated",
		Cvt => "CVT",
	}
}

labeled_enum! {
	Condition {
		New => "Novo" | "new" | "0km",
		SemiNew => "Seminovo" | "semi-new",
		Used => "Usado" | "used",
	}
}

/// A catalog row with its option names.
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
	pub vehicle_id: Uuid,
	pub brand: String,
	pub model: String,
	pub manufacture_year: i32,
	pub model_year: i32,
	pub color: Option<String>,
	pub fuel: FuelType,
	pub transmission: Transmission,
	pub condition: Condition,
	pub price: f64,
	pub engine: String,
	pub mileage: i64,
	pub door_count: i32,
	pub city: Option<String>,
	pub state: Option<String>,
	pub options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVehicle {
	pub brand: String,
	pub model: String,
	pub manufacture_year: i32,
	pub model_year: i32,
	pub color: Option<String>,
	pub fuel: FuelType,
	pub transmission: Transmission,
	pub condition: Condition,
	pub price: f64,
	pub engine: String,
	#[serde(default)]
	pub mileage: i64,
	#[serde(default = "default_door_count")]
	pub door_count: i32,
	pub city: Option<String>,
	pub state: Option<String>,
	#[serde(default)]
	pub options: Vec<String>,
}
impl NewVehicle {
	pub fn validate(&self) -> Result<()> {
		for (field, value) in
			[("brand", &self.brand), ("model", &self.model), ("engine", &self.engine)]
		{
			if value.trim().is_empty() {
				return Err(Error::InvalidVehicle { field, message: "must be non-empty.".to_string() });
			}
		}
		for (field, year) in
			[("manufacture_year", self.manufacture_year), ("model_year", self.model_year)]
		{
			if !(MIN_MODEL_YEAR..=MAX_MODEL_YEAR).contains(&year) {
				return Err(Error::InvalidVehicle {
					field,
					message: format!("must be between {MIN_MODEL_YEAR} and {MAX_MODEL_YEAR}."),
				});
			}
		}

		if !self.price.is_finite() || self.price <= 0.0 {
			return Err(Error::InvalidVehicle {
				field: "price",
				message: "must be a positive number.".to_string(),
			});
		}
		if self.mileage < 0 {
			return Err(Error::InvalidVehicle {
				field: "mileage",
				message: "must be zero or greater.".to_string(),
			});
		}
		if self.door_count <= 0 {
			return Err(Error::InvalidVehicle {
				field: "door_count",
				message: "must be greater than zero.".to_string(),
			});
		}
		if self.options.iter().any(|option| option.trim().is_empty()) {
			return Err(Error::InvalidVehicle {
				field: "options",
				message: "must not contain empty names.".to_string(),
			});
		}

		Ok(())
	}

	pub fn into_vehicle(self, vehicle_id: Uuid) -> Vehicle {
		let mut options = self.options;

		options.sort();
		options.dedup();

		Vehicle {
			vehicle_id,
			brand: self.brand,
			model: self.model,
			manufacture_year: self.manufacture_year,
			model_year: self.model_year,
			color: self.color,
			fuel: self.fuel,
			transmission: self.transmission,
			condition: self.condition,
			price: self.price,
			engine: self.engine,
			mileage: self.mileage,
			door_count: self.door_count,
			city: self.city,
			state: self.state,
			options,
		}
	}
}

fn default_door_count() -> i32 {
	4
}
