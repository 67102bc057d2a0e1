use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::vehicle::{Condition, Vehicle};

/// One search result as it travels on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehicleListing {
	pub id: Uuid,
	#[serde(rename = "marca")]
	pub brand: String,
	#[serde(rename = "modelo")]
	pub model: String,
	#[serde(rename = "ano")]
	pub model_year: i32,
	#[serde(rename = "cor")]
	pub color: Option<String>,
	#[serde(rename = "quilometragem")]
	pub mileage: i64,
	#[serde(rename = "preco")]
	pub price: f64,
	#[serde(rename = "condicao")]
	pub condition: Condition,
	#[serde(rename = "cidade")]
	pub city: Option<String>,
	#[serde(rename = "estado")]
	pub state: Option<String>,
	#[serde(rename = "opcionais", default)]
	pub options: Vec<String>,
}
impl From<Vehicle> for VehicleListing {
	fn from(vehicle: Vehicle) -> Self {
		Self {
			id: vehicle.vehicle_id,
			brand: vehicle.brand,
			model: vehicle.model,
			model_year: vehicle.model_year,
			color: vehicle.color,
			mileage: vehicle.mileage,
			price: vehicle.price,
			condition: vehicle.condition,
			city: vehicle.city,
			state: vehicle.state,
			options: vehicle.options,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplyStatus {
	#[serde(rename = "ok")]
	Ok,
}

/// Response envelope: `{"status": "ok", "resultados": [...]}` or `{"erro": "..."}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
	Ok {
		status: ReplyStatus,
		#[serde(rename = "resultados")]
		results: Vec<VehicleListing>,
	},
	Error {
		#[serde(rename = "erro")]
		message: String,
	},
}
impl Reply {
	pub fn ok(results: Vec<VehicleListing>) -> Self {
		Self::Ok { status: ReplyStatus::Ok, results }
	}

	pub fn error(message: impl Into<String>) -> Self {
		Self::Error { message: message.into() }
	}

	pub fn is_ok(&self) -> bool {
		matches!(self, Self::Ok { .. })
	}

	pub fn results(&self) -> &[VehicleListing] {
		match self {
			Self::Ok { results, .. } => results,
			Self::Error { .. } => &[],
		}
	}

	pub fn error_message(&self) -> Option<&str> {
		match self {
			Self::Ok { .. } => None,
			Self::Error { message } => Some(message),
		}
	}
}
