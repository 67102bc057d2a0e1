//! Criteria normalization.
//!
//! Turns an untrusted criteria map into [`Criteria`]. Every problem is local to one field: the
//! field is dropped and reported in [`Normalized::dropped`], the rest of the map survives.

use serde_json::{Map, Value};

use crate::{
	criteria::{Criteria, Field, Vocabulary},
	text,
};

const ALLOWED_DOOR_COUNTS: [i32; 3] = [2, 4, 5];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropReason {
	UnknownKey,
	InvalidType,
	Empty,
	UnknownValue,
	RequiresBrand,
	NotAllowed,
}
impl DropReason {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::UnknownKey => "unknown_key",
			Self::InvalidType => "invalid_type",
			Self::Empty => "empty",
			Self::UnknownValue => "unknown_value",
			Self::RequiresBrand => "requires_brand",
			Self::NotAllowed => "not_allowed",
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DroppedField {
	pub field: String,
	pub reason: DropReason,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
	pub criteria: Criteria,
	pub dropped: Vec<DroppedField>,
}
impl Normalized {
	pub fn was_dropped(&self, key: &str) -> bool {
		self.dropped.iter().any(|dropped| dropped.field == key)
	}

	fn drop_field(&mut self, field: impl Into<String>, reason: DropReason) {
		self.dropped.push(DroppedField { field: field.into(), reason });
	}
}

pub fn normalize(raw: &Map<String, Value>, vocabulary: &Vocabulary) -> Normalized {
	let mut out = Normalized::default();

	for key in raw.keys() {
		if Field::from_key(key).is_none() {
			out.drop_field(key.as_str(), DropReason::UnknownKey);
		}
	}

	if let Some(value) = present(raw, Field::Brand) {
		match resolve_brand(value, vocabulary) {
			Ok(brand) => out.criteria.brand = Some(brand),
			Err(reason) => out.drop_field(Field::Brand.key(), reason),
		}
	}
	if let Some(value) = present(raw, Field::Model) {
		let resolved = match out.criteria.brand.as_deref() {
			Some(brand) => resolve_model(value, vocabulary.models_of(brand)),
			None => Err(DropReason::RequiresBrand),
		};

		match resolved {
			Ok(model) => out.criteria.model = Some(model),
			Err(reason) => out.drop_field(Field::Model.key(), reason),
		}
	}
	if let Some(value) = present(raw, Field::Options) {
		match value.as_array() {
			Some(entries) => out.criteria.options = filter_options(entries, &vocabulary.options),
			None => out.drop_field(Field::Options.key(), DropReason::InvalidType),
		}
	}
	if let Some(value) = present(raw, Field::DoorCount) {
		match door_count(value) {
			Ok(doors) => out.criteria.door_count = Some(doors),
			Err(reason) => out.drop_field(Field::DoorCount.key(), reason),
		}
	}

	for field in Field::ALL {
		if let Some(value) = present(raw, field)
			&& let Some(slot) = out.criteria.raw_slot(field)
		{
			*slot = Some(value.clone());
		}
	}

	out
}

fn present(raw: &Map<String, Value>, field: Field) -> Option<&Value> {
	raw.get(field.key()).filter(|value| !value.is_null())
}

fn resolve_brand(value: &Value, vocabulary: &Vocabulary) -> Result<String, DropReason> {
	let candidate = non_blank_str(value)?;

	text::first_match(candidate, vocabulary.brands.iter().map(|brand| brand.name.as_str()))
		.map(str::to_string)
		.ok_or(DropReason::UnknownValue)
}

fn resolve_model(value: &Value, models: &[String]) -> Result<String, DropReason> {
	let candidate = non_blank_str(value)?;

	text::first_match(candidate, models.iter().map(String::as_str))
		.map(str::to_string)
		.ok_or(DropReason::UnknownValue)
}

fn non_blank_str(value: &Value) -> Result<&str, DropReason> {
	let raw = value.as_str().ok_or(DropReason::InvalidType)?;

	if raw.trim().is_empty() {
		return Err(DropReason::Empty);
	}

	Ok(raw)
}

/// Keeps entries naming a configured option exactly, case included, in request order without
/// repeats.
fn filter_options(entries: &[Value], valid: &[String]) -> Vec<String> {
	let mut kept: Vec<String> = Vec::new();

	for entry in entries {
		let Some(name) = entry.as_str() else {
			continue;
		};

		if valid.iter().any(|option| option == name) && !kept.iter().any(|seen| seen == name) {
			kept.push(name.to_string());
		}
	}

	kept
}

fn door_count(value: &Value) -> Result<i32, DropReason> {
	let Value::Number(number) = value else {
		return Err(DropReason::InvalidType);
	};
	let doors = match number.as_i64() {
		Some(doors) => doors,
		None => match number.as_f64() {
			Some(raw) if raw.fract() == 0.0 => raw as i64,
			_ => return Err(DropReason::NotAllowed),
		},
	};

	ALLOWED_DOOR_COUNTS
		.into_iter()
		.find(|allowed| i64::from(*allowed) == doors)
		.ok_or(DropReason::NotAllowed)
}
