//! Query planning.
//!
//! A [`QueryPlan`] is a conjunction of [`Predicate`]s plus a hard row cap. The store renders it
//! into SQL; [`QueryPlan::apply`] evaluates the same plan in memory.

use std::cmp::Ordering;

use serde_json::Value;

use crate::{
	criteria::{Criteria, Field},
	text,
	vehicle::{Condition, FuelType, Transmission, Vehicle},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanPolicy {
	pub default_limit: u32,
	pub max_limit: u32,
	pub year_window: i32,
}
impl Default for PlanPolicy {
	fn default() -> Self {
		Self { default_limit: 50, max_limit: 500, year_window: 2 }
	}
}
impl From<&autofind_config::Search> for PlanPolicy {
	fn from(search: &autofind_config::Search) -> Self {
		Self {
			default_limit: search.default_limit,
			max_limit: search.max_limit,
			year_window: search.year_window,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextColumn {
	Brand,
	Model,
	Color,
	Engine,
	City,
	State,
}
impl TextColumn {
	/// Column name in the `vehicles` table.
	pub fn column(&self) -> &'static str {
		match self {
			Self::Brand => "brand",
			Self::Model => "model",
			Self::Color => "color",
			Self::Engine => "engine",
			Self::City => "city",
			Self::State => "state",
		}
	}

	pub fn value<'a>(&self, vehicle: &'a Vehicle) -> Option<&'a str> {
		match self {
			Self::Brand => Some(vehicle.brand.as_str()),
			Self::Model => Some(vehicle.model.as_str()),
			Self::Color => vehicle.color.as_deref(),
			Self::Engine => Some(vehicle.engine.as_str()),
			Self::City => vehicle.city.as_deref(),
			Self::State => vehicle.state.as_deref(),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
	/// Column contains the needle, ignoring case. A missing value never matches.
	Contains { column: TextColumn, needle: String },
	/// Column does not contain the needle, ignoring case. A missing value always matches.
	Excludes { column: TextColumn, needle: String },
	ModelYearBetween { from: i32, to: i32 },
	Fuel(FuelType),
	Transmission(Transmission),
	Condition(Condition),
	/// Some option name of the vehicle contains the needle, ignoring case.
	HasOption(String),
	PriceAtLeast(f64),
	PriceAtMost(f64),
	MileageAtMost(f64),
	DoorCount(i32),
}
impl Predicate {
	pub fn matches(&self, vehicle: &Vehicle) -> bool {
		match self {
			Self::Contains { column, needle } => column
				.value(vehicle)
				.is_some_and(|value| text::contains_ignore_case(value, needle)),
			Self::Excludes { column, needle } => column
				.value(vehicle)
				.is_none_or(|value| !text::contains_ignore_case(value, needle)),
			Self::ModelYearBetween { from, to } => (*from..=*to).contains(&vehicle.model_year),
			Self::Fuel(fuel) => vehicle.fuel == *fuel,
			Self::Transmission(transmission) => vehicle.transmission == *transmission,
			Self::Condition(condition) => vehicle.condition == *condition,
			Self::HasOption(needle) =>
				vehicle.options.iter().any(|option| text::contains_ignore_case(option, needle)),
			Self::PriceAtLeast(min) => vehicle.price >= *min,
			Self::PriceAtMost(max) => vehicle.price <= *max,
			Self::MileageAtMost(max) => (vehicle.mileage as f64) <= *max,
			Self::DoorCount(doors) => vehicle.door_count == *doors,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
	InvalidType,
	OutOfRange,
	UnknownLabel,
}
impl SkipReason {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::InvalidType => "invalid_type",
			Self::OutOfRange => "out_of_range",
			Self::UnknownLabel => "unknown_label",
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedPredicate {
	pub field: Field,
	pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
	pub predicates: Vec<Predicate>,
	pub limit: u32,
	pub skipped: Vec<SkippedPredicate>,
}
impl QueryPlan {
	pub fn build(criteria: &Criteria, policy: &PlanPolicy) -> Self {
		let mut builder = PlanBuilder::default();

		if let Some(brand) = criteria.brand.as_deref() {
			builder.contains(TextColumn::Brand, brand);
		}
		if let Some(model) = criteria.model.as_deref() {
			builder.contains(TextColumn::Model, model);
		}

		builder.year(criteria.year.as_ref(), policy.year_window);
		builder.label(Field::Fuel, criteria.fuel.as_ref(), FuelType::parse, Predicate::Fuel);
		builder.label(
			Field::Transmission,
			criteria.transmission.as_ref(),
			Transmission::parse,
			Predicate::Transmission,
		);
		builder.label(
			Field::Condition,
			criteria.condition.as_ref(),
			Condition::parse,
			Predicate::Condition,
		);
		builder.bound(Field::PriceMin, criteria.price_min.as_ref(), Predicate::PriceAtLeast);
		builder.bound(Field::PriceMax, criteria.price_max.as_ref(), Predicate::PriceAtMost);
		builder.bound(Field::MileageMax, criteria.mileage_max.as_ref(), Predicate::MileageAtMost);
		builder.text(Field::ColorToAvoid, criteria.color_to_avoid.as_ref(), |needle| {
			Predicate::Excludes { column: TextColumn::Color, needle }
		});
		builder.text(Field::Engine, criteria.engine.as_ref(), |needle| Predicate::Contains {
			column: TextColumn::Engine,
			needle,
		});
		builder.text(Field::City, criteria.city.as_ref(), |needle| Predicate::Contains {
			column: TextColumn::City,
			needle,
		});
		builder.text(Field::State, criteria.state.as_ref(), |needle| Predicate::Contains {
			column: TextColumn::State,
			needle,
		});

		for option in &criteria.options {
			builder.predicates.push(Predicate::HasOption(option.clone()));
		}
		if let Some(doors) = criteria.door_count {
			builder.predicates.push(Predicate::DoorCount(doors));
		}

		let limit = builder.limit(criteria.limit.as_ref(), policy);

		Self { predicates: builder.predicates, limit, skipped: builder.skipped }
	}

	pub fn matches(&self, vehicle: &Vehicle) -> bool {
		self.predicates.iter().all(|predicate| predicate.matches(vehicle))
	}

	/// Filters, orders by price then id, and truncates to the limit.
	pub fn apply<I>(&self, vehicles: I) -> Vec<Vehicle>
	where
		I: IntoIterator<Item = Vehicle>,
	{
		let mut kept: Vec<Vehicle> =
			vehicles.into_iter().filter(|vehicle| self.matches(vehicle)).collect();

		kept.sort_by(compare_listing_order);
		kept.truncate(self.limit as usize);

		kept
	}
}

/// Ascending price, ties broken by ascending id.
pub fn compare_listing_order(left: &Vehicle, right: &Vehicle) -> Ordering {
	left.price.total_cmp(&right.price).then_with(|| left.vehicle_id.cmp(&right.vehicle_id))
}

#[derive(Default)]
struct PlanBuilder {
	predicates: Vec<Predicate>,
	skipped: Vec<SkippedPredicate>,
}
impl PlanBuilder {
	fn skip(&mut self, field: Field, reason: SkipReason) {
		self.skipped.push(SkippedPredicate { field, reason });
	}

	fn contains(&mut self, column: TextColumn, needle: &str) {
		self.predicates.push(Predicate::Contains { column, needle: needle.to_string() });
	}

	fn text<F>(&mut self, field: Field, value: Option<&Value>, predicate: F)
	where
		F: FnOnce(String) -> Predicate,
	{
		let Some(value) = value else {
			return;
		};

		match coerce_text(value) {
			Ok(Some(needle)) => self.predicates.push(predicate(needle)),
			Ok(None) => {},
			Err(reason) => self.skip(field, reason),
		}
	}

	fn label<T, P, F>(&mut self, field: Field, value: Option<&Value>, parse: P, predicate: F)
	where
		P: FnOnce(&str) -> Option<T>,
		F: FnOnce(T) -> Predicate,
	{
		let Some(value) = value else {
			return;
		};
		let Some(raw) = value.as_str() else {
			self.skip(field, SkipReason::InvalidType);

			return;
		};

		if raw.trim().is_empty() {
			return;
		}

		match parse(raw) {
			Some(parsed) => self.predicates.push(predicate(parsed)),
			None => self.skip(field, SkipReason::UnknownLabel),
		}
	}

	fn bound<F>(&mut self, field: Field, value: Option<&Value>, predicate: F)
	where
		F: FnOnce(f64) -> Predicate,
	{
		let Some(value) = value else {
			return;
		};

		match coerce_number(value) {
			Ok(Some(number)) => self.predicates.push(predicate(number)),
			Ok(None) => {},
			Err(reason) => self.skip(field, reason),
		}
	}

	/// Any integral year yields a window. Years far outside the catalog simply match nothing.
	fn year(&mut self, value: Option<&Value>, window: i32) {
		let Some(value) = value else {
			return;
		};
		let year = match coerce_integer(value) {
			Ok(Some(year)) => year,
			Ok(None) => return,
			Err(reason) => {
				self.skip(Field::Year, reason);

				return;
			},
		};
		let window = i64::from(window);
		let from = clamp_year(year.saturating_sub(window));
		let to = clamp_year(year.saturating_add(window));

		self.predicates.push(Predicate::ModelYearBetween { from, to });
	}

	fn limit(&mut self, value: Option<&Value>, policy: &PlanPolicy) -> u32 {
		let requested = match value.map(coerce_integer) {
			None | Some(Ok(None)) => None,
			Some(Ok(Some(limit))) if limit > 0 => Some(limit),
			Some(Ok(Some(_))) => {
				self.skip(Field::Limit, SkipReason::OutOfRange);

				None
			},
			Some(Err(reason)) => {
				self.skip(Field::Limit, reason);

				None
			},
		};

		match requested {
			Some(limit) => u32::try_from(limit).unwrap_or(u32::MAX).min(policy.max_limit),
			None => policy.default_limit.min(policy.max_limit),
		}
	}
}

fn clamp_year(year: i64) -> i32 {
	i32::try_from(year).unwrap_or(if year < 0 { i32::MIN } else { i32::MAX })
}

/// Strings are trimmed, numbers are rendered. Blank strings mean "absent".
fn coerce_text(value: &Value) -> Result<Option<String>, SkipReason> {
	match value {
		Value::String(raw) => {
			let trimmed = raw.trim();

			Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
		},
		Value::Number(number) => Ok(Some(number.to_string())),
		_ => Err(SkipReason::InvalidType),
	}
}

fn coerce_number(value: &Value) -> Result<Option<f64>, SkipReason> {
	let number = match value {
		Value::Number(number) => number.as_f64().ok_or(SkipReason::InvalidType)?,
		Value::String(raw) => {
			let trimmed = raw.trim();

			if trimmed.is_empty() {
				return Ok(None);
			}

			trimmed.parse::<f64>().map_err(|_| SkipReason::InvalidType)?
		},
		_ => return Err(SkipReason::InvalidType),
	};

	if !number.is_finite() {
		return Err(SkipReason::InvalidType);
	}

	Ok(Some(number))
}

fn coerce_integer(value: &Value) -> Result<Option<i64>, SkipReason> {
	match value {
		Value::Number(number) => {
			if let Some(integer) = number.as_i64() {
				return Ok(Some(integer));
			}

			match number.as_f64() {
				Some(raw) if raw.is_finite() && raw.fract() == 0.0 => {
					if raw < i64::MIN as f64 || raw > i64::MAX as f64 {
						return Err(SkipReason::OutOfRange);
					}

					Ok(Some(raw as i64))
				},
				_ => Err(SkipReason::InvalidType),
			}
		},
		Value::String(raw) => {
			let trimmed = raw.trim();

			if trimmed.is_empty() {
				return Ok(None);
			}

			trimmed.parse::<i64>().map(Some).map_err(|_| SkipReason::InvalidType)
		},
		_ => Err(SkipReason::InvalidType),
	}
}
