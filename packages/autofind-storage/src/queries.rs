use std::collections::HashMap;

use sqlx::{PgExecutor, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use autofind_domain::{NewVehicle, Predicate, QueryPlan, Vehicle};

use crate::{
	Result,
	db::Db,
	models::{VehicleOptionName, VehicleRow},
};

const VEHICLE_COLUMNS: &str = "v.vehicle_id, v.brand, v.model, v.manufacture_year, v.model_year, \
v.color, v.fuel, v.transmission, v.condition, v.price, v.engine, v.mileage, v.door_count, v.city, \
v.state, v.created_at";

/// Validates and stores one vehicle with its options in a single transaction.
pub async fn insert_vehicle(db: &Db, vehicle: &NewVehicle) -> Result<Uuid> {
	vehicle.validate()?;

	let vehicle_id = Uuid::new_v4();
	let mut tx = db.pool.begin().await?;

	sqlx::query(
		"\
INSERT INTO vehicles (
	vehicle_id,
	brand,
	model,
	manufacture_year,
	model_year,
	color,
	fuel,
	transmission,
	condition,
	price,
	engine,
	mileage,
	door_count,
	city,
	state,
	created_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
	)
	.bind(vehicle_id)
	.bind(vehicle.brand.as_str())
	.bind(vehicle.model.as_str())
	.bind(vehicle.manufacture_year)
	.bind(vehicle.model_year)
	.bind(vehicle.color.as_deref())
	.bind(vehicle.fuel.as_str())
	.bind(vehicle.transmission.as_str())
	.bind(vehicle.condition.as_str())
	.bind(vehicle.price)
	.bind(vehicle.engine.as_str())
	.bind(vehicle.mileage)
	.bind(vehicle.door_count)
	.bind(vehicle.city.as_deref())
	.bind(vehicle.state.as_deref())
	.bind(OffsetDateTime::now_utc())
	.execute(&mut *tx)
	.await?;

	let mut names: Vec<&str> = vehicle.options.iter().map(|option| option.trim()).collect();

	names.sort_unstable();
	names.dedup();

	for name in names {
		let option_id = upsert_option(&mut *tx, name).await?;

		sqlx::query(
			"\
INSERT INTO vehicle_options (vehicle_id, option_id)
VALUES ($1, $2)
ON CONFLICT DO NOTHING",
		)
		.bind(vehicle_id)
		.bind(option_id)
		.execute(&mut *tx)
		.await?;
	}

	tx.commit().await?;

	Ok(vehicle_id)
}

/// Runs a plan as one parameterized statement, then attaches option names to the returned rows.
pub async fn search_vehicles(db: &Db, plan: &QueryPlan) -> Result<Vec<Vehicle>> {
	let mut builder = QueryBuilder::<Postgres>::new("SELECT ");

	builder.push(VEHICLE_COLUMNS);
	builder.push(" FROM vehicles v WHERE TRUE");

	for predicate in &plan.predicates {
		push_predicate(&mut builder, predicate);
	}

	builder.push(" ORDER BY v.price ASC, v.vehicle_id ASC LIMIT ");
	builder.push_bind(i64::from(plan.limit));

	let rows: Vec<VehicleRow> = builder.build_query_as().fetch_all(&db.pool).await?;
	let ids: Vec<Uuid> = rows.iter().map(|row| row.vehicle_id).collect();
	let mut options = load_option_names(&db.pool, &ids).await?;

	rows.into_iter()
		.map(|row| {
			let names = options.remove(&row.vehicle_id).unwrap_or_default();

			row.into_vehicle(names)
		})
		.collect()
}

/// Every known option name, alphabetically.
pub async fn list_option_names(db: &Db) -> Result<Vec<String>> {
	let names: Vec<String> = sqlx::query_scalar("SELECT name FROM options ORDER BY name ASC")
		.fetch_all(&db.pool)
		.await?;

	Ok(names)
}

/// Escapes `%`, `_` and `\` so the needle matches literally inside `ILIKE`.
pub fn like_pattern(needle: &str) -> String {
	let mut pattern = String::with_capacity(needle.len() + 2);

	pattern.push('%');

	for ch in needle.chars() {
		if matches!(ch, '%' | '_' | '\\') {
			pattern.push('\\');
		}

		pattern.push(ch);
	}

	pattern.push('%');

	pattern
}

fn push_predicate(builder: &mut QueryBuilder<'_, Postgres>, predicate: &Predicate) {
	match predicate {
		Predicate::Contains { column, needle } => {
			builder.push(format!(" AND v.{} ILIKE ", column.column()));
			builder.push_bind(like_pattern(needle));
		},
		Predicate::Excludes { column, needle } => {
			let column = column.column();

			builder.push(format!(" AND (v.{column} IS NULL OR v.{column} NOT ILIKE "));
			builder.push_bind(like_pattern(needle));
			builder.push(")");
		},
		Predicate::ModelYearBetween { from, to } => {
			builder.push(" AND v.model_year BETWEEN ");
			builder.push_bind(*from);
			builder.push(" AND ");
			builder.push_bind(*to);
		},
		Predicate::Fuel(fuel) => {
			builder.push(" AND v.fuel = ");
			builder.push_bind(fuel.as_str());
		},
		Predicate::Transmission(transmission) => {
			builder.push(" AND v.transmission = ");
			builder.push_bind(transmission.as_str());
		},
		Predicate::Condition(condition) => {
			builder.push(" AND v.condition = ");
			builder.push_bind(condition.as_str());
		},
		Predicate::HasOption(needle) => {
			builder.push(
				" AND EXISTS (\
SELECT 1 FROM vehicle_options vo \
JOIN options o ON o.option_id = vo.option_id \
WHERE vo.vehicle_id = v.vehicle_id AND o.name ILIKE ",
			);
			builder.push_bind(like_pattern(needle));
			builder.push(")");
		},
		Predicate::PriceAtLeast(min) => {
			builder.push(" AND v.price >= ");
			builder.push_bind(*min);
		},
		Predicate::PriceAtMost(max) => {
			builder.push(" AND v.price <= ");
			builder.push_bind(*max);
		},
		Predicate::MileageAtMost(max) => {
			builder.push(" AND v.mileage <= ");
			builder.push_bind(*max);
		},
		Predicate::DoorCount(doors) => {
			builder.push(" AND v.door_count = ");
			builder.push_bind(*doors);
		},
	}
}

async fn upsert_option<'e, E>(executor: E, name: &str) -> Result<Uuid>
where
	E: PgExecutor<'e>,
{
	let option_id = sqlx::query_scalar(
		"\
INSERT INTO options (option_id, name)
VALUES ($1, $2)
ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
RETURNING option_id",
	)
	.bind(Uuid::new_v4())
	.bind(name)
	.fetch_one(executor)
	.await?;

	Ok(option_id)
}

async fn load_option_names<'e, E>(executor: E, ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<String>>>
where
	E: PgExecutor<'e>,
{
	let mut out: HashMap<Uuid, Vec<String>> = HashMap::new();

	if ids.is_empty() {
		return Ok(out);
	}

	let rows: Vec<VehicleOptionName> = sqlx::query_as(
		"\
SELECT vo.vehicle_id, o.name
FROM vehicle_options vo
JOIN options o ON o.option_id = vo.option_id
WHERE vo.vehicle_id = ANY($1)
ORDER BY o.name ASC",
	)
	.bind(ids)
	.fetch_all(executor)
	.await?;

	for row in rows {
		out.entry(row.vehicle_id).or_default().push(row.name);
	}

	Ok(out)
}
