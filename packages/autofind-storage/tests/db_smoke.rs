use serde_json::json;

use autofind_domain::{
	Condition, Criteria, FuelType, NewVehicle, PlanPolicy, QueryPlan, Transmission, Vehicle,
};
use autofind_storage::{Error, db::Db, queries};
use autofind_testkit::ScratchDatabase;

fn new_vehicle(brand: &str, model: &str, model_year: i32, price: f64) -> NewVehicle {
	NewVehicle {
		brand: brand.to_string(),
		model: model.to_string(),
		manufacture_year: model_year,
		model_year,
		color: Some("Branco".to_string()),
		fuel: FuelType::Flex,
		transmission: Transmission::Automatic,
		condition: Condition::SemiNew,
		price,
		engine: "2.0".to_string(),
		mileage: 30_000,
		door_count: 4,
		city: Some("São Paulo".to_string()),
		state: Some("SP".to_string()),
		options: Vec::new(),
	}
}

async fn bootstrap(scratch: &ScratchDatabase) -> Db {
	let db = Db::connect(&scratch.postgres(2)).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	db
}

fn plan_for(criteria: Criteria) -> QueryPlan {
	QueryPlan::build(&criteria, &PlanPolicy::default())
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set AUTOFIND_PG_DSN to run."]
async fn db_connects_and_bootstraps_twice() {
	let Some(base_dsn) = autofind_testkit::env_dsn() else {
		eprintln!("Skipping db_connects_and_bootstraps_twice; set AUTOFIND_PG_DSN to run this test.");

		return;
	};
	let scratch =
		ScratchDatabase::create(&base_dsn).await.expect("Failed to create scratch database.");
	let db = bootstrap(&scratch).await;

	db.ensure_schema().await.expect("Schema bootstrap must be idempotent.");

	for table in ["vehicles", "options", "vehicle_options"] {
		let count: i64 = sqlx::query_scalar(
			"SELECT count(*) FROM information_schema.tables WHERE table_name = $1",
		)
		.bind(table)
		.fetch_one(&db.pool)
		.await
		.expect("Failed to query schema tables.");

		assert_eq!(count, 1, "missing table {table}");
	}

	scratch.drop_database().await.expect("Failed to drop scratch database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set AUTOFIND_PG_DSN to run."]
async fn brand_scenario_respects_price_ceiling() {
	let Some(base_dsn) = autofind_testkit::env_dsn() else {
		eprintln!(
			"Skipping brand_scenario_respects_price_ceiling; set AUTOFIND_PG_DSN to run this test."
		);

		return;
	};
	let scratch =
		ScratchDatabase::create(&base_dsn).await.expect("Failed to create scratch database.");
	let db = bootstrap(&scratch).await;
	let vehicle_id = queries::insert_vehicle(&db, &new_vehicle("Toyota", "Corolla", 2020, 80_000.0))
		.await
		.expect("Failed to insert vehicle.");
	let found = queries::search_vehicles(
		&db,
		&plan_for(Criteria { brand: Some("Toyota".to_string()), ..Criteria::default() }),
	)
	.await
	.expect("Failed to search vehicles.");

	assert_eq!(found.len(), 1);
	assert_eq!(found[0].vehicle_id, vehicle_id);
	assert_eq!(found[0].model, "Corolla");
	assert_eq!(found[0].condition, Condition::SemiNew);

	let found = queries::search_vehicles(
		&db,
		&plan_for(Criteria {
			brand: Some("Toyota".to_string()),
			price_max: Some(json!(50_000)),
			..Criteria::default()
		}),
	)
	.await
	.expect("Failed to search vehicles.");

	assert!(found.is_empty());

	scratch.drop_database().await.expect("Failed to drop scratch database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set AUTOFIND_PG_DSN to run."]
async fn options_are_shared_and_matched_conjunctively() {
	let Some(base_dsn) = autofind_testkit::env_dsn() else {
		eprintln!(
			"Skipping options_are_shared_and_matched_conjunctively; set AUTOFIND_PG_DSN to run this test."
		);

		return;
	};
	let scratch =
		ScratchDatabase::create(&base_dsn).await.expect("Failed to create scratch database.");
	let db = bootstrap(&scratch).await;
	let mut full = new_vehicle("Jeep", "Compass", 2022, 150_000.0);

	full.options = vec!["Teto solar".to_string(), "Airbag".to_string(), "Airbag".to_string()];

	let mut partial = new_vehicle("Jeep", "Renegade", 2021, 110_000.0);

	partial.options = vec!["Teto solar".to_string(), "GPS".to_string()];

	let full_id = queries::insert_vehicle(&db, &full).await.expect("Failed to insert vehicle.");

	queries::insert_vehicle(&db, &partial).await.expect("Failed to insert vehicle.");

	let names = queries::list_option_names(&db).await.expect("Failed to list options.");

	assert_eq!(names, vec!["Airbag".to_string(), "GPS".to_string(), "Teto solar".to_string()]);

	let found = queries::search_vehicles(
		&db,
		&plan_for(Criteria {
			options: vec!["Teto solar".to_string(), "Airbag".to_string()],
			..Criteria::default()
		}),
	)
	.await
	.expect("Failed to search vehicles.");

	assert_eq!(found.len(), 1);
	assert_eq!(found[0].vehicle_id, full_id);
	assert_eq!(found[0].options, vec!["Airbag".to_string(), "Teto solar".to_string()]);

	scratch.drop_database().await.expect("Failed to drop scratch database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set AUTOFIND_PG_DSN to run."]
async fn search_orders_by_price_and_caps_rows() {
	let Some(base_dsn) = autofind_testkit::env_dsn() else {
		eprintln!("Skipping search_orders_by_price_and_caps_rows; set AUTOFIND_PG_DSN to run this test.");

		return;
	};
	let scratch =
		ScratchDatabase::create(&base_dsn).await.expect("Failed to create scratch database.");
	let db = bootstrap(&scratch).await;

	for (model, price) in [("Gol", 45_000.0), ("Polo", 30_000.0), ("Virtus", 90_000.0)] {
		queries::insert_vehicle(&db, &new_vehicle("Volkswagen", model, 2019, price))
			.await
			.expect("Failed to insert vehicle.");
	}

	let found = queries::search_vehicles(
		&db,
		&plan_for(Criteria { limit: Some(json!(2)), ..Criteria::default() }),
	)
	.await
	.expect("Failed to search vehicles.");
	let models: Vec<&str> = found.iter().map(|vehicle| vehicle.model.as_str()).collect();

	assert_eq!(models, vec!["Polo", "Gol"]);

	let found = queries::search_vehicles(
		&db,
		&plan_for(Criteria { city: Some(json!("100%")), ..Criteria::default() }),
	)
	.await
	.expect("Wildcards in needles must be escaped.");

	assert!(found.is_empty());

	scratch.drop_database().await.expect("Failed to drop scratch database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set AUTOFIND_PG_DSN to run."]
async fn invalid_vehicle_never_reaches_the_store() {
	let Some(base_dsn) = autofind_testkit::env_dsn() else {
		eprintln!(
			"Skipping invalid_vehicle_never_reaches_the_store; set AUTOFIND_PG_DSN to run this test."
		);

		return;
	};
	let scratch =
		ScratchDatabase::create(&base_dsn).await.expect("Failed to create scratch database.");
	let db = bootstrap(&scratch).await;
	let result = queries::insert_vehicle(&db, &new_vehicle("Toyota", "Yaris", 2020, -1.0)).await;

	assert!(matches!(result, Err(Error::Domain(_))));

	let count: i64 = sqlx::query_scalar("SELECT count(*) FROM vehicles")
		.fetch_one(&db.pool)
		.await
		.expect("Failed to count vehicles.");

	assert_eq!(count, 0);

	scratch.drop_database().await.expect("Failed to drop scratch database.");
}

async fn seed(db: &Db, fleet: Vec<NewVehicle>) -> Vec<Vehicle> {
	let mut stored = Vec::with_capacity(fleet.len());

	for vehicle in fleet {
		let vehicle_id =
			queries::insert_vehicle(db, &vehicle).await.expect("Failed to insert vehicle.");

		stored.push(vehicle.into_vehicle(vehicle_id));
	}

	stored
}

/// Runs `criteria` against Postgres and in memory and returns the Postgres ids after checking
/// both agree on rows and order.
async fn search_both(db: &Db, stored: &[Vehicle], criteria: Criteria) -> Vec<uuid::Uuid> {
	let label = format!("{criteria:?}");
	let plan = plan_for(criteria);
	let from_db: Vec<_> = queries::search_vehicles(db, &plan)
		.await
		.expect("Failed to search vehicles.")
		.into_iter()
		.map(|vehicle| vehicle.vehicle_id)
		.collect();
	let in_memory: Vec<_> =
		plan.apply(stored.to_vec()).into_iter().map(|vehicle| vehicle.vehicle_id).collect();

	assert_eq!(from_db, in_memory, "stores disagree for {label}");

	from_db
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set AUTOFIND_PG_DSN to run."]
async fn postgres_agrees_with_in_memory_evaluation() {
	let Some(base_dsn) = autofind_testkit::env_dsn() else {
		eprintln!(
			"Skipping postgres_agrees_with_in_memory_evaluation; set AUTOFIND_PG_DSN to run this test."
		);

		return;
	};
	let scratch =
		ScratchDatabase::create(&base_dsn).await.expect("Failed to create scratch database.");
	let db = bootstrap(&scratch).await;
	let mut hybrid = new_vehicle("Toyota", "Corolla", 2020, 150_000.0);

	hybrid.fuel = FuelType::Hybrid;
	hybrid.color = Some("Vermelho".to_string());
	hybrid.mileage = 40_000;
	hybrid.door_count = 4;

	let mut manual = new_vehicle("Volkswagen", "Gol", 2017, 35_000.0);

	manual.transmission = Transmission::Manual;
	manual.color = None;
	manual.mileage = 90_000;
	manual.door_count = 2;

	let mut electric = new_vehicle("BYD", "Dolphin", 2023, 120_000.0);

	electric.fuel = FuelType::Electric;
	electric.condition = Condition::New;
	electric.color = Some("vermelho escuro".to_string());
	electric.mileage = 0;
	electric.door_count = 5;

	let stored = seed(&db, vec![hybrid, manual, electric]).await;
	let (hybrid_id, manual_id, electric_id) =
		(stored[0].vehicle_id, stored[1].vehicle_id, stored[2].vehicle_id);

	// Year window is two on each side: 2015 reaches 2017, 2014 does not.
	assert_eq!(
		search_both(&db, &stored, Criteria { year: Some(json!(2015)), ..Criteria::default() }).await,
		vec![manual_id]
	);
	assert_eq!(
		search_both(&db, &stored, Criteria { year: Some(json!(2014)), ..Criteria::default() }).await,
		Vec::<uuid::Uuid>::new()
	);
	assert_eq!(
		search_both(&db, &stored, Criteria { year: Some(json!(3000)), ..Criteria::default() }).await,
		Vec::<uuid::Uuid>::new()
	);

	// A vehicle without a color is never excluded by a color to avoid.
	assert_eq!(
		search_both(&db, &stored, Criteria {
			color_to_avoid: Some(json!("VERMELHO")),
			..Criteria::default()
		})
		.await,
		vec![manual_id]
	);

	// Accented labels compare exactly.
	assert_eq!(
		search_both(&db, &stored, Criteria { fuel: Some(json!("hibrido")), ..Criteria::default() })
			.await,
		vec![hybrid_id]
	);
	assert_eq!(
		search_both(&db, &stored, Criteria {
			transmission: Some(json!("Automático")),
			..Criteria::default()
		})
		.await,
		vec![electric_id, hybrid_id]
	);
	assert_eq!(
		search_both(&db, &stored, Criteria { fuel: Some(json!("Elétrico")), ..Criteria::default() })
			.await,
		vec![electric_id]
	);

	// Fractional mileage bounds against the integer column.
	assert_eq!(
		search_both(&db, &stored, Criteria {
			mileage_max: Some(json!(39_999.5)),
			..Criteria::default()
		})
		.await,
		vec![electric_id]
	);
	assert_eq!(
		search_both(&db, &stored, Criteria {
			mileage_max: Some(json!("40000")),
			..Criteria::default()
		})
		.await,
		vec![electric_id, hybrid_id]
	);
	assert_eq!(
		search_both(&db, &stored, Criteria { mileage_max: Some(json!(-1)), ..Criteria::default() })
			.await,
		Vec::<uuid::Uuid>::new()
	);

	for (doors, expected) in [(2, manual_id), (4, hybrid_id), (5, electric_id)] {
		assert_eq!(
			search_both(&db, &stored, Criteria { door_count: Some(doors), ..Criteria::default() })
				.await,
			vec![expected]
		);
	}

	assert_eq!(
		search_both(&db, &stored, Criteria { price_max: Some(json!(-1)), ..Criteria::default() })
			.await,
		Vec::<uuid::Uuid>::new()
	);
	assert_eq!(
		search_both(&db, &stored, Criteria {
			engine: Some(json!("2.0")),
			condition: Some(json!("novo")),
			..Criteria::default()
		})
		.await,
		vec![electric_id]
	);

	scratch.drop_database().await.expect("Failed to drop scratch database.");
}
