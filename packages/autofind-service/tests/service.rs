use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};

use serde_json::{Map, Value, json};

use autofind_config::{Brand, Catalog, Client, Config, Postgres, Search, Service, Storage};
use autofind_domain::{Condition, FuelType, NewVehicle, Predicate, QueryPlan, Transmission, Vehicle};
use autofind_service::{BoxFuture, CatalogService, CatalogStore, Error, MemoryCatalog, Result};

fn test_config() -> Config {
	Config {
		service: Service {
			bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
			max_frame_bytes: 64 * 1_024,
			read_timeout_ms: None,
		},
		storage: Storage {
			postgres: Postgres {
				dsn: "postgres://localhost/autofind".to_string(),
				pool_max_conns: 1,
			},
		},
		search: Search { default_limit: 50, max_limit: 100, year_window: 2 },
		client: Client::default(),
		catalog: Catalog {
			options: vec![
				"Ar condicionado".to_string(),
				"Airbag".to_string(),
				"Teto solar".to_string(),
				"GPS".to_string(),
			],
			brands: vec![
				Brand {
					name: "Toyota".to_string(),
					models: vec!["Corolla".to_string(), "Hilux".to_string()],
				},
				Brand {
					name: "Volkswagen".to_string(),
					models: vec!["Gol".to_string(), "Polo".to_string()],
				},
			],
		},
	}
}

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

fn criteria(value: Value) -> Map<String, Value> {
	match value {
		Value::Object(map) => map,
		other => panic!("Criteria fixture must be an object, got {other}."),
	}
}

fn service_with(vehicles: Vec<NewVehicle>) -> CatalogService {
	let store = MemoryCatalog::default();

	for vehicle in vehicles {
		store.insert(vehicle).expect("Fixture vehicle must be valid.");
	}

	CatalogService::new(&test_config(), Arc::new(store))
}

struct FailingStore;
impl CatalogStore for FailingStore {
	fn search<'a>(&'a self, _plan: &'a QueryPlan) -> BoxFuture<'a, Result<Vec<Vehicle>>> {
		Box::pin(async { Err(Error::Storage { message: "connection refused".to_string() }) })
	}
}

struct SpyStore {
	calls: AtomicUsize,
}
impl CatalogStore for SpyStore {
	fn search<'a>(&'a self, plan: &'a QueryPlan) -> BoxFuture<'a, Result<Vec<Vehicle>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let limit = plan.limit;

		Box::pin(async move {
			assert_eq!(limit, 100);

			Ok(Vec::new())
		})
	}
}

#[tokio::test]
async fn brand_scenario_respects_price_ceiling() {
	let service = service_with(vec![new_vehicle("Toyota", "Corolla", 2020, 80_000.0)]);
	let found =
		service.search(&criteria(json!({ "marca": "Toyota" }))).await.expect("Search failed.");

	assert_eq!(found.len(), 1);
	assert_eq!(found[0].model, "Corolla");
	assert_eq!(found[0].condition, Condition::SemiNew);

	let found = service
		.search(&criteria(json!({ "marca": "Toyota", "preco_max": 50000 })))
		.await
		.expect("Search failed.");

	assert!(found.is_empty());
}

#[tokio::test]
async fn unknown_brand_widens_instead_of_failing() {
	let service = service_with(vec![
		new_vehicle("Toyota", "Corolla", 2020, 80_000.0),
		new_vehicle("Volkswagen", "Gol", 2018, 40_000.0),
	]);
	let found =
		service.search(&criteria(json!({ "marca": "Ferrari" }))).await.expect("Search failed.");

	assert_eq!(found.len(), 2);
}

#[tokio::test]
async fn fuzzy_brand_and_model_resolve_to_catalog_names() {
	let service = service_with(vec![
		new_vehicle("Toyota", "Corolla", 2020, 80_000.0),
		new_vehicle("Toyota", "Hilux", 2021, 200_000.0),
	]);
	let found = service
		.search(&criteria(json!({ "marca": "toyo", "modelo": "HILUX SRV" })))
		.await
		.expect("Search failed.");

	assert_eq!(found.len(), 1);
	assert_eq!(found[0].model, "Hilux");
}

#[tokio::test]
async fn year_window_is_two_years() {
	let service = service_with(vec![new_vehicle("Toyota", "Corolla", 2020, 80_000.0)]);

	for (year, expected) in [(2018, 1), (2022, 1), (2017, 0), (2023, 0)] {
		let found =
			service.search(&criteria(json!({ "ano": year }))).await.expect("Search failed.");

		assert_eq!(found.len(), expected, "year {year}");
	}
}

#[tokio::test]
async fn results_are_sorted_by_price_and_capped() {
	let vehicles = (0..60_i32)
		.map(|index| {
			new_vehicle("Volkswagen", "Gol", 2015, 90_000.0 - f64::from(index) * 1_000.0)
		})
		.collect();
	let service = service_with(vehicles);
	let found = service.search(&criteria(json!({}))).await.expect("Search failed.");

	assert_eq!(found.len(), 50);
	assert!(found.windows(2).all(|pair| pair[0].price <= pair[1].price));
	assert_eq!(found[0].price, 31_000.0);

	let found = service.search(&criteria(json!({ "limite": 3 }))).await.expect("Search failed.");

	assert_eq!(found.len(), 3);
}

#[tokio::test]
async fn requested_options_are_conjunctive() {
	let mut both = new_vehicle("Toyota", "Corolla", 2020, 80_000.0);

	both.options = vec!["Teto solar".to_string(), "Airbag".to_string()];

	let mut sunroof_only = new_vehicle("Toyota", "Corolla", 2020, 81_000.0);

	sunroof_only.options = vec!["Teto solar".to_string()];

	let service = service_with(vec![both, sunroof_only]);
	let found = service
		.search(&criteria(json!({ "opcionais": ["Teto solar", "Airbag"] })))
		.await
		.expect("Search failed.");

	assert_eq!(found.len(), 1);
	assert_eq!(found[0].options, vec!["Airbag".to_string(), "Teto solar".to_string()]);

	let found = service
		.search(&criteria(json!({ "opcionais": ["Teto solar", "GPS"] })))
		.await
		.expect("Search failed.");

	assert!(found.is_empty());
}

#[tokio::test]
async fn malformed_fields_are_ignored() {
	let service = service_with(vec![new_vehicle("Toyota", "Corolla", 2020, 80_000.0)]);
	let found = service
		.search(&criteria(json!({
			"marca": "Toyota",
			"ano": "sometime",
			"preco_max": "cheap",
			"portas": 3,
			"combustivel": "plasma",
			"opcionais": "Airbag",
			"extra": true,
		})))
		.await
		.expect("Search failed.");

	assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn store_failures_surface_as_storage_errors() {
	let service = CatalogService::new(&test_config(), Arc::new(FailingStore));
	let err = service
		.search(&criteria(json!({ "marca": "Toyota" })))
		.await
		.expect_err("Expected store failure.");

	assert!(matches!(err, Error::Storage { .. }));
	assert!(err.to_string().contains("connection refused"));
}

#[tokio::test]
async fn limit_is_clamped_before_reaching_the_store() {
	let store = Arc::new(SpyStore { calls: AtomicUsize::new(0) });
	let service = CatalogService::new(&test_config(), store.clone());

	service.search(&criteria(json!({ "limite": 10_000 }))).await.expect("Search failed.");

	assert_eq!(store.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn plan_reflects_normalized_criteria() {
	let service = service_with(Vec::new());
	let plan = service.plan(&criteria(json!({ "modelo": "Corolla", "portas": 2 })));

	assert_eq!(plan.predicates, vec![Predicate::DoorCount(2)]);
	assert_eq!(service.policy().max_limit, 100);
	assert_eq!(service.vocabulary().brands.len(), 2);
}

#[test]
fn memory_catalog_rejects_invalid_vehicles() {
	let store = MemoryCatalog::default();
	let err = store
		.insert(new_vehicle("Toyota", "Corolla", 1950, 80_000.0))
		.expect_err("Expected validation failure.");

	assert!(matches!(err, Error::InvalidRequest { .. }));
	assert!(store.is_empty());
}
