use serde_json::Value;

/// Recognized criteria keys. The wire names are the Portuguese keys clients send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
	Brand,
	Model,
	Year,
	Fuel,
	PriceMin,
	PriceMax,
	ColorToAvoid,
	Engine,
	Options,
	DoorCount,
	MileageMax,
	Condition,
	Transmission,
	City,
	State,
	Limit,
}
impl Field {
	pub const ALL: [Self; 16] = [
		Self::Brand,
		Self::Model,
		Self::Year,
		Self::Fuel,
		Self::PriceMin,
		Self::PriceMax,
		Self::ColorToAvoid,
		Self::Engine,
		Self::Options,
		Self::DoorCount,
		Self::MileageMax,
		Self::Condition,
		Self::Transmission,
		Self::City,
		Self::State,
		Self::Limit,
	];

	pub fn key(&self) -> &'static str {
		match self {
			Self::Brand => "marca",
			Self::Model => "modelo",
			Self::Year => "ano",
			Self::Fuel => "combustivel",
			Self::PriceMin => "preco_min",
			Self::PriceMax => "preco_max",
			Self::ColorToAvoid => "cor_evitar",
			Self::Engine => "motor",
			Self::Options => "opcionais",
			Self::DoorCount => "portas",
			Self::MileageMax => "quilometragem_max",
			Self::Condition => "condicao",
			Self::Transmission => "transmissao",
			Self::City => "cidade",
			Self::State => "estado",
			Self::Limit => "limite",
		}
	}

	pub fn from_key(key: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|field| field.key() == key)
	}
}
impl std::fmt::Display for Field {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.key())
	}
}

/// Output of the normalizer. Brand, model, options and door count are resolved; everything else
/// is the raw client value, coerced later by the planner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
	pub brand: Option<String>,
	pub model: Option<String>,
	pub options: Vec<String>,
	pub door_count: Option<i32>,
	pub year: Option<Value>,
	pub fuel: Option<Value>,
	pub price_min: Option<Value>,
	pub price_max: Option<Value>,
	pub color_to_avoid: Option<Value>,
	pub engine: Option<Value>,
	pub mileage_max: Option<Value>,
	pub condition: Option<Value>,
	pub transmission: Option<Value>,
	pub city: Option<Value>,
	pub state: Option<Value>,
	pub limit: Option<Value>,
}
impl Criteria {
	/// Slot for a field the normalizer passes through untouched.
	pub(crate) fn raw_slot(&mut self, field: Field) -> Option<&mut Option<Value>> {
		match field {
			Field::Year => Some(&mut self.year),
			Field::Fuel => Some(&mut self.fuel),
			Field::PriceMin => Some(&mut self.price_min),
			Field::PriceMax => Some(&mut self.price_max),
			Field::ColorToAvoid => Some(&mut self.color_to_avoid),
			Field::Engine => Some(&mut self.engine),
			Field::MileageMax => Some(&mut self.mileage_max),
			Field::Condition => Some(&mut self.condition),
			Field::Transmission => Some(&mut self.transmission),
			Field::City => Some(&mut self.city),
			Field::State => Some(&mut self.state),
			Field::Limit => Some(&mut self.limit),
			Field::Brand | Field::Model | Field::Options | Field::DoorCount => None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandModels {
	pub name: String,
	pub models: Vec<String>,
}

/// Brands, models and options the normalizer accepts, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
	pub brands: Vec<BrandModels>,
	pub options: Vec<String>,
}
impl Vocabulary {
	pub fn from_config(catalog: &autofind_config::Catalog) -> Self {
		Self {
			brands: catalog
				.brands
				.iter()
				.map(|brand| BrandModels { name: brand.name.clone(), models: brand.models.clone() })
				.collect(),
			options: catalog.options.clone(),
		}
	}

	pub fn models_of(&self, brand: &str) -> &[String] {
		self.brands
			.iter()
			.find(|entry| entry.name == brand)
			.map(|entry| entry.models.as_slice())
			.unwrap_or(&[])
	}
}
