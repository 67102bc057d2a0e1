//! Vehicle catalog domain: criteria normalization, query planning, and the wire shapes shared by
//! the server and the client.

pub mod criteria;
pub mod listing;
pub mod normalize;
pub mod plan;
pub mod text;
pub mod vehicle;

mod error;

pub use criteria::{Criteria, Field, Vocabulary};
pub use error::{Error, Result};
pub use listing::{Reply, VehicleListing};
pub use normalize::{DropReason, DroppedField, Normalized, normalize};
pub use plan::{PlanPolicy, Predicate, QueryPlan, SkipReason, SkippedPredicate};
pub use vehicle::{Condition, FuelType, NewVehicle, Transmission, Vehicle};
