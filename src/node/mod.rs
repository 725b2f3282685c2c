pub mod derive;
pub mod name;
pub mod schema;

pub use derive::{get_derived, DerivedNode};
pub use name::verbose_name;
pub use schema::{NodeSchema, Operability};
