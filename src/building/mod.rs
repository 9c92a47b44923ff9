mod building;
mod types;

pub use building::{Building, Buildings};
pub use types::{DeliveryClass, HeightSource, NeighborInfo};
