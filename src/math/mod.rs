pub mod bands;
pub mod edges;
pub mod extrema;
pub mod interp;

pub use bands::band_slices;
pub use edges::{find_edges, EdgeDirection};
pub use extrema::{max_value, min_value};
pub use interp::value_at_index;
