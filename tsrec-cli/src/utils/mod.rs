mod params;

pub use params::{parse_headers, parse_params};
