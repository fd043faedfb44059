mod builder;
mod models;

pub use builder::{Showroom, URL_REGEX, parse_room_id, parse_streaming_url};
pub use models::{StreamingUrl, StreamingUrlResponse};
