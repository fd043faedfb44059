pub mod error;
pub mod platforms;
pub mod utils;
