pub mod config;

pub use config::{load_dotenv, SvdsConfig};
