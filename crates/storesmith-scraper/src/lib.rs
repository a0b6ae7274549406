pub mod detect;
pub mod embed;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod gate;
pub mod html;
pub mod images;
pub mod price;

pub use detect::detect_platform;
pub use error::ScrapeError;
pub use extract::{extract_with, scrape};
pub use gate::{accept, demo_record};
