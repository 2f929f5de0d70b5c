pub mod config;
pub mod domain;
pub mod error;
pub mod fields;
pub mod gateway;
pub mod logging;
pub mod pipeline;
pub mod stats;

pub use config::SurveyConfig;
pub use domain::CompField;
pub use error::{Result, SurveyError};
pub use pipeline::SurveyPipeline;
