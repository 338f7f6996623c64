mod output;
mod policy;
pub mod population;
pub mod weather;

pub use output::{OutputError, TsvSink};
pub use policy::{ErrorRecord, FailurePolicy};

pub use population::error::PopulationError;
pub use population::fred::ReleaseTables;
pub use population::job::PopulationReport;

pub use weather::api::TimelineClient;
pub use weather::error::WeatherError;
pub use weather::input::GeoDate;
pub use weather::job::WeatherReport;
