pub mod analyzer;
pub mod correlated;
pub mod error;
pub mod format;
pub mod instance;
pub mod report;
pub mod traffic;

pub use analyzer::Paramalyzer;
pub use correlated::{CorrelatedParam, ParamKey, ParamStats};
pub use error::AnalysisError;
pub use instance::{ParamInstance, ParamType};
pub use traffic::{CapturedTraffic, TrafficRecord, TrafficSource};

pub fn print_banner() {
    println!(
        "\n  paramflow v{}\n  parameter correlation and origin tracking\n",
        env!("CARGO_PKG_VERSION")
    );
}
