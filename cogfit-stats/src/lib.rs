pub mod error;
pub mod result;
pub mod stats;

pub use error::{Shape, StatsError};
pub use result::{
    render_report, Measure, RenderOptions, TaskResult, REPORT_HEADER, REPORT_RULE,
};
