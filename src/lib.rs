pub mod error;
pub mod logging;
pub mod types;

pub mod df_utils;
pub mod io;
pub mod parallel;
pub mod plot_utils;
pub mod qc;
pub mod schema;
pub mod stats;

pub mod clean;
pub mod pairwise;
pub mod regression;
pub mod report;
pub mod residual;
pub mod summary;

pub mod pipeline;
