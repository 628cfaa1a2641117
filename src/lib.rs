#[macro_use]
extern crate lazy_static;

#[macro_use]
pub mod macros;
pub mod dataset;
pub mod evaluation;
pub mod polygon;
pub mod regression;
pub mod report;
pub mod resample;
pub mod tolerance;
pub mod utils;
