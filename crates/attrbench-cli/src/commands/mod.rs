pub mod compare;
pub mod masker;
pub mod run;
pub mod trend;
