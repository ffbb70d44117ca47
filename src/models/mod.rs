pub mod brownian;
pub mod gbm;
pub mod model;
