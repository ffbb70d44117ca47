pub mod control_variate;
pub mod estimate;
pub mod mc_engine;
