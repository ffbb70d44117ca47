pub mod inversion;
pub mod quadrature;
