pub mod filters;
pub mod nir_preprocessor;
