pub mod comparison_renderer;
