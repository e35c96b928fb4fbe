pub mod panel_comparison_renderer;
