pub mod detail_panel;
pub mod editor_canvas;
pub mod explorer_window;
