//! dotspectrum library - audio-reactive spectrum bars for a dot-matrix display

pub mod audio;
pub mod cli;
pub mod display;
pub mod error;
pub mod frame_loop;
pub mod params;
pub mod visualizer;
