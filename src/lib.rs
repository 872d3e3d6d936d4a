pub mod app;
pub mod args;
pub mod braille;
pub mod chart;
pub mod colormap;
pub mod data;
pub mod diff;
pub mod error;
pub mod incidents;
pub mod layout;
pub mod map;
pub mod report;
pub mod scale;
pub mod transition;
pub mod ui;
