//! UI components for the booth.

pub mod capture;
pub mod review;
pub mod welcome;
pub mod widgets;
pub mod window;

pub use window::MainWindow;
