pub mod balloon;
pub mod camera;
pub mod motion;
pub mod state;
