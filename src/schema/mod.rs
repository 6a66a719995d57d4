pub mod scene;
pub mod thread;
