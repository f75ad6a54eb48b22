pub mod camera;
pub mod light;
pub mod transform;
#[cfg(test)]
mod tests;

pub use camera::{Camera, CameraState};
pub use light::Light;
pub use transform::{ModelState, Transform};
