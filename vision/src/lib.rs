//! Camera and face-detection backends for the presence monitor.
//!
//! [`FrameDirCamera`] plays image files from disk as a webcam feed and
//! [`RustfaceDetector`] counts faces with a SeetaFace model via `rustface`.

pub mod camera;
pub mod face;

pub use camera::{FrameDirCamera, FrameDirStream};
pub use face::{count_faces, RustfaceDetector, RustfaceSettings};
