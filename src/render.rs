pub mod composite;
pub mod surface;

pub use composite::{FramedImage, LoadedFrame, compose, render_framed};
pub use surface::Surface;
