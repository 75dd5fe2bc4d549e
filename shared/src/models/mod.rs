pub mod character;
pub mod content;
pub mod image;
pub mod response;

pub use character::*;
pub use content::*;
pub use image::*;
pub use response::*;
