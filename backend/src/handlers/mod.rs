pub mod characters;
pub mod content;
pub mod health;
pub mod images;

pub use characters::*;
pub use content::*;
pub use health::*;
pub use images::*;
