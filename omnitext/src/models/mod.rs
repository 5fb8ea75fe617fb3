mod content;
mod format;

pub use content::*;
pub use format::*;
