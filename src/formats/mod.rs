pub mod rect;

pub use rect::NormalizedRect;
