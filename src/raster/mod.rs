pub mod composite;
pub mod font;
pub mod io;
pub mod overlay;
pub(crate) mod pixmap;
pub mod transform;
