pub mod canvas;
pub mod utils;
pub mod vocab;
