mod compact;
pub use compact::{
    blank_canvas, insertion_canvas, known_length_canvas, BlankCanvas, InsertionCanvas,
    KnownLengthCanvas,
};

mod batch;
pub use batch::{
    get_canvas, get_insertion_canvas, get_known_length_canvas, BlankCanvasBatch,
    InsertionCanvasBatch, KnownLengthCanvasBatch,
};
