pub mod line_item_reader;

pub use line_item_reader::LineItemReader;
