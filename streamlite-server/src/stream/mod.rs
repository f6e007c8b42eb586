pub mod range_streamer;

pub use range_streamer::RangeStreamer;
