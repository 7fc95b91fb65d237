pub mod frame;
pub mod segment;

pub use frame::{encode_frame, FrameRead, FrameReader, MAX_FRAME_LEN};
pub use segment::Segment;
