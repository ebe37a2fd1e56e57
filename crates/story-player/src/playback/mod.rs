pub mod machine;
pub mod types;

pub use machine::{PlaybackMachine, PlaybackSession};
pub use types::{MediaSignal, PlaybackEvent, PlaybackSnapshot, PlaybackState};
