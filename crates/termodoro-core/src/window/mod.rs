mod channel;
mod lifecycle;

pub use channel::{QueueWindow, WindowChannel, WindowRole};
pub use lifecycle::{PopoutOptions, WindowHost, WindowLifecycle};
