//! xxfb - two small system tools
//!
//! This library provides the logic behind `xx` (hex dumper) and `fbclock`
//! (Linux framebuffer clock).

pub mod clock;
pub mod dump;
pub mod fb;
pub mod font;
pub mod logging;
