//! Hardware-independent core library for lumen
//!
//! This crate contains all platform-agnostic logic for the lumen light and
//! temperature node: the sliding sample windows, activity classification,
//! adaptive aggregation, Theil-Sen regression, the read-cycle scheduler,
//! sensor trait definitions, event publishing and fixed-point rendering.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets and desktop hosts (for the simulator and tests).

#![no_std]

extern crate alloc;

pub mod analysis;
pub mod config;
pub mod events;
pub mod fixed_point;
pub mod node;
pub mod scheduler;
pub mod sensors;
pub mod window;

/// Number of samples held in each sliding window, and the length of one read cycle
pub const WINDOW_SIZE: usize = 12;
