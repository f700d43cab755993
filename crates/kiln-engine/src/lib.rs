//! Kiln engine crate.
//!
//! A minimal GPU task execution layer over wgpu: acquire a device, build
//! device-resident resources, compile a compute or render pipeline, encode
//! a single-use command sequence, submit it to the queue, and observe the
//! result through mapped readback or frame presentation.
//!
//! The layer models exactly two execution shapes (a data-parallel
//! transform with host readback, and a textured-quad rasterization loop)
//! and validates usage-capability sets and binding layouts before work
//! reaches the queue.

pub mod device;
pub mod resource;
pub mod shader;
pub mod pipeline;
pub mod binding;
pub mod command;

pub mod error;
pub mod logging;
