#![no_std]

pub mod application;
pub mod battery;
pub mod bmp;
pub mod board;
pub mod config;
pub mod decoder;
pub mod display;
pub mod download;
pub mod framebuffer;
pub mod net;
pub mod sleep;
pub mod status_bar;
pub mod telemetry;

extern crate alloc;
