//! Collaborator implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in bonemux-hal:
//!
//! - Header pin maps (BeagleBone Black P8/P9 and user LEDs)
//! - Simulated board and readiness reactor for host-side use

#![no_std]
#![deny(unsafe_code)]

pub mod header;
pub mod sim;
