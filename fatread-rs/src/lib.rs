#![no_std]

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod fat;
mod hexfmt;
pub mod source;

pub use hexfmt::{
    hexfmt,
    hexfmt32,
};
