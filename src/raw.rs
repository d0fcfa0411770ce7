//! Raw kernel ABI definitions, mirroring the C headers.

#![allow(non_camel_case_types, non_snake_case)]

pub mod input;
