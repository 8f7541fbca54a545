#![allow(dead_code)]
pub mod carts;
pub mod fakes;
pub mod prepare_env;
