#![allow(clippy::float_cmp)]

mod nominal;
mod numeric;
mod position;
mod round_trip;
