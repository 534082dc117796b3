#![allow(dead_code)]

pub mod garmin_mock;
pub mod socket_guard;
