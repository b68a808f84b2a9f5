#![allow(dead_code)]

pub mod counting_transport;
pub mod mock_server;
