pub mod common;
pub mod u001_route_sync;
