pub mod realtime;
pub mod route_inventory;
pub mod slug_rules;
