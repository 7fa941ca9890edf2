pub mod a001_page;
pub mod a002_nav_item;
pub mod common;
