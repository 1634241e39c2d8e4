pub mod case;
pub mod section;
pub mod suite;
pub mod work_item;
