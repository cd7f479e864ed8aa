pub mod attribute;
pub mod change_record;
pub mod delivery;
pub mod payload;
