pub mod index;
pub mod record;
