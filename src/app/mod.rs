pub mod kitchen;

pub use kitchen::{place_order, run_scenario, Kitchen, OrderReceipt, OrderReport, ShiftReport};
