pub mod date;
pub mod debug;
pub mod timezone;

pub use date::{parse_date, parse_date_cell, parse_datetime_cell};
pub use debug::{parse_debug_enabled, set_parse_debug};
pub use timezone::Timezone;
