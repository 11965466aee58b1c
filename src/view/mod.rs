pub(crate) mod fmt;
mod summary;
mod table;

pub use summary::{print_header, print_summary};
pub use table::{print_events, print_filters, print_types};

const TABLE_WIDTH: usize = 78;
const TIME_COL: usize = 20;
const TYPE_COL: usize = 26;
const ATTR_COL: usize = TABLE_WIDTH - TIME_COL - TYPE_COL - 6;
const FUNNEL_WIDTH: usize = 30;
