pub mod output;
pub mod progress;
pub mod table;
pub mod theme;

pub use output::{
    country, detail, error, header, info, section, stats, success, summary_row, timing, warn,
};
pub use progress::{SeedProgress, Spinner};
pub use table::{codes_table, stats_table};
pub use theme::{theme, Icons, Theme};
