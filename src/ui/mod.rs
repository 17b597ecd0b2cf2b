pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{declaration, dim, file, header, info, section, success, summary_row, warn};
pub use table::{stats_table, types_table, TypeRow};
pub use theme::{theme, Theme};
