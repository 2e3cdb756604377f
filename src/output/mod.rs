pub mod formatter;

pub use formatter::{
    format_breakdown, format_json, format_miles, format_price, format_ranked_table, format_score,
    format_tsv, format_verbose_table, should_use_colors, OutputFormat,
};
