mod format;
mod json;
mod members;
mod period;
mod table;

pub(crate) use format::{NumberFormat, TableOptions};
pub(crate) use json::{
    TrendsJson, cancellations_json, classes_json, formats_json, funnel_json, members_json,
    sales_json, trends_json,
};
pub(crate) use members::{MemberRow, print_members_table, print_segment_counts};
pub(crate) use period::{
    print_comparisons, print_funnel_months, print_sales_months, print_session_months,
};
pub(crate) use table::{
    CancellationView, SummaryOptions, print_cancellation_tables, print_classes_table,
    print_leads_table, print_quadrant_table, print_sales_table, print_summary_line,
};
