use comfy_table::Color;

use studiostats::core::{FunnelMonth, PeriodComparison, SalesMonth, SessionMonth};

use crate::cli::SortOrder;
use crate::output::format::{
    TableOptions, change_color, create_styled_table, header_cell, header_row, print_title,
    right_cell, styled_cell,
};

/// Rows in display order; monthly rows are built oldest first
pub(crate) fn ordered<T>(rows: &[T], order: SortOrder) -> Vec<&T> {
    match order {
        SortOrder::Asc => rows.iter().collect(),
        SortOrder::Desc => rows.iter().rev().collect(),
    }
}

/// "avg_transaction_value" -> "Avg Transaction Value"
fn metric_header(metric: &str) -> String {
    metric
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn print_session_months(
    rows: &[SessionMonth],
    order: SortOrder,
    opts: &TableOptions<'_>,
) {
    let mut table = create_styled_table();
    table.set_header(header_row(
        &["Month", "Sessions", "Capacity", "Checked In", "Fill", "Avg Att", "Revenue", "Rev/Session"],
        opts.use_color,
    ));
    for row in ordered(rows, order) {
        table.add_row(vec![
            styled_cell(&row.month.label(), None, false),
            right_cell(&opts.count(row.sessions), None, false),
            right_cell(&opts.count(row.capacity as usize), None, false),
            right_cell(&opts.count(row.checked_in as usize), None, false),
            right_cell(&opts.pct(row.fill_rate), None, false),
            right_cell(&opts.decimal(row.avg_attendance), None, false),
            right_cell(&opts.money(row.revenue), opts.accent(Color::Green), false),
            right_cell(&opts.money(row.revenue_per_session), None, false),
        ]);
    }
    print_title("Monthly Class Sessions");
    println!("{table}");
}

pub(crate) fn print_sales_months(rows: &[SalesMonth], order: SortOrder, opts: &TableOptions<'_>) {
    let mut table = create_styled_table();
    table.set_header(header_row(
        &["Month", "Txns", "Revenue", "Customers", "New", "Existing", "Avg Value", "Disc Rate"],
        opts.use_color,
    ));
    for row in ordered(rows, order) {
        table.add_row(vec![
            styled_cell(&row.month.label(), None, false),
            right_cell(&opts.count(row.transactions), None, false),
            right_cell(&opts.money(row.revenue), opts.accent(Color::Green), false),
            right_cell(&opts.count(row.unique_customers), None, false),
            right_cell(&opts.count(row.new_customers), None, false),
            right_cell(&opts.count(row.existing_customers), None, false),
            right_cell(&opts.money(row.avg_transaction_value), None, false),
            right_cell(&opts.pct(row.discount_rate), None, false),
        ]);
    }
    print_title("Monthly Sales");
    println!("{table}");
}

pub(crate) fn print_funnel_months(rows: &[FunnelMonth], order: SortOrder, opts: &TableOptions<'_>) {
    let mut table = create_styled_table();
    table.set_header(header_row(
        &["Month", "Leads", "Trials", "Converted", "Retained", "Trial Rate", "Conv Rate", "Retention", "Avg LTV"],
        opts.use_color,
    ));
    for row in ordered(rows, order) {
        table.add_row(vec![
            styled_cell(&row.month.label(), None, false),
            right_cell(&opts.count(row.leads), None, false),
            right_cell(&opts.count(row.trials), None, false),
            right_cell(&opts.count(row.conversions), opts.accent(Color::Green), false),
            right_cell(&opts.count(row.retained), None, false),
            right_cell(&opts.pct(row.trial_rate), None, false),
            right_cell(&opts.pct(row.conversion_rate), None, false),
            right_cell(&opts.pct(row.retention_rate), None, false),
            right_cell(&opts.money(row.avg_ltv), None, false),
        ]);
    }
    print_title("Monthly Lead Funnel");
    println!("{table}");
}

/// Growth of every metric, one row per compared pair of months
pub(crate) fn print_comparisons(
    title: &str,
    comparisons: &[PeriodComparison],
    order: SortOrder,
    opts: &TableOptions<'_>,
) {
    let Some(first) = comparisons.first() else {
        println!("\n  {title}: not enough months to compare.");
        return;
    };

    let mut header = vec![header_cell("Period", opts.use_color)];
    header.extend(
        first
            .deltas
            .iter()
            .map(|d| header_cell(&metric_header(d.metric), opts.use_color)),
    );

    let mut table = create_styled_table();
    table.set_header(header);
    for comparison in ordered(comparisons, order) {
        let mut row = vec![styled_cell(
            &format!("{} vs {}", comparison.current.label(), comparison.previous.label()),
            None,
            false,
        )];
        for delta in &comparison.deltas {
            let text = if delta.growth > 0.0 {
                format!("+{}", opts.pct(delta.growth))
            } else {
                opts.pct(delta.growth)
            };
            row.push(right_cell(&text, change_color(delta.growth, opts.use_color), false));
        }
        table.add_row(row);
    }

    print_title(title);
    println!("{table}");
}
