use comfy_table::{Cell, Color, Table};

use studiostats::core::{
    CancellationPeaks, CancellationSummary, LeadSummary, Quadrant, QuadrantMatrix,
    RepeatCanceller, SalesSummary, SessionSummary, pct, safe_div,
};

use crate::output::format::{
    TableOptions, create_styled_table, header_row, print_title, right_cell, styled_cell,
};

/// Load statistics printed under every table
#[derive(Debug, Clone, Copy)]
pub(crate) struct SummaryOptions {
    pub(crate) records: usize,
    pub(crate) failed_files: usize,
    pub(crate) rejected_rows: usize,
    pub(crate) elapsed_ms: Option<f64>,
}

/// Print the summary line with optional timing
pub(crate) fn print_summary_line(summary: SummaryOptions, opts: &TableOptions<'_>) {
    let mut stats_text = format!("{} records", opts.count(summary.records));
    if summary.failed_files > 0 {
        stats_text.push_str(&format!(
            " ({} unreadable files skipped)",
            opts.count(summary.failed_files)
        ));
    }
    if summary.rejected_rows > 0 {
        stats_text.push_str(&format!(
            " ({} malformed rows skipped)",
            opts.count(summary.rejected_rows)
        ));
    }

    if let Some(ms) = summary.elapsed_ms {
        if opts.use_color {
            println!("\n  {} | \x1b[36m{:.0}ms\x1b[0m\n", stats_text, ms);
        } else {
            println!("\n  {} | {:.0}ms\n", stats_text, ms);
        }
    } else {
        println!("\n  {}\n", stats_text);
    }
}

fn total_cell(text: &str, opts: &TableOptions<'_>) -> Cell {
    right_cell(text, opts.accent(Color::Cyan), true)
}

fn finish(title: &str, table: &Table) {
    print_title(title);
    println!("{table}");
}

// ============================================================================
// Classes
// ============================================================================

pub(crate) fn print_classes_table(
    rows: &[SessionSummary],
    dimension_label: &str,
    opts: &TableOptions<'_>,
) {
    let mut table = create_styled_table();
    table.set_header(header_row(
        &[
            dimension_label,
            "Sessions",
            "Empty",
            "Checked In",
            "Fill",
            "Avg Att",
            "Revenue",
            "Rev/Session",
            "Rev/Seat",
            "No-show",
            "Late Cx",
            "Score",
            "Peak Day",
        ],
        opts.use_color,
    ));

    let green = opts.accent(Color::Green);
    let mut sessions = 0usize;
    let mut empty = 0usize;
    let mut capacity = 0u64;
    let mut checked_in = 0u64;
    let mut revenue = 0.0;

    for row in rows {
        sessions += row.sessions;
        empty += row.empty_sessions;
        capacity += row.total_capacity;
        checked_in += row.total_checked_in;
        revenue += row.total_revenue;

        table.add_row(vec![
            styled_cell(&row.key, None, false),
            right_cell(&opts.count(row.sessions), None, false),
            right_cell(&opts.count(row.empty_sessions), None, false),
            right_cell(&opts.count(row.total_checked_in as usize), None, false),
            right_cell(&opts.pct(row.fill_rate), None, false),
            right_cell(&opts.decimal(row.avg_attendance), None, false),
            right_cell(&opts.money(row.total_revenue), green, false),
            right_cell(&opts.money(row.avg_revenue_per_session), None, false),
            right_cell(&opts.money(row.revenue_per_seat), None, false),
            right_cell(&opts.pct(row.no_show_rate), None, false),
            right_cell(&opts.pct(row.late_cancel_rate), None, false),
            right_cell(&opts.decimal(row.efficiency_score), None, false),
            styled_cell(row.peak_day.as_deref().unwrap_or("-"), None, false),
        ]);
    }

    table.add_row(vec![
        styled_cell("TOTAL", opts.accent(Color::Cyan), true),
        total_cell(&opts.count(sessions), opts),
        total_cell(&opts.count(empty), opts),
        total_cell(&opts.count(checked_in as usize), opts),
        total_cell(&opts.pct(pct(checked_in as f64, capacity as f64)), opts),
        total_cell(&opts.decimal(safe_div(checked_in as f64, sessions as f64)), opts),
        right_cell(&opts.money(revenue), green, true),
        total_cell(&opts.money(safe_div(revenue, sessions as f64)), opts),
        total_cell(&opts.money(safe_div(revenue, capacity as f64)), opts),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
    ]);

    finish(&format!("Class Performance by {dimension_label}"), &table);
}

pub(crate) fn print_quadrant_table(matrix: &QuadrantMatrix, opts: &TableOptions<'_>) {
    let mut table = create_styled_table();
    table.set_header(header_row(
        &["Format", "Rev/Session", "Avg Attendance", "Quadrant"],
        opts.use_color,
    ));

    for quadrant in [
        Quadrant::HighHigh,
        Quadrant::HighLow,
        Quadrant::LowHigh,
        Quadrant::LowLow,
    ] {
        let color = match quadrant {
            Quadrant::HighHigh => opts.accent(Color::Green),
            Quadrant::LowLow => opts.accent(Color::Red),
            _ => None,
        };
        for a in matrix.in_quadrant(quadrant) {
            table.add_row(vec![
                styled_cell(&a.key, None, false),
                right_cell(&opts.money(a.x), None, false),
                right_cell(&opts.decimal(a.y), None, false),
                styled_cell(quadrant.label(), color, quadrant == Quadrant::HighHigh),
            ]);
        }
    }

    finish(
        &format!(
            "Format Quadrants (median rev/session {}, median attendance {})",
            opts.money(matrix.x_median),
            opts.decimal(matrix.y_median)
        ),
        &table,
    );
}

// ============================================================================
// Sales and leads
// ============================================================================

pub(crate) fn print_sales_table(
    rows: &[SalesSummary],
    dimension_label: &str,
    opts: &TableOptions<'_>,
) {
    let mut table = create_styled_table();
    table.set_header(header_row(
        &[
            dimension_label,
            "Txns",
            "Paid",
            "Customers",
            "Revenue",
            "Share",
            "Avg Value",
            "Discounts",
            "Disc Rate",
            "Avg Disc",
        ],
        opts.use_color,
    ));

    let green = opts.accent(Color::Green);
    let mut transactions = 0usize;
    let mut succeeded = 0usize;
    let mut revenue = 0.0;
    let mut discount_total = 0.0;

    for row in rows {
        transactions += row.transactions;
        succeeded += row.succeeded;
        revenue += row.revenue;
        discount_total += row.discount_total;

        table.add_row(vec![
            styled_cell(&row.key, None, false),
            right_cell(&opts.count(row.transactions), None, false),
            right_cell(&opts.count(row.succeeded), None, false),
            right_cell(&opts.count(row.unique_customers), None, false),
            right_cell(&opts.money(row.revenue), green, false),
            right_cell(&opts.pct(row.revenue_share), None, false),
            right_cell(&opts.money(row.avg_transaction_value), None, false),
            right_cell(&opts.money(row.discount_total), None, false),
            right_cell(&opts.pct(row.discount_rate), None, false),
            right_cell(&opts.pct(row.avg_discount_percent), None, false),
        ]);
    }

    table.add_row(vec![
        styled_cell("TOTAL", opts.accent(Color::Cyan), true),
        total_cell(&opts.count(transactions), opts),
        total_cell(&opts.count(succeeded), opts),
        Cell::new(""),
        right_cell(&opts.money(revenue), green, true),
        Cell::new(""),
        total_cell(&opts.money(safe_div(revenue, succeeded as f64)), opts),
        total_cell(&opts.money(discount_total), opts),
        Cell::new(""),
        Cell::new(""),
    ]);

    finish(&format!("Sales by {dimension_label}"), &table);
}

pub(crate) fn print_leads_table(rows: &[LeadSummary], dimension_label: &str, opts: &TableOptions<'_>) {
    let mut table = create_styled_table();
    table.set_header(header_row(
        &[
            dimension_label,
            "Leads",
            "Trials",
            "Converted",
            "Retained",
            "Conv Rate",
            "Trial→Member",
            "Retention",
            "Avg LTV",
            "Avg Visits",
            "Days to Convert",
        ],
        opts.use_color,
    ));

    let mut leads = 0usize;
    let mut trials = 0usize;
    let mut conversions = 0usize;
    let mut retained = 0usize;

    for row in rows {
        leads += row.leads;
        trials += row.trials;
        conversions += row.conversions;
        retained += row.retained;

        table.add_row(vec![
            styled_cell(&row.key, None, false),
            right_cell(&opts.count(row.leads), None, false),
            right_cell(&opts.count(row.trials), None, false),
            right_cell(&opts.count(row.conversions), opts.accent(Color::Green), false),
            right_cell(&opts.count(row.retained), None, false),
            right_cell(&opts.pct(row.conversion_rate), None, false),
            right_cell(&opts.pct(row.trial_to_member_rate), None, false),
            right_cell(&opts.pct(row.retention_rate), None, false),
            right_cell(&opts.money(row.avg_ltv), None, false),
            right_cell(&opts.decimal(row.avg_visits), None, false),
            right_cell(&opts.decimal(row.avg_days_to_convert), None, false),
        ]);
    }

    table.add_row(vec![
        styled_cell("TOTAL", opts.accent(Color::Cyan), true),
        total_cell(&opts.count(leads), opts),
        total_cell(&opts.count(trials), opts),
        total_cell(&opts.count(conversions), opts),
        total_cell(&opts.count(retained), opts),
        total_cell(&opts.pct(pct(conversions as f64, leads as f64)), opts),
        Cell::new(""),
        total_cell(&opts.pct(pct(retained as f64, conversions as f64)), opts),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
    ]);

    finish(&format!("Lead Funnel by {dimension_label}"), &table);
}

// ============================================================================
// Cancellations
// ============================================================================

pub(crate) struct CancellationView<'a> {
    pub(crate) dimension_label: &'a str,
    pub(crate) groups: &'a [CancellationSummary],
    pub(crate) peaks: &'a CancellationPeaks,
    pub(crate) repeaters: &'a [RepeatCanceller],
    pub(crate) repeat_min: usize,
    /// Bookings vs late cancellations across sessions, when sessions were loaded
    pub(crate) correlation: Option<f64>,
}

pub(crate) fn print_cancellation_tables(view: &CancellationView<'_>, opts: &TableOptions<'_>) {
    let mut table = create_styled_table();
    table.set_header(header_row(
        &[view.dimension_label, "Late Cancels", "Members", "Paid", "Share"],
        opts.use_color,
    ));

    let mut total = 0usize;
    let mut paid = 0.0;
    for row in view.groups {
        total += row.cancellations;
        paid += row.total_paid;
        table.add_row(vec![
            styled_cell(&row.key, None, false),
            right_cell(&opts.count(row.cancellations), opts.accent(Color::Red), false),
            right_cell(&opts.count(row.unique_members), None, false),
            right_cell(&opts.money(row.total_paid), None, false),
            right_cell(&opts.pct(row.share), None, false),
        ]);
    }
    table.add_row(vec![
        styled_cell("TOTAL", opts.accent(Color::Cyan), true),
        total_cell(&opts.count(total), opts),
        Cell::new(""),
        total_cell(&opts.money(paid), opts),
        Cell::new(""),
    ]);
    finish(&format!("Late Cancellations by {}", view.dimension_label), &table);

    if let Some(day) = &view.peaks.weekday {
        println!(
            "  Peak day: {} ({} cancellations)",
            day,
            opts.count(view.peaks.weekday_count)
        );
    }
    if let Some(hour) = view.peaks.hour {
        println!(
            "  Peak hour: {:02}:00 ({} cancellations)",
            hour,
            opts.count(view.peaks.hour_count)
        );
    }
    if let Some(r) = view.correlation {
        println!("  Bookings vs late cancels correlation: {r:.2}");
    }

    if view.repeaters.is_empty() {
        println!("\n  No members with {}+ late cancellations.", view.repeat_min);
        return;
    }

    let mut repeat = create_styled_table();
    repeat.set_header(header_row(
        &["Member", "Late Cancels", "Paid", "Most Cancelled Class"],
        opts.use_color,
    ));
    for r in view.repeaters {
        repeat.add_row(vec![
            styled_cell(&r.member_id, None, false),
            right_cell(&opts.count(r.cancellations), opts.accent(Color::Red), true),
            right_cell(&opts.money(r.total_paid), None, false),
            styled_cell(r.top_class.as_deref().unwrap_or("-"), None, false),
        ]);
    }
    finish(
        &format!("Repeat Cancellers ({}+ late cancels)", view.repeat_min),
        &repeat,
    );
}
