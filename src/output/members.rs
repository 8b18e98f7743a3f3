use comfy_table::Color;
use serde::Serialize;

use studiostats::core::{MemberProfile, Segment, TrendDirection, TrendReport, pct};

use crate::output::format::{
    TableOptions, create_styled_table, header_row, print_title, right_cell, styled_cell,
};

/// One member's profile joined with its segment and visit trend
#[derive(Debug, Clone, Serialize)]
pub(crate) struct MemberRow {
    #[serde(flatten)]
    pub(crate) profile: MemberProfile,
    pub(crate) segment: Segment,
    /// Absent for members without check-ins in the trend windows
    pub(crate) trend: Option<TrendReport>,
}

fn trend_color(direction: TrendDirection, opts: &TableOptions<'_>) -> Option<Color> {
    match direction {
        TrendDirection::Increasing => opts.accent(Color::Green),
        TrendDirection::Declining => opts.accent(Color::Red),
        TrendDirection::Stable => None,
    }
}

pub(crate) fn print_segment_counts(counts: &[(Segment, usize)], opts: &TableOptions<'_>) {
    let total: usize = counts.iter().map(|(_, n)| n).sum();
    let mut table = create_styled_table();
    table.set_header(header_row(&["Segment", "Members", "Share"], opts.use_color));
    for (segment, n) in counts {
        table.add_row(vec![
            styled_cell(segment.label(), None, false),
            right_cell(&opts.count(*n), None, false),
            right_cell(&opts.pct(pct(*n as f64, total as f64)), None, false),
        ]);
    }
    table.add_row(vec![
        styled_cell("TOTAL", opts.accent(Color::Cyan), true),
        right_cell(&opts.count(total), opts.accent(Color::Cyan), true),
        right_cell("", None, false),
    ]);
    print_title("Member Segments");
    println!("{table}");
}

pub(crate) fn print_members_table(rows: &[MemberRow], opts: &TableOptions<'_>) {
    let mut table = create_styled_table();
    table.set_header(header_row(
        &[
            "Member",
            "Segment",
            "Visits",
            "Show-up",
            "Late Cx",
            "Paid",
            "Compliance",
            "Last Visit",
            "Trend",
            "Churn Risk",
        ],
        opts.use_color,
    ));

    for row in rows {
        let p = &row.profile;
        let last_visit = match (p.last_visit, p.days_since_last_visit) {
            (Some(date), Some(days)) => format!("{date} ({days}d)"),
            (Some(date), None) => date.to_string(),
            _ => "-".to_string(),
        };
        let (trend_text, color, risk) = match &row.trend {
            Some(t) => (
                t.direction.label(),
                trend_color(t.direction, opts),
                opts.decimal(t.churn_risk),
            ),
            None => ("-", None, "-".to_string()),
        };
        table.add_row(vec![
            styled_cell(&p.member_id, None, false),
            styled_cell(row.segment.label(), None, row.segment == Segment::HighValue),
            right_cell(&opts.count(p.visits), None, false),
            right_cell(&opts.pct(p.show_up_rate), None, false),
            right_cell(&opts.pct(p.cancellation_rate), None, false),
            right_cell(&opts.money(p.lifetime_paid), opts.accent(Color::Green), false),
            right_cell(&opts.pct(p.payment_compliance), None, false),
            right_cell(&last_visit, None, false),
            styled_cell(trend_text, color, false),
            right_cell(&risk, None, false),
        ]);
    }

    print_title("Members");
    println!("{table}");
}
