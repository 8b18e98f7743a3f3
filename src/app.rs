use std::collections::HashMap;

use chrono::NaiveDate;
use clap::ValueEnum;

use studiostats::consts::DEFAULT_TRAILING_MONTHS;
use studiostats::core::{
    CancellationDimension, CustomerIndex, LeadDimension, MonthKey, RecordFilter, SalesDimension,
    Segment, SegmentThresholds, SessionDimension, SessionQuery, SortMetric, TrendThresholds,
    active_members, booking_cancellation_correlation, bottom_n, build_member_profiles,
    cancellation_peaks, classify_segment, format_quadrants, member_trends, month_over_month,
    monthly_funnel, monthly_sales, monthly_sessions, rank_sessions, repeat_cancellers,
    segment_counts, summarize_cancellations, summarize_leads, summarize_sales, summarize_sessions,
    top_n, trailing_months, year_over_year,
};
use studiostats::error::AppError;
use studiostats::source::{LoadOptions, Snapshot, SnapshotKind, load_snapshot};

use crate::cli::commands::{CancelBy, LeadBy, SalesBy, SessionBy, SortBy, Window};
use crate::cli::{Cli, Commands};
use crate::output::{
    CancellationView, MemberRow, SummaryOptions, TableOptions, TrendsJson, cancellations_json,
    classes_json, formats_json, funnel_json, members_json, print_cancellation_tables,
    print_classes_table, print_comparisons, print_funnel_months, print_leads_table,
    print_members_table, print_quadrant_table, print_sales_months, print_sales_table,
    print_segment_counts, print_session_months, print_summary_line, sales_json, trends_json,
};

pub(crate) struct CommandContext<'a> {
    pub(crate) cli: &'a Cli,
    pub(crate) filter: RecordFilter,
    /// Last day of the reporting window: `--until`, else today in the configured timezone
    pub(crate) as_of: NaiveDate,
    pub(crate) segments: SegmentThresholds,
    pub(crate) trends: TrendThresholds,
    pub(crate) table: TableOptions<'a>,
}

impl CommandContext<'_> {
    fn load(&self, kinds: &[SnapshotKind]) -> Result<Snapshot, AppError> {
        load_snapshot(
            &self.cli.data_dir(),
            kinds,
            LoadOptions {
                quiet: self.cli.quiet,
                debug: self.cli.debug,
            },
        )
    }

    fn summary(&self, snapshot: &Snapshot, records: usize) {
        print_summary_line(
            SummaryOptions {
                records,
                failed_files: snapshot.failed_files,
                rejected_rows: snapshot.rejected_rows,
                elapsed_ms: Some(snapshot.elapsed_ms),
            },
            &self.table,
        );
    }
}

/// CLI spelling of a value enum, echoed in JSON output
fn value_name<T: ValueEnum>(value: T) -> String {
    value
        .to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_default()
}

fn print_json(json: &str) {
    println!("{json}");
}

fn handle_classes(
    ctx: &CommandContext<'_>,
    by: SessionBy,
    sort: SortBy,
    min_sessions: usize,
    min_checked_in: u64,
    top: Option<usize>,
    bottom: Option<usize>,
) -> Result<(), AppError> {
    let snapshot = ctx.load(&[SnapshotKind::Sessions])?;
    let dimension = SessionDimension::from(by);
    let query = SessionQuery {
        dimension,
        filter: ctx.filter.clone(),
        min_sessions,
        min_checked_in,
    };
    let mut rows = summarize_sessions(&snapshot.sessions, &query);
    rank_sessions(&mut rows, SortMetric::from(sort));
    let shown = match (top, bottom) {
        (_, Some(n)) => bottom_n(&rows, n),
        (Some(n), None) => top_n(&rows, n),
        (None, None) => &rows[..],
    };

    if ctx.cli.json {
        print_json(&classes_json(shown, &value_name(by), &value_name(sort)));
        return Ok(());
    }
    if shown.is_empty() {
        println!("No session data found.");
        return Ok(());
    }
    print_classes_table(shown, dimension.label(), &ctx.table);
    ctx.summary(&snapshot, snapshot.sessions.len());
    Ok(())
}

fn handle_formats(ctx: &CommandContext<'_>) -> Result<(), AppError> {
    let snapshot = ctx.load(&[SnapshotKind::Sessions])?;
    let query = SessionQuery {
        dimension: SessionDimension::Format,
        filter: ctx.filter.clone(),
        ..SessionQuery::default()
    };
    let rows = summarize_sessions(&snapshot.sessions, &query);
    let matrix = format_quadrants(&rows);

    if ctx.cli.json {
        print_json(&formats_json(&matrix, &rows));
        return Ok(());
    }
    if rows.is_empty() {
        println!("No session data found.");
        return Ok(());
    }
    print_quadrant_table(&matrix, &ctx.table);
    ctx.summary(&snapshot, snapshot.sessions.len());
    Ok(())
}

fn handle_sales(ctx: &CommandContext<'_>, by: SalesBy) -> Result<(), AppError> {
    let snapshot = ctx.load(&[SnapshotKind::Sales])?;
    let sales = ctx.filter.apply(&snapshot.sales);
    let dimension = SalesDimension::from(by);
    let rows = summarize_sales(&sales, dimension);

    if ctx.cli.json {
        print_json(&sales_json(&rows, &value_name(by)));
        return Ok(());
    }
    if rows.is_empty() {
        println!("No sales data found.");
        return Ok(());
    }
    print_sales_table(&rows, dimension.label(), &ctx.table);
    ctx.summary(&snapshot, sales.len());
    Ok(())
}

/// Months to build and how many of them to show.
///
/// Year-over-year needs the twelve months before the window as well.
fn trend_window(as_of: NaiveDate, months: usize, yoy: bool) -> (Vec<MonthKey>, usize) {
    let built = if yoy { months + 12 } else { months };
    (trailing_months(as_of, built), built - months)
}

fn handle_trends(ctx: &CommandContext<'_>, months: Window, yoy: bool) -> Result<(), AppError> {
    let snapshot = ctx.load(&[SnapshotKind::Sessions, SnapshotKind::Sales])?;
    let sessions = ctx.filter.apply(&snapshot.sessions);
    let sales = ctx.filter.apply(&snapshot.sales);
    // New vs existing is decided against the whole history, not the filtered view
    let index = CustomerIndex::build(&snapshot.sales);

    let (window, skip) = trend_window(ctx.as_of, months.months(), yoy);
    let session_rows = monthly_sessions(&sessions, &window);
    let sales_rows = monthly_sales(&sales, &index, &window);
    let (session_changes, sales_changes) = if yoy {
        (year_over_year(&session_rows), year_over_year(&sales_rows))
    } else {
        (month_over_month(&session_rows), month_over_month(&sales_rows))
    };
    let session_rows = &session_rows[skip..];
    let sales_rows = &sales_rows[skip..];
    let members = active_members(&sales, ctx.as_of);

    if ctx.cli.json {
        let data = TrendsJson {
            sessions: session_rows,
            sales: sales_rows,
            session_changes: &session_changes,
            sales_changes: &sales_changes,
            year_over_year: yoy,
            active_members: members,
            as_of: ctx.as_of,
        };
        print_json(&trends_json(&data, ctx.cli.order));
        return Ok(());
    }

    let label = if yoy { "Year over Year" } else { "Month over Month" };
    let order = ctx.cli.order;
    print_session_months(session_rows, order, &ctx.table);
    print_comparisons(&format!("Sessions {label}"), &session_changes, order, &ctx.table);
    print_sales_months(sales_rows, order, &ctx.table);
    print_comparisons(&format!("Sales {label}"), &sales_changes, order, &ctx.table);
    println!(
        "\n  Active members as of {}: {}",
        ctx.as_of,
        ctx.table.count(members)
    );
    ctx.summary(&snapshot, sessions.len() + sales.len());
    Ok(())
}

fn handle_funnel(ctx: &CommandContext<'_>, by: LeadBy) -> Result<(), AppError> {
    let snapshot = ctx.load(&[SnapshotKind::Leads])?;
    let leads = ctx.filter.apply(&snapshot.leads);
    let dimension = LeadDimension::from(by);
    let rows = summarize_leads(&leads, dimension);
    let window = trailing_months(ctx.as_of, DEFAULT_TRAILING_MONTHS);
    let months = monthly_funnel(&leads, &window);
    let changes = month_over_month(&months);

    if ctx.cli.json {
        print_json(&funnel_json(&rows, &value_name(by), &months, &changes, ctx.cli.order));
        return Ok(());
    }
    if rows.is_empty() {
        println!("No lead data found.");
        return Ok(());
    }
    print_leads_table(&rows, dimension.label(), &ctx.table);
    print_funnel_months(&months, ctx.cli.order, &ctx.table);
    print_comparisons("Funnel Month over Month", &changes, ctx.cli.order, &ctx.table);
    ctx.summary(&snapshot, leads.len());
    Ok(())
}

fn handle_cancellations(
    ctx: &CommandContext<'_>,
    by: CancelBy,
    repeat: usize,
) -> Result<(), AppError> {
    let snapshot = ctx.load(&[SnapshotKind::Cancellations, SnapshotKind::Sessions])?;
    let records = ctx.filter.apply(&snapshot.cancellations);
    let sessions = ctx.filter.apply(&snapshot.sessions);

    let groups = summarize_cancellations(&records, by.into());
    let peaks = cancellation_peaks(&records);
    let repeaters = repeat_cancellers(&records, repeat);
    let correlation = (!sessions.is_empty()).then(|| booking_cancellation_correlation(&sessions));

    if ctx.cli.json {
        print_json(&cancellations_json(
            &groups,
            &value_name(by),
            &peaks,
            &repeaters,
            correlation,
        ));
        return Ok(());
    }
    if groups.is_empty() {
        println!("No cancellation data found.");
        return Ok(());
    }
    print_cancellation_tables(
        &CancellationView {
            dimension_label: CancellationDimension::from(by).label(),
            groups: &groups,
            peaks: &peaks,
            repeaters: &repeaters,
            repeat_min: repeat.max(1),
            correlation,
        },
        &ctx.table,
    );
    ctx.summary(&snapshot, records.len());
    Ok(())
}

fn handle_members(ctx: &CommandContext<'_>, segment: Option<&str>) -> Result<(), AppError> {
    let wanted = segment
        .map(|name| {
            Segment::parse(name).ok_or_else(|| AppError::UnknownSegment {
                input: name.to_string(),
                expected: Segment::ALL
                    .iter()
                    .map(|s| s.label())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
        })
        .transpose()?;

    let snapshot = ctx.load(&[SnapshotKind::Checkins, SnapshotKind::Sales])?;
    let checkins = ctx.filter.apply(&snapshot.checkins);
    // Lifetime paid and compliance span the whole history, not the date window
    let sales = ctx.filter.without_dates().apply(&snapshot.sales);

    let profiles = build_member_profiles(&checkins, &sales, ctx.as_of);
    let counts = segment_counts(&profiles, &ctx.segments);
    let mut trends: HashMap<String, _> = member_trends(&checkins, ctx.as_of, &ctx.trends)
        .into_iter()
        .map(|t| (t.member_id, t.report))
        .collect();

    let rows: Vec<MemberRow> = profiles
        .into_iter()
        .map(|profile| {
            let segment = classify_segment(&profile, &ctx.segments);
            let trend = trends.remove(&profile.member_id);
            MemberRow {
                profile,
                segment,
                trend,
            }
        })
        .filter(|row| wanted.is_none_or(|s| row.segment == s))
        .collect();

    if ctx.cli.json {
        print_json(&members_json(&rows, &counts, ctx.as_of));
        return Ok(());
    }
    if counts.iter().all(|(_, n)| *n == 0) {
        println!("No member data found.");
        return Ok(());
    }
    print_segment_counts(&counts, &ctx.table);
    if !rows.is_empty() {
        print_members_table(&rows, &ctx.table);
    }
    ctx.summary(&snapshot, checkins.len() + sales.len());
    Ok(())
}

/// Run one report
pub(crate) fn handle_command(command: &Commands, ctx: &CommandContext<'_>) -> Result<(), AppError> {
    match command {
        Commands::Classes {
            by,
            sort,
            min_sessions,
            min_checked_in,
            top,
            bottom,
        } => handle_classes(ctx, *by, *sort, *min_sessions, *min_checked_in, *top, *bottom),
        Commands::Formats => handle_formats(ctx),
        Commands::Sales { by } => handle_sales(ctx, *by),
        Commands::Trends { months, yoy } => handle_trends(ctx, *months, *yoy),
        Commands::Funnel { by } => handle_funnel(ctx, *by),
        Commands::Cancellations { by, repeat } => handle_cancellations(ctx, *by, *repeat),
        Commands::Members { segment } => handle_members(ctx, segment.as_deref()),
    }
}
