//! CLI subcommand definitions
//!
//! Each report is one subcommand; the value enums below map onto the
//! engine's dimension and metric enums so clap stays out of the library.

use clap::{Subcommand, ValueEnum};

use studiostats::core::{
    CancellationDimension, LeadDimension, SalesDimension, SessionDimension, SortMetric,
};

/// Main CLI commands
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Commands {
    /// Class session performance by dimension (default)
    Classes {
        /// Dimension to group sessions by
        #[arg(short, long, value_enum, default_value = "format")]
        by: SessionBy,
        /// Metric to rank groups by
        #[arg(long, value_enum, default_value = "revenue")]
        sort: SortBy,
        /// Drop groups with fewer sessions
        #[arg(long, default_value_t = 0, value_name = "N")]
        min_sessions: usize,
        /// Drop groups with fewer total check-ins
        #[arg(long, default_value_t = 0, value_name = "N")]
        min_checked_in: u64,
        /// Only show the first N groups
        #[arg(long, value_name = "N", conflicts_with = "bottom")]
        top: Option<usize>,
        /// Only show the last N groups of the ranking
        #[arg(long, value_name = "N")]
        bottom: Option<usize>,
    },
    /// Profitability vs popularity quadrants of class formats
    Formats,
    /// Sales by product, category, location, seller or month
    Sales {
        #[arg(short, long, value_enum, default_value = "product")]
        by: SalesBy,
    },
    /// Monthly sales and session tables with period-over-period changes
    Trends {
        /// Trailing window length in months
        #[arg(short, long, value_enum, default_value = "6")]
        months: Window,
        /// Compare each month with the same month a year earlier
        #[arg(long)]
        yoy: bool,
    },
    /// Lead funnel by source, stage, center, associate or month
    Funnel {
        #[arg(short, long, value_enum, default_value = "source")]
        by: LeadBy,
    },
    /// Late cancellations, peak times and repeat cancellers
    Cancellations {
        #[arg(short, long, value_enum, default_value = "location")]
        by: CancelBy,
        /// Minimum cancellations to list a member as a repeat canceller
        #[arg(long, default_value_t = 3, value_name = "N")]
        repeat: usize,
    },
    /// Member segments with visit trend and churn risk
    Members {
        /// Only list members in this segment (e.g. "at-risk", "high-value")
        #[arg(long, value_name = "NAME")]
        segment: Option<String>,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Classes {
            by: SessionBy::default(),
            sort: SortBy::default(),
            min_sessions: 0,
            min_checked_in: 0,
            top: None,
            bottom: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub(crate) enum SessionBy {
    #[default]
    Format,
    Class,
    Trainer,
    Location,
    Day,
    Time,
    Month,
}

impl From<SessionBy> for SessionDimension {
    fn from(by: SessionBy) -> Self {
        match by {
            SessionBy::Format => SessionDimension::Format,
            SessionBy::Class => SessionDimension::Class,
            SessionBy::Trainer => SessionDimension::Trainer,
            SessionBy::Location => SessionDimension::Location,
            SessionBy::Day => SessionDimension::DayOfWeek,
            SessionBy::Time => SessionDimension::TimeSlot,
            SessionBy::Month => SessionDimension::Month,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub(crate) enum SortBy {
    #[default]
    Revenue,
    Sessions,
    FillRate,
    RevenuePerSeat,
    RevenuePerSession,
    EmptySessions,
    Attendance,
    Efficiency,
}

impl From<SortBy> for SortMetric {
    fn from(by: SortBy) -> Self {
        match by {
            SortBy::Revenue => SortMetric::Revenue,
            SortBy::Sessions => SortMetric::Sessions,
            SortBy::FillRate => SortMetric::FillRate,
            SortBy::RevenuePerSeat => SortMetric::RevenuePerSeat,
            SortBy::RevenuePerSession => SortMetric::RevenuePerSession,
            SortBy::EmptySessions => SortMetric::EmptySessions,
            SortBy::Attendance => SortMetric::Attendance,
            SortBy::Efficiency => SortMetric::Efficiency,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub(crate) enum SalesBy {
    #[default]
    Product,
    Category,
    Location,
    Seller,
    Month,
}

impl From<SalesBy> for SalesDimension {
    fn from(by: SalesBy) -> Self {
        match by {
            SalesBy::Product => SalesDimension::Product,
            SalesBy::Category => SalesDimension::Category,
            SalesBy::Location => SalesDimension::Location,
            SalesBy::Seller => SalesDimension::SoldBy,
            SalesBy::Month => SalesDimension::Month,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub(crate) enum LeadBy {
    #[default]
    Source,
    Stage,
    Center,
    Associate,
    Month,
}

impl From<LeadBy> for LeadDimension {
    fn from(by: LeadBy) -> Self {
        match by {
            LeadBy::Source => LeadDimension::Source,
            LeadBy::Stage => LeadDimension::Stage,
            LeadBy::Center => LeadDimension::Center,
            LeadBy::Associate => LeadDimension::Associate,
            LeadBy::Month => LeadDimension::Month,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub(crate) enum CancelBy {
    #[default]
    Location,
    Trainer,
    Class,
    Member,
}

impl From<CancelBy> for CancellationDimension {
    fn from(by: CancelBy) -> Self {
        match by {
            CancelBy::Location => CancellationDimension::Location,
            CancelBy::Trainer => CancellationDimension::Trainer,
            CancelBy::Class => CancellationDimension::Class,
            CancelBy::Member => CancellationDimension::Member,
        }
    }
}

/// Trailing window for the trends report
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub(crate) enum Window {
    #[default]
    #[value(name = "6")]
    Six,
    #[value(name = "12")]
    Twelve,
}

impl Window {
    pub(crate) fn months(self) -> usize {
        match self {
            Window::Six => 6,
            Window::Twelve => 12,
        }
    }
}

/// Resolve the subcommand, falling back to the default classes report
pub(crate) fn parse_command(cmd: Option<Commands>) -> Commands {
    cmd.unwrap_or_default()
}
