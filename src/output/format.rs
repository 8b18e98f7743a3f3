use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ContentArrangement, Table, TableComponent,
    modifiers::UTF8_SOLID_INNER_BORDERS, presets::UTF8_FULL,
};
use serde::Serialize;

use studiostats::error::AppError;

#[derive(Debug, Clone, Copy)]
pub(crate) struct NumberFormat {
    group_sep: char,
    decimal_sep: char,
}

impl Default for NumberFormat {
    fn default() -> Self {
        NumberFormat {
            group_sep: ',',
            decimal_sep: '.',
        }
    }
}

impl NumberFormat {
    pub(crate) fn from_locale(locale: Option<&str>) -> Result<Self, AppError> {
        let Some(raw) = locale else {
            return Ok(NumberFormat::default());
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(NumberFormat::default());
        }
        let base = trimmed
            .split(['-', '_'])
            .next()
            .unwrap_or(trimmed)
            .to_ascii_lowercase();

        let format = match base.as_str() {
            "de" => NumberFormat {
                group_sep: '.',
                decimal_sep: ',',
            },
            "fr" | "ru" => NumberFormat {
                group_sep: ' ',
                decimal_sep: ',',
            },
            "en" | "hi" | "zh" => NumberFormat::default(),
            _ => {
                return Err(AppError::UnsupportedLocale {
                    input: trimmed.to_string(),
                });
            }
        };

        Ok(format)
    }
}

/// Display settings shared by every table
#[derive(Debug, Clone, Copy)]
pub(crate) struct TableOptions<'a> {
    pub(crate) use_color: bool,
    pub(crate) number_format: NumberFormat,
    pub(crate) currency: &'a str,
}

impl TableOptions<'_> {
    pub(crate) fn count(&self, n: usize) -> String {
        format_number(i64::try_from(n).unwrap_or(i64::MAX), self.number_format)
    }

    pub(crate) fn money(&self, amount: f64) -> String {
        format!("{}{}", self.currency, format_decimal(amount, 2, self.number_format))
    }

    pub(crate) fn pct(&self, value: f64) -> String {
        format!("{}%", format_decimal(value, 1, self.number_format))
    }

    pub(crate) fn decimal(&self, value: f64) -> String {
        format_decimal(value, 1, self.number_format)
    }

    pub(crate) fn accent(&self, color: Color) -> Option<Color> {
        self.use_color.then_some(color)
    }
}

/// Insert the group separator every three digits from the right
fn group_digits(digits: &str, sep: char) -> String {
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(sep);
        }
        result.push(c);
    }
    result
}

pub(crate) fn format_number(n: i64, format: NumberFormat) -> String {
    let sign = if n < 0 { "-" } else { "" };
    let digits = n.unsigned_abs().to_string();
    format!("{sign}{}", group_digits(&digits, format.group_sep))
}

/// Grouped integer part plus `places` decimals in the locale's separators
pub(crate) fn format_decimal(value: f64, places: usize, format: NumberFormat) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }
    let fixed = format!("{:.*}", places, value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let sign = if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    let mut out = format!("{sign}{}", group_digits(int_part, format.group_sep));
    if !frac_part.is_empty() {
        out.push(format.decimal_sep);
        out.push_str(frac_part);
    }
    out
}

pub(crate) fn styled_cell(text: &str, color: Option<Color>, bold: bool) -> Cell {
    let mut cell = Cell::new(text);
    if let Some(c) = color {
        cell = cell.fg(c);
    }
    if bold {
        cell = cell.add_attribute(Attribute::Bold);
    }
    cell
}

pub(crate) fn header_cell(text: &str, use_color: bool) -> Cell {
    let mut cell = Cell::new(text).add_attribute(Attribute::Bold);
    if use_color {
        cell = cell.fg(Color::Cyan);
    }
    cell
}

pub(crate) fn header_row(labels: &[&str], use_color: bool) -> Vec<Cell> {
    labels.iter().map(|l| header_cell(l, use_color)).collect()
}

/// Replace the double-line header separator (╞═╪═╡) with single-line (├─┼─┤)
fn normalize_header_separator(table: &mut Table) {
    table.set_style(TableComponent::HeaderLines, '─');
    table.set_style(TableComponent::LeftHeaderIntersection, '├');
    table.set_style(TableComponent::MiddleHeaderIntersections, '┼');
    table.set_style(TableComponent::RightHeaderIntersection, '┤');
}

/// Create a table with the standard preset, inner borders, and normalized header separator.
pub(crate) fn create_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    normalize_header_separator(&mut table);
    table
}

pub(crate) fn right_cell(text: &str, color: Option<Color>, bold: bool) -> Cell {
    let mut cell = Cell::new(text).set_alignment(CellAlignment::Right);
    if let Some(c) = color {
        cell = cell.fg(c);
    }
    if bold {
        cell = cell.add_attribute(Attribute::Bold);
    }
    cell
}

/// Color for a signed change: green up, red down
pub(crate) fn change_color(change: f64, use_color: bool) -> Option<Color> {
    if !use_color || change == 0.0 {
        None
    } else if change > 0.0 {
        Some(Color::Green)
    } else {
        Some(Color::Red)
    }
}

pub(crate) fn print_title(title: &str) {
    println!("\n  {title}\n");
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Failed to serialize JSON output: {e}");
        "{}".to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_with_commas() {
        let fmt = NumberFormat::default();
        assert_eq!(format_number(0, fmt), "0");
        assert_eq!(format_number(999, fmt), "999");
        assert_eq!(format_number(1000, fmt), "1,000");
        assert_eq!(format_number(1_234_567, fmt), "1,234,567");
        assert_eq!(format_number(-1234, fmt), "-1,234");
    }

    #[test]
    fn format_decimal_places_and_separators() {
        let fmt = NumberFormat::default();
        assert_eq!(format_decimal(1234.567, 2, fmt), "1,234.57");
        assert_eq!(format_decimal(0.0, 1, fmt), "0.0");
        assert_eq!(format_decimal(-25.0, 1, fmt), "-25.0");
        assert_eq!(format_decimal(-0.01, 1, fmt), "0.0");
        assert_eq!(format_decimal(12.0, 0, fmt), "12");
        assert_eq!(format_decimal(f64::NAN, 1, fmt), "N/A");
        assert_eq!(
            format_decimal(1e19, 2, fmt),
            "10,000,000,000,000,000,000.00"
        );
        assert_eq!(format_number(i64::MIN, fmt), "-9,223,372,036,854,775,808");

        let de = NumberFormat::from_locale(Some("de")).unwrap();
        assert_eq!(format_decimal(1234.5, 2, de), "1.234,50");
    }

    #[test]
    fn table_options_helpers() {
        let opts = TableOptions {
            use_color: false,
            number_format: NumberFormat::default(),
            currency: "₹",
        };
        assert_eq!(opts.money(12500.0), "₹12,500.00");
        assert_eq!(opts.pct(85.24), "85.2%");
        assert_eq!(opts.count(1500), "1,500");
        assert!(opts.accent(Color::Green).is_none());
    }

    #[test]
    fn from_locale_variants() {
        let fmt = NumberFormat::from_locale(None).unwrap();
        assert_eq!(format_number(1000, fmt), "1,000");
        let fmt = NumberFormat::from_locale(Some("fr")).unwrap();
        assert_eq!(format_number(1000, fmt), "1 000");
        let fmt = NumberFormat::from_locale(Some("de-DE")).unwrap();
        assert_eq!(format_number(1000, fmt), "1.000");
        assert!(NumberFormat::from_locale(Some("ja")).is_err());
    }

    #[test]
    fn change_color_by_sign() {
        assert_eq!(change_color(5.0, true), Some(Color::Green));
        assert_eq!(change_color(-5.0, true), Some(Color::Red));
        assert_eq!(change_color(0.0, true), None);
        assert_eq!(change_color(5.0, false), None);
    }
}
