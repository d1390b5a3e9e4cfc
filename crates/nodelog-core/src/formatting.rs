//! Number formatting for report cells.
//!
//! Reports group digits in threes (`1,234,567`) unless the caller asks for
//! raw numbers, in which case plain `Display` output is used.

/// How numeric cells are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberStyle {
    /// Thousands separated with `,`.
    #[default]
    Grouped,
    /// Plain digits, suitable for piping into other tools.
    Raw,
}

impl NumberStyle {
    /// Render an integer in this style.
    pub fn int(self, value: i64) -> String {
        match self {
            NumberStyle::Grouped => format_int(value),
            NumberStyle::Raw => value.to_string(),
        }
    }

    /// Render a float with `decimals` places in this style.
    pub fn float(self, value: f64, decimals: u32) -> String {
        match self {
            NumberStyle::Grouped => format_number(value, decimals),
            NumberStyle::Raw => format!("{:.prec$}", value, prec = decimals as usize),
        }
    }
}

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use nodelog_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Nudge by half an ULP at the target precision so exact midpoints round up.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();
    let grouped = group_thousands(&integer_part.to_string());

    let result = if decimals == 0 {
        grouped
    } else {
        // "0.50" -> ".50"
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        format!("{}{}", grouped, &frac_str[1..])
    };

    if negative && rounded != 0.0 {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format an integer with thousands separators.
///
/// ```
/// use nodelog_core::formatting::format_int;
///
/// assert_eq!(format_int(408_877_851), "408,877,851");
/// assert_eq!(format_int(-1_000), "-1,000");
/// ```
pub fn format_int(value: i64) -> String {
    let grouped = group_thousands(&value.unsigned_abs().to_string());
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = s.len() % 3;
    for (i, c) in s.chars().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}
