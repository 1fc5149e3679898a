// Display formatting shared by the HTML and terminal front ends

/// Whole-dollar currency with thousands separators, e.g. `$210,000`
pub fn format_currency(value: f64) -> String {
    let rounded = format!("{:.0}", value.abs());
    let sign = if value < 0.0 && rounded != "0" { "-" } else { "" };
    format!("{}${}", sign, group_thousands(&rounded))
}

/// One-decimal percentage, e.g. `19.0%` or `-4.8%`
pub fn format_percent(value: f64) -> String {
    let formatted = format!("{:.1}", value);
    if formatted == "-0.0" {
        return "0.0%".to_string();
    }
    format!("{}%", formatted)
}

/// Compact axis label, e.g. `$250K` or `$1.2M`
pub fn format_axis_currency(value: f64) -> String {
    let abs = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };

    if abs >= 1_000_000.0 {
        let millions = abs / 1_000_000.0;
        if (millions - millions.round()).abs() < 1e-9 {
            format!("{}${:.0}M", sign, millions)
        } else {
            format!("{}${:.1}M", sign, millions)
        }
    } else if abs >= 1_000.0 {
        format!("{}${:.0}K", sign, abs / 1_000.0)
    } else {
        format!("{}${:.0}", sign, abs)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Escape text for HTML element content and attribute values
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(210_000.0), "$210,000");
        assert_eq!(format_currency(1_234_567.4), "$1,234,567");
        assert_eq!(format_currency(999.0), "$999");
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(-1_500.0), "-$1,500");
        assert_eq!(format_currency(-0.2), "$0");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(19.0), "19.0%");
        assert_eq!(format_percent(3.46), "3.5%");
        assert_eq!(format_percent(-4.8), "-4.8%");
        assert_eq!(format_percent(-0.01), "0.0%");
    }

    #[test]
    fn test_format_axis_currency() {
        assert_eq!(format_axis_currency(250_000.0), "$250K");
        assert_eq!(format_axis_currency(1_000_000.0), "$1M");
        assert_eq!(format_axis_currency(1_500_000.0), "$1.5M");
        assert_eq!(format_axis_currency(0.0), "$0");
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
    }
}
