use std::io::{self, Write};

use products_hr::{Employee, EmployeeKey};

pub const NO_MATCHES: &str = "No employees match your search criteria";

pub fn write_rows<W, K>(out: &mut W, employees: &[Employee<K>], empty: &str) -> io::Result<()>
where
    W: Write,
    K: EmployeeKey,
{
    if employees.is_empty() {
        return writeln!(out, "{empty}");
    }
    for employee in employees {
        writeln!(out, "{employee}")?;
    }
    Ok(())
}

pub fn average_line(department: &str, average: f64) -> String {
    format!("Average Salary in {department} Department: ${average:.2}")
}

pub fn raise_line(amount: f64, count: usize, min_rating: f64) -> String {
    let noun = if count == 1 { "employee" } else { "employees" };
    format!("Raise of ${amount:.2} applied to {count} {noun} with rating >= {min_rating:.1}")
}

/// `$1,234,567.89` style amounts for summaries.
pub fn format_currency(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, digit) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}
