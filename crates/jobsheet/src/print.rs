//! Printable job sheet and amounts spelled out in words.

use std::fmt::Write as _;

use crate::job::{JobRecord, format_amount};

const BELOW_TWENTY: [&str; 19] = [
    "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 8] = [
    "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const SCALES: [&str; 7] = [
    "",
    "Thousand",
    "Million",
    "Billion",
    "Trillion",
    "Quadrillion",
    "Quintillion",
];

/// Days after which uncollected products are no longer the shop's liability.
pub const COLLECTION_DAYS: u32 = 60;

/// Width of the rendered sheet.
const SHEET_WIDTH: usize = 64;

fn below_thousand(mut n: u64, words: &mut Vec<&'static str>) {
    if n >= 100 {
        words.push(BELOW_TWENTY[(n / 100 - 1) as usize]);
        words.push("Hundred");
        n %= 100;
    }
    if n >= 20 {
        words.push(TENS[(n / 10 - 2) as usize]);
        n %= 10;
    }
    if n > 0 {
        words.push(BELOW_TWENTY[(n - 1) as usize]);
    }
}

/// Spells out `n` in English, short scale, without "and".
///
/// ```rust
/// use jobsheet::print::amount_in_words;
///
/// assert_eq!(amount_in_words(1234), "One Thousand Two Hundred Thirty Four");
/// assert_eq!(amount_in_words(0), "Zero");
/// ```
#[must_use]
pub fn amount_in_words(n: u64) -> String {
    if n == 0 {
        return "Zero".to_string();
    }
    let mut chunks = Vec::new();
    let mut rest = n;
    while rest > 0 {
        chunks.push(rest % 1000);
        rest /= 1000;
    }

    let mut words = Vec::new();
    for (scale, &chunk) in chunks.iter().enumerate().rev() {
        if chunk == 0 {
            continue;
        }
        below_thousand(chunk, &mut words);
        if !SCALES[scale].is_empty() {
            words.push(SCALES[scale]);
        }
    }
    words.join(" ")
}

/// `"Rs. 1500"`, or `-` when the amount is missing or zero.
#[must_use]
pub fn amount_figures(amount: Option<f64>) -> String {
    match amount {
        Some(value) if value != 0.0 => format!("Rs. {}", format_amount(value)),
        _ => "-".to_string(),
    }
}

/// `"(One Thousand Five Hundred Only)"`, or `-` when missing or zero.
///
/// Fractions are dropped; negative amounts have no spelled form.
#[must_use]
pub fn amount_words(amount: Option<f64>) -> String {
    match amount {
        Some(value) if value >= 1.0 => {
            // Whole rupees only; the float-to-int cast saturates.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let whole = value.trunc() as u64;
            format!("({} Only)", amount_in_words(whole))
        }
        _ => "-".to_string(),
    }
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "-".repeat(title.len()));
}

fn field(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "{label:<18}{value}");
}

/// Renders a job as a plain-text sheet for printing or handing over.
#[must_use]
pub fn render_print_sheet(job: &JobRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:^SHEET_WIDTH$}", "JOB SHEET");
    let _ = writeln!(out, "{}", "=".repeat(SHEET_WIDTH));
    field(&mut out, "Job No", &job.job_id);
    field(&mut out, "Engineer", &job.engineer);
    field(&mut out, "In Date", &job.in_date);
    field(&mut out, "Out Date", &job.out_date);

    heading(&mut out, "CUSTOMER DETAILS");
    field(&mut out, "Name", &job.name);
    field(&mut out, "Mobile", &job.mobile);
    field(&mut out, "Email", &job.email);
    field(&mut out, "Address", &job.address);

    heading(&mut out, "PRODUCT DETAILS");
    field(&mut out, "Asset Type", &job.assets);
    field(&mut out, "Product Type", &job.product_make);
    field(&mut out, "Serial No", &job.serial_no);
    field(&mut out, "Description", &job.description);
    field(&mut out, "Job Status", &job.job_status);
    field(&mut out, "Fault Type", &job.fault_type);
    field(&mut out, "Fault Description", &job.fault_desc);

    heading(&mut out, "PROVIDED SOLUTION");
    let _ = writeln!(out, "{}", job.solution_provided);

    let _ = writeln!(out);
    field(&mut out, "AMOUNT", &amount_figures(job.amount));
    field(&mut out, "(in words)", &amount_words(job.amount));

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Terms & Conditions: we are not responsible for products not collected\n\
         within {COLLECTION_DAYS} days of the date this job sheet is issued."
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "{:>SHEET_WIDTH$}", "Customer Signature");
    out
}
