use chrono::{Datelike, NaiveDate};

use super::record::FormRecord;

pub const PLACEHOLDER: &str = "N/A";

/// Turns a validated record into the labelled text block carried by the QR code.
/// The viewer relies on `Password:` being the first line.
pub fn serialize(record: &FormRecord) -> String {
    let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| PLACEHOLDER.to_string());

    let lines = [
        ("Password", record.password.clone()),
        ("Full Name", record.full_name.clone()),
        ("Roll Number", record.roll_number.clone()),
        ("Date of Birth", long_date(record.dob)),
        ("Gender", record.gender.to_string()),
        ("Mobile Number", record.mobile_number.clone()),
        ("Email Address", record.email.clone()),
        ("Course / Degree", record.course.clone()),
        ("Department", record.department.clone()),
        (
            "Blood Group",
            record
                .blood_group
                .map(|group| group.to_string())
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
        ),
        ("Nationality", record.nationality.clone()),
        ("Address", record.address.clone()),
        ("Father's Name", optional(&record.father_name)),
        ("Father's Occupation", optional(&record.father_occupation)),
        ("Mother's Name", optional(&record.mother_name)),
        ("Mother's Occupation", optional(&record.mother_occupation)),
        ("Hobbies", optional(&record.hobbies)),
        ("Additional Info", optional(&record.other_info)),
    ];

    lines
        .iter()
        .map(|(label, value)| format!("{}: {}", label, value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// "April 21st, 2003"
fn long_date(date: NaiveDate) -> String {
    format!(
        "{} {}{}, {}",
        date.format("%B"),
        date.day(),
        ordinal_suffix(date.day()),
        date.year()
    )
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
