use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Local, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Deserializer};
use validator::{Validate, ValidationError};

static MOBILE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{9,14}$").expect("valid mobile number regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BloodGroup {
    APositive,
    ANegative,
    BPositive,
    BNegative,
    AbPositive,
    AbNegative,
    OPositive,
    ONegative,
}

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::APositive,
        BloodGroup::ANegative,
        BloodGroup::BPositive,
        BloodGroup::BNegative,
        BloodGroup::AbPositive,
        BloodGroup::AbNegative,
        BloodGroup::OPositive,
        BloodGroup::ONegative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BloodGroup::APositive => "A+",
            BloodGroup::ANegative => "A-",
            BloodGroup::BPositive => "B+",
            BloodGroup::BNegative => "B-",
            BloodGroup::AbPositive => "AB+",
            BloodGroup::AbNegative => "AB-",
            BloodGroup::OPositive => "O+",
            BloodGroup::ONegative => "O-",
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        BloodGroup::ALL
            .into_iter()
            .find(|group| group.as_str() == wanted)
            .ok_or_else(|| format!("unknown blood group '{}'", s.trim()))
    }
}

/// One person's details as submitted by the form.
///
/// Optional strings that arrive blank are stored as `None` so the serializer
/// can print its placeholder for them.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FormRecord {
    #[validate(length(min = 3, message = "Full name is required"))]
    pub full_name: String,

    #[validate(custom(function = "validate_dob"))]
    pub dob: NaiveDate,

    pub gender: Gender,

    #[serde(default, deserialize_with = "blank_blood_group")]
    pub blood_group: Option<BloodGroup>,

    #[validate(length(min = 2, message = "Nationality is required"))]
    pub nationality: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters."))]
    pub password: String,

    #[validate(regex(path = *MOBILE_NUMBER, message = "Please enter a valid mobile number."))]
    pub mobile_number: String,

    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,

    #[validate(length(min = 5, message = "Address is required."))]
    pub address: String,

    #[validate(length(min = 1, message = "Roll number is required."))]
    pub roll_number: String,

    #[validate(length(min = 2, message = "Course/Degree is required."))]
    pub course: String,

    #[validate(length(min = 2, message = "Department is required."))]
    pub department: String,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub father_name: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub father_occupation: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub mother_name: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub mother_occupation: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub hobbies: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub other_info: Option<String>,
}

fn validate_dob(dob: &NaiveDate) -> Result<(), ValidationError> {
    let earliest = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN);
    let today = Local::now().date_naive();

    if *dob < earliest || *dob > today {
        let mut err = ValidationError::new("dob_range");
        err.message = Some("Date of birth must be between 1900-01-01 and today.".into());
        return Err(err);
    }
    Ok(())
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn blank_blood_group<'de, D>(deserializer: D) -> Result<Option<BloodGroup>, D::Error>
where
    D: Deserializer<'de>,
{
    match blank_as_none(deserializer)? {
        Some(raw) => raw.parse().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_record;
    use serde_json::json;

    fn messages(record: &FormRecord) -> Vec<String> {
        let errors = match record.validate() {
            Ok(()) => return Vec::new(),
            Err(errors) => errors,
        };
        errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .collect()
    }

    #[test]
    fn sample_record_is_valid() {
        assert!(sample_record().validate().is_ok());
    }

    #[test]
    fn five_digit_mobile_number_is_rejected() {
        let mut record = sample_record();
        record.mobile_number = "12345".to_string();

        assert_eq!(messages(&record), vec!["Please enter a valid mobile number."]);
    }

    #[test]
    fn mobile_number_accepts_country_prefix() {
        let mut record = sample_record();
        record.mobile_number = "+919876543210".to_string();
        assert!(record.validate().is_ok());

        record.mobile_number = "0987654321".to_string();
        assert!(record.validate().is_err());
    }

    #[test]
    fn short_fields_and_bad_email_report_each_message() {
        let mut record = sample_record();
        record.password = "abc".to_string();
        record.email = "not-an-email".to_string();
        record.full_name = "Al".to_string();

        let found = messages(&record);
        assert_eq!(found.len(), 3);
        assert!(found.contains(&"Password must be at least 6 characters.".to_string()));
        assert!(found.contains(&"Please enter a valid email address.".to_string()));
        assert!(found.contains(&"Full name is required".to_string()));
    }

    #[test]
    fn future_date_of_birth_is_rejected() {
        let mut record = sample_record();
        record.dob = Local::now().date_naive() + chrono::Days::new(1);
        assert!(record.validate().is_err());

        record.dob = NaiveDate::from_ymd_opt(1899, 12, 31).unwrap();
        assert!(record.validate().is_err());
    }

    #[test]
    fn blank_optional_fields_deserialize_as_absent() {
        let record: FormRecord = serde_json::from_value(json!({
            "fullName": "Santhosh A",
            "dob": "2003-04-21",
            "gender": "Male",
            "bloodGroup": "",
            "nationality": "Indian",
            "password": "secret123",
            "mobileNumber": "9876543210",
            "email": "santhosh@example.com",
            "address": "123 Main St, Coimbatore",
            "rollNumber": "URK21CS100",
            "course": "B.Sc Computer Science",
            "department": "School of Computing",
            "fatherName": "   ",
            "hobbies": "Cricket"
        }))
        .unwrap();

        assert_eq!(record.blood_group, None);
        assert_eq!(record.father_name, None);
        assert_eq!(record.mother_name, None);
        assert_eq!(record.hobbies.as_deref(), Some("Cricket"));
    }

    #[test]
    fn blood_group_parses_display_form() {
        assert_eq!("ab-".parse::<BloodGroup>(), Ok(BloodGroup::AbNegative));
        assert_eq!("O+".parse::<BloodGroup>(), Ok(BloodGroup::OPositive));
        assert!("C+".parse::<BloodGroup>().is_err());
    }
}
