use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HrError, HrResult};

/// Attributes of an employee record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Id,
    Name,
    Department,
    Salary,
    Rating,
    Experience,
    Active,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Name => "name",
            Field::Department => "department",
            Field::Salary => "salary",
            Field::Rating => "rating",
            Field::Experience => "experience",
            Field::Active => "active",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = HrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "id" => Ok(Field::Id),
            "name" => Ok(Field::Name),
            "department" => Ok(Field::Department),
            "salary" => Ok(Field::Salary),
            "rating" => Ok(Field::Rating),
            "experience" => Ok(Field::Experience),
            "active" => Ok(Field::Active),
            _ => Err(HrError::UnknownField(s.to_string())),
        }
    }
}

/// A change to exactly one attribute of one record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum FieldUpdate {
    Name(String),
    Department(String),
    Salary(f64),
    Rating(f64),
    Experience(i64),
    Active(bool),
}

impl FieldUpdate {
    pub fn field(&self) -> Field {
        match self {
            FieldUpdate::Name(_) => Field::Name,
            FieldUpdate::Department(_) => Field::Department,
            FieldUpdate::Salary(_) => Field::Salary,
            FieldUpdate::Rating(_) => Field::Rating,
            FieldUpdate::Experience(_) => Field::Experience,
            FieldUpdate::Active(_) => Field::Active,
        }
    }

    /// Build an update from a field name and raw text, as typed by a user.
    ///
    /// Field names match case-insensitively. Text that cannot be read as the
    /// field's type yields [`HrError::WrongType`]; range checks are left to
    /// the record's setters.
    pub fn parse(field: &str, raw: &str) -> HrResult<Self> {
        let field: Field = field.parse()?;
        let wrong_type = || HrError::WrongType {
            field,
            value: raw.to_string(),
        };
        match field {
            Field::Id => Err(HrError::validation(Field::Id, "cannot be changed")),
            Field::Name => Ok(FieldUpdate::Name(raw.to_string())),
            Field::Department => Ok(FieldUpdate::Department(raw.to_string())),
            Field::Salary => raw
                .trim()
                .parse()
                .map(FieldUpdate::Salary)
                .map_err(|_| wrong_type()),
            Field::Rating => raw
                .trim()
                .parse()
                .map(FieldUpdate::Rating)
                .map_err(|_| wrong_type()),
            Field::Experience => raw
                .trim()
                .parse()
                .map(FieldUpdate::Experience)
                .map_err(|_| wrong_type()),
            Field::Active => parse_flag(raw)
                .map(FieldUpdate::Active)
                .ok_or_else(wrong_type),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_are_case_insensitive() {
        assert_eq!("Salary".parse::<Field>().unwrap(), Field::Salary);
        assert_eq!("RATING".parse::<Field>().unwrap(), Field::Rating);
        assert_eq!(
            "bonus".parse::<Field>(),
            Err(HrError::UnknownField("bonus".into()))
        );
    }

    #[test]
    fn parse_reads_typed_values() {
        assert_eq!(
            FieldUpdate::parse("salary", "55000").unwrap(),
            FieldUpdate::Salary(55000.0)
        );
        assert_eq!(
            FieldUpdate::parse("experience", "-2").unwrap(),
            FieldUpdate::Experience(-2)
        );
        assert_eq!(
            FieldUpdate::parse("active", "No").unwrap(),
            FieldUpdate::Active(false)
        );
        assert_eq!(
            FieldUpdate::parse("name", "Jane Smith").unwrap(),
            FieldUpdate::Name("Jane Smith".into())
        );
    }

    #[test]
    fn parse_rejects_wrong_types() {
        let err = FieldUpdate::parse("salary", "lots").unwrap_err();
        assert_eq!(
            err,
            HrError::WrongType {
                field: Field::Salary,
                value: "lots".into()
            }
        );
        assert!(FieldUpdate::parse("experience", "4.5").is_err());
        assert!(FieldUpdate::parse("active", "maybe").is_err());
    }

    #[test]
    fn id_and_unknown_fields_are_rejected() {
        assert!(FieldUpdate::parse("id", "7").unwrap_err().is_validation());
        assert!(matches!(
            FieldUpdate::parse("bonus", "10"),
            Err(HrError::UnknownField(_))
        ));
    }

    #[test]
    fn update_reports_its_field() {
        assert_eq!(FieldUpdate::Rating(4.0).field(), Field::Rating);
        assert_eq!(FieldUpdate::Department("HR".into()).field(), Field::Department);
    }
}
