use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{HrError, HrResult};
use crate::field::{Field, FieldUpdate};

/// Key type usable as an employee id.
pub trait EmployeeKey: Clone + Eq + Hash + fmt::Display + fmt::Debug {
    /// Blank keys are rejected at construction.
    fn is_blank(&self) -> bool {
        false
    }
}

macro_rules! numeric_keys {
    ($($ty:ty),*) => {
        $(impl EmployeeKey for $ty {})*
    };
}

numeric_keys!(u16, u32, u64, usize, i32, i64);

impl EmployeeKey for String {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

/// Unvalidated employee attributes, as read from input.
#[derive(Clone, Debug, Deserialize)]
pub struct EmployeeRecord<K> {
    pub id: K,
    pub name: String,
    pub department: String,
    pub salary: f64,
    pub performance_rating: f64,
    pub years_of_experience: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// One employee. Fields are private so every write goes through validation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(
    try_from = "EmployeeRecord<K>",
    bound(deserialize = "K: EmployeeKey + Deserialize<'de>")
)]
pub struct Employee<K> {
    id: K,
    name: String,
    department: String,
    salary: f64,
    performance_rating: f64,
    years_of_experience: u32,
    is_active: bool,
}

impl<K: EmployeeKey> Employee<K> {
    pub fn new(
        id: K,
        name: impl Into<String>,
        department: impl Into<String>,
        salary: f64,
        performance_rating: f64,
        years_of_experience: i64,
        is_active: bool,
    ) -> HrResult<Self> {
        if id.is_blank() {
            return Err(HrError::validation(Field::Id, "cannot be empty"));
        }
        Ok(Self {
            id,
            name: check_text(Field::Name, name.into())?,
            department: check_text(Field::Department, department.into())?,
            salary: check_salary(salary)?,
            performance_rating: check_rating(performance_rating)?,
            years_of_experience: check_experience(years_of_experience)?,
            is_active,
        })
    }

    pub fn from_record(record: EmployeeRecord<K>) -> HrResult<Self> {
        Self::new(
            record.id,
            record.name,
            record.department,
            record.salary,
            record.performance_rating,
            record.years_of_experience,
            record.is_active,
        )
    }

    pub fn id(&self) -> &K {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn department(&self) -> &str {
        &self.department
    }

    pub fn salary(&self) -> f64 {
        self.salary
    }

    pub fn performance_rating(&self) -> f64 {
        self.performance_rating
    }

    pub fn years_of_experience(&self) -> u32 {
        self.years_of_experience
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> HrResult<()> {
        self.name = check_text(Field::Name, name.into())?;
        Ok(())
    }

    pub fn set_department(&mut self, department: impl Into<String>) -> HrResult<()> {
        self.department = check_text(Field::Department, department.into())?;
        Ok(())
    }

    pub fn set_salary(&mut self, salary: f64) -> HrResult<()> {
        self.salary = check_salary(salary)?;
        Ok(())
    }

    pub fn set_performance_rating(&mut self, rating: f64) -> HrResult<()> {
        self.performance_rating = check_rating(rating)?;
        Ok(())
    }

    pub fn set_years_of_experience(&mut self, years: i64) -> HrResult<()> {
        self.years_of_experience = check_experience(years)?;
        Ok(())
    }

    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    /// Route an update to the matching setter.
    pub fn apply(&mut self, update: FieldUpdate) -> HrResult<()> {
        match update {
            FieldUpdate::Name(name) => self.set_name(name),
            FieldUpdate::Department(department) => self.set_department(department),
            FieldUpdate::Salary(salary) => self.set_salary(salary),
            FieldUpdate::Rating(rating) => self.set_performance_rating(rating),
            FieldUpdate::Experience(years) => self.set_years_of_experience(years),
            FieldUpdate::Active(active) => {
                self.set_active(active);
                Ok(())
            }
        }
    }

    /// More experienced employees order first.
    pub fn cmp_by_experience(&self, other: &Self) -> Ordering {
        other.years_of_experience.cmp(&self.years_of_experience)
    }

    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl<K: EmployeeKey> TryFrom<EmployeeRecord<K>> for Employee<K> {
    type Error = HrError;

    fn try_from(record: EmployeeRecord<K>) -> Result<Self, Self::Error> {
        Self::from_record(record)
    }
}

impl<K: EmployeeKey> fmt::Display for Employee<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} | ${:.2} | Rating: {:.1} | Exp: {} yrs | Active: {}",
            self.id,
            self.name,
            self.department,
            self.salary,
            self.performance_rating,
            self.years_of_experience,
            if self.is_active { "Yes" } else { "No" }
        )
    }
}

impl<K: PartialEq> PartialEq for Employee<K> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<K: Eq> Eq for Employee<K> {}

impl<K: Hash> Hash for Employee<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

fn check_text(field: Field, value: String) -> HrResult<String> {
    if value.trim().is_empty() {
        return Err(HrError::validation(field, "cannot be empty"));
    }
    Ok(value)
}

fn check_salary(salary: f64) -> HrResult<f64> {
    if !salary.is_finite() {
        return Err(HrError::validation(Field::Salary, "must be a finite number"));
    }
    if salary < 0.0 {
        return Err(HrError::validation(Field::Salary, "cannot be negative"));
    }
    // folds -0.0 into 0.0
    Ok(salary + 0.0)
}

fn check_rating(rating: f64) -> HrResult<f64> {
    if !(0.0..=5.0).contains(&rating) {
        return Err(HrError::validation(
            Field::Rating,
            "must be between 0 and 5",
        ));
    }
    Ok(rating + 0.0)
}

fn check_experience(years: i64) -> HrResult<u32> {
    if years < 0 {
        return Err(HrError::validation(Field::Experience, "cannot be negative"));
    }
    u32::try_from(years).map_err(|_| HrError::validation(Field::Experience, "is out of range"))
}
