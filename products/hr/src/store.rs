use std::cmp::Ordering;
use std::collections::HashMap;
use std::collections::hash_map::Values;

use tracing::debug;

use crate::employee::{Employee, EmployeeKey};
use crate::error::{HrError, HrResult};
use crate::field::FieldUpdate;

/// In-memory roster keyed by employee id.
///
/// Sorts are stable over the map's iteration order, which is unspecified, so
/// employees with equal sort keys come back in no particular order.
#[derive(Clone, Debug)]
pub struct EmployeeStore<K> {
    employees: HashMap<K, Employee<K>>,
}

impl<K> Default for EmployeeStore<K> {
    fn default() -> Self {
        Self {
            employees: HashMap::new(),
        }
    }
}

impl<K: EmployeeKey> EmployeeStore<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite by id, returning the record that was replaced.
    pub fn add(&mut self, employee: Employee<K>) -> Option<Employee<K>> {
        let id = employee.id().clone();
        let replaced = self.employees.insert(id.clone(), employee);
        debug!(id = %id, replaced = replaced.is_some(), "employee stored");
        replaced
    }

    pub fn remove(&mut self, id: &K) -> HrResult<Employee<K>> {
        let removed = self
            .employees
            .remove(id)
            .ok_or_else(|| HrError::not_found(id))?;
        debug!(id = %id, "employee removed");
        Ok(removed)
    }

    /// Change one field of one record. A rejected value leaves the record as it was.
    pub fn update(&mut self, id: &K, update: FieldUpdate) -> HrResult<()> {
        let employee = self
            .employees
            .get_mut(id)
            .ok_or_else(|| HrError::not_found(id))?;
        let field = update.field();
        employee.apply(update)?;
        debug!(id = %id, %field, "employee updated");
        Ok(())
    }

    pub fn get(&self, id: &K) -> Option<&Employee<K>> {
        self.employees.get(id)
    }

    pub fn contains(&self, id: &K) -> bool {
        self.employees.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    pub fn iter(&self) -> Values<'_, K, Employee<K>> {
        self.employees.values()
    }

    pub fn get_all(&self) -> Vec<Employee<K>> {
        self.employees.values().cloned().collect()
    }

    pub fn search_by_department(&self, department: &str) -> Vec<Employee<K>> {
        if department.trim().is_empty() {
            return Vec::new();
        }
        let wanted = department.to_lowercase();
        self.collect_where(|emp| emp.department().to_lowercase() == wanted)
    }

    pub fn search_by_name(&self, fragment: &str) -> Vec<Employee<K>> {
        if fragment.trim().is_empty() {
            return Vec::new();
        }
        let needle = fragment.to_lowercase();
        self.collect_where(|emp| emp.name().to_lowercase().contains(&needle))
    }

    /// Free-text match on name, department, or id.
    pub fn search(&self, query: &str) -> Vec<Employee<K>> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        self.collect_where(|emp| {
            emp.name().to_lowercase().contains(&needle)
                || emp.department().to_lowercase().contains(&needle)
                || emp.id().to_string().to_lowercase().contains(&needle)
        })
    }

    pub fn filter_by_performance(&self, min_rating: f64) -> Vec<Employee<K>> {
        self.collect_where(|emp| emp.performance_rating() >= min_rating)
    }

    pub fn filter_by_salary_range(&self, min: f64, max: f64) -> Vec<Employee<K>> {
        self.collect_where(|emp| emp.salary() >= min && emp.salary() <= max)
    }

    pub fn sort_by_salary(&self) -> Vec<Employee<K>> {
        self.sorted_by(|a, b| b.salary().total_cmp(&a.salary()))
    }

    pub fn sort_by_performance(&self) -> Vec<Employee<K>> {
        self.sorted_by(|a, b| b.performance_rating().total_cmp(&a.performance_rating()))
    }

    pub fn sort_by_experience(&self) -> Vec<Employee<K>> {
        self.sorted_by(Employee::cmp_by_experience)
    }

    /// Add `amount` to the salary of everyone rated at least `min_rating`.
    ///
    /// All new salaries are validated before any is written, so a rejected
    /// raise changes nothing. Returns how many employees were raised.
    pub fn give_raise(&mut self, min_rating: f64, amount: f64) -> HrResult<usize> {
        let mut raised = Vec::new();
        for employee in self
            .employees
            .values()
            .filter(|emp| emp.performance_rating() >= min_rating)
        {
            let mut next = employee.clone();
            next.set_salary(employee.salary() + amount)?;
            raised.push(next);
        }

        let count = raised.len();
        for employee in raised {
            self.employees.insert(employee.id().clone(), employee);
        }
        debug!(min_rating, amount, count, "raise applied");
        Ok(count)
    }

    pub fn top_paid(&self, limit: usize) -> Vec<Employee<K>> {
        let mut ranked = self.sort_by_salary();
        ranked.truncate(limit);
        ranked
    }

    /// Mean salary in a department, or 0.0 when nobody matches.
    pub fn average_salary(&self, department: &str) -> f64 {
        let wanted = department.to_lowercase();
        let (total, count) = self
            .employees
            .values()
            .filter(|emp| emp.department().to_lowercase() == wanted)
            .fold((0.0, 0usize), |(total, count), emp| {
                (total + emp.salary(), count + 1)
            });
        if count == 0 {
            0.0
        } else {
            total / count as f64
        }
    }

    /// Departments in use, sorted, one spelling per case-insensitive name.
    pub fn departments(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .employees
            .values()
            .map(|emp| emp.department().to_string())
            .collect();
        names.sort_by_key(|name| name.to_lowercase());
        names.dedup_by(|a, b| a.to_lowercase() == b.to_lowercase());
        names
    }

    fn collect_where(&self, keep: impl Fn(&Employee<K>) -> bool) -> Vec<Employee<K>> {
        self.employees
            .values()
            .filter(|emp| keep(emp))
            .cloned()
            .collect()
    }

    fn sorted_by(
        &self,
        compare: impl FnMut(&Employee<K>, &Employee<K>) -> Ordering,
    ) -> Vec<Employee<K>> {
        let mut all = self.get_all();
        all.sort_by(compare);
        all
    }
}

impl<K: EmployeeKey> FromIterator<Employee<K>> for EmployeeStore<K> {
    fn from_iter<I: IntoIterator<Item = Employee<K>>>(iter: I) -> Self {
        let mut store = Self::new();
        store.extend(iter);
        store
    }
}

impl<K: EmployeeKey> Extend<Employee<K>> for EmployeeStore<K> {
    fn extend<I: IntoIterator<Item = Employee<K>>>(&mut self, iter: I) {
        for employee in iter {
            self.add(employee);
        }
    }
}

impl<'a, K: EmployeeKey> IntoIterator for &'a EmployeeStore<K> {
    type Item = &'a Employee<K>;
    type IntoIter = Values<'a, K, Employee<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
