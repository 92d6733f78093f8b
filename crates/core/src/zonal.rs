//! Customer → zonal manager reconciliation.
//!
//! The ERP has no direct link between a customer and the manager responsible
//! for it. The link is derived through the territory hierarchy:
//!
//! - an active Area Service Manager is attached to a Service Person record
//!   whose territory is a *parent* territory (a zone),
//! - a customer sits in a territory whose parent is that zone.
//!
//! A handful of managers are missing from the ERP and are added by hand, and a
//! few names are recorded with spellings that differ from the canonical ones.
//! Customers whose zone has no manager are filled from neighbouring rows in
//! two passes (see [`reconcile`]).

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::domain::{Customer, Employee, ServicePerson, Territory};

/// Employee designation that qualifies as a zonal manager.
pub const ZONAL_MANAGER_DESIGNATION: &str = "Area Service Manager";
/// Employee status required for a zonal manager.
pub const ACTIVE_EMPLOYEE_STATUS: &str = "Active";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ManualManager {
    pub employee: &'static str,
    pub employee_name: &'static str,
    pub zonal_manager: &'static str,
    pub parent_territory: &'static str,
}

/// Managers the ERP does not record against a Service Person.
pub const MANUAL_MANAGERS: [ManualManager; 2] = [
    ManualManager {
        employee: "EL1700001",
        employee_name: "Shivam Kumar",
        zonal_manager: "Shivam Kumar",
        parent_territory: "East",
    },
    ManualManager {
        employee: "001100001",
        employee_name: "Anuraj T. R",
        zonal_manager: "Anuraj T. R",
        parent_territory: "South 3",
    },
];

/// Recorded spelling → canonical spelling.
pub const NAME_CORRECTIONS: [(&str, &str); 4] = [
    ("Anuraj T. R", "Anuraj T"),
    ("Subrahmanyam Somagani", "S.Somagani"),
    ("Vivek Singh Chauhan", "Vivek Chauhan"),
    ("Tousif Rauf Baig Mirza", "Tausif Mirza"),
];

/// The four ERP collections the reconciliation reads.
#[derive(Clone, Debug, Default)]
pub struct ZonalInputs {
    pub service_persons: Vec<ServicePerson>,
    /// Already restricted to active Area Service Managers.
    pub employees: Vec<Employee>,
    pub customers: Vec<Customer>,
    pub territories: Vec<Territory>,
}

/// A manager attached to a zone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManagerRow {
    pub employee: Option<String>,
    pub employee_name: Option<String>,
    pub zonal_manager: Option<String>,
    pub parent_territory: Option<String>,
}

/// A customer placed in its territory and zone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomerRow {
    pub customer: String,
    pub territory: Option<String>,
    pub parent_territory: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconciledRow {
    pub customer: String,
    pub territory: Option<String>,
    pub parent_territory: Option<String>,
    pub zonal_manager: Option<String>,
}

/// Read-only customer → zonal manager lookup.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ZonalManagerMap {
    entries: BTreeMap<String, String>,
}

impl ZonalManagerMap {
    pub fn get(&self, customer: &str) -> Option<&str> {
        self.entries.get(customer).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(customer, manager)| (customer.as_str(), manager.as_str()))
    }
}

impl FromIterator<(String, String)> for ZonalManagerMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

/// Build the customer → zonal manager map.
///
/// Steps, in order:
/// 1. employees left-joined to service persons on employee id,
/// 2. [`MANUAL_MANAGERS`] appended,
/// 3. [`NAME_CORRECTIONS`] applied,
/// 4. customers left-joined to territories on territory name,
/// 5. managers right-joined onto customers on parent territory,
/// 6. nulls filled from the first manager in the same parent territory,
/// 7. remaining nulls filled from the first row whose *territory* equals the
///    missing parent territory, scanning the whole table,
/// 8. reduced to customer → manager; later rows win, nulls are dropped.
pub fn reconcile(inputs: &ZonalInputs) -> ZonalManagerMap {
    let mut managers = manager_rows(&inputs.employees, &inputs.service_persons);
    managers.extend(MANUAL_MANAGERS.iter().map(|manual| ManagerRow {
        employee: Some(manual.employee.to_string()),
        employee_name: Some(manual.employee_name.to_string()),
        zonal_manager: Some(manual.zonal_manager.to_string()),
        parent_territory: Some(manual.parent_territory.to_string()),
    }));
    apply_name_corrections(&mut managers);

    let customers = customer_rows(&inputs.customers, &inputs.territories);
    let mut rows = join_on_parent_territory(&managers, &customers);

    fill_from_parent_territory(&mut rows);
    fill_from_matching_territory(&mut rows);

    rows.into_iter()
        .filter_map(|row| row.zonal_manager.map(|manager| (row.customer, manager)))
        .collect()
}

pub fn manager_rows(employees: &[Employee], service_persons: &[ServicePerson]) -> Vec<ManagerRow> {
    let mut by_employee: HashMap<&str, Vec<&ServicePerson>> = HashMap::new();
    for person in service_persons {
        if let Some(employee) = person.employee.as_deref() {
            by_employee.entry(employee).or_default().push(person);
        }
    }

    let mut rows = Vec::with_capacity(employees.len());
    for employee in employees {
        match by_employee.get(employee.id.as_str()) {
            Some(persons) => rows.extend(persons.iter().map(|person| ManagerRow {
                employee: Some(employee.id.clone()),
                employee_name: employee.employee_name.clone(),
                zonal_manager: Some(person.name.clone()),
                parent_territory: person.territory.clone(),
            })),
            None => rows.push(ManagerRow {
                employee: Some(employee.id.clone()),
                employee_name: employee.employee_name.clone(),
                zonal_manager: None,
                parent_territory: None,
            }),
        }
    }
    rows
}

pub fn customer_rows(customers: &[Customer], territories: &[Territory]) -> Vec<CustomerRow> {
    let mut by_name: HashMap<&str, Vec<&Territory>> = HashMap::new();
    for territory in territories {
        by_name.entry(territory.name.as_str()).or_default().push(territory);
    }

    let mut rows = Vec::with_capacity(customers.len());
    for customer in customers {
        let matches = customer.territory.as_deref().and_then(|name| by_name.get(name));
        match matches {
            Some(territories) => rows.extend(territories.iter().map(|territory| CustomerRow {
                customer: customer.name.clone(),
                territory: customer.territory.clone(),
                parent_territory: territory.parent.clone(),
            })),
            None => rows.push(CustomerRow {
                customer: customer.name.clone(),
                territory: customer.territory.clone(),
                parent_territory: None,
            }),
        }
    }
    rows
}

fn apply_name_corrections(rows: &mut [ManagerRow]) {
    for row in rows {
        let Some(manager) = row.zonal_manager.as_deref() else {
            continue;
        };
        if let Some((_, canonical)) =
            NAME_CORRECTIONS.iter().find(|(recorded, _)| *recorded == manager)
        {
            row.zonal_manager = Some((*canonical).to_string());
        }
    }
}

/// Every customer row is kept; one output row per matching manager.
fn join_on_parent_territory(
    managers: &[ManagerRow],
    customers: &[CustomerRow],
) -> Vec<ReconciledRow> {
    let mut by_parent: HashMap<&str, Vec<&ManagerRow>> = HashMap::new();
    for manager in managers {
        if let Some(parent) = manager.parent_territory.as_deref() {
            by_parent.entry(parent).or_default().push(manager);
        }
    }

    let mut rows = Vec::with_capacity(customers.len());
    for customer in customers {
        let matches = customer.parent_territory.as_deref().and_then(|parent| by_parent.get(parent));
        match matches {
            Some(managers) => rows.extend(managers.iter().map(|manager| ReconciledRow {
                customer: customer.customer.clone(),
                territory: customer.territory.clone(),
                parent_territory: customer.parent_territory.clone(),
                zonal_manager: manager.zonal_manager.clone(),
            })),
            None => rows.push(ReconciledRow {
                customer: customer.customer.clone(),
                territory: customer.territory.clone(),
                parent_territory: customer.parent_territory.clone(),
                zonal_manager: None,
            }),
        }
    }
    rows
}

/// Pass A: first non-null manager of each parent territory fills that group.
pub fn fill_from_parent_territory(rows: &mut [ReconciledRow]) {
    let mut first_by_parent: HashMap<String, String> = HashMap::new();
    for row in rows.iter() {
        if let (Some(parent), Some(manager)) = (&row.parent_territory, &row.zonal_manager) {
            first_by_parent.entry(parent.clone()).or_insert_with(|| manager.clone());
        }
    }

    for row in rows.iter_mut().filter(|row| row.zonal_manager.is_none()) {
        if let Some(parent) = row.parent_territory.as_deref() {
            row.zonal_manager = first_by_parent.get(parent).cloned();
        }
    }
}

/// Pass B: a zone without a manager borrows from the first row anywhere in
/// the table that sits *in* that zone as its territory.
pub fn fill_from_matching_territory(rows: &mut [ReconciledRow]) {
    let mut fills: HashMap<String, String> = HashMap::new();
    for row in rows.iter().filter(|row| row.zonal_manager.is_none()) {
        let Some(parent) = row.parent_territory.as_deref() else {
            continue;
        };
        if fills.contains_key(parent) {
            continue;
        }
        let candidate =
            rows.iter().find_map(|other| match (&other.territory, &other.zonal_manager) {
                (Some(territory), Some(manager)) if territory == parent => Some(manager.clone()),
                _ => None,
            });
        if let Some(manager) = candidate {
            fills.insert(parent.to_string(), manager);
        }
    }

    for row in rows.iter_mut().filter(|row| row.zonal_manager.is_none()) {
        if let Some(parent) = row.parent_territory.as_deref() {
            row.zonal_manager = fills.get(parent).cloned();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        fill_from_matching_territory, fill_from_parent_territory, reconcile, ReconciledRow,
        ZonalInputs,
    };
    use crate::domain::{Customer, Employee, ServicePerson, Territory};

    fn employee(id: &str, name: &str) -> Employee {
        Employee { id: id.to_string(), employee_name: Some(name.to_string()) }
    }

    fn service_person(name: &str, employee: &str, territory: &str) -> ServicePerson {
        ServicePerson {
            name: name.to_string(),
            employee: Some(employee.to_string()),
            territory: Some(territory.to_string()),
        }
    }

    fn customer(name: &str, territory: &str) -> Customer {
        Customer { name: name.to_string(), territory: Some(territory.to_string()) }
    }

    fn territory(name: &str, parent: &str) -> Territory {
        Territory { name: name.to_string(), parent: Some(parent.to_string()) }
    }

    fn row(customer: &str, territory: &str, parent: &str, manager: Option<&str>) -> ReconciledRow {
        ReconciledRow {
            customer: customer.to_string(),
            territory: Some(territory.to_string()),
            parent_territory: Some(parent.to_string()),
            zonal_manager: manager.map(str::to_string),
        }
    }

    fn west_region() -> ZonalInputs {
        ZonalInputs {
            service_persons: vec![service_person("Priya Nair", "EMP-001", "West")],
            employees: vec![employee("EMP-001", "Priya Nair"), employee("EMP-002", "Unassigned")],
            customers: vec![
                customer("Acme Pharma", "Pune"),
                customer("Baxter Labs", "Mumbai"),
                customer("Cipla Rural Unit", "Pune Rural"),
                customer("Orphan Co", "Atlantis"),
            ],
            territories: vec![
                territory("Pune", "West"),
                territory("Mumbai", "West"),
                territory("Pune Rural", "Pune"),
            ],
        }
    }

    #[test]
    fn customers_resolve_through_parent_territory() {
        let map = reconcile(&west_region());

        assert_eq!(map.get("Acme Pharma"), Some("Priya Nair"));
        assert_eq!(map.get("Baxter Labs"), Some("Priya Nair"));
    }

    #[test]
    fn zone_without_manager_borrows_from_rows_in_that_territory() {
        let map = reconcile(&west_region());

        assert_eq!(
            map.get("Cipla Rural Unit"),
            Some("Priya Nair"),
            "Pune has no manager of its own, so rows located in Pune lend theirs"
        );
    }

    #[test]
    fn customer_with_unknown_territory_is_absent() {
        let map = reconcile(&west_region());

        assert_eq!(map.get("Orphan Co"), None);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn manual_manager_is_published_under_canonical_spelling() {
        let inputs = ZonalInputs {
            customers: vec![customer("Kerala Biotech", "Kochi")],
            territories: vec![territory("Kochi", "South 3")],
            ..ZonalInputs::default()
        };

        let map = reconcile(&inputs);

        assert_eq!(map.get("Kerala Biotech"), Some("Anuraj T"));
    }

    #[test]
    fn recorded_spellings_are_corrected() {
        let inputs = ZonalInputs {
            service_persons: vec![service_person("Vivek Singh Chauhan", "EMP-010", "North 1")],
            employees: vec![employee("EMP-010", "Vivek Singh Chauhan")],
            customers: vec![customer("Delhi Diagnostics", "Delhi")],
            territories: vec![territory("Delhi", "North 1")],
        };

        let map = reconcile(&inputs);

        assert_eq!(map.get("Delhi Diagnostics"), Some("Vivek Chauhan"));
    }

    #[test]
    fn service_person_of_inactive_employee_is_ignored() {
        let inputs = ZonalInputs {
            service_persons: vec![service_person("Former Manager", "EMP-099", "Central")],
            employees: vec![],
            customers: vec![customer("Nagpur Labs", "Nagpur")],
            territories: vec![territory("Nagpur", "Central")],
        };

        assert_eq!(reconcile(&inputs).get("Nagpur Labs"), None);
    }

    #[test]
    fn later_manager_row_wins_for_shared_zone() {
        let inputs = ZonalInputs {
            service_persons: vec![
                service_person("First Manager", "EMP-1", "North 2"),
                service_person("Second Manager", "EMP-2", "North 2"),
            ],
            employees: vec![
                employee("EMP-1", "First Manager"),
                employee("EMP-2", "Second Manager"),
            ],
            customers: vec![customer("Jaipur Health", "Jaipur")],
            territories: vec![territory("Jaipur", "North 2")],
        };

        assert_eq!(reconcile(&inputs).get("Jaipur Health"), Some("Second Manager"));
    }

    #[test]
    fn parent_pass_fills_every_null_in_group_with_first_value() {
        let mut rows = vec![
            row("A", "T1", "Z", None),
            row("B", "T2", "Z", Some("First")),
            row("C", "T3", "Z", Some("Second")),
            row("D", "T4", "Y", None),
        ];

        fill_from_parent_territory(&mut rows);

        assert_eq!(rows[0].zonal_manager.as_deref(), Some("First"));
        assert_eq!(rows[2].zonal_manager.as_deref(), Some("Second"));
        assert_eq!(rows[3].zonal_manager, None);
    }

    #[test]
    fn territory_pass_scans_whole_table_and_uses_pre_fill_values() {
        let mut rows = vec![
            row("A", "Q", "P", None),
            row("B", "Q", "P", None),
            row("C", "P", "Other", Some("From C")),
            row("D", "P", "Else", Some("From D")),
            row("E", "R", "Q", None),
        ];

        fill_from_matching_territory(&mut rows);

        assert_eq!(rows[0].zonal_manager.as_deref(), Some("From C"));
        assert_eq!(rows[1].zonal_manager.as_deref(), Some("From C"));
        assert_eq!(
            rows[4].zonal_manager, None,
            "rows in territory Q were null before the pass, so Q stays unresolved"
        );
    }

    #[test]
    fn every_customer_sharing_a_resolved_zone_is_resolved() {
        let inputs = ZonalInputs {
            service_persons: vec![
                service_person("Zone Lead", "EMP-1", "East"),
                service_person("Other Lead", "EMP-2", "South 1"),
            ],
            employees: vec![employee("EMP-1", "Zone Lead"), employee("EMP-2", "Other Lead")],
            customers: (0..25)
                .map(|index| {
                    let territory = ["Kolkata", "Patna", "Chennai", "Vizag", "Ranchi"][index % 5];
                    customer(&format!("Customer {index}"), territory)
                })
                .collect(),
            territories: vec![
                territory("Kolkata", "East"),
                territory("Patna", "East"),
                territory("Ranchi", "East"),
                territory("Chennai", "South 1"),
                territory("Vizag", "Andhra"),
            ],
        };

        let map = reconcile(&inputs);

        for customer in &inputs.customers {
            let parent = inputs
                .territories
                .iter()
                .find(|territory| Some(&territory.name) == customer.territory.as_ref())
                .and_then(|territory| territory.parent.clone());
            let zone_has_manager = matches!(parent.as_deref(), Some("East" | "South 1"));
            assert_eq!(
                map.get(&customer.name).is_some(),
                zone_has_manager,
                "unexpected resolution for {}",
                customer.name
            );
        }
    }
}
