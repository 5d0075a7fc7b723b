//! Reporting-line resolution over the employee forest.
//!
//! [`OrgTree`] is built once per request from a flat snapshot of the
//! directory and answers every hierarchy question in memory: subordinate
//! closure, root-manager chain, requester scope and the nested view used for
//! org charts. Every walk carries a visited set, so a cycle that slipped into
//! the data ends the walk instead of looping.
//!
//! Costs: building is O(n log n) (bucketing plus per-bucket sorting);
//! `subordinates_of` and `root_of` are O(n) per call. Nothing is cached
//! across requests because imports and edits reshape the tree.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::db::{DbEmployee, DbError, StaffDb};

/// One employee in the nested hierarchy payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub id: i64,
    pub full_name: Option<String>,
    pub designation: Option<String>,
    pub role: Option<String>,
    pub team: Option<String>,
    pub is_manager: bool,
    pub direct_reports: Vec<HierarchyNode>,
}

/// Adjacency view of the employee forest.
#[derive(Debug, Clone, Default)]
pub struct OrgTree {
    employees: HashMap<i64, DbEmployee>,
    /// Manager id → direct report ids, sorted by name.
    reports: HashMap<i64, Vec<i64>>,
    /// Forest roots, sorted by name.
    roots: Vec<i64>,
}

impl OrgTree {
    /// Read the whole directory in one statement and build the tree.
    pub fn load(db: &StaffDb) -> Result<Self, DbError> {
        Ok(Self::from_employees(db.list_employees()?))
    }

    /// Bucket employees by manager in one pass.
    ///
    /// An employee becomes a root when it has no manager, names itself as
    /// manager, or names a manager that is not in the snapshot.
    pub fn from_employees(employees: Vec<DbEmployee>) -> Self {
        let employees: HashMap<i64, DbEmployee> =
            employees.into_iter().map(|e| (e.id, e)).collect();

        let mut reports: HashMap<i64, Vec<i64>> = HashMap::new();
        let mut roots = Vec::new();
        for emp in employees.values() {
            match emp.manager_id {
                Some(mgr) if mgr != emp.id && employees.contains_key(&mgr) => {
                    reports.entry(mgr).or_default().push(emp.id);
                }
                _ => roots.push(emp.id),
            }
        }

        let by_name = |a: &i64, b: &i64| {
            let (ea, eb) = (&employees[a], &employees[b]);
            ea.name().cmp(eb.name()).then(ea.id.cmp(&eb.id))
        };
        for ids in reports.values_mut() {
            ids.sort_by(by_name);
        }
        roots.sort_by(by_name);

        Self {
            employees,
            reports,
            roots,
        }
    }

    pub fn get(&self, id: i64) -> Option<&DbEmployee> {
        self.employees.get(&id)
    }

    /// Forest roots, sorted by name.
    pub fn roots(&self) -> Vec<&DbEmployee> {
        self.roots.iter().filter_map(|id| self.get(*id)).collect()
    }

    /// Direct reports of `id`, sorted by name.
    pub fn direct_reports(&self, id: i64) -> Vec<&DbEmployee> {
        self.reports
            .get(&id)
            .map(|ids| ids.iter().filter_map(|r| self.get(*r)).collect())
            .unwrap_or_default()
    }

    /// Every employee below `id`, depth-first in name order. Never contains
    /// `id` itself and never repeats an employee.
    pub fn subordinates_of(&self, id: i64) -> Vec<&DbEmployee> {
        let mut out = Vec::new();
        let mut visited = HashSet::from([id]);
        let mut stack: Vec<i64> = self
            .reports
            .get(&id)
            .map(|ids| ids.iter().rev().copied().collect())
            .unwrap_or_default();

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            if let Some(emp) = self.get(current) {
                out.push(emp);
            }
            if let Some(children) = self.reports.get(&current) {
                stack.extend(children.iter().rev().filter(|c| !visited.contains(*c)));
            }
        }
        out
    }

    pub fn subordinate_ids(&self, id: i64) -> HashSet<i64> {
        self.subordinates_of(id).into_iter().map(|e| e.id).collect()
    }

    /// Whether `target` sits anywhere below `manager`.
    pub fn is_subordinate(&self, manager: i64, target: i64) -> bool {
        manager != target && self.subordinate_ids(manager).contains(&target)
    }

    /// Managers above `id`, nearest first. Stops at a root, a dangling
    /// manager reference, or the first repeated employee.
    pub fn ancestors_of(&self, id: i64) -> Vec<&DbEmployee> {
        let mut chain = Vec::new();
        let mut visited = HashSet::from([id]);
        let mut current = self.get(id);

        while let Some(emp) = current {
            let parent = match emp.manager_id {
                Some(mgr) if visited.insert(mgr) => self.get(mgr),
                _ => None,
            };
            if let Some(p) = parent {
                chain.push(p);
            }
            current = parent;
        }
        chain
    }

    /// Top of the reporting chain for `id`; the employee itself when it is a
    /// root. `None` only when `id` is not in the tree.
    pub fn root_of(&self, id: i64) -> Option<&DbEmployee> {
        let start = self.get(id)?;
        Some(self.ancestors_of(id).pop().unwrap_or(start))
    }

    /// Employees a requester may aggregate over: themselves, plus every
    /// subordinate when they are a manager.
    pub fn scope_for(&self, requester_id: i64) -> Vec<&DbEmployee> {
        let Some(requester) = self.get(requester_id) else {
            return Vec::new();
        };
        let mut scope = vec![requester];
        if requester.is_manager {
            scope.extend(self.subordinates_of(requester_id));
        }
        scope
    }

    /// Whether pointing `employee_id` at `new_manager_id` would close a loop.
    pub fn would_create_cycle(&self, employee_id: i64, new_manager_id: i64) -> bool {
        employee_id == new_manager_id || self.is_subordinate(employee_id, new_manager_id)
    }

    /// The whole forest as nested nodes.
    pub fn forest(&self) -> Vec<HierarchyNode> {
        let mut visited = HashSet::new();
        self.roots
            .iter()
            .filter_map(|id| self.node(*id, &mut visited))
            .collect()
    }

    /// The org chart a requester gets to see. An individual contributor who
    /// reports to someone sees only the tree of their own root manager;
    /// managers and unattached employees see the whole forest.
    pub fn hierarchy_view(&self, requester_id: i64) -> Vec<HierarchyNode> {
        let Some(requester) = self.get(requester_id) else {
            return Vec::new();
        };
        if requester.manager_id.is_some() && !requester.is_manager {
            let mut visited = HashSet::new();
            return self
                .root_of(requester_id)
                .and_then(|root| self.node(root.id, &mut visited))
                .into_iter()
                .collect();
        }
        self.forest()
    }

    fn node(&self, id: i64, visited: &mut HashSet<i64>) -> Option<HierarchyNode> {
        if !visited.insert(id) {
            return None;
        }
        let emp = self.get(id)?;
        let direct_reports = self
            .reports
            .get(&id)
            .map(|ids| ids.iter().filter_map(|r| self.node(*r, visited)).collect())
            .unwrap_or_default();

        Some(HierarchyNode {
            id,
            full_name: emp.full_name.clone(),
            designation: emp.designation.clone(),
            role: emp.role.clone(),
            team: emp.team.clone(),
            is_manager: emp.is_manager,
            direct_reports,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::emp;
    use super::*;

    fn names(list: &[&DbEmployee]) -> Vec<String> {
        list.iter().map(|e| e.name().to_string()).collect()
    }

    /// A ─┬─ C ── E
    ///    └─ B ── D
    /// F (second root)
    fn sample_tree() -> OrgTree {
        OrgTree::from_employees(vec![
            emp(1, "Alice", None, true),
            emp(2, "Bob", Some(1), true),
            emp(3, "Carol", Some(1), true),
            emp(4, "Dan", Some(2), false),
            emp(5, "Eve", Some(3), false),
            emp(6, "Frank", None, true),
        ])
    }

    #[test]
    fn test_build_forest_sorts_roots_and_reports() {
        let tree = OrgTree::from_employees(vec![
            emp(3, "Carl", Some(1), false),
            emp(1, "Anna", None, true),
            emp(2, "Beth", Some(1), false),
        ]);
        assert_eq!(names(&tree.roots()), vec!["Anna"]);
        assert_eq!(names(&tree.direct_reports(1)), vec!["Beth", "Carl"]);
    }

    #[test]
    fn test_missing_names_sort_first() {
        let tree = OrgTree::from_employees(vec![
            emp(1, "Root", None, true),
            emp(2, "Zed", Some(1), false),
            emp(3, "", Some(1), false),
        ]);
        let ids: Vec<i64> = tree.direct_reports(1).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn test_subordinates_of_is_transitive_closure() {
        let tree = sample_tree();
        let mut ids: Vec<i64> = tree.subordinate_ids(1).into_iter().collect();
        ids.sort();
        assert_eq!(ids, vec![2, 3, 4, 5]);
        assert_eq!(names(&tree.subordinates_of(1)), vec!["Bob", "Dan", "Carol", "Eve"]);
        assert!(tree.subordinates_of(4).is_empty());
        assert!(tree.subordinates_of(6).is_empty());
    }

    #[test]
    fn test_subordinates_of_unknown_id_is_empty() {
        assert!(sample_tree().subordinates_of(99).is_empty());
    }

    #[test]
    fn test_subordinates_terminates_on_cycle() {
        // 1 -> 2 -> 3 -> 1: no root at all.
        let tree = OrgTree::from_employees(vec![
            emp(1, "A", Some(3), true),
            emp(2, "B", Some(1), true),
            emp(3, "C", Some(2), true),
        ]);
        let mut ids: Vec<i64> = tree.subordinate_ids(1).into_iter().collect();
        ids.sort();
        assert_eq!(ids, vec![2, 3], "closure never includes the start node");
        assert!(tree.roots().is_empty());
        assert!(tree.forest().is_empty());
    }

    #[test]
    fn test_root_of_walks_up() {
        let tree = sample_tree();
        assert_eq!(tree.root_of(5).unwrap().id, 1);
        assert_eq!(tree.root_of(1).unwrap().id, 1);
        assert_eq!(tree.root_of(6).unwrap().id, 6);
        assert!(tree.root_of(42).is_none());
        assert_eq!(names(&tree.ancestors_of(4)), vec!["Bob", "Alice"]);
    }

    #[test]
    fn test_root_of_terminates_on_cycle() {
        let tree = OrgTree::from_employees(vec![
            emp(1, "A", Some(2), false),
            emp(2, "B", Some(1), false),
        ]);
        let root = tree.root_of(1).expect("employee exists");
        assert_eq!(root.id, 2);
    }

    #[test]
    fn test_dangling_and_self_manager_become_roots() {
        let tree = OrgTree::from_employees(vec![
            emp(1, "Orphan", Some(77), false),
            emp(2, "Selfie", Some(2), false),
        ]);
        assert_eq!(names(&tree.roots()), vec!["Orphan", "Selfie"]);
        assert_eq!(tree.root_of(1).unwrap().id, 1);
    }

    #[test]
    fn test_scope_for_manager_and_individual() {
        let tree = sample_tree();
        let mut scope: Vec<i64> = tree.scope_for(2).iter().map(|e| e.id).collect();
        scope.sort();
        assert_eq!(scope, vec![2, 4]);

        let solo: Vec<i64> = tree.scope_for(4).iter().map(|e| e.id).collect();
        assert_eq!(solo, vec![4]);

        assert!(tree.scope_for(99).is_empty());
    }

    #[test]
    fn test_would_create_cycle() {
        let tree = sample_tree();
        assert!(tree.would_create_cycle(1, 4), "root under its own grandchild");
        assert!(tree.would_create_cycle(3, 3));
        assert!(!tree.would_create_cycle(4, 3));
        assert!(!tree.would_create_cycle(6, 1));
    }

    #[test]
    fn test_forest_is_nested_and_ordered() {
        let forest = sample_tree().forest();
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].full_name.as_deref(), Some("Alice"));
        let alice_reports: Vec<_> = forest[0]
            .direct_reports
            .iter()
            .map(|n| n.full_name.clone().unwrap())
            .collect();
        assert_eq!(alice_reports, vec!["Bob", "Carol"]);
        assert_eq!(forest[0].direct_reports[0].direct_reports[0].id, 4);
        assert_eq!(forest[1].full_name.as_deref(), Some("Frank"));
    }

    #[test]
    fn test_hierarchy_view_for_individual_shows_own_root_only() {
        let tree = sample_tree();
        let view = tree.hierarchy_view(5);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, 1);

        // Managers get everything.
        assert_eq!(tree.hierarchy_view(2).len(), 2);
        // So do unattached employees.
        assert_eq!(tree.hierarchy_view(6).len(), 2);
    }
}
