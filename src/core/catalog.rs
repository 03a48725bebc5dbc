//! Step catalog: the validated registry of every ingestion step

use crate::core::step::{Step, StepGroup, StepId};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Errors detected while building the catalog
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Duplicate step ID: {0}")]
    DuplicateStep(StepId),

    #[error("Step '{step}' depends on non-existent step '{dependency}'")]
    UnknownDependency { step: StepId, dependency: StepId },

    #[error("Step '{0}' depends on itself")]
    SelfDependency(StepId),

    #[error("Cycle detected in dependency graph: {}", format_cycle(.0))]
    Cycle(Vec<StepId>),

    #[error("Step family '{0}' declares no steps")]
    EmptyFamily(&'static str),
}

fn format_cycle(cycle: &[StepId]) -> String {
    cycle
        .iter()
        .map(StepId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// A sub-catalog of steps for one resource area
#[derive(Debug, Clone)]
pub struct StepFamily {
    pub name: &'static str,
    pub group: StepGroup,
    pub steps: Vec<Step>,
}

impl StepFamily {
    pub fn new(name: &'static str, group: StepGroup, steps: Vec<Step>) -> Self {
        Self { name, group, steps }
    }
}

/// Immutable registry of steps, built once and shared by the resolver and
/// the engine
#[derive(Debug, Clone)]
pub struct StepCatalog {
    steps: Vec<Step>,
    groups: Vec<StepGroup>,
    index: HashMap<StepId, usize>,
    execution_order: Vec<StepId>,
}

impl StepCatalog {
    /// Merge family sub-catalogs and validate the resulting graph
    pub fn from_families(
        families: impl IntoIterator<Item = StepFamily>,
    ) -> Result<Self, CatalogError> {
        let mut steps = Vec::new();
        let mut groups = Vec::new();
        let mut index = HashMap::new();

        for family in families {
            if family.steps.is_empty() {
                return Err(CatalogError::EmptyFamily(family.name));
            }
            for step in family.steps {
                if index.insert(step.id, steps.len()).is_some() {
                    return Err(CatalogError::DuplicateStep(step.id));
                }
                groups.push(family.group);
                steps.push(step);
            }
        }

        for step in &steps {
            for dep in &step.depends_on {
                if *dep == step.id {
                    return Err(CatalogError::SelfDependency(step.id));
                }
                if !index.contains_key(dep) {
                    return Err(CatalogError::UnknownDependency {
                        step: step.id,
                        dependency: *dep,
                    });
                }
            }
        }

        let mut catalog = Self {
            steps,
            groups,
            index,
            execution_order: Vec::new(),
        };
        if let Some(cycle) = catalog.find_cycle() {
            return Err(CatalogError::Cycle(cycle));
        }
        catalog.execution_order = catalog.topological_sort();
        Ok(catalog)
    }

    /// All steps, in declaration order
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn get(&self, id: StepId) -> Option<&Step> {
        self.index.get(&id).map(|&i| &self.steps[i])
    }

    pub fn contains(&self, id: StepId) -> bool {
        self.index.contains_key(&id)
    }

    /// The group of the family that declared the step
    pub fn group_of(&self, id: StepId) -> Option<StepGroup> {
        self.index.get(&id).map(|&i| self.groups[i])
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = StepId> + '_ {
        self.steps.iter().map(|step| step.id)
    }

    /// Steps that list `id` as a direct dependency
    pub fn dependents_of(&self, id: StepId) -> Vec<StepId> {
        self.steps
            .iter()
            .filter(|step| step.depends_on.contains(&id))
            .map(|step| step.id)
            .collect()
    }

    /// Dependencies before dependents; stable across runs
    pub fn execution_order(&self) -> &[StepId] {
        &self.execution_order
    }

    fn topological_sort(&self) -> Vec<StepId> {
        let mut result = Vec::with_capacity(self.steps.len());
        let mut visited = HashSet::new();

        for step in &self.steps {
            self.visit(step.id, &mut visited, &mut result);
        }

        result
    }

    fn visit(&self, id: StepId, visited: &mut HashSet<StepId>, result: &mut Vec<StepId>) {
        if !visited.insert(id) {
            return;
        }
        if let Some(step) = self.get(id) {
            for dep in &step.depends_on {
                self.visit(*dep, visited, result);
            }
        }
        result.push(id);
    }

    /// Find a dependency cycle, returning its path
    fn find_cycle(&self) -> Option<Vec<StepId>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Visited,
        }

        fn dfs(
            id: StepId,
            catalog: &StepCatalog,
            marks: &mut HashMap<StepId, Mark>,
            path: &mut Vec<StepId>,
        ) -> Option<Vec<StepId>> {
            marks.insert(id, Mark::Visiting);
            path.push(id);

            if let Some(step) = catalog.get(id) {
                for dep in &step.depends_on {
                    match marks.get(dep) {
                        Some(Mark::Visiting) => {
                            let start = path.iter().position(|s| s == dep).unwrap_or(0);
                            let mut cycle = path[start..].to_vec();
                            cycle.push(*dep);
                            return Some(cycle);
                        }
                        Some(Mark::Visited) => {}
                        None => {
                            if let Some(cycle) = dfs(*dep, catalog, marks, path) {
                                return Some(cycle);
                            }
                        }
                    }
                }
            }

            path.pop();
            marks.insert(id, Mark::Visited);
            None
        }

        let mut marks = HashMap::new();
        let mut path = Vec::new();
        for step in &self.steps {
            if !marks.contains_key(&step.id) {
                if let Some(cycle) = dfs(step.id, self, &mut marks, &mut path) {
                    return Some(cycle);
                }
            }
        }
        None
    }
}
