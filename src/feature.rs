//! The `Feature` trait and build-time validation (spec §3 "Feature
//! descriptor", §4.7 step 1-2).

use std::collections::HashSet;

use crate::context::VListContext;
use crate::error::VListError;

/// A composable module that extends the core by running a setup
/// function against the context. Lower `priority` runs first; equal
/// priorities run in registration order (a stable sort).
pub trait Feature<T: 'static> {
    fn name(&self) -> &'static str;

    fn priority(&self) -> i32 {
        50
    }

    fn conflicts(&self) -> &[&'static str] {
        &[]
    }

    fn setup(&mut self, ctx: &mut VListContext<T>);

    fn destroy(&mut self, _ctx: &mut VListContext<T>) {}
}

/// Stable-sort by priority (ascending), validate no duplicate names and
/// no declared conflicts among the registered set (spec §4.7 step 2).
pub fn validate_and_sort<T: 'static>(
    mut features: Vec<Box<dyn Feature<T>>>,
) -> Result<Vec<Box<dyn Feature<T>>>, VListError> {
    features.sort_by_key(|f| f.priority());

    let mut seen = HashSet::new();
    for f in &features {
        if !seen.insert(f.name()) {
            return Err(VListError::DuplicateFeature(f.name()));
        }
    }
    for f in &features {
        for conflict in f.conflicts() {
            if seen.contains(conflict) {
                return Err(VListError::FeatureConflict(f.name(), conflict));
            }
        }
    }
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stub {
        name: &'static str,
        priority: i32,
        conflicts: &'static [&'static str],
    }

    impl Feature<()> for Stub {
        fn name(&self) -> &'static str {
            self.name
        }
        fn priority(&self) -> i32 {
            self.priority
        }
        fn conflicts(&self) -> &[&'static str] {
            self.conflicts
        }
        fn setup(&mut self, _ctx: &mut VListContext<()>) {}
    }

    #[test]
    fn sorts_by_priority_ascending_stable() {
        let features: Vec<Box<dyn Feature<()>>> = vec![
            Box::new(Stub { name: "b", priority: 50, conflicts: &[] }),
            Box::new(Stub { name: "a", priority: 10, conflicts: &[] }),
            Box::new(Stub { name: "c", priority: 50, conflicts: &[] }),
        ];
        let sorted = validate_and_sort(features).unwrap();
        let names: Vec<_> = sorted.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn rejects_duplicate_names() {
        let features: Vec<Box<dyn Feature<()>>> = vec![
            Box::new(Stub { name: "selection", priority: 50, conflicts: &[] }),
            Box::new(Stub { name: "selection", priority: 60, conflicts: &[] }),
        ];
        assert!(matches!(
            validate_and_sort(features),
            Err(VListError::DuplicateFeature("selection"))
        ));
    }

    #[test]
    fn rejects_declared_conflicts() {
        let features: Vec<Box<dyn Feature<()>>> = vec![
            Box::new(Stub { name: "grid", priority: 10, conflicts: &["reverse"] }),
            Box::new(Stub { name: "reverse", priority: 20, conflicts: &[] }),
        ];
        assert!(matches!(
            validate_and_sort(features),
            Err(VListError::FeatureConflict("grid", "reverse"))
        ));
    }
}
