//! Template instance cache.
//!
//! Instances are keyed by template hash and the completed argument list, so
//! instantiating the same template with the same arguments twice always
//! yields the same instance. Keys currently being built are tracked
//! separately; finding one of those again means the instantiation requires
//! itself.

use libscript_core::{TemplateArgument, TypeHash};
use rustc_hash::{FxHashMap, FxHashSet};

type InstanceKey = (TypeHash, Vec<TemplateArgument>);

/// Cache of completed and in-progress template instances.
#[derive(Debug, Default, Clone)]
pub struct TemplateInstanceCache {
    instances: FxHashMap<InstanceKey, TypeHash>,
    in_progress: FxHashSet<InstanceKey>,
}

impl TemplateInstanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed instance for `template<args>`.
    pub fn get(&self, template: TypeHash, args: &[TemplateArgument]) -> Option<TypeHash> {
        self.instances.get(&(template, args.to_vec())).copied()
    }

    pub fn contains(&self, template: TypeHash, args: &[TemplateArgument]) -> bool {
        self.get(template, args).is_some()
    }

    pub fn is_in_progress(&self, template: TypeHash, args: &[TemplateArgument]) -> bool {
        self.in_progress.contains(&(template, args.to_vec()))
    }

    /// Mark `template<args>` as being built. Returns false if it already was.
    pub fn begin(&mut self, template: TypeHash, args: Vec<TemplateArgument>) -> bool {
        self.in_progress.insert((template, args))
    }

    /// Record a finished instance.
    pub fn finish(&mut self, template: TypeHash, args: Vec<TemplateArgument>, instance: TypeHash) {
        let key = (template, args);
        self.in_progress.remove(&key);
        self.instances.insert(key, instance);
    }

    /// Forget an instantiation that failed.
    pub fn abandon(&mut self, template: TypeHash, args: &[TemplateArgument]) {
        self.in_progress.remove(&(template, args.to_vec()));
    }

    /// All instances of `template`.
    pub fn instances_of(&self, template: TypeHash) -> impl Iterator<Item = TypeHash> + '_ {
        self.instances
            .iter()
            .filter(move |((t, _), _)| *t == template)
            .map(|(_, instance)| *instance)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libscript_core::primitives;

    #[test]
    fn finished_instances_are_found() {
        let mut cache = TemplateInstanceCache::new();
        let template = TypeHash::from_name("List");
        let args = vec![TemplateArgument::from(primitives::INT)];
        let instance = TypeHash::from_template_instance(template, &args);

        assert!(cache.begin(template, args.clone()));
        assert!(cache.is_in_progress(template, &args));
        assert!(!cache.begin(template, args.clone()));

        cache.finish(template, args.clone(), instance);
        assert_eq!(cache.get(template, &args), Some(instance));
        assert!(!cache.is_in_progress(template, &args));
        assert_eq!(cache.instances_of(template).collect::<Vec<_>>(), vec![instance]);
    }

    #[test]
    fn argument_lists_are_distinct_keys() {
        let mut cache = TemplateInstanceCache::new();
        let template = TypeHash::from_name("Grid");
        let a = vec![TemplateArgument::Integer(2)];
        let b = vec![TemplateArgument::Integer(3)];
        cache.finish(template, a.clone(), TypeHash::from_template_instance(template, &a));

        assert!(cache.contains(template, &a));
        assert!(!cache.contains(template, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn abandoned_keys_can_be_retried() {
        let mut cache = TemplateInstanceCache::new();
        let template = TypeHash::from_name("Box");
        let args = vec![TemplateArgument::Bool(false)];

        cache.begin(template, args.clone());
        cache.abandon(template, &args);
        assert!(!cache.is_in_progress(template, &args));
        assert!(cache.is_empty());
        assert!(cache.begin(template, args));
    }
}
