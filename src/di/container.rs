use crate::error::{ContainerError, Result};
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::Arc;

/// Casts an erased implementation into an erased `Arc<dyn Trait>`.
/// Returns `None` when the instance is not the bound implementation type.
type CasterFn =
    Arc<dyn Fn(Arc<dyn Any + Send + Sync>) -> Option<Arc<dyn Any + Send + Sync>> + Send + Sync>;

/// Thread-safe dependency injection container.
///
/// Every registered service is a singleton: each `resolve` hands out a clone of
/// the same `Arc`. A trait may be bound to exactly one implementation; binding it
/// to a second, different implementation makes it ambiguous.
pub struct Container {
    services: DashMap<TypeId, ServiceEntry>,
    bindings: DashMap<TypeId, TraitBinding>,
}

struct ServiceEntry {
    instance: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

enum TraitBinding {
    Single {
        impl_id: TypeId,
        impl_name: &'static str,
        caster: CasterFn,
    },
    Ambiguous(Vec<&'static str>),
}

impl Container {
    pub fn new() -> Self {
        Self {
            services: DashMap::new(),
            bindings: DashMap::new(),
        }
    }

    pub fn register<T: 'static + Send + Sync>(&mut self, instance: T) -> &mut Self {
        self.register_arc(Arc::new(instance))
    }

    /// Register an already shared instance, keeping its identity.
    pub fn register_arc<T: 'static + Send + Sync>(&mut self, instance: Arc<T>) -> &mut Self {
        let entry = ServiceEntry {
            instance,
            type_name: std::any::type_name::<T>(),
        };
        if self.services.insert(TypeId::of::<T>(), entry).is_some() {
            tracing::debug!("Replaced registration for {}", std::any::type_name::<T>());
        }
        self
    }

    pub fn register_trait<Trait, Impl, F>(&mut self, caster_fn: F) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        Impl: 'static + Send + Sync,
        F: Fn(Arc<Impl>) -> Arc<Trait> + 'static + Send + Sync,
    {
        let trait_id = TypeId::of::<Trait>();
        let impl_id = TypeId::of::<Impl>();
        let impl_name = std::any::type_name::<Impl>();

        let caster: CasterFn = Arc::new(move |instance: Arc<dyn Any + Send + Sync>| {
            let concrete = instance.downcast::<Impl>().ok()?;
            let trait_obj: Arc<Trait> = caster_fn(concrete);
            Some(Arc::new(trait_obj) as Arc<dyn Any + Send + Sync>)
        });

        let mut binding = self
            .bindings
            .entry(trait_id)
            .or_insert_with(|| TraitBinding::Single {
                impl_id,
                impl_name,
                caster,
            });
        let widened = match &*binding {
            TraitBinding::Single {
                impl_id: bound_id,
                impl_name: bound_name,
                ..
            } if *bound_id != impl_id => {
                tracing::warn!(
                    "{} bound to both {} and {}",
                    std::any::type_name::<Trait>(),
                    bound_name,
                    impl_name
                );
                Some(vec![*bound_name, impl_name])
            }
            TraitBinding::Ambiguous(candidates) if !candidates.contains(&impl_name) => {
                let mut candidates = candidates.clone();
                candidates.push(impl_name);
                Some(candidates)
            }
            _ => None,
        };
        if let Some(candidates) = widened {
            *binding = TraitBinding::Ambiguous(candidates);
        }
        drop(binding);
        self
    }

    pub fn resolve<T: 'static + Send + Sync>(&self) -> Result<Arc<T>> {
        let entry = self
            .services
            .get(&TypeId::of::<T>())
            .ok_or_else(ContainerError::not_found::<T>)?;
        entry
            .instance
            .clone()
            .downcast::<T>()
            .map_err(|_| ContainerError::downcast_failed(entry.type_name))
    }

    pub fn resolve_trait<T: ?Sized + 'static + Send + Sync>(&self) -> Result<Arc<T>> {
        let binding = self
            .bindings
            .get(&TypeId::of::<T>())
            .ok_or_else(ContainerError::not_found::<T>)?;

        let (impl_id, impl_name, caster) = match &*binding {
            TraitBinding::Single {
                impl_id,
                impl_name,
                caster,
            } => (*impl_id, *impl_name, caster.clone()),
            TraitBinding::Ambiguous(candidates) => {
                return Err(ContainerError::AmbiguousDependency {
                    type_name: std::any::type_name::<T>().to_string(),
                    candidates: candidates.clone(),
                });
            }
        };
        drop(binding);

        let instance = self
            .services
            .get(&impl_id)
            .map(|entry| entry.instance.clone())
            .ok_or_else(|| ContainerError::DependencyNotFound {
                type_name: format!(
                    "Implementation '{}' for trait '{}' not registered",
                    impl_name,
                    std::any::type_name::<T>()
                ),
            })?;

        // The caster hands back an Arc<dyn Any> wrapping the Arc<T>.
        let wrapper = caster(instance)
            .and_then(|erased| erased.downcast::<Arc<T>>().ok())
            .ok_or_else(|| ContainerError::downcast_failed(std::any::type_name::<T>()))?;
        Ok(wrapper.as_ref().clone())
    }

    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        let type_id = TypeId::of::<T>();
        self.services.contains_key(&type_id) || self.bindings.contains_key(&type_id)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}
