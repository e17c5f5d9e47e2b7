//! Extension declarations
//!
//! A test class lists its extensions in one or more [`ExtensionDeclaration`]s,
//! either directly or through reusable [`ComposedDeclaration`] bundles. Discovery
//! flattens them into one ordered list of [`ExtensionClass`]es.

use super::Extension;
use crate::di::Container;
use crate::error::Result;
use std::any::TypeId;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Runtime handle for an extension type
///
/// Knows how to ask a container for the managed instance of that type.
#[derive(Clone, Copy)]
pub struct ExtensionClass {
    type_id: TypeId,
    name: &'static str,
    resolve: fn(&Container) -> Result<Arc<dyn Extension>>,
}

impl ExtensionClass {
    pub fn of<E: Extension>() -> Self {
        Self {
            type_id: TypeId::of::<E>(),
            name: std::any::type_name::<E>(),
            resolve: resolve_managed::<E>,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Look up the managed instance in `container`
    pub fn resolve(&self, container: &Container) -> Result<Arc<dyn Extension>> {
        (self.resolve)(container)
    }
}

fn resolve_managed<E: Extension>(container: &Container) -> Result<Arc<dyn Extension>> {
    let instance: Arc<E> = container.resolve::<E>()?;
    Ok(instance)
}

impl PartialEq for ExtensionClass {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ExtensionClass {}

impl fmt::Debug for ExtensionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ExtensionClass").field(&self.name).finish()
    }
}

/// One `#[extend_with(...)]` entry: an ordered list of extension classes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionDeclaration {
    extensions: Vec<ExtensionClass>,
}

impl ExtensionDeclaration {
    pub fn new(extensions: impl IntoIterator<Item = ExtensionClass>) -> Self {
        Self {
            extensions: extensions.into_iter().collect(),
        }
    }

    pub fn extensions(&self) -> &[ExtensionClass] {
        &self.extensions
    }
}

/// Bundles declarations so several test classes can share them
///
/// The `#[derive(ComposedExtensions)]` macro implements this trait; a test class
/// applies the bundle with `#[compose(Bundle)]`.
pub trait ComposedExtensions: 'static {
    fn metadata() -> TestClassMetadata;
}

/// A reference to a [`ComposedExtensions`] bundle
///
/// The bundle's metadata is produced on demand during discovery, so bundles
/// may reference each other without recursing at construction time.
#[derive(Clone, Copy)]
pub struct ComposedDeclaration {
    type_id: TypeId,
    name: &'static str,
    metadata: fn() -> TestClassMetadata,
}

impl ComposedDeclaration {
    pub fn of<C: ComposedExtensions>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            name: std::any::type_name::<C>(),
            metadata: C::metadata,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn metadata(&self) -> TestClassMetadata {
        (self.metadata)()
    }
}

impl fmt::Debug for ComposedDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComposedDeclaration").field(&self.name).finish()
    }
}

/// Declarations attached to a test class or a bundle
///
/// # Example
///
/// ```rust,ignore
/// let metadata = TestClassMetadata::builder()
///     .extend_with([ExtensionClass::of::<ResourceController>()])
///     .extend_with([ExtensionClass::of::<ResourceValidation>()])
///     .compose(ComposedDeclaration::of::<TracingBundle>());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TestClassMetadata {
    declarations: Vec<ExtensionDeclaration>,
    composed: Vec<ComposedDeclaration>,
}

impl TestClassMetadata {
    pub fn builder() -> Self {
        Self::default()
    }

    /// Append a declaration directly present on the owner
    pub fn extend_with(mut self, extensions: impl IntoIterator<Item = ExtensionClass>) -> Self {
        self.declarations.push(ExtensionDeclaration::new(extensions));
        self
    }

    /// Append a bundle whose declarations are discovered after the direct ones
    pub fn compose(mut self, composed: ComposedDeclaration) -> Self {
        self.composed.push(composed);
        self
    }

    pub fn declarations(&self) -> &[ExtensionDeclaration] {
        &self.declarations
    }

    pub fn composed(&self) -> &[ComposedDeclaration] {
        &self.composed
    }

    /// All declarations in discovery order
    ///
    /// Direct declarations come first, then bundles level by level: every
    /// bundle applied directly, then the bundles those apply, and so on. Within a
    /// level the declared order is kept. A bundle reached more than once is
    /// visited only the first time.
    pub fn discover(&self) -> Vec<ExtensionDeclaration> {
        let mut found = self.declarations.clone();
        let mut visited = HashSet::new();
        let mut level: Vec<ComposedDeclaration> = self.composed.clone();

        while !level.is_empty() {
            let mut next = Vec::new();
            for composed in level {
                if !visited.insert(composed.type_id) {
                    continue;
                }
                let metadata = composed.metadata();
                found.extend(metadata.declarations);
                next.extend(metadata.composed);
            }
            level = next;
        }
        found
    }

    /// Every declared extension class in discovery order, duplicates kept
    pub fn extension_classes(&self) -> Vec<ExtensionClass> {
        self.discover()
            .into_iter()
            .flat_map(|declaration| declaration.extensions)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Alpha;
    struct Beta;
    struct Gamma;
    struct Delta;

    impl Extension for Alpha {}
    impl Extension for Beta {}
    impl Extension for Gamma {}
    impl Extension for Delta {}

    struct Inner;
    struct Outer;
    struct Cyclic;

    impl ComposedExtensions for Inner {
        fn metadata() -> TestClassMetadata {
            TestClassMetadata::builder().extend_with([ExtensionClass::of::<Delta>()])
        }
    }

    impl ComposedExtensions for Outer {
        fn metadata() -> TestClassMetadata {
            TestClassMetadata::builder()
                .extend_with([ExtensionClass::of::<Gamma>()])
                .compose(ComposedDeclaration::of::<Inner>())
        }
    }

    impl ComposedExtensions for Cyclic {
        fn metadata() -> TestClassMetadata {
            TestClassMetadata::builder()
                .extend_with([ExtensionClass::of::<Alpha>()])
                .compose(ComposedDeclaration::of::<Cyclic>())
        }
    }

    fn names(classes: &[ExtensionClass]) -> Vec<&'static str> {
        classes
            .iter()
            .map(|class| class.name().rsplit("::").next().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_declarations_concatenate_in_order() {
        let metadata = TestClassMetadata::builder()
            .extend_with([ExtensionClass::of::<Alpha>()])
            .extend_with([ExtensionClass::of::<Beta>()]);
        assert_eq!(names(&metadata.extension_classes()), vec!["Alpha", "Beta"]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let metadata = TestClassMetadata::builder()
            .extend_with([ExtensionClass::of::<Alpha>(), ExtensionClass::of::<Beta>()])
            .extend_with([ExtensionClass::of::<Alpha>()]);
        assert_eq!(
            names(&metadata.extension_classes()),
            vec!["Alpha", "Beta", "Alpha"]
        );
    }

    #[test]
    fn test_direct_before_composed() {
        let metadata = TestClassMetadata::builder()
            .compose(ComposedDeclaration::of::<Outer>())
            .extend_with([ExtensionClass::of::<Alpha>()]);
        assert_eq!(
            names(&metadata.extension_classes()),
            vec!["Alpha", "Gamma", "Delta"]
        );
    }

    #[test]
    fn test_composed_discovered_by_distance() {
        let metadata = TestClassMetadata::builder()
            .compose(ComposedDeclaration::of::<Outer>())
            .compose(ComposedDeclaration::of::<Cyclic>());
        // Gamma and Alpha sit one level down, Delta two levels down.
        assert_eq!(
            names(&metadata.extension_classes()),
            vec!["Gamma", "Alpha", "Delta"]
        );
    }

    #[test]
    fn test_self_composing_bundle_terminates() {
        let metadata = TestClassMetadata::builder().compose(ComposedDeclaration::of::<Cyclic>());
        assert_eq!(names(&metadata.extension_classes()), vec!["Alpha"]);
    }

    #[test]
    fn test_empty_metadata() {
        assert!(TestClassMetadata::default().extension_classes().is_empty());
    }
}
