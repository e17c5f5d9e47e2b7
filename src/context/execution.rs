use super::{TestClass, TestClassDescriptor};

/// What the runner tells a lifecycle participant about the current scope
pub trait ExtensionContext: Send + Sync {
    /// The test class in scope, if any
    ///
    /// Suite-level contexts have none; such contexts never resolve extensions.
    fn test_class(&self) -> Option<&TestClassDescriptor>;

    fn display_name(&self) -> &str;

    /// The running test method, for method-level contexts
    fn test_method(&self) -> Option<&str> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Suite,
    Class,
    Method,
}

/// Plain [`ExtensionContext`] for the three scopes a runner drives
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    scope: Scope,
    display_name: String,
    test_class: Option<TestClassDescriptor>,
    test_method: Option<String>,
}

impl ExecutionContext {
    pub fn suite(display_name: impl Into<String>) -> Self {
        Self {
            scope: Scope::Suite,
            display_name: display_name.into(),
            test_class: None,
            test_method: None,
        }
    }

    pub fn class<T: TestClass>() -> Self {
        Self::for_class(TestClassDescriptor::of::<T>())
    }

    pub fn for_class(test_class: TestClassDescriptor) -> Self {
        Self {
            scope: Scope::Class,
            display_name: test_class.name().to_string(),
            test_class: Some(test_class),
            test_method: None,
        }
    }

    pub fn method<T: TestClass>(test_method: impl Into<String>) -> Self {
        let test_method = test_method.into();
        let test_class = TestClassDescriptor::of::<T>();
        Self {
            scope: Scope::Method,
            display_name: format!("{}::{}", test_class.name(), test_method),
            test_class: Some(test_class),
            test_method: Some(test_method),
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }
}

impl ExtensionContext for ExecutionContext {
    fn test_class(&self) -> Option<&TestClassDescriptor> {
        self.test_class.as_ref()
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn test_method(&self) -> Option<&str> {
        self.test_method.as_deref()
    }
}
