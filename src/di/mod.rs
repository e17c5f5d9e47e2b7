mod builder;
mod container;
mod injectable;
mod module;

pub use builder::ContainerBuilder;
pub use container::Container;
pub use injectable::Injectable;
pub use module::Module;
