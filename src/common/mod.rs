mod once_map;

pub use once_map::OnceMap;
