pub mod path;
pub mod resolvable;
pub mod value;

pub use path::*;
pub use resolvable::*;
pub use value::*;
