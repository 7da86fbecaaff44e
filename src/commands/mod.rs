pub mod context;
pub mod ignore;
pub mod roots;
pub mod scan;
pub mod switch;

pub use context::*;
pub use ignore::*;
pub use roots::*;
pub use scan::*;
pub use switch::*;
