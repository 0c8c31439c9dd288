pub mod collaborators;
pub mod errors;
pub mod join;
pub mod model;
pub mod normalize;
pub mod pagination;
pub mod query;
pub mod rules;
pub mod util;

pub use collaborators::*;
pub use errors::*;
pub use model::*;
pub use pagination::PaginationStyle;
pub use query::*;
pub use rules::*;
