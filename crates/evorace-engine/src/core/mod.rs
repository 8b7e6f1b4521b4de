pub use self::{geometry::*, track::*, wall::*};

pub(crate) mod geometry;
pub(crate) mod track;
pub(crate) mod wall;
