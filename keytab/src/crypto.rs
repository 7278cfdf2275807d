mod enctype;
mod keyblock;

pub use self::{enctype::Enctype, keyblock::Keyblock};
