mod crosswalk;
mod entrance;
mod filler;
mod line;
mod marking;
mod point;
mod rule;
mod serializing;
mod trajectory;

pub use crosswalk::*;
pub use entrance::*;
pub use filler::*;
pub use line::*;
pub use marking::*;
pub use point::*;
pub use rule::*;
pub use serializing::*;
pub use trajectory::*;
