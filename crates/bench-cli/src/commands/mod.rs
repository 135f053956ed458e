pub mod compare;
pub mod pipeline;
pub mod trends;
pub mod weights;
