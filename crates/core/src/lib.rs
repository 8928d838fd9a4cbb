pub mod arbitration;
pub mod assembly;
pub mod pipeline;
pub mod segmentation;
pub mod shared;
