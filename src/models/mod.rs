pub mod image_item;
pub mod loaders;
pub mod mode;

pub use image_item::{ImageItem, ItemId, ItemStatus, PendingImage, SourceFile};
pub use loaders::{load_folder, RawFile};
pub use mode::{ToolMode, MAX_IMAGES};
