//! Growable contiguous arrays over pluggable allocator strategies
//!
//! ```
//! use kiln::prelude::*;
//!
//! let mut arr = dynarr![1, 2, 3];
//! arr.push_back(4);
//! arr.erase(0);
//! assert_eq!(arr, [2, 3, 4]);
//! ```

pub use kiln_base as base;
pub use kiln_logging as logging;
pub use kiln_core::{alloc, collections, error};

pub mod prelude {
    pub use kiln_core::prelude::*;
    pub use kiln_logging::{Logger, LogCategory, LogLevel, set_logger, get_logger};
}
