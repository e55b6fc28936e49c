use kiln_logging::LogCategory;

pub(crate) const LOG_ALLOC_CAT : LogCategory = LogCategory::new("Alloc");
pub(crate) const LOG_DYNARR_CAT : LogCategory = LogCategory::new_with_sub("Collections", "DynArray");

cfg_if::cfg_if! {
    if #[cfg(feature = "logging")] {
        macro_rules! core_log {
            ($level:ident, $category:expr, $($arg:tt)+) => {
                kiln_logging::$level!($category, $($arg)+)
            };
        }
    } else {
        macro_rules! core_log {
            ($level:ident, $category:expr, $($arg:tt)+) => {{
                let _ = &$category;
                let _ = format_args!($($arg)+);
            }};
        }
    }
}
pub(crate) use core_log;
