//! Helper macros

/// Count the number of comma separated expressions
// mutliple version to limit recusion
#[macro_export]
macro_rules! count_exprs {
    ($_a:expr, $_b:expr, $_c:expr, $_d:expr, $_e:expr,
     $_f:expr, $_g:expr, $_h:expr, $_i:expr, $_j:expr,
     $($rest:expr),+ $(,)?) => {
        10usize + $crate::count_exprs!($($rest),+)
    };
    ($_a:expr, $_b:expr, $_c:expr, $_d:expr, $_e:expr,
     $($rest:expr),+ $(,)?) => {
        5usize + $crate::count_exprs!($($rest),+)
    };
    ($_first:expr, $($rest:expr),+ $(,)?) => {
        1usize + $crate::count_exprs!($($rest),+)
    };
    ($_first:expr $(,)?) => {
        1usize
    };
    () => {
        0usize
    };
}

/// Get the name of the surrounding function
#[macro_export]
macro_rules! func_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            core::any::type_name::<T>()
        }
        let name = type_name_of(f);
        match name.strip_suffix("::f") {
            Some(stripped) => stripped,
            None => name,
        }
    }};
}
