mod seq_iter;
pub use seq_iter::*;

mod raw_buf;

mod dyn_array;
pub use dyn_array::*;

//--------------------------------------------------------------

macro_rules! impl_slice_partial_eq {
    ([$($vars:tt)*] $lhs:ty, $rhs:ty) => {
        impl<T, U, $($vars)*> PartialEq<$rhs> for $lhs
        where
            T : PartialEq<U>,
        {
            #[inline]
            fn eq(&self, other: &$rhs) -> bool { <$lhs as AsRef<[T]>>::as_ref(self) == <$rhs as AsRef<[U]>>::as_ref(other) }
        }
    };
}
use impl_slice_partial_eq;

//--------------------------------------------------------------

/// Writes the local length back on drop, so a panic halfway through filling a buffer keeps every written element owned
struct SetLenOnDrop<'a> {
    len       : &'a mut usize,
    local_len : usize,
}

impl<'a> SetLenOnDrop<'a> {
    #[inline]
    fn new(len: &'a mut usize) -> Self {
        SetLenOnDrop { local_len: *len, len }
    }

    #[inline]
    fn current_len(&self) -> usize {
        self.local_len
    }

    #[inline]
    fn increment_len(&mut self, increment: usize) {
        self.local_len += increment;
    }
}

impl Drop for SetLenOnDrop<'_> {
    #[inline]
    fn drop(&mut self) {
        *self.len = self.local_len;
    }
}
