//! C scalars map onto themselves

use super::MappedType;
use crate::error::Result;

macro_rules! identity_mapped {
    ($($ty:ty => $c_name:literal),* $(,)?) => {
        $(
            impl MappedType for $ty {
                type CRepr = $ty;
                const C_NAME: &'static str = $c_name;
                const NATIVE_NAME: &'static str = stringify!($ty);

                #[inline]
                fn to_c(&self) -> Result<$ty> {
                    Ok(*self)
                }

                #[inline]
                unsafe fn to_cpp(c: $ty) -> Result<Box<Self>> {
                    Ok(Box::new(c))
                }
            }
        )*
    };
}

identity_mapped! {
    bool => "bool",
    i8 => "signed char",
    i16 => "short",
    i32 => "int",
    i64 => "long long",
    u8 => "unsigned char",
    u16 => "unsigned short",
    u32 => "unsigned int",
    u64 => "unsigned long long",
    isize => "ptrdiff_t",
    usize => "size_t",
    f32 => "float",
    f64 => "double",
}
