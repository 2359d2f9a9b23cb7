use std::fmt::Debug;

/// Losslessly converts `n` to `u8` using `TryFrom` or panics.
///
/// # Panics
///
/// Panics if the conversion errors.
pub fn cast_u8<T>(n: T) -> u8
where
    T: TryInto<u8>,
    <T as TryInto<u8>>::Error: Debug,
{
    n.try_into().expect("Expected N to fit in u8")
}

/// Losslessly converts `n` to `u32` using `TryFrom` or panics.
///
/// # Panics
///
/// Panics if the conversion errors.
pub fn cast_u32<T>(n: T) -> u32
where
    T: TryInto<u32>,
    <T as TryInto<u32>>::Error: Debug,
{
    n.try_into().expect("Expected N to fit in u32")
}

/// Losslessly converts `n` to `usize` using `TryFrom` or panics.
///
/// # Panics
///
/// Panics if the conversion errors.
pub fn cast_usize<T>(n: T) -> usize
where
    T: TryInto<usize>,
    <T as TryInto<usize>>::Error: Debug,
{
    n.try_into().expect("Expected N to fit in usize")
}
