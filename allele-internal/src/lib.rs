#![no_std]
extern crate alloc;

use alloc::{boxed::Box, string::String, vec::Vec};
use core::{fmt, mem};

/// Returned by a lifecycle hook the type does not provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Unsupported;

impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("lifecycle operation not supported by this type")
    }
}

/// This trait describes what a type can do over its lifetime: which ways it can
/// be constructed, assigned and destroyed.
///
/// The associated consts are the answers, the methods are the hooks that carry
/// them out. A hook must succeed whenever its const says the capability is
/// present. The defaults describe a move-only type.
///
/// **Note**: prefer `#[derive(Capabilities)]` over implementing this by hand.
pub trait Capabilities: Sized {
    /// A new value can be made from `&Self`.
    const COPY_CONSTRUCTIBLE: bool = false;

    /// A new value can be made by moving `Self` into place.
    const MOVE_CONSTRUCTIBLE: bool = true;

    /// A live value can be overwritten from `&Self`.
    const COPY_ASSIGNABLE: bool = false;

    /// A live value can be overwritten by moving a `Self` into it.
    const MOVE_ASSIGNABLE: bool = true;

    /// A value can be made out of nothing.
    const DEFAULT_CONSTRUCTIBLE: bool = false;

    /// Dropping a value runs no code.
    ///
    /// Informational. Containers still run the native drop of every live value.
    const TRIVIALLY_DESTRUCTIBLE: bool = !mem::needs_drop::<Self>();

    /// `Some(len)` if `Self` is a fixed-length array. Every hook of an array
    /// works element by element.
    const EXTENT: Option<usize> = None;

    fn copy_construct(&self) -> Result<Self, Unsupported> {
        Err(Unsupported)
    }

    fn copy_assign(&mut self, _source: &Self) -> Result<(), Unsupported> {
        Err(Unsupported)
    }

    fn move_assign(&mut self, source: Self) {
        *self = source;
    }

    fn default_construct() -> Result<Self, Unsupported> {
        Err(Unsupported)
    }
}

/// Whether `T` is a fixed-length array, and if so how long.
pub const fn extent<T: Capabilities>() -> Option<usize> {
    T::EXTENT
}

macro_rules! plain {
    ($($ty:ty),* $(,)?) => {$(
        impl Capabilities for $ty {
            const COPY_CONSTRUCTIBLE: bool = true;
            const COPY_ASSIGNABLE: bool = true;
            const DEFAULT_CONSTRUCTIBLE: bool = true;

            fn copy_construct(&self) -> Result<Self, Unsupported> {
                Ok(self.clone())
            }

            fn copy_assign(&mut self, source: &Self) -> Result<(), Unsupported> {
                self.clone_from(source);
                Ok(())
            }

            fn default_construct() -> Result<Self, Unsupported> {
                Ok(<$ty>::default())
            }
        }
    )*};
}

plain!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, bool, char, (),
    String,
);

impl<T: Capabilities> Capabilities for Vec<T> {
    const COPY_CONSTRUCTIBLE: bool = T::COPY_CONSTRUCTIBLE;
    // Assigning rebuilds the elements, so it needs only element construction
    const COPY_ASSIGNABLE: bool = T::COPY_CONSTRUCTIBLE;
    const DEFAULT_CONSTRUCTIBLE: bool = true;

    fn copy_construct(&self) -> Result<Self, Unsupported> {
        self.iter().map(T::copy_construct).collect()
    }

    fn copy_assign(&mut self, source: &Self) -> Result<(), Unsupported> {
        *self = source.copy_construct()?;
        Ok(())
    }

    fn default_construct() -> Result<Self, Unsupported> {
        Ok(Vec::new())
    }
}

impl<T: Capabilities> Capabilities for Box<T> {
    const COPY_CONSTRUCTIBLE: bool = T::COPY_CONSTRUCTIBLE;
    const COPY_ASSIGNABLE: bool = T::COPY_ASSIGNABLE;
    const DEFAULT_CONSTRUCTIBLE: bool = T::DEFAULT_CONSTRUCTIBLE;

    fn copy_construct(&self) -> Result<Self, Unsupported> {
        T::copy_construct(self).map(Box::new)
    }

    fn copy_assign(&mut self, source: &Self) -> Result<(), Unsupported> {
        T::copy_assign(self, source)
    }

    fn default_construct() -> Result<Self, Unsupported> {
        T::default_construct().map(Box::new)
    }
}

impl<T: Capabilities> Capabilities for Option<T> {
    const COPY_CONSTRUCTIBLE: bool = T::COPY_CONSTRUCTIBLE;
    const COPY_ASSIGNABLE: bool = T::COPY_CONSTRUCTIBLE;
    const DEFAULT_CONSTRUCTIBLE: bool = true;

    fn copy_construct(&self) -> Result<Self, Unsupported> {
        self.as_ref().map(T::copy_construct).transpose()
    }

    fn copy_assign(&mut self, source: &Self) -> Result<(), Unsupported> {
        if let (Some(slot), Some(item)) = (self.as_mut(), source) {
            if T::COPY_ASSIGNABLE {
                return slot.copy_assign(item);
            }
        }
        *self = source.copy_construct()?;
        Ok(())
    }

    fn default_construct() -> Result<Self, Unsupported> {
        Ok(None)
    }
}

// Arrays take every answer from their element type, so the whole array uses
// one strategy.
impl<T: Capabilities, const N: usize> Capabilities for [T; N] {
    const COPY_CONSTRUCTIBLE: bool = T::COPY_CONSTRUCTIBLE;
    const MOVE_CONSTRUCTIBLE: bool = T::MOVE_CONSTRUCTIBLE;
    const COPY_ASSIGNABLE: bool = T::COPY_ASSIGNABLE;
    const MOVE_ASSIGNABLE: bool = T::MOVE_ASSIGNABLE;
    const DEFAULT_CONSTRUCTIBLE: bool = T::DEFAULT_CONSTRUCTIBLE;
    const TRIVIALLY_DESTRUCTIBLE: bool = T::TRIVIALLY_DESTRUCTIBLE;
    const EXTENT: Option<usize> = Some(N);

    fn copy_construct(&self) -> Result<Self, Unsupported> {
        if !T::COPY_CONSTRUCTIBLE {
            return Err(Unsupported);
        }
        gather(self.iter().map(T::copy_construct))
    }

    fn copy_assign(&mut self, source: &Self) -> Result<(), Unsupported> {
        if !T::COPY_ASSIGNABLE {
            return Err(Unsupported);
        }
        self.iter_mut()
            .zip(source)
            .try_for_each(|(slot, item)| slot.copy_assign(item))
    }

    fn move_assign(&mut self, source: Self) {
        for (slot, item) in self.iter_mut().zip(source) {
            slot.move_assign(item);
        }
    }

    fn default_construct() -> Result<Self, Unsupported> {
        if !T::DEFAULT_CONSTRUCTIBLE {
            return Err(Unsupported);
        }
        gather((0..N).map(|_| T::default_construct()))
    }
}

fn gather<T, const N: usize>(
    items: impl Iterator<Item = Result<T, Unsupported>>,
) -> Result<[T; N], Unsupported> {
    let items = items.collect::<Result<Vec<T>, Unsupported>>()?;
    <[T; N]>::try_from(items).map_err(|_| Unsupported)
}
