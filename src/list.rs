use allele_internal::Capabilities;
use core::{
    fmt,
    marker::PhantomData,
    mem::{self, ManuallyDrop},
    ptr,
};

#[macro_export]
/// Spells out an alternative list. If you're familiar with tuples, this is
/// `Variant`'s equivalent of writing the member types in order.
/// ```rust
/// # use allele::{Alts, Cons, Nil, Variant};
/// let v: Variant<Alts![u8, String]> = Variant::with(7u8);
///
/// // is the same as
///
/// let w: Variant<Cons<u8, Cons<String, Nil>>> = Variant::with(7u8);
/// # assert_eq!(v, w);
/// ```
macro_rules! Alts {
    () => { $crate::Nil };
    ($head:ty $(, $tail:ty)* $(,)?) => {
        $crate::Cons<$head, $crate::Alts![$($tail),*]>
    };
}

/// One link of an alternative list, and at the same time the storage for it:
/// the head alternative overlaps the storage of every later one.
///
/// Never holds a live value on its own; a [`Variant`](crate::Variant) keeps it
/// in `MaybeUninit` next to the tag saying which field is live.
#[repr(C)]
pub union Cons<H, T> {
    head: ManuallyDrop<H>,
    tail: ManuallyDrop<T>,
}

/// The end of an alternative list.
pub struct Nil;

// Each public trait below has a sealed twin whose impls carry the same bounds.
// An impl outside this crate either fails the twin or overlaps ours, so the
// positions and cells the variant trusts can only come from here.
pub(crate) mod sealed {
    use super::{Cons, Here, Nil, There};
    use allele_internal::Capabilities;
    use core::fmt;

    pub trait Sealed {}

    impl Sealed for Nil {}
    impl<H, T> Sealed for Cons<H, T>
    where
        H: Capabilities,
        T: Sealed,
    {
    }

    /// `T` sits at `I`.
    pub trait At<T, I> {}

    impl<T, Tail> At<T, Here> for Cons<T, Tail>
    where
        T: Capabilities,
        Tail: Sealed,
    {
    }

    impl<T, H, Tail, I> At<T, There<I>> for Cons<H, Tail>
    where
        H: Capabilities,
        Tail: At<T, I>,
    {
    }

    /// Something sits at `I`.
    pub trait Nth<I> {}

    impl<H, Tail> Nth<Here> for Cons<H, Tail>
    where
        H: Capabilities,
        Tail: Sealed,
    {
    }

    impl<H, Tail, I> Nth<There<I>> for Cons<H, Tail>
    where
        H: Capabilities,
        Tail: Nth<I>,
    {
    }

    pub trait AllDebug {}

    impl AllDebug for Nil {}
    impl<H, T> AllDebug for Cons<H, T>
    where
        H: Capabilities + fmt::Debug,
        T: AllDebug,
    {
    }

    pub trait AllEq {}

    impl AllEq for Nil {}
    impl<H, T> AllEq for Cons<H, T>
    where
        H: Capabilities + PartialEq,
        T: AllEq,
    {
    }
}

/// A type-level list of alternatives: [`Nil`] or [`Cons`] of a
/// [`Capabilities`] type and another list.
pub trait Alternatives: Sized + sealed::Sealed {
    /// The number of alternatives.
    const LEN: usize;

    /// Whether any alternative runs code when dropped. Taken from the types
    /// themselves, never from [`Capabilities::TRIVIALLY_DESTRUCTIBLE`].
    const NEEDS_DROP: bool;

    /// Drops the alternative at `index`.
    ///
    /// # Safety
    /// `chain` must point to storage whose alternative at `index` is live.
    /// It is not live afterwards.
    #[doc(hidden)]
    unsafe fn drop_at(chain: *mut Self, index: usize);
}

impl Alternatives for Nil {
    const LEN: usize = 0;
    const NEEDS_DROP: bool = false;

    unsafe fn drop_at(_: *mut Self, _: usize) {}
}

impl<H, T> Alternatives for Cons<H, T>
where
    H: Capabilities,
    T: Alternatives,
{
    const LEN: usize = T::LEN + 1;
    const NEEDS_DROP: bool = mem::needs_drop::<H>() || T::NEEDS_DROP;

    unsafe fn drop_at(chain: *mut Self, index: usize) {
        if index == 0 {
            ptr::drop_in_place(Self::head(chain))
        } else {
            T::drop_at(Self::tail(chain), index - 1)
        }
    }
}

impl<H, T> Cons<H, T> {
    // # Safety
    // `chain` must be valid for `size_of::<Self>()` bytes. Nothing is read.
    pub(crate) unsafe fn head(chain: *mut Self) -> *mut H {
        ptr::addr_of_mut!((*chain).head).cast()
    }

    // # Safety
    // Same as `head`
    pub(crate) unsafe fn tail(chain: *mut Self) -> *mut T {
        ptr::addr_of_mut!((*chain).tail).cast()
    }
}

/// Type-level position of the first alternative.
pub struct Here;

/// Type-level position one past `I`.
pub struct There<I>(PhantomData<I>);

pub type P0 = Here;
pub type P1 = There<P0>;
pub type P2 = There<P1>;
pub type P3 = There<P2>;
pub type P4 = There<P3>;
pub type P5 = There<P4>;
pub type P6 = There<P5>;
pub type P7 = There<P6>;
pub type P8 = There<P7>;
pub type P9 = There<P8>;
pub type P10 = There<P9>;
pub type P11 = There<P10>;
pub type P12 = There<P11>;
pub type P13 = There<P12>;
pub type P14 = There<P13>;
pub type P15 = There<P14>;

/// The list holds `T` at position `I`.
///
/// `I` is inferred, so callers write `variant.get::<String, _>()`. Inference
/// fails to pick an `I` when `T` appears twice in the list.
///
/// Sealed. Only the lists themselves know where their cells are:
/// ```compile_fail
/// # use allele::{Capabilities, Cons, Locate, Nil};
/// struct Big([u32; 16]);
/// impl Capabilities for Big {}
/// struct Elsewhere;
///
/// impl Locate<Big, Elsewhere> for Cons<u8, Nil> {
///     const POSITION: usize = 0;
///     unsafe fn cell(chain: *mut Self) -> *mut Big {
///         chain.cast()
///     }
/// }
/// ```
/// Nor with a real position, for a type the list does not hold:
/// ```compile_fail
/// # use allele::{Capabilities, Cons, Here, Locate, Nil};
/// struct Big([u32; 16]);
/// impl Capabilities for Big {}
///
/// impl Locate<Big, Here> for Cons<u8, Nil> {
///     const POSITION: usize = 0;
///     unsafe fn cell(chain: *mut Self) -> *mut Big {
///         chain.cast()
///     }
/// }
/// ```
pub trait Locate<T, I>: Alternatives + sealed::At<T, I> {
    /// `I` as a number.
    const POSITION: usize;

    /// Walks the chain to the cell of `T`.
    ///
    /// # Safety
    /// `chain` must be valid for `size_of::<Self>()` bytes. Nothing is read.
    #[doc(hidden)]
    unsafe fn cell(chain: *mut Self) -> *mut T;
}

impl<T, Tail> Locate<T, Here> for Cons<T, Tail>
where
    T: Capabilities,
    Tail: Alternatives,
{
    const POSITION: usize = 0;

    unsafe fn cell(chain: *mut Self) -> *mut T {
        Self::head(chain)
    }
}

impl<T, H, Tail, I> Locate<T, There<I>> for Cons<H, Tail>
where
    H: Capabilities,
    Tail: Locate<T, I>,
{
    const POSITION: usize = <Tail as Locate<T, I>>::POSITION + 1;

    unsafe fn cell(chain: *mut Self) -> *mut T {
        Tail::cell(Self::tail(chain))
    }
}

/// The alternative at position `I`.
pub trait Select<I>: Alternatives + sealed::Nth<I> {
    type Output: Capabilities;
}

impl<H, Tail> Select<Here> for Cons<H, Tail>
where
    H: Capabilities,
    Tail: Alternatives,
{
    type Output = H;
}

impl<H, Tail, I> Select<There<I>> for Cons<H, Tail>
where
    H: Capabilities,
    Tail: Select<I>,
{
    type Output = Tail::Output;
}

/// Every alternative is [`Debug`](fmt::Debug).
pub trait DebugAt: Alternatives + sealed::AllDebug {
    /// # Safety
    /// The alternative at `index` must be live.
    #[doc(hidden)]
    unsafe fn fmt_at(chain: *const Self, index: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl DebugAt for Nil {
    unsafe fn fmt_at(_: *const Self, _: usize, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        Ok(())
    }
}

impl<H, T> DebugAt for Cons<H, T>
where
    H: Capabilities + fmt::Debug,
    T: DebugAt,
{
    unsafe fn fmt_at(chain: *const Self, index: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chain = chain.cast_mut();
        if index == 0 {
            fmt::Debug::fmt(&*Self::head(chain), f)
        } else {
            T::fmt_at(Self::tail(chain), index - 1, f)
        }
    }
}

/// Every alternative is [`PartialEq`].
pub trait EqAt: Alternatives + sealed::AllEq {
    /// # Safety
    /// The alternative at `index` must be live in both chains.
    #[doc(hidden)]
    unsafe fn eq_at(left: *const Self, right: *const Self, index: usize) -> bool;
}

impl EqAt for Nil {
    unsafe fn eq_at(_: *const Self, _: *const Self, _: usize) -> bool {
        true
    }
}

impl<H, T> EqAt for Cons<H, T>
where
    H: Capabilities + PartialEq,
    T: EqAt,
{
    unsafe fn eq_at(left: *const Self, right: *const Self, index: usize) -> bool {
        let (left, right) = (left.cast_mut(), right.cast_mut());
        if index == 0 {
            *Self::head(left) == *Self::head(right)
        } else {
            T::eq_at(Self::tail(left), Self::tail(right), index - 1)
        }
    }
}
