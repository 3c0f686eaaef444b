use crate::{
    error::VariantError,
    list::{Alternatives, Cons, Locate, Nil},
    policy::Action,
    variant::Variant,
};
use allele_internal::Capabilities;

mod sealed {
    use crate::list::{
        sealed::{At, Sealed},
        Cons, Nil,
    };
    use allele_internal::Capabilities;

    /// Every alternative of `Self` sits in `M`, at the positions `Is`.
    pub trait Within<M, Is> {}

    impl<M> Within<M, Nil> for Nil where M: Sealed {}

    impl<H, T, M, I, Is> Within<M, (I, Is)> for Cons<H, T>
    where
        H: Capabilities,
        T: Within<M, Is>,
        M: At<H, I>,
    {
    }
}

/// Every alternative of `Self` is also an alternative of `M`, so any value a
/// `Variant<Self>` holds fits in a `Variant<M>`.
///
/// `Is` lists where each of `Self`'s alternatives sits in `M`. It is inferred,
/// and there is no impl at all when some alternative is missing from `M`:
/// ```compile_fail
/// # use allele::{Alts, Variant};
/// let wide = Variant::<Alts![i32, f32, char]>::with('c');
/// let narrow = Variant::<Alts![i32, f32]>::try_widen_from(&wide);
/// ```
///
/// Sealed, like [`Locate`].
pub trait Embed<M, Is>: Alternatives + sealed::Within<M, Is>
where
    M: Alternatives,
{
    /// Copies the alternative at `index` into `target` through the policy.
    ///
    /// # Safety
    /// The alternative at `index` must be live.
    #[doc(hidden)]
    unsafe fn copy_to(
        chain: *const Self,
        index: usize,
        target: &mut Variant<M>,
    ) -> Result<Action, VariantError>;

    /// Moves the alternative at `index` into `target` through the policy.
    ///
    /// # Safety
    /// The alternative at `index` must be live, and already marked vacant by
    /// the caller. It is read exactly once.
    #[doc(hidden)]
    unsafe fn move_to(
        chain: *mut Self,
        index: usize,
        target: &mut Variant<M>,
    ) -> Result<Action, VariantError>;
}

impl<M> Embed<M, Nil> for Nil
where
    M: Alternatives,
{
    unsafe fn copy_to(
        _: *const Self,
        index: usize,
        _: &mut Variant<M>,
    ) -> Result<Action, VariantError> {
        Err(VariantError::AlternativeNotPresent {
            requested: index,
            active: None,
        })
    }

    unsafe fn move_to(
        _: *mut Self,
        index: usize,
        _: &mut Variant<M>,
    ) -> Result<Action, VariantError> {
        Err(VariantError::AlternativeNotPresent {
            requested: index,
            active: None,
        })
    }
}

impl<H, T, M, I, Is> Embed<M, (I, Is)> for Cons<H, T>
where
    H: Capabilities,
    T: Embed<M, Is>,
    M: Locate<H, I>,
{
    unsafe fn copy_to(
        chain: *const Self,
        index: usize,
        target: &mut Variant<M>,
    ) -> Result<Action, VariantError> {
        let chain = chain.cast_mut();
        if index == 0 {
            target.set_copied::<H, I>(&*Self::head(chain))
        } else {
            T::copy_to(Self::tail(chain), index - 1, target)
        }
    }

    unsafe fn move_to(
        chain: *mut Self,
        index: usize,
        target: &mut Variant<M>,
    ) -> Result<Action, VariantError> {
        if index == 0 {
            target.set::<H, I>(Self::head(chain).read())
        } else {
            T::move_to(Self::tail(chain), index - 1, target)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fixtures::{journal, Event, NoCopy, Tracked},
        tag::Vacancy,
        Alts,
    };

    type Narrow = Alts![i32, f32];
    type Wide = Alts![i32, f32, char];
    type Shuffled = Alts![char, f32, String, i32];

    #[test]
    fn widening_keeps_the_value() {
        let a = Variant::<Narrow>::with(7i32);
        let b = Variant::<Wide>::try_widen_from(&a).unwrap();
        assert!(b.has::<i32, _>());
        assert_eq!(b.get::<i32, _>(), Ok(&7));
        // copying leaves the source alone
        assert!(a.has::<i32, _>());
    }

    #[test]
    fn widening_follows_type_not_position() {
        let a = Variant::<Narrow>::with(2.5f32);
        let b = Variant::<Shuffled>::try_widen_from(&a).unwrap();
        assert_eq!(a.index(), Some(1));
        assert_eq!(b.index(), Some(1));
        let a = Variant::<Narrow>::with(3i32);
        let b = Variant::<Shuffled>::try_widen_from(&a).unwrap();
        assert_eq!(b.index(), Some(3));
        assert_eq!(b.get::<i32, _>(), Ok(&3));
    }

    #[test]
    fn move_empties_the_source() {
        let mut a = Variant::<Narrow>::with(11i32);
        let mut b = Variant::<Wide>::with('z');
        assert_eq!(b.take_from(&mut a), Ok(Some(Action::Construct)));
        assert!(!a.has::<i32, _>());
        assert_eq!(a.vacancy(), Some(Vacancy::MovedOut));
        assert_eq!(b.get::<i32, _>(), Ok(&11));
    }

    #[test]
    fn widen_consumes() {
        let a = Variant::<Alts![String]>::with(String::from("moved"));
        let b: Variant<Alts![u8, String]> = a.widen().unwrap();
        assert_eq!(b.get::<String, _>().map(String::as_str), Ok("moved"));
    }

    #[test]
    fn empty_source_empties_target() {
        let a = Variant::<Narrow>::new();
        let mut b = Variant::<Wide>::with('q');
        assert_eq!(b.set_from(&a), Ok(None));
        assert!(b.is_empty());
        let mut a = Variant::<Narrow>::new();
        let mut b = Variant::<Wide>::with('q');
        assert_eq!(b.take_from(&mut a), Ok(None));
        assert!(b.is_empty());
    }

    #[test]
    fn cross_variant_assign_uses_the_policy() {
        let a = Variant::<Alts![Tracked]>::with(Tracked(4));
        let mut b = Variant::<Alts![u8, Tracked]>::with(Tracked(1));
        journal::clear();
        assert_eq!(b.set_from(&a), Ok(Some(Action::Assign)));
        assert_eq!(journal::take(), [Event::CopyAssign]);

        let mut a = Variant::<Alts![Tracked]>::with(Tracked(5));
        journal::clear();
        assert_eq!(b.take_from(&mut a), Ok(Some(Action::Assign)));
        assert_eq!(journal::take(), [Event::MoveAssign, Event::Drop(4)]);
        assert_eq!(b.get::<Tracked, _>(), Ok(&Tracked(5)));
        assert!(a.is_empty());
    }

    #[test]
    fn unviable_copy_is_reported() {
        let a = Variant::<Alts![NoCopy]>::with(NoCopy(1));
        let err = Variant::<Alts![u8, NoCopy]>::try_widen_from(&a).unwrap_err();
        assert!(matches!(
            err,
            VariantError::NoViableInitialization { position: 1, .. }
        ));
        assert!(a.has::<NoCopy, _>());
    }
}
