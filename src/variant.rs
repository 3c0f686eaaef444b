use crate::{
    error::VariantError,
    list::{Alternatives, DebugAt, EqAt, Locate, Select},
    policy::{self, Action, ByCopy, ByMove, Slot, Source, Viable},
    tag::{Tag, Vacancy},
    widen::Embed,
};
use allele_internal::Capabilities;
use core::{any::type_name, fmt, mem::MaybeUninit};

/// Holds at most one value out of the alternative list `L`, in storage sized
/// for the largest alternative.
///
/// Alternatives are addressed by type (`get::<String, _>()`, the position is
/// inferred) or by type-level position (`get_at::<P1>()`). Every way of putting
/// a value in goes through the same copy-or-move policy and reports the
/// [`Action`] it took.
///
/// ```rust
/// # use allele::{Alts, Variant};
/// let mut v = Variant::<Alts![i32, String]>::with(42i32);
/// assert!(v.has::<i32, _>());
///
/// v.set(String::from("hi")).unwrap();
/// assert!(!v.has::<i32, _>());
/// assert_eq!(v.get::<String, _>().unwrap(), "hi");
/// ```
pub struct Variant<L: Alternatives> {
    pub(crate) tag: Tag<L>,
    storage: MaybeUninit<L>,
}

impl<L> Variant<L>
where
    L: Alternatives,
{
    /// The number of alternatives.
    pub const ALTERNATIVES: usize = L::LEN;

    /// Creates a variant holding nothing.
    pub fn new() -> Self {
        Variant {
            tag: Tag::vacant(Vacancy::Unset),
            storage: MaybeUninit::uninit(),
        }
    }

    /// Creates a variant holding `value`.
    ///
    /// Rejected at compile time if `T` opts out of move construction; use
    /// [`try_with`](Self::try_with) for such types.
    pub fn with<T, I>(value: T) -> Self
    where
        T: Capabilities,
        L: Locate<T, I>,
    {
        #[allow(clippy::let_unit_value)]
        let () = Viable::<T>::BY_MOVE;
        let mut variant = Self::new();
        // A move into a vacant slot always constructs
        let action = variant.put::<T, I, _>(ByMove(value));
        debug_assert_eq!(action, Action::Construct);
        variant
    }

    /// Creates a variant holding `value`, for any `T`.
    pub fn try_with<T, I>(value: T) -> Result<Self, VariantError>
    where
        T: Capabilities,
        L: Locate<T, I>,
    {
        let mut variant = Self::new();
        variant.set(value)?;
        Ok(variant)
    }

    /// Creates a variant holding a copy of `value`.
    pub fn copied<T, I>(value: &T) -> Result<Self, VariantError>
    where
        T: Capabilities,
        L: Locate<T, I>,
    {
        let mut variant = Self::new();
        variant.set_copied(value)?;
        Ok(variant)
    }

    /// Creates a variant from one whose alternatives are all among `L`'s,
    /// copying its value.
    pub fn try_widen_from<S, Is>(source: &Variant<S>) -> Result<Self, VariantError>
    where
        S: Embed<L, Is>,
    {
        let mut variant = Self::new();
        variant.set_from(source)?;
        Ok(variant)
    }

    /// Moves the value into a variant over a wider alternative list `M`.
    ///
    /// Narrowing does not compile:
    /// ```compile_fail
    /// # use allele::{Alts, Variant};
    /// let wide = Variant::<Alts![i32, f32, char]>::with(1i32);
    /// let narrow = wide.widen::<Alts![i32, f32], _>();
    /// ```
    pub fn widen<M, Is>(self) -> Result<Variant<M>, VariantError>
    where
        M: Alternatives,
        L: Embed<M, Is>,
    {
        let mut source = self;
        let mut target = Variant::new();
        target.take_from(&mut source)?;
        Ok(target)
    }

    /// Copies the variant and its live value, if any.
    pub fn try_clone<Is>(&self) -> Result<Self, VariantError>
    where
        L: Embed<L, Is>,
    {
        Self::try_widen_from(self)
    }

    /// Moves `value` in.
    ///
    /// If another alternative is live it is dropped first. On
    /// [`VariantError::NoViableInitialization`] the variant is left empty.
    pub fn set<T, I>(&mut self, value: T) -> Result<Action, VariantError>
    where
        T: Capabilities,
        L: Locate<T, I>,
    {
        let action = self.put::<T, I, _>(ByMove(value));
        self.settle::<T, I>(action)
    }

    /// Copies `value` in. Same rules as [`set`](Self::set).
    pub fn set_copied<T, I>(&mut self, value: &T) -> Result<Action, VariantError>
    where
        T: Capabilities,
        L: Locate<T, I>,
    {
        let action = self.put::<T, I, _>(ByCopy(value));
        self.settle::<T, I>(action)
    }

    /// Copies the value of a narrower variant in, or empties `self` if
    /// `source` is empty.
    ///
    /// Returns the action taken, `None` if there was nothing to copy.
    pub fn set_from<S, Is>(&mut self, source: &Variant<S>) -> Result<Option<Action>, VariantError>
    where
        S: Embed<L, Is>,
    {
        match source.tag.position() {
            None => {
                self.reset();
                Ok(None)
            }
            // # Safety
            // The tag says `index` is live
            Some(index) => unsafe { S::copy_to(source.storage.as_ptr(), index, self) }.map(Some),
        }
    }

    /// Moves the value of a narrower variant in, leaving `source` empty.
    /// Empties `self` if `source` is empty.
    pub fn take_from<S, Is>(
        &mut self,
        source: &mut Variant<S>,
    ) -> Result<Option<Action>, VariantError>
    where
        S: Embed<L, Is>,
    {
        let Some(index) = source.tag.position() else {
            self.reset();
            return Ok(None);
        };
        source.tag.vacate(Vacancy::MovedOut);
        // # Safety
        // `index` was live and is now vacated, so the value is read exactly once
        unsafe { S::move_to(source.storage.as_mut_ptr(), index, self) }.map(Some)
    }

    /// Whether `T` is the live alternative.
    pub fn has<T, I>(&self) -> bool
    where
        L: Locate<T, I>,
    {
        self.tag.position() == Some(<L as Locate<T, I>>::POSITION)
    }

    /// Whether the alternative at `index` is live.
    pub fn has_at(&self, index: usize) -> bool {
        self.tag.position() == Some(index)
    }

    /// Whether the alternative at type-level position `I` is live.
    pub fn has_index<I>(&self) -> bool
    where
        L: Select<I> + Locate<<L as Select<I>>::Output, I>,
    {
        self.has::<<L as Select<I>>::Output, I>()
    }

    /// The position of the live alternative.
    pub fn index(&self) -> Option<usize> {
        self.tag.position()
    }

    /// Returns whether no alternative is live.
    pub fn is_empty(&self) -> bool {
        self.tag.position().is_none()
    }

    /// Why the variant is empty, `None` if it isn't.
    pub fn vacancy(&self) -> Option<Vacancy> {
        self.tag.vacancy()
    }

    /// Borrows the live `T`, or fails with
    /// [`VariantError::AlternativeNotPresent`].
    pub fn get<T, I>(&self) -> Result<&T, VariantError>
    where
        L: Locate<T, I>,
    {
        self.check::<T, I>()?;
        // # Safety
        // `check` saw `T` live. The pointer is only read through.
        Ok(unsafe { &*<L as Locate<T, I>>::cell(self.storage.as_ptr().cast_mut()) })
    }

    /// Mutably borrows the live `T`. Same error as [`get`](Self::get).
    pub fn get_mut<T, I>(&mut self) -> Result<&mut T, VariantError>
    where
        L: Locate<T, I>,
    {
        self.check::<T, I>()?;
        // # Safety
        // `check` saw `T` live
        Ok(unsafe { &mut *<L as Locate<T, I>>::cell(self.storage.as_mut_ptr()) })
    }

    /// Borrows the alternative at type-level position `I`, or fails with
    /// [`VariantError::AlternativeNotPresent`].
    pub fn get_at<I>(&self) -> Result<&<L as Select<I>>::Output, VariantError>
    where
        L: Select<I> + Locate<<L as Select<I>>::Output, I>,
    {
        self.get::<<L as Select<I>>::Output, I>()
    }

    /// Moves the live `T` out, leaving the variant empty.
    pub fn take<T, I>(&mut self) -> Result<T, VariantError>
    where
        L: Locate<T, I>,
    {
        self.check::<T, I>()?;
        self.tag.vacate(Vacancy::MovedOut);
        // # Safety
        // `T` was live and is now vacated, so it is read exactly once
        Ok(unsafe { <L as Locate<T, I>>::cell(self.storage.as_mut_ptr()).read() })
    }

    /// Drops the live alternative, if any.
    pub fn reset(&mut self) {
        self.evict(Vacancy::Unset);
    }

    fn check<T, I>(&self) -> Result<(), VariantError>
    where
        L: Locate<T, I>,
    {
        let requested = <L as Locate<T, I>>::POSITION;
        match self.tag.position() {
            Some(active) if active == requested => Ok(()),
            active => Err(VariantError::AlternativeNotPresent { requested, active }),
        }
    }

    /// Runs the policy against the cell of `T`. Any other live alternative is
    /// dropped first, so the slot is either `T` or vacant.
    fn put<T, I, S>(&mut self, source: S) -> Action
    where
        T: Capabilities,
        L: Locate<T, I>,
        S: Source<T>,
    {
        let position = <L as Locate<T, I>>::POSITION;
        if self.tag.position().is_some_and(|live| live != position) {
            self.evict(Vacancy::Unset);
        }
        // # Safety
        // The cell and the tag both belong to `self`, and the tag is accurate
        let slot = unsafe {
            Slot::new(
                <L as Locate<T, I>>::cell(self.storage.as_mut_ptr()),
                &mut self.tag,
                position,
            )
        };
        policy::initialize(slot, source)
    }

    fn settle<T, I>(&mut self, action: Action) -> Result<Action, VariantError>
    where
        L: Locate<T, I>,
    {
        if action != Action::Unviable {
            return Ok(action);
        }
        let position = <L as Locate<T, I>>::POSITION;
        tracing::debug!(position, ty = type_name::<T>(), "no viable initialization");
        self.evict(Vacancy::Failed);
        Err(VariantError::NoViableInitialization {
            position,
            type_name: type_name::<T>(),
        })
    }

    fn evict(&mut self, reason: Vacancy) {
        let live = self.tag.position();
        self.tag.vacate(reason);
        if let Some(index) = live {
            if L::NEEDS_DROP {
                // # Safety
                // `index` was live and the tag no longer says so, so it is
                // dropped exactly once
                unsafe { L::drop_at(self.storage.as_mut_ptr(), index) }
            }
        }
    }
}

impl<L> Drop for Variant<L>
where
    L: Alternatives,
{
    fn drop(&mut self) {
        self.evict(Vacancy::Unset);
    }
}

impl<L> Default for Variant<L>
where
    L: Alternatives,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<L> fmt::Debug for Variant<L>
where
    L: DebugAt,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag.position() {
            Some(index) => {
                write!(f, "Variant({index}: ")?;
                // # Safety
                // The tag says `index` is live
                unsafe { L::fmt_at(self.storage.as_ptr(), index, f)? };
                f.write_str(")")
            }
            None => f.debug_tuple("Variant").field(&self.tag).finish(),
        }
    }
}

impl<L> PartialEq for Variant<L>
where
    L: EqAt,
{
    fn eq(&self, other: &Self) -> bool {
        match (self.tag.position(), other.tag.position()) {
            // # Safety
            // Both tags say `index` is live
            (Some(left), Some(right)) if left == right => unsafe {
                L::eq_at(self.storage.as_ptr(), other.storage.as_ptr(), left)
            },
            (None, None) => true,
            _ => false,
        }
    }
}
