//! [`Vehicle`] definitions.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;

use common::{unit, DateTime, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Vehicle offered for resale.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Vehicle {
    /// ID of this [`Vehicle`].
    pub id: Id,

    /// [`Brand`] of this [`Vehicle`].
    pub brand: Brand,

    /// [`Model`] of this [`Vehicle`].
    pub model: Model,

    /// Manufacturing [`Year`] of this [`Vehicle`].
    pub year: Year,

    /// [`Color`] of this [`Vehicle`].
    pub color: Color,

    /// Price this [`Vehicle`] is offered for.
    pub price: Money,

    /// [`DateTime`] when this [`Vehicle`] was sold.
    ///
    /// [`None`] means that this [`Vehicle`] is still for sale. Once set, it's
    /// never cleared or reassigned.
    pub sold_at: Option<SaleDateTime>,

    /// [`DateTime`] when this [`Vehicle`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when attributes of this [`Vehicle`] were changed last time.
    pub updated_at: ModificationDateTime,
}

impl Vehicle {
    /// Indicates whether this [`Vehicle`] has been sold already.
    #[must_use]
    pub fn is_sold(&self) -> bool {
        self.sold_at.is_some()
    }

    /// Merges the provided [`Patch`] into this [`Vehicle`].
    ///
    /// Only the fields present in the [`Patch`] are considered. `updated_at`
    /// is refreshed only if at least one of them differs from the current
    /// value.
    ///
    /// Returns whether this [`Vehicle`] has been changed.
    pub fn apply(&mut self, patch: Patch) -> bool {
        let Patch {
            brand,
            model,
            year,
            color,
            price,
        } = patch;

        // Non-short-circuiting `|` so every field is assigned.
        let changed = assign(&mut self.brand, brand)
            | assign(&mut self.model, model)
            | assign(&mut self.year, year)
            | assign(&mut self.color, color)
            | assign(&mut self.price, price);
        if changed {
            self.updated_at = DateTime::now().coerce();
        }
        changed
    }
}

/// Assigns the `value` to the `field`, if it's present and differs.
fn assign<T: PartialEq>(field: &mut T, value: Option<T>) -> bool {
    let Some(value) = value.filter(|v| *v != *field) else {
        return false;
    };
    *field = value;
    true
}

/// Merge-patch of [`Vehicle`] attributes.
///
/// [`None`] means the attribute is omitted and stays untouched.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Patch {
    /// New [`Brand`], if any.
    pub brand: Option<Brand>,

    /// New [`Model`], if any.
    pub model: Option<Model>,

    /// New [`Year`], if any.
    pub year: Option<Year>,

    /// New [`Color`], if any.
    pub color: Option<Color>,

    /// New price, if any.
    pub price: Option<Money>,
}

impl Patch {
    /// Indicates whether this [`Patch`] sets no attributes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let Self {
            brand,
            model,
            year,
            color,
            price,
        } = self;
        brand.is_none()
            && model.is_none()
            && year.is_none()
            && color.is_none()
            && price.is_none()
    }
}

/// Transition of a [`Vehicle`] into the sold state.
///
/// Conditional: it applies only if the [`Vehicle`] is still for sale at the
/// moment of writing, so storages report whether it matched anything.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SoldTransition {
    /// ID of the [`Vehicle`] being sold.
    pub id: Id,

    /// [`DateTime`] when the [`Vehicle`] is sold.
    pub sold_at: SaleDateTime,
}

/// ID of a [`Vehicle`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Brand of a [`Vehicle`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(str, String)]
pub struct Brand(String);

impl Brand {
    /// Creates a new [`Brand`] if the given `brand` is valid.
    #[must_use]
    pub fn new(brand: impl Into<String>) -> Option<Self> {
        let brand = brand.into();
        is_valid_text(&brand).then_some(Self(brand))
    }
}

impl FromStr for Brand {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Brand`")
    }
}

/// Model of a [`Vehicle`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(str, String)]
pub struct Model(String);

impl Model {
    /// Creates a new [`Model`] if the given `model` is valid.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Option<Self> {
        let model = model.into();
        is_valid_text(&model).then_some(Self(model))
    }
}

impl FromStr for Model {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Model`")
    }
}

/// Color of a [`Vehicle`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(str, String)]
pub struct Color(String);

impl Color {
    /// Creates a new [`Color`] if the given `color` is valid.
    #[must_use]
    pub fn new(color: impl Into<String>) -> Option<Self> {
        let color = color.into();
        is_valid_text(&color).then_some(Self(color))
    }
}

impl FromStr for Color {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Color`")
    }
}

/// Checks whether the given `text` is a valid textual [`Vehicle`] attribute.
fn is_valid_text(text: &str) -> bool {
    text.trim() == text && !text.is_empty() && text.len() <= 512
}

/// Manufacturing year of a [`Vehicle`].
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
pub struct Year(u16);

impl Year {
    /// Creates a new [`Year`] if the given `year` is positive.
    #[must_use]
    pub fn new(year: u16) -> Option<Self> {
        (year > 0).then_some(Self(year))
    }
}

impl FromStr for Year {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse()
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Year`")
    }
}

#[cfg(feature = "postgres")]
impl FromSql<'_> for Year {
    accepts!(INT4);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        u16::try_from(i32::from_sql(ty, raw)?)
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| "invalid `Year`".into())
    }
}

#[cfg(feature = "postgres")]
impl ToSql for Year {
    accepts!(INT4);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        i32::from(self.0).to_sql(ty, w)
    }
}

/// [`DateTime`] when a [`Vehicle`] was created.
pub type CreationDateTime = DateTimeOf<(Vehicle, unit::Creation)>;

/// [`DateTime`] when a [`Vehicle`] was modified.
pub type ModificationDateTime = DateTimeOf<(Vehicle, unit::Modification)>;

/// [`DateTime`] when a [`Vehicle`] was sold.
pub type SaleDateTime = DateTimeOf<(Vehicle, unit::Sale)>;

#[cfg(test)]
pub(crate) mod spec {
    use common::{DateTime, Money};

    use super::{Brand, Color, Id, Model, Patch, Vehicle, Year};

    /// Builds a for-sale [`Vehicle`] updated long time ago.
    pub(crate) fn vehicle(price: u32) -> Vehicle {
        let long_ago = DateTime::from_rfc3339("2020-01-01T00:00:00Z").unwrap();
        Vehicle {
            id: Id::new(),
            brand: Brand::new("Ford").unwrap(),
            model: Model::new("Ka").unwrap(),
            year: Year::new(2022).unwrap(),
            color: Color::new("Preto").unwrap(),
            price: Money::new(price.into()).unwrap(),
            sold_at: None,
            created_at: long_ago.coerce(),
            updated_at: long_ago.coerce(),
        }
    }

    #[test]
    fn validates_text_attributes() {
        assert!(Brand::new("Ford").is_some());
        assert!(Model::new("Ka Sedan").is_some());

        assert!(Brand::new("").is_none());
        assert!(Color::new(" Preto").is_none());
        assert!(Model::new("Ka ").is_none());
        assert!(Color::new("x".repeat(513)).is_none());
    }

    #[test]
    fn validates_year() {
        assert!(Year::new(2022).is_some());
        assert!(Year::new(0).is_none());
        assert!("1999".parse::<Year>().is_ok());
        assert!("0".parse::<Year>().is_err());
        assert!("-5".parse::<Year>().is_err());
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn decodes_year_from_int4() {
        use postgres_types::{FromSql as _, Type};

        let year = Year::from_sql(&Type::INT4, &2022_i32.to_be_bytes());
        assert_eq!(year.unwrap(), Year::new(2022).unwrap());

        for invalid in [0_i32, -1, 70_000] {
            let year = Year::from_sql(&Type::INT4, &invalid.to_be_bytes());
            assert!(year.is_err(), "{invalid} is decoded");
        }
    }

    #[test]
    fn patch_changes_only_present_fields() {
        let original = vehicle(50_000);
        let mut updated = original.clone();

        let changed = updated.apply(Patch {
            brand: Brand::new("Fiat"),
            ..Patch::default()
        });

        assert!(changed);
        assert_eq!(updated.brand, Brand::new("Fiat").unwrap());
        assert_eq!(updated.model, original.model);
        assert_eq!(updated.year, original.year);
        assert_eq!(updated.color, original.color);
        assert_eq!(updated.price, original.price);
        assert_eq!(updated.sold_at, original.sold_at);
        assert_eq!(updated.created_at, original.created_at);
        assert!(updated.updated_at > original.updated_at);
    }

    #[test]
    fn patch_with_same_values_changes_nothing() {
        let original = vehicle(50_000);
        let mut updated = original.clone();

        let changed = updated.apply(Patch {
            brand: Some(original.brand.clone()),
            price: Some(original.price),
            ..Patch::default()
        });

        assert!(!changed);
        assert_eq!(updated, original);
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let original = vehicle(50_000);
        let mut updated = original.clone();

        assert!(Patch::default().is_empty());
        assert!(!updated.apply(Patch::default()));
        assert_eq!(updated, original);
    }
}
