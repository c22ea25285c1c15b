//! [`Vehicle`]-related REST API definitions.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    Json,
};
#[cfg(doc)]
use common::DateTime;
use common::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::{command, domain, domain::vehicle, query, read, Command as _};

use crate::{api::PrivilegeError, define_error, AsError, Context, Error};

/// Vehicle offered for resale.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Vehicle {
    /// ID of this [`Vehicle`].
    pub id: vehicle::Id,

    /// Brand of this [`Vehicle`].
    pub brand: String,

    /// Model of this [`Vehicle`].
    pub model: String,

    /// Manufacturing year of this [`Vehicle`].
    pub year: u16,

    /// Color of this [`Vehicle`].
    pub color: String,

    /// Price this [`Vehicle`] is offered for.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// [`DateTime`] when this [`Vehicle`] was sold, if it was.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "common::datetime::serde::rfc3339::option"
    )]
    pub sold_at: Option<vehicle::SaleDateTime>,

    /// [`DateTime`] when this [`Vehicle`] was created.
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub created_at: vehicle::CreationDateTime,

    /// [`DateTime`] when this [`Vehicle`] was updated last time.
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub updated_at: vehicle::ModificationDateTime,
}

impl From<domain::Vehicle> for Vehicle {
    fn from(vehicle: domain::Vehicle) -> Self {
        let domain::Vehicle {
            id,
            brand,
            model,
            year,
            color,
            price,
            sold_at,
            created_at,
            updated_at,
        } = vehicle;
        Self {
            id,
            brand: brand.to_string(),
            model: model.to_string(),
            year: year.into(),
            color: color.to_string(),
            price: price.into(),
            sold_at,
            created_at,
            updated_at,
        }
    }
}

/// Attributes of a new [`Vehicle`].
#[derive(Clone, Debug, Deserialize)]
pub struct NewVehicle {
    /// Brand of the new [`Vehicle`].
    pub brand: String,

    /// Model of the new [`Vehicle`].
    pub model: String,

    /// Manufacturing year of the new [`Vehicle`].
    pub year: u16,

    /// Color of the new [`Vehicle`].
    pub color: String,

    /// Price of the new [`Vehicle`].
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Changes of [`Vehicle`] attributes.
///
/// Omitted attributes stay untouched.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct VehiclePatch {
    /// New brand, if any.
    pub brand: Option<String>,

    /// New model, if any.
    pub model: Option<String>,

    /// New manufacturing year, if any.
    pub year: Option<u16>,

    /// New color, if any.
    pub color: Option<String>,

    /// New price, if any.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
}

impl TryFrom<VehiclePatch> for vehicle::Patch {
    type Error = Error;

    fn try_from(patch: VehiclePatch) -> Result<Self, Self::Error> {
        let VehiclePatch {
            brand,
            model,
            year,
            color,
            price,
        } = patch;
        Ok(Self {
            brand: brand
                .map(|b| valid(vehicle::Brand::new(b), "brand"))
                .transpose()?,
            model: model
                .map(|m| valid(vehicle::Model::new(m), "model"))
                .transpose()?,
            year: year
                .map(|y| valid(vehicle::Year::new(y), "year"))
                .transpose()?,
            color: color
                .map(|c| valid(vehicle::Color::new(c), "color"))
                .transpose()?,
            price: price
                .map(|p| valid(Money::new(p), "price"))
                .transpose()?,
        })
    }
}

/// Parameters of a [`Vehicle`] list.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct ListParams {
    /// Sale status to filter [`Vehicle`]s by, if any.
    pub is_sold: Option<bool>,
}

/// Unwraps the provided `value`, reporting the `field` as invalid if it's
/// absent.
fn valid<T>(value: Option<T>, field: &str) -> Result<T, Error> {
    value.ok_or_else(|| Error::invalid_request(&format!("invalid `{field}`")))
}

/// Parses the [`vehicle::Id`] from the request path.
fn vehicle_id(
    path: Result<Path<String>, PathRejection>,
) -> Result<vehicle::Id, Error> {
    let Path(id) = path.map_err(AsError::into_error)?;
    id.parse()
        .map_err(|_| VehicleError::InvalidIdentifier.into())
}

/// Creates a new [`Vehicle`].
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - request is not authenticated;
/// - `PERMISSION_DENIED` - user is not allowed to create [`Vehicle`]s;
/// - `INVALID_REQUEST` - attributes are missing or invalid.
#[tracing::instrument(skip_all)]
pub async fn create(
    ctx: Context,
    body: Result<Json<NewVehicle>, JsonRejection>,
) -> Result<(http::StatusCode, Json<Vehicle>), Error> {
    let session = ctx.current_session().await?;
    let Json(NewVehicle {
        brand,
        model,
        year,
        color,
        price,
    }) = body.map_err(AsError::into_error)?;

    let vehicle = ctx
        .service()
        .execute(command::CreateVehicle {
            brand: valid(vehicle::Brand::new(brand), "brand")?,
            model: valid(vehicle::Model::new(model), "model")?,
            year: valid(vehicle::Year::new(year), "year")?,
            color: valid(vehicle::Color::new(color), "color")?,
            price: valid(Money::new(price), "price")?,
            initiator_role: session.role,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((http::StatusCode::CREATED, Json(vehicle.into())))
}

/// Lists [`Vehicle`]s ordered by price, optionally filtered by their sale
/// status.
///
/// # Errors
///
/// Possible error codes:
/// - `INVALID_REQUEST` - query parameters are invalid.
#[tracing::instrument(skip_all)]
pub async fn list(
    ctx: Context,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Vehicle>>, Error> {
    let Query(ListParams { is_sold }) =
        params.map_err(AsError::into_error)?;

    let vehicles = ctx
        .service()
        .execute(query::vehicles::List::by(read::vehicle::list::Filter {
            is_sold: is_sold.map(read::vehicle::IsSold),
        }))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(vehicles.into_iter().map(Into::into).collect()))
}

/// Returns a [`Vehicle`] by its ID.
///
/// # Errors
///
/// Possible error codes:
/// - `INVALID_IDENTIFIER` - provided ID is malformed;
/// - `VEHICLE_NOT_EXISTS` - [`Vehicle`] with the provided ID doesn't exist.
#[tracing::instrument(skip_all)]
pub async fn get(
    ctx: Context,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vehicle>, Error> {
    let id = vehicle_id(path)?;

    ctx.service()
        .execute(query::vehicle::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .map(|v| Json(v.into()))
        .ok_or_else(|| VehicleError::NotExists.into())
}

/// Updates attributes of a [`Vehicle`].
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - request is not authenticated;
/// - `INVALID_IDENTIFIER` - provided ID is malformed;
/// - `INVALID_REQUEST` - attributes are invalid;
/// - `VEHICLE_NOT_EXISTS` - [`Vehicle`] with the provided ID doesn't exist.
#[tracing::instrument(skip_all)]
pub async fn update(
    ctx: Context,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<VehiclePatch>, JsonRejection>,
) -> Result<Json<Vehicle>, Error> {
    _ = ctx.current_session().await?;
    let id = vehicle_id(path)?;
    let Json(patch) = body.map_err(AsError::into_error)?;

    ctx.service()
        .execute(command::UpdateVehicle {
            vehicle_id: id,
            patch: patch.try_into()?,
        })
        .await
        .map(|v| Json(v.into()))
        .map_err(AsError::into_error)
}

/// Buys a [`Vehicle`] for the authenticated user.
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - request is not authenticated;
/// - `PERMISSION_DENIED` - user is not allowed to buy [`Vehicle`]s;
/// - `INVALID_IDENTIFIER` - provided ID is malformed;
/// - `VEHICLE_NOT_EXISTS` - [`Vehicle`] with the provided ID doesn't exist;
/// - `VEHICLE_ALREADY_SOLD` - [`Vehicle`] is sold already;
/// - `SALE_NOT_RECONCILED` - sale may be recorded without the [`Vehicle`]
///   being marked as sold.
#[tracing::instrument(
    skip_all,
    fields(user.id = tracing::field::Empty)
)]
pub async fn buy(
    ctx: Context,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vehicle>, Error> {
    let session = ctx.current_session().await?;
    _ = tracing::Span::current()
        .record("user.id", tracing::field::display(&session.user_id));
    let id = vehicle_id(path)?;

    ctx.service()
        .execute(command::BuyVehicle {
            vehicle_id: id,
            buyer_id: session.user_id,
            buyer_role: session.role,
        })
        .await
        .map(|v| Json(v.into()))
        .map_err(AsError::into_error)
}

impl AsError for command::create_vehicle::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PermissionDenied => {
                Some(PrivilegeError::PermissionDenied.into())
            }
        }
    }
}

impl AsError for command::update_vehicle::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::VehicleNotExists(_) => Some(VehicleError::NotExists.into()),
        }
    }
}

impl AsError for command::buy_vehicle::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PermissionDenied => {
                Some(PrivilegeError::PermissionDenied.into())
            }
            Self::SaleNotReconciled(id) => Some(Error {
                message: format!("`Sale(id: {id})` is not reconciled"),
                ..VehicleError::SaleNotReconciled.into()
            }),
            Self::VehicleAlreadySold(_) => {
                Some(VehicleError::AlreadySold.into())
            }
            Self::VehicleNotExists(_) => Some(VehicleError::NotExists.into()),
        }
    }
}

define_error! {
    enum VehicleError {
        #[code = "VEHICLE_ALREADY_SOLD"]
        #[status = CONFLICT]
        #[message = "`Vehicle` is sold already"]
        AlreadySold,

        #[code = "INVALID_IDENTIFIER"]
        #[status = BAD_REQUEST]
        #[message = "Malformed `Vehicle` identifier"]
        InvalidIdentifier,

        #[code = "VEHICLE_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Vehicle` does not exist"]
        NotExists,

        #[code = "SALE_NOT_RECONCILED"]
        #[status = INTERNAL_SERVER_ERROR]
        #[message = "`Sale` is not reconciled with its `Vehicle`"]
        SaleNotReconciled,
    }
}
