//! [`Sale`]-related REST API definitions.

use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::{
    domain::{self, sale, vehicle},
    query, Query as _,
};

use crate::{AsError, Context, Error};

/// Completed purchase of a [`Vehicle`].
///
/// [`Vehicle`]: super::Vehicle
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Sale {
    /// ID of this [`Sale`].
    pub id: sale::Id,

    /// ID of the sold [`Vehicle`].
    ///
    /// [`Vehicle`]: super::Vehicle
    pub vehicle_id: vehicle::Id,

    /// ID of the user who bought the [`Vehicle`].
    ///
    /// [`Vehicle`]: super::Vehicle
    pub user_id: String,

    /// Price the [`Vehicle`] was sold for.
    ///
    /// [`Vehicle`]: super::Vehicle
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Date and time when this [`Sale`] happened.
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub sold_at: sale::SaleDateTime,
}

impl From<domain::Sale> for Sale {
    fn from(sale: domain::Sale) -> Self {
        let domain::Sale {
            id,
            vehicle_id,
            buyer_id,
            price,
            sold_at,
        } = sale;
        Self {
            id,
            vehicle_id,
            user_id: buyer_id.to_string(),
            price: price.into(),
            sold_at,
        }
    }
}

/// Lists all the [`Sale`]s in the order they happened.
///
/// # Errors
///
/// Only on infrastructure failures.
#[tracing::instrument(skip_all)]
pub async fn list(ctx: Context) -> Result<Json<Vec<Sale>>, Error> {
    let sales = ctx
        .service()
        .execute(query::sales::List::by(()))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(sales.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
mod spec {
    use http::{Method, StatusCode};
    use serde_json::json;

    use crate::api::spec::{admin, app, call, client, create_vehicle};

    #[tokio::test]
    async fn lists_sales_with_price_snapshot() {
        let app = app();
        let first = create_vehicle(&app, 50_000).await;
        let second = create_vehicle(&app, 70_000).await;

        for (id, user) in [(&second, "client-2"), (&first, "client-1")] {
            let (status, _) = call(
                &app,
                Method::POST,
                &format!("/vehicles/{id}/buy"),
                Some(&client(user)),
                None,
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, _) = call(
            &app,
            Method::PATCH,
            &format!("/vehicles/{second}"),
            Some(&admin()),
            Some(json!({"price": 99_000})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&app, Method::GET, "/sales", None, None).await;

        assert_eq!(status, StatusCode::OK);
        let sales = body.as_array().unwrap();
        assert_eq!(sales.len(), 2);
        assert_eq!(sales[0]["vehicle_id"], second.as_str());
        assert_eq!(sales[0]["user_id"], "client-2");
        assert_eq!(sales[0]["price"].as_f64(), Some(70_000.0));
        assert_eq!(sales[1]["vehicle_id"], first.as_str());
        assert_eq!(sales[1]["user_id"], "client-1");
        assert_eq!(sales[1]["price"].as_f64(), Some(50_000.0));
        assert!(sales.iter().all(|s| s["sold_at"].is_string()));
    }
}
