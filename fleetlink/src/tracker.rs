mod errors;
mod internal;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::model::NewLocationLog;
use crate::resource_api::{ResourceApiError, ResourceClient};
use crate::session::AccessTokenSource;

pub use errors::*;
pub use internal::{LocationReporter, NdjsonPositionSource, ReporterSettings};

/// One device fix as sampled from a position source. The timestamp is
/// optional; samples without one are stamped at publish time.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PositionFix {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<OffsetDateTime>,
}

/// Where device fixes come from.
#[async_trait]
pub trait PositionSource: Send {
    /// The next fix. `Exhausted` ends the reporting loop gracefully.
    async fn sample(&mut self) -> Result<PositionFix, PositionSourceError>;
}

/// Where location samples go. Implemented by the resource client.
#[async_trait]
pub trait LocationSink: Send + Sync {
    async fn publish(
        &self,
        sample: &NewLocationLog,
    ) -> Result<(), ResourceApiError>;
}

#[async_trait]
impl<S: AccessTokenSource> LocationSink for ResourceClient<S> {
    async fn publish(
        &self,
        sample: &NewLocationLog,
    ) -> Result<(), ResourceApiError> {
        self.submit_location(sample).await.map(|_| ())
    }
}

#[async_trait]
impl<K: LocationSink> LocationSink for &K {
    async fn publish(
        &self,
        sample: &NewLocationLog,
    ) -> Result<(), ResourceApiError> {
        (**self).publish(sample).await
    }
}
