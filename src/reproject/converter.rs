use crate::error::Result;
use async_trait::async_trait;
use geophoto_types::convert::ConvertedPoint;
use geophoto_types::point::Cartographic;

/// A geographic-conversion service for the project's coordinate system.
///
/// Implementations must answer positionally: the i-th result belongs to the
/// i-th input position.
#[async_trait]
pub trait GeoConverter: Send + Sync {
    async fn geographic_to_spatial(
        &self,
        positions: &[Cartographic],
    ) -> Result<Vec<ConvertedPoint>>;
}
