use std::time::Duration;

use rama::{
    Layer as _, Service as _,
    error::OpaqueError,
    http::{
        Body, Request, Response,
        client::EasyHttpWebClient,
        layer::{
            decompression::DecompressionLayer, map_request_body::MapRequestBodyLayer,
            map_response_body::MapResponseBodyLayer, timeout::TimeoutLayer,
        },
    },
    layer::MapErrLayer,
    service::BoxService,
};

/// Boxed web client shared (cloned) by every virtual user.
///
/// No transport-level retry layer is mounted: retry and backoff are owned by
/// the calling behaviors per endpoint.
pub fn new_http_client() -> BoxService<Request, Response, OpaqueError> {
    let inner_https_client = EasyHttpWebClient::default();
    (
        MapResponseBodyLayer::new(Body::new),
        DecompressionLayer::new(),
        MapErrLayer::new(OpaqueError::from_std),
        TimeoutLayer::new(Duration::from_secs(60)),
        MapRequestBodyLayer::new(Body::new),
    )
        .into_layer(inner_https_client)
        .boxed()
}
