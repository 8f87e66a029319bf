use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Consumables Forecast API",
        version = "0.1.0",
        description = r#"
# Consumables Forecast API

Predicts next-quarter usage of office consumables from their quarterly
history and estimates when current stock runs out.

## Methods

- **linear_regression**: least-squares trend over the positive history points
- **average**: a single positive history point is used as-is
- **average_fallback**: no usable history; the caller's quarterly average hint is used

## Error Handling

Errors share one envelope:

```json
{
  "success": false,
  "error": "Invalid request format. Expected \"items\" array.",
  "message": "Invalid request",
  "timestamp": "2025-01-10T12:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development")
    ),
    tags(
        (name = "forecast", description = "Usage forecasting endpoints"),
        (name = "health", description = "Health check endpoints")
    ),
    paths(
        crate::handlers::forecast::predict_consumables,
        crate::handlers::health::health_check,
    ),
    components(
        schemas(
            crate::handlers::forecast::ForecastBatchRequest,
            crate::handlers::forecast::ForecastBatchResponse,
            crate::handlers::health::HealthResponse,
            crate::forecast::ItemRequest,
            crate::forecast::ItemId,
            crate::forecast::HistoricalPoint,
            crate::forecast::ForecastFeatures,
            crate::forecast::ForecastResult,
            crate::forecast::ForecastMethod,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
