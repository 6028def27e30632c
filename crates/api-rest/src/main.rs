//! PDS REST API server.
//!
//! ## Purpose
//! Exposes every PDS operation as a JSON endpoint with OpenAPI/Swagger
//! documentation: order validation and submission, formulary queries, renal
//! function estimation, interaction checks and dosing calculators.
//!
//! The HIS client behind the submission endpoints is the in-memory mock;
//! deployments substitute a real transport implementing `HisClient`.

use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{dto, HealthService};
use pds_core::validation::{validate_drug_code, validate_order_id};
use pds_core::{
    dosing, estimate_crcl, resolve_data_dir, CoreConfig, CoreError, Formulary, FormularyItem,
    InteractionIndex, InteractionRecord, InteractionSeverity, MockHisClient, OrderDraft,
    PrescriptionService, RenalDosing, Sex,
};

/// Application state shared across REST API handlers.
#[derive(Clone)]
struct AppState {
    service: Arc<PrescriptionService>,
    interactions: Arc<InteractionIndex>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        validate_order,
        submit_order,
        stop_order,
        get_formulary_item,
        search_formulary,
        high_alert_drugs,
        get_renal_adjustment,
        compute_crcl,
        check_interactions,
        weight_based_dose,
        infusion_rate,
    ),
    components(schemas(
        dto::HealthRes,
        dto::ValidateOrderReq,
        dto::ValidationRes,
        dto::SuggestedAdjustmentRes,
        dto::SubmitOrderReq,
        dto::OrderRes,
        dto::StopOrderReq,
        dto::StopRes,
        dto::FormularyItemRes,
        dto::FormularyListRes,
        dto::CrclReq,
        dto::CrclRes,
        dto::RenalAdjustmentRes,
        dto::InteractionCheckReq,
        dto::InteractionRes,
        dto::InteractionCheckRes,
        dto::WeightBasedDoseReq,
        dto::WeightBasedDoseRes,
        dto::InfusionRateReq,
        dto::InfusionRateRes,
    ))
)]
struct ApiDoc;

/// Main entry point for the PDS REST API server.
///
/// # Environment Variables
/// - `PDS_REST_ADDR`: server address (default: "0.0.0.0:3000")
/// - `PDS_DATA_DIR`: reference-data directory override
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the reference data cannot be located or loaded,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("PDS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("-- Starting PDS REST API on {}", addr);

    let data_dir_override = std::env::var("PDS_DATA_DIR").ok().map(PathBuf::from);
    let cfg = CoreConfig::new(resolve_data_dir(data_dir_override)?)?;

    let formulary = Arc::new(Formulary::load(&cfg.formulary_path())?);
    let renal_dosing = Arc::new(RenalDosing::load(&cfg.renal_adjustments_path())?);
    let interactions = Arc::new(InteractionIndex::load(&cfg.interactions_path())?);
    tracing::info!(
        formulary_items = formulary.len(),
        renal_rules = renal_dosing.len(),
        interaction_pairs = interactions.len(),
        "reference data loaded"
    );

    let service = Arc::new(PrescriptionService::new(
        formulary,
        renal_dosing,
        Arc::new(MockHisClient::new()),
    ));
    let state = AppState {
        service,
        interactions,
    };

    let app = Router::new()
        .route("/health", get(health))
        .route("/orders/validate", post(validate_order))
        .route("/orders", post(submit_order))
        .route("/orders/:order_id/discontinue", post(stop_order))
        .route("/formulary", get(search_formulary))
        .route("/formulary/high-alert", get(high_alert_drugs))
        .route("/formulary/:drug_code", get(get_formulary_item))
        .route("/renal/adjustments/:drug_code", get(get_renal_adjustment))
        .route("/renal/crcl", post(compute_crcl))
        .route("/interactions/check", post(check_interactions))
        .route("/dosing/weight-based", post(weight_based_dose))
        .route("/dosing/infusion-rate", post(infusion_rate))
        .merge(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// DTO conversions ----------------------------------------------------------

fn formulary_item_res(item: FormularyItem) -> dto::FormularyItemRes {
    dto::FormularyItemRes {
        drug_code: item.drug_code,
        drug_name: item.drug_name,
        generic_name: item.generic_name,
        strength: item.strength,
        unit: item.unit,
        dosage_form: item.dosage_form,
        available_routes: item.available_routes,
        min_dose: item.min_dose,
        max_dose: item.max_dose,
        default_frequency: item.default_frequency,
        nhi_code: item.nhi_code,
        atc_code: item.atc_code,
        requires_renal_adjustment: item.requires_renal_adjustment,
        high_alert: item.high_alert,
    }
}

fn validation_res(result: pds_core::ValidationResult) -> dto::ValidationRes {
    dto::ValidationRes {
        valid: result.valid,
        errors: result.errors,
        warnings: result.warnings,
        suggested_adjustments: result.suggested_adjustments.map(|a| {
            dto::SuggestedAdjustmentRes {
                needs_renal_adjustment: a.needs_renal_adjustment,
                suggested_frequency: a.suggested_frequency,
                recommendation: a.recommendation,
            }
        }),
    }
}

fn interaction_res(record: InteractionRecord) -> dto::InteractionRes {
    let severity = match record.severity {
        InteractionSeverity::Minor => "minor",
        InteractionSeverity::Moderate => "moderate",
        InteractionSeverity::Major => "major",
        InteractionSeverity::Contraindicated => "contraindicated",
    };
    dto::InteractionRes {
        drug_a: record.drug_a,
        drug_b: record.drug_b,
        severity: severity.to_string(),
        description: record.description,
        recommendation: record.recommendation,
    }
}

// Handlers -----------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = dto::HealthRes)
    )
)]
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<dto::HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/orders/validate",
    request_body = dto::ValidateOrderReq,
    responses(
        (status = 200, description = "Validation verdict", body = dto::ValidationRes),
        (status = 400, description = "Bad request")
    )
)]
/// Validate a proposed medication order.
///
/// Business-rule findings are always a `200` with the verdict inside the
/// body; only malformed input is a `400`.
#[axum::debug_handler]
async fn validate_order(
    State(state): State<AppState>,
    Json(req): Json<dto::ValidateOrderReq>,
) -> Result<Json<dto::ValidationRes>, (StatusCode, &'static str)> {
    if let Err(e) = validate_drug_code(&req.drug_code) {
        tracing::error!("Invalid drug code: {:?}", e);
        return Err((StatusCode::BAD_REQUEST, "Invalid drug code"));
    }

    let result = state.service.validate_order(
        &req.drug_code,
        req.dose,
        &req.dose_unit,
        &req.route,
        &req.frequency,
        req.patient_crcl,
    );
    Ok(Json(validation_res(result)))
}

#[utoipa::path(
    post,
    path = "/orders",
    request_body = dto::SubmitOrderReq,
    responses(
        (status = 200, description = "Submission outcome", body = dto::OrderRes),
        (status = 400, description = "Bad request")
    )
)]
/// Validate and submit an order to the HIS.
#[axum::debug_handler]
async fn submit_order(
    State(state): State<AppState>,
    Json(req): Json<dto::SubmitOrderReq>,
) -> Result<Json<dto::OrderRes>, (StatusCode, &'static str)> {
    if let Err(e) = validate_drug_code(&req.drug_code) {
        tracing::error!("Invalid drug code: {:?}", e);
        return Err((StatusCode::BAD_REQUEST, "Invalid drug code"));
    }

    let draft = OrderDraft {
        patient_id: req.patient_id,
        drug_code: req.drug_code,
        dose: req.dose,
        dose_unit: req.dose_unit,
        route: req.route,
        frequency: req.frequency,
        duration_days: req.duration_days,
        physician_id: req.physician_id,
        notes: req.notes,
    };
    let result = state
        .service
        .submit_order(&draft, req.patient_crcl, req.override_warnings)
        .await;

    Ok(Json(dto::OrderRes {
        success: result.success,
        order_id: result.order_id,
        message: result.message,
        errors: result.errors,
    }))
}

#[utoipa::path(
    post,
    path = "/orders/{order_id}/discontinue",
    request_body = dto::StopOrderReq,
    responses(
        (status = 200, description = "Discontinuation outcome", body = dto::StopRes),
        (status = 400, description = "Bad request")
    )
)]
/// Discontinue an existing order through the HIS.
#[axum::debug_handler]
async fn stop_order(
    State(state): State<AppState>,
    AxumPath(order_id): AxumPath<String>,
    Json(req): Json<dto::StopOrderReq>,
) -> Result<Json<dto::StopRes>, (StatusCode, &'static str)> {
    if let Err(e) = validate_order_id(&order_id) {
        tracing::error!("Invalid order id: {:?}", e);
        return Err((StatusCode::BAD_REQUEST, "Invalid order id"));
    }

    let result = state.service.stop_order(&order_id, &req.reason).await;
    Ok(Json(dto::StopRes {
        success: result.success,
        message: result.message,
    }))
}

#[utoipa::path(
    get,
    path = "/formulary/{drug_code}",
    responses(
        (status = 200, description = "Formulary item", body = dto::FormularyItemRes),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Drug code not in the formulary")
    )
)]
#[axum::debug_handler]
async fn get_formulary_item(
    State(state): State<AppState>,
    AxumPath(drug_code): AxumPath<String>,
) -> Result<Json<dto::FormularyItemRes>, (StatusCode, &'static str)> {
    if let Err(e) = validate_drug_code(&drug_code) {
        tracing::error!("Invalid drug code: {:?}", e);
        return Err((StatusCode::BAD_REQUEST, "Invalid drug code"));
    }

    match state.service.formulary_item(&drug_code) {
        Some(item) => Ok(Json(formulary_item_res(item))),
        None => Err((StatusCode::NOT_FOUND, "Drug code not in the formulary")),
    }
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: String,
    limit: Option<usize>,
}

#[utoipa::path(
    get,
    path = "/formulary",
    params(
        ("query" = String, Query, description = "Substring to match against code and names"),
        ("limit" = Option<usize>, Query, description = "Maximum results, default 10")
    ),
    responses(
        (status = 200, description = "Matching formulary items", body = dto::FormularyListRes)
    )
)]
#[axum::debug_handler]
async fn search_formulary(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<dto::FormularyListRes> {
    let limit = params.limit.unwrap_or(10);
    let items = state
        .service
        .search_formulary(&params.query, limit)
        .into_iter()
        .map(formulary_item_res)
        .collect();
    Json(dto::FormularyListRes { items })
}

#[utoipa::path(
    get,
    path = "/formulary/high-alert",
    responses(
        (status = 200, description = "High-alert drugs", body = dto::FormularyListRes)
    )
)]
#[axum::debug_handler]
async fn high_alert_drugs(State(state): State<AppState>) -> Json<dto::FormularyListRes> {
    let items = state
        .service
        .high_alert_drugs()
        .into_iter()
        .map(formulary_item_res)
        .collect();
    Json(dto::FormularyListRes { items })
}

#[derive(Debug, Deserialize)]
struct CrclQuery {
    crcl: f64,
}

#[utoipa::path(
    get,
    path = "/renal/adjustments/{drug_code}",
    params(
        ("crcl" = f64, Query, description = "Creatinine clearance in mL/min")
    ),
    responses(
        (status = 200, description = "Renal adjustment", body = dto::RenalAdjustmentRes),
        (status = 400, description = "Bad request")
    )
)]
#[axum::debug_handler]
async fn get_renal_adjustment(
    State(state): State<AppState>,
    AxumPath(drug_code): AxumPath<String>,
    Query(params): Query<CrclQuery>,
) -> Result<Json<dto::RenalAdjustmentRes>, (StatusCode, &'static str)> {
    if let Err(e) = validate_drug_code(&drug_code) {
        tracing::error!("Invalid drug code: {:?}", e);
        return Err((StatusCode::BAD_REQUEST, "Invalid drug code"));
    }

    let adjustment = state.service.renal_adjustment(&drug_code, params.crcl);
    Ok(Json(dto::RenalAdjustmentRes {
        drug_code: adjustment.drug_code,
        crcl_range: adjustment.crcl_range,
        needs_adjustment: adjustment.needs_adjustment,
        recommendation: adjustment.recommendation,
        suggested_dose: adjustment.suggested_dose,
        suggested_frequency: adjustment.suggested_frequency,
        contraindicated: adjustment.contraindicated,
    }))
}

#[utoipa::path(
    post,
    path = "/renal/crcl",
    request_body = dto::CrclReq,
    responses(
        (status = 200, description = "Estimated creatinine clearance", body = dto::CrclRes),
        (status = 400, description = "Bad request")
    )
)]
/// Estimate creatinine clearance with the Cockcroft-Gault formula.
#[axum::debug_handler]
async fn compute_crcl(
    State(_state): State<AppState>,
    Json(req): Json<dto::CrclReq>,
) -> Result<Json<dto::CrclRes>, (StatusCode, &'static str)> {
    let sex: Sex = match req.sex.parse() {
        Ok(sex) => sex,
        Err(e) => {
            tracing::error!("Invalid sex: {:?}", e);
            return Err((StatusCode::BAD_REQUEST, "Invalid sex"));
        }
    };

    match estimate_crcl(req.age_years, req.weight_kg, req.serum_creatinine, sex) {
        Ok(estimate) => Ok(Json(dto::CrclRes {
            value: estimate.value,
            unit: "mL/min".into(),
            category: estimate.category.to_string(),
            formula: "Cockcroft-Gault".into(),
        })),
        Err(e) => {
            tracing::error!("CrCl estimation error: {:?}", e);
            Err((StatusCode::BAD_REQUEST, "Invalid patient parameters"))
        }
    }
}

#[utoipa::path(
    post,
    path = "/interactions/check",
    request_body = dto::InteractionCheckReq,
    responses(
        (status = 200, description = "Interactions found", body = dto::InteractionCheckRes)
    )
)]
/// Check every pair in a medication list against the interaction index.
#[axum::debug_handler]
async fn check_interactions(
    State(state): State<AppState>,
    Json(req): Json<dto::InteractionCheckReq>,
) -> Json<dto::InteractionCheckRes> {
    let interactions = state
        .interactions
        .check_list(&req.drugs)
        .into_iter()
        .map(interaction_res)
        .collect();
    Json(dto::InteractionCheckRes { interactions })
}

#[utoipa::path(
    post,
    path = "/dosing/weight-based",
    request_body = dto::WeightBasedDoseReq,
    responses(
        (status = 200, description = "Calculated dose", body = dto::WeightBasedDoseRes),
        (status = 400, description = "Bad request")
    )
)]
#[axum::debug_handler]
async fn weight_based_dose(
    State(_state): State<AppState>,
    Json(req): Json<dto::WeightBasedDoseReq>,
) -> Result<Json<dto::WeightBasedDoseRes>, (StatusCode, &'static str)> {
    match dosing::weight_based_dose(
        req.dose_per_kg,
        req.patient_weight_kg,
        &req.dose_unit,
        req.max_dose,
        req.round_to,
    ) {
        Ok(dose) => Ok(Json(dto::WeightBasedDoseRes {
            dose_per_kg: dose.dose_per_kg,
            patient_weight_kg: dose.patient_weight_kg,
            calculated_dose: dose.calculated_dose,
            final_dose: dose.final_dose,
            dose_unit: dose.dose_unit,
            max_dose: dose.max_dose,
            capped: dose.capped,
        })),
        Err(CoreError::InvalidInput(e)) => {
            tracing::error!("Weight-based dose error: {e}");
            Err((StatusCode::BAD_REQUEST, "Invalid dose parameters"))
        }
        Err(e) => {
            tracing::error!("Weight-based dose error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}

#[utoipa::path(
    post,
    path = "/dosing/infusion-rate",
    request_body = dto::InfusionRateReq,
    responses(
        (status = 200, description = "Calculated infusion rate", body = dto::InfusionRateRes),
        (status = 400, description = "Bad request")
    )
)]
#[axum::debug_handler]
async fn infusion_rate(
    State(_state): State<AppState>,
    Json(req): Json<dto::InfusionRateReq>,
) -> Result<Json<dto::InfusionRateRes>, (StatusCode, &'static str)> {
    match dosing::infusion_rate(
        req.total_dose,
        &req.dose_unit,
        req.volume_ml,
        req.duration_hours,
    ) {
        Ok(rate) => Ok(Json(dto::InfusionRateRes {
            total_dose: rate.total_dose,
            dose_unit: rate.dose_unit,
            volume_ml: rate.volume_ml,
            duration_hours: rate.duration_hours,
            concentration: rate.concentration,
            rate_ml_per_hour: rate.rate_ml_per_hour,
            rate_dose_per_hour: rate.rate_dose_per_hour,
        })),
        Err(e) => {
            tracing::error!("Infusion rate error: {:?}", e);
            Err((StatusCode::BAD_REQUEST, "Invalid infusion parameters"))
        }
    }
}
