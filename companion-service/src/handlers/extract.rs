use axum::extract::FromRequest;
use service_core::error::AppError;

/// `axum::Json` whose rejection is an [`AppError`], so undecodable bodies get
/// the same `{error, details}` response as every other failure.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);
