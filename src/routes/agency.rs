use axum::extract::State;
use std::sync::Arc;

use crate::api::DataResponse;
use crate::app::AppState;
use crate::config::AgencyInfo;

/// GET /agency
///
/// Contact details shown in the site header and footer.
pub async fn get_agency(State(state): State<Arc<AppState>>) -> DataResponse<AgencyInfo> {
    DataResponse::new(state.settings.agency.clone())
}
