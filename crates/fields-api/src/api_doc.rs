//! OpenAPI document.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::custom_field::create,
        crate::handlers::custom_field::read,
        crate::handlers::custom_field::update,
        crate::handlers::custom_field::delete,
        crate::handlers::search::search,
        crate::handlers::master_list::create,
        crate::handlers::master_list::update,
        crate::handlers::status::update_status,
        crate::handlers::status::update_popup,
    ),
    components(schemas(
        crate::response::ApiResponse,
        crate::response::ResponseParams,
        fields_core::models::SearchCriteria,
        fields_core::models::SearchResult,
        fields_core::models::HierarchyNode,
    )),
    tags(
        (name = "customFields", description = "Organization-defined custom field management")
    )
)]
pub struct ApiDoc;
