use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth::{dtos as auth_dtos, handlers as auth_handlers};
use crate::features::files::{dtos as files_dtos, handlers as files_handlers, models as files_models};
use crate::features::subscriptions::{
    dtos as subscriptions_dtos, handlers as subscriptions_handlers,
    models as subscriptions_models,
};
use crate::shared::format::{FileCategory, FileIcon};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth_handlers::signup,
        auth_handlers::login,
        auth_handlers::get_me,
        // Files
        files_handlers::upload_file,
        files_handlers::list_files,
        files_handlers::delete_file,
        files_handlers::get_share_link,
        files_handlers::get_upload_progress,
        // Share (public)
        files_handlers::open_shared_file,
        files_handlers::file_not_available,
        // Subscriptions
        subscriptions_handlers::get_status,
        subscriptions_handlers::create_checkout,
        subscriptions_handlers::list_plans,
    ),
    components(
        schemas(
            Meta,
            // Auth
            auth_dtos::SignupRequestDto,
            auth_dtos::LoginRequestDto,
            auth_dtos::AuthResponseDto,
            auth_dtos::AuthUserDto,
            auth_dtos::MeResponseDto,
            ApiResponse<auth_dtos::AuthResponseDto>,
            ApiResponse<auth_dtos::MeResponseDto>,
            // Files
            FileIcon,
            FileCategory,
            files_models::StorageTier,
            files_dtos::UploadFileDto,
            files_dtos::FileResponseDto,
            files_dtos::UploadResultDto,
            files_dtos::ShareLinkDto,
            files_dtos::UploadProgressDto,
            files_dtos::DeleteFileResponseDto,
            ApiResponse<files_dtos::UploadResultDto>,
            ApiResponse<Vec<files_dtos::FileResponseDto>>,
            ApiResponse<files_dtos::ShareLinkDto>,
            ApiResponse<files_dtos::UploadProgressDto>,
            ApiResponse<files_dtos::DeleteFileResponseDto>,
            // Subscriptions
            subscriptions_models::SubscriptionTier,
            subscriptions_models::PlanLimits,
            subscriptions_models::SubscriptionStatus,
            subscriptions_models::Plan,
            subscriptions_dtos::CheckoutRequestDto,
            subscriptions_dtos::CheckoutResponseDto,
            ApiResponse<subscriptions_models::SubscriptionStatus>,
            ApiResponse<subscriptions_dtos::CheckoutResponseDto>,
            ApiResponse<Vec<subscriptions_models::Plan>>,
        )
    ),
    tags(
        (name = "auth", description = "Signup, login and the current user"),
        (name = "files", description = "Upload, list, delete and link files"),
        (name = "share", description = "Public share links"),
        (name = "subscriptions", description = "Plans, limits and checkout"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Sharebox API",
        version = "0.1.0",
        description = "File upload and sharing API",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
