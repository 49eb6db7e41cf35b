//! services/web/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification of the JSON endpoints.

use utoipa::OpenApi;

use crate::web::{auth, content, payment, profile};

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::google_login_handler,
        auth::logout_handler,
        auth::me_handler,
        content::restructure_handler,
        payment::subscribe_handler,
        payment::bypass_handler,
        profile::history_handler,
        profile::buy_credits_handler,
    ),
    components(
        schemas(
            auth::CredentialsRequest,
            auth::GoogleLoginRequest,
            auth::AuthResponse,
            auth::UserResponse,
            auth::SessionResponse,
            content::InputModeDto,
            content::RestructureBody,
            content::PlatformResult,
            content::RestructureResponse,
            payment::SubscribeRequest,
            payment::SubscribeResponse,
            payment::PaymentErrorResponse,
            profile::HistoryEntryResponse,
            profile::BuyCreditsRequest,
        )
    ),
    tags(
        (name = "Recraftr API", description = "Endpoints behind the Recraftr screens.")
    )
)]
pub struct ApiDoc;
